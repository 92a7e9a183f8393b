//! Arena-backed endpoint tree.
//!
//! Nodes live in a `Vec` and refer to each other by [`NodeId`]. Children are
//! owned through the arena; the parent link is an id, so walking up the tree
//! never borrows anything and can only be used to rebuild a path string.
//!
//! The tree is append-only. Registering a child under a name that already
//! exists re-points the name to the new node; the replaced node stays in the
//! arena but is no longer reachable.

use std::sync::Arc;

use tracing::{debug, warn};

use super::core::{Handler, Node, RequestCheck, ResponseCheck};
use crate::envelope::Envelope;
use crate::middleware::Interceptor;
use crate::request::{method_set, MethodSet, RequestContext, HTTP_METHODS};
use http::Method;

/// Handle of a node inside one [`NodeTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// One version's endpoint tree. The root accepts every method and has no
/// handler; it is never run, only walked through.
pub struct NodeTree {
    nodes: Vec<Node>,
}

impl NodeTree {
    /// Create a tree whose root is named `root_name` (the version tag).
    #[must_use]
    pub fn new(root_name: &str) -> Self {
        let root = Node::new(Arc::from(root_name), method_set(HTTP_METHODS), None, false);
        Self { nodes: vec![root] }
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Registration handle on an existing node. Nodes added through it are
    /// primary registrations.
    pub fn builder(&mut self, id: NodeId) -> Option<NodeBuilder<'_>> {
        self.get(id)?;
        Some(NodeBuilder::new(self, id, false, true))
    }

    /// Child of `parent` registered under `name`.
    #[must_use]
    pub fn child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.get(parent)?
            .children
            .iter()
            .find(|(child, _)| **child == *name)
            .map(|(_, id)| *id)
    }

    /// Node reached from the root by following `path` (`/`-separated exact
    /// names).
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<NodeId> {
        path.split('/')
            .try_fold(self.root(), |id, segment| self.child(id, segment))
    }

    /// Create a child of `parent`, bind `handler` to it and register it
    /// under `name`. A previous child with the same name is replaced.
    ///
    /// Returns `None` when `parent` does not belong to this tree.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        name: &str,
        methods: MethodSet,
        handler: Box<dyn Handler>,
        fallback: bool,
        warn_empty_methods: bool,
    ) -> Option<NodeId> {
        self.get(parent)?;

        let id = NodeId(self.nodes.len());
        let name: Arc<str> = Arc::from(name);
        let mut node = Node::new(Arc::clone(&name), methods, Some(parent), fallback);
        node.bind(handler, warn_empty_methods);
        self.nodes.push(node);

        let previous = self.child(parent, &name);
        let siblings = &mut self.nodes[parent.0].children;
        match siblings.iter_mut().find(|(child, _)| *child == name) {
            Some(slot) => slot.1 = id,
            None => siblings.push((name, id)),
        }

        let path = self.path_of(id);
        if let Some(old) = previous {
            if self.nodes[old.0].fallback {
                debug!(%path, "fallback endpoint replaced");
            } else {
                warn!(%path, "endpoint registered twice; the later registration replaces the earlier one");
            }
        }
        debug!(%path, methods = ?self.nodes[id.0].methods(), fallback, "endpoint added");
        Some(id)
    }

    pub fn add_request_check(&mut self, id: NodeId, fallback_status: u16, check: RequestCheck) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.add_request_check(fallback_status, check);
        }
    }

    pub fn add_response_check(&mut self, id: NodeId, check: ResponseCheck) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.add_response_check(check);
        }
    }

    /// Resolve `segments` below `from` and run the node they name.
    ///
    /// Every segment must be the exact name of a child; there are no
    /// wildcards or captures. A miss anywhere yields 404.
    pub fn find_node(
        &self,
        from: NodeId,
        segments: &[&str],
        ctx: &RequestContext,
        interceptors: &[Arc<dyn Interceptor>],
    ) -> Envelope {
        let Some((first, rest)) = segments.split_first() else {
            return Envelope::new(404);
        };
        match self.child(from, first) {
            Some(child) if rest.is_empty() => self.nodes[child.0].run(ctx, interceptors),
            Some(child) => self.find_node(child, rest, ctx, interceptors),
            None => {
                debug!(segment = %first, url = %ctx.url(), "no endpoint for path segment");
                Envelope::new(404)
            }
        }
    }

    /// Diagnostic path of a node, e.g. `/v1/users/me`.
    #[must_use]
    pub fn path_of(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut cursor = self.get(id);
        while let Some(node) = cursor {
            names.push(node.name());
            cursor = node.parent.and_then(|p| self.get(p));
        }
        names.iter().rev().fold(String::new(), |mut path, name| {
            path.push('/');
            path.push_str(name);
            path
        })
    }

    /// Every reachable, bound endpoint in registration order (depth first).
    #[must_use]
    pub fn endpoints(&self) -> Vec<(String, Vec<Method>)> {
        let mut out = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            if node.is_bound() {
                out.push((self.path_of(id), node.methods().to_vec()));
            }
            stack.extend(node.children.iter().rev().map(|(_, child)| *child));
        }
        out
    }
}

/// Mutable handle on one node during registration.
///
/// Returned by [`VersionSession::add`](crate::registry::VersionSession::add)
/// and by [`NodeBuilder::add`] for nested endpoints.
pub struct NodeBuilder<'a> {
    tree: &'a mut NodeTree,
    id: NodeId,
    fallback: bool,
    warn_empty_methods: bool,
}

impl<'a> NodeBuilder<'a> {
    pub(crate) fn new(tree: &'a mut NodeTree, id: NodeId, fallback: bool, warn_empty_methods: bool) -> Self {
        Self {
            tree,
            id,
            fallback,
            warn_empty_methods,
        }
    }

    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub fn path(&self) -> String {
        self.tree.path_of(self.id)
    }

    /// Register a child endpoint below this node.
    pub fn add<M, H>(&mut self, name: &str, methods: M, handler: H) -> NodeBuilder<'_>
    where
        M: IntoIterator<Item = Method>,
        H: Handler + 'static,
    {
        let parent = self.id;
        // `self.id` was minted by this tree, so the parent always exists.
        let id = self
            .tree
            .add_child(
                parent,
                name,
                method_set(methods),
                Box::new(handler),
                self.fallback,
                self.warn_empty_methods,
            )
            .unwrap_or(parent);
        NodeBuilder::new(&mut *self.tree, id, self.fallback, self.warn_empty_methods)
    }

    /// Add a request check; when it returns `false` the request is answered
    /// with `fallback_status` and the handler is not called.
    pub fn request_check<F>(&mut self, fallback_status: u16, check: F) -> &mut Self
    where
        F: Fn(&RequestContext) -> bool + Send + Sync + 'static,
    {
        self.tree
            .add_request_check(self.id, fallback_status, Box::new(check));
        self
    }

    /// Add a response check, run after the handler in registration order.
    pub fn response_check<F>(&mut self, check: F) -> &mut Self
    where
        F: Fn(&mut Envelope) + Send + Sync + 'static,
    {
        self.tree.add_response_check(self.id, Box::new(check));
        self
    }
}
