use std::sync::Arc;

use http::Method;

use crate::envelope::Envelope;
use crate::node::{Handler, NodeBuilder, NodeId, NodeTree, RequestCheck, ResponseCheck};
use crate::request::RequestContext;

/// Everything registered under one version tag.
pub struct VersionEntry {
    tag: Arc<str>,
    tree: NodeTree,
    request_checks: Vec<(RequestCheck, u16)>,
    response_checks: Vec<ResponseCheck>,
    default_endpoint: Option<Box<dyn Handler>>,
}

impl VersionEntry {
    fn new(tag: &str) -> Self {
        Self {
            tag: Arc::from(tag),
            tree: NodeTree::new(tag),
            request_checks: Vec::new(),
            response_checks: Vec::new(),
            default_endpoint: None,
        }
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[must_use]
    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    #[must_use]
    pub fn default_endpoint(&self) -> Option<&dyn Handler> {
        self.default_endpoint.as_deref()
    }

    /// Run the global request checks in order. Returns the fallback status
    /// of the first check that rejects the request.
    #[must_use]
    pub fn check_request(&self, ctx: &RequestContext) -> Option<u16> {
        self.request_checks
            .iter()
            .find(|(check, _)| !check(ctx))
            .map(|(_, status)| *status)
    }

    /// Run the global response checks in order.
    pub fn check_response(&self, envelope: &mut Envelope) {
        for check in &self.response_checks {
            check(envelope);
        }
    }
}

/// Version tag → endpoint tree, in registration order.
#[derive(Default)]
pub struct VersionRegistry {
    entries: Vec<VersionEntry>,
}

impl VersionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&VersionEntry> {
        self.entries.iter().find(|e| e.tag() == tag)
    }

    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.get(tag).is_some()
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(VersionEntry::tag)
    }

    pub fn entries(&self) -> impl Iterator<Item = &VersionEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for `tag`, created empty on first use. Registering the same
    /// tag again reopens the existing entry, so later passes add to it.
    pub fn entry_or_insert(&mut self, tag: &str) -> &mut VersionEntry {
        let index = match self.entries.iter().position(|e| e.tag() == tag) {
            Some(index) => index,
            None => {
                self.entries.push(VersionEntry::new(tag));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index]
    }

    /// Split a request path into its version entry and the remainder.
    ///
    /// The first segment selects a registered tag by exact match and is
    /// stripped. Otherwise the `default` tag is used and the path is kept
    /// whole. The leading `/` is never part of the remainder.
    #[must_use]
    pub fn resolve<'p>(&self, path: &'p str, default: Option<&str>) -> (Option<&VersionEntry>, &'p str) {
        let path = path.strip_prefix('/').unwrap_or(path);
        let (first, rest) = match path.split_once('/') {
            Some((first, rest)) => (first, rest),
            None => (path, ""),
        };
        if let Some(entry) = self.get(first) {
            return (Some(entry), rest);
        }
        (default.and_then(|tag| self.get(tag)), path)
    }

    /// [`resolve`](Self::resolve) for a path already split into segments.
    #[must_use]
    pub fn resolve_segments<'s, S: AsRef<str>>(
        &self,
        segments: &'s [S],
        default: Option<&str>,
    ) -> (Option<&VersionEntry>, &'s [S]) {
        if let Some((first, rest)) = segments.split_first() {
            if let Some(entry) = self.get(first.as_ref()) {
                return (Some(entry), rest);
            }
        }
        (default.and_then(|tag| self.get(tag)), segments)
    }
}

/// Registration scope of one version.
///
/// Obtained from [`ApiBuilder::add_version`](crate::api::ApiBuilder::add_version).
/// Endpoints, global checks and the default endpoint can only be
/// registered through a session, so they always belong to a version.
pub struct VersionSession<'a> {
    entry: &'a mut VersionEntry,
    fallback: bool,
    warn_empty_methods: bool,
}

impl<'a> VersionSession<'a> {
    pub(crate) fn new(entry: &'a mut VersionEntry, fallback: bool, warn_empty_methods: bool) -> Self {
        Self {
            entry,
            fallback,
            warn_empty_methods,
        }
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        self.entry.tag()
    }

    /// Whether this session is a fallback pass.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// Register a top-level endpoint of this version.
    ///
    /// A later registration under the same name replaces this one; see
    /// [`NodeTree::add_child`].
    pub fn add<M, H>(&mut self, name: &str, methods: M, handler: H) -> NodeBuilder<'_>
    where
        M: IntoIterator<Item = Method>,
        H: Handler + 'static,
    {
        let root = self.entry.tree.root();
        let mut root = NodeBuilder::new(&mut self.entry.tree, root, self.fallback, self.warn_empty_methods);
        let id = root.add(name, methods, handler).id();
        NodeBuilder::new(&mut self.entry.tree, id, self.fallback, self.warn_empty_methods)
    }

    /// Id of the node registered at `path` in this version, e.g.
    /// `"users/me"`.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<NodeId> {
        self.entry.tree.lookup(path)
    }

    /// Reopen a node registered earlier in this version.
    pub fn node(&mut self, id: NodeId) -> Option<NodeBuilder<'_>> {
        self.entry.tree.get(id)?;
        Some(NodeBuilder::new(
            &mut self.entry.tree,
            id,
            self.fallback,
            self.warn_empty_methods,
        ))
    }

    /// Check run before routing for every request of this version. When it
    /// returns `false` the request is answered with `fallback_status`.
    pub fn global_request_check<F>(&mut self, fallback_status: u16, check: F) -> &mut Self
    where
        F: Fn(&RequestContext) -> bool + Send + Sync + 'static,
    {
        self.entry.request_checks.push((Box::new(check), fallback_status));
        self
    }

    /// Callback run on every envelope of this version before serialization.
    pub fn global_response_check<F>(&mut self, check: F) -> &mut Self
    where
        F: Fn(&mut Envelope) + Send + Sync + 'static,
    {
        self.entry.response_checks.push(Box::new(check));
        self
    }

    /// Handler answering requests that carry no path below the version.
    pub fn default_endpoint<H>(&mut self, handler: H) -> &mut Self
    where
        H: Handler + 'static,
    {
        self.entry.default_endpoint = Some(Box::new(handler));
        self
    }
}
