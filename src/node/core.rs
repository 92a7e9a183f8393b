//! Node core: handler invocation and the per-node check pipeline.

use std::sync::Arc;
use std::time::Instant;

use http::Method;
use tracing::{debug, warn};

use super::tree::NodeId;
use crate::envelope::{Body, Envelope, HandlerResult};
use crate::middleware::Interceptor;
use crate::request::{MethodSet, RequestContext};

/// An endpoint implementation.
///
/// Any `Fn(&RequestContext) -> R` where `R: Into<HandlerResult>` is a
/// handler, so plain functions and closures can be registered directly:
///
/// ```
/// use treeroute::node::Handler;
/// use treeroute::request::RequestContext;
///
/// fn health(_ctx: &RequestContext) -> u16 {
///     204
/// }
///
/// fn assert_handler<H: Handler>(_: H) {}
/// assert_handler(health);
/// assert_handler(|ctx: &RequestContext| (200u16, ctx.client().to_string()));
/// ```
pub trait Handler: Send + Sync {
    fn call(&self, ctx: &RequestContext) -> HandlerResult;
}

impl<F, R> Handler for F
where
    F: Fn(&RequestContext) -> R + Send + Sync,
    R: Into<HandlerResult>,
{
    fn call(&self, ctx: &RequestContext) -> HandlerResult {
        self(ctx).into()
    }
}

/// Predicate run before a handler; `false` rejects the request.
pub type RequestCheck = Box<dyn Fn(&RequestContext) -> bool + Send + Sync>;

/// Callback run on the envelope after a handler; may edit the body.
pub type ResponseCheck = Box<dyn Fn(&mut Envelope) + Send + Sync>;

/// A single routable unit of the tree.
///
/// A node is bound to at most one handler and a fixed method set. Its
/// children are stored by id in the owning [`NodeTree`](super::NodeTree);
/// `parent` is only used to rebuild the diagnostic path.
pub struct Node {
    pub(super) name: Arc<str>,
    methods: MethodSet,
    handler: Option<Box<dyn Handler>>,
    request_checks: Vec<(RequestCheck, u16)>,
    response_checks: Vec<ResponseCheck>,
    pub(super) children: Vec<(Arc<str>, NodeId)>,
    pub(super) parent: Option<NodeId>,
    pub(super) fallback: bool,
}

impl Node {
    pub(super) fn new(name: Arc<str>, methods: MethodSet, parent: Option<NodeId>, fallback: bool) -> Self {
        Self {
            name,
            methods,
            handler: None,
            request_checks: Vec::new(),
            response_checks: Vec::new(),
            children: Vec::new(),
            parent,
            fallback,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Whether the node was registered by a fallback pass.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.handler.is_some()
    }

    /// Attach the handler. An empty method set makes the node unreachable,
    /// which is reported as a warning unless `warn_empty_methods` is off.
    pub fn bind(&mut self, handler: Box<dyn Handler>, warn_empty_methods: bool) {
        if self.methods.is_empty() && warn_empty_methods {
            warn!(
                node = %self.name,
                "endpoint bound with no accepted methods; every request to it will get 405"
            );
        }
        self.handler = Some(handler);
    }

    pub fn add_request_check(&mut self, fallback_status: u16, check: RequestCheck) {
        self.request_checks.push((check, fallback_status));
    }

    pub fn add_response_check(&mut self, check: ResponseCheck) {
        self.response_checks.push(check);
    }

    /// Run the node for a request that resolved to it.
    ///
    /// Order: method check (405), request checks (first failure returns its
    /// fallback status and skips everything else), handler plus
    /// interceptors, response checks in registration order.
    pub fn run(&self, ctx: &RequestContext, interceptors: &[Arc<dyn Interceptor>]) -> Envelope {
        if !self.methods.contains(ctx.method()) {
            debug!(node = %self.name, method = %ctx.method(), "method not accepted");
            return Envelope::new(405);
        }

        for (index, (check, fallback_status)) in self.request_checks.iter().enumerate() {
            if !check(ctx) {
                debug!(
                    node = %self.name,
                    check = index,
                    status = *fallback_status,
                    "request check rejected request"
                );
                return Envelope::new(*fallback_status);
            }
        }

        let Some(handler) = self.handler.as_deref() else {
            return Envelope::new(404);
        };

        let mut envelope = invoke(handler, ctx, interceptors);
        for check in &self.response_checks {
            check(&mut envelope);
        }
        envelope
    }
}

/// Call a handler and turn its result into an envelope.
///
/// Interceptors see the raw result first (in order) and may rewrite it and
/// contribute extra body fields; the extras are merged after normalization,
/// then every interceptor's `after` hook sees the finished envelope.
pub(crate) fn invoke(
    handler: &dyn Handler,
    ctx: &RequestContext,
    interceptors: &[Arc<dyn Interceptor>],
) -> Envelope {
    let start = Instant::now();
    let mut result = handler.call(ctx);
    let mut extra = Body::new();
    for interceptor in interceptors {
        result = interceptor.before(ctx, result, &mut extra);
    }
    if matches!(result, HandlerResult::RateLimited(..)) {
        debug!(
            request_id = %ctx.request_id(),
            "rate-limit verdict returned but no interceptor unpacked it; using inner result"
        );
    }

    let mut envelope = Envelope::from(result);
    envelope.merge(extra);

    let latency = start.elapsed();
    for interceptor in interceptors {
        interceptor.after(ctx, &mut envelope, latency);
    }
    envelope
}
