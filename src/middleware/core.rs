use std::time::Duration;

use crate::envelope::{Body, Envelope, HandlerResult};
use crate::request::RequestContext;

/// Hook around every handler call.
///
/// `before` receives the raw handler result and returns the result to
/// normalize; fields written to `extra` are merged into the envelope body
/// after normalization. `after` sees the finished envelope before the
/// node's response checks run.
pub trait Interceptor: Send + Sync {
    fn name(&self) -> &'static str;

    fn before(&self, _ctx: &RequestContext, result: HandlerResult, _extra: &mut Body) -> HandlerResult {
        result
    }

    fn after(&self, _ctx: &RequestContext, _envelope: &mut Envelope, _latency: Duration) {}
}
