use tracing::debug;

use super::Interceptor;
use crate::envelope::{Body, HandlerResult};
use crate::request::RequestContext;

/// Status forced when the rate limiter refuses a request.
pub const TOO_MANY_REQUESTS: u16 = 429;

/// Unpacks results returned as
/// [`HandlerResult::RateLimited`](crate::envelope::HandlerResult::RateLimited).
///
/// The verdict is opaque: `allowed == false` replaces the handler's result
/// with a bare 429, and the verdict's metadata is merged into the body in
/// both cases.
#[derive(Debug, Default, Clone, Copy)]
pub struct RateLimitInterceptor;

impl Interceptor for RateLimitInterceptor {
    fn name(&self) -> &'static str {
        "rate_limit"
    }

    fn before(&self, ctx: &RequestContext, result: HandlerResult, extra: &mut Body) -> HandlerResult {
        match result {
            HandlerResult::RateLimited(decision, inner) => {
                extra.extend(decision.meta);
                if decision.allowed {
                    *inner
                } else {
                    debug!(
                        request_id = %ctx.request_id(),
                        client = %ctx.client(),
                        "request refused by rate limiter"
                    );
                    HandlerResult::Status(TOO_MANY_REQUESTS)
                }
            }
            other => other,
        }
    }
}
