use std::time::Duration;

use tracing::info;

use super::Interceptor;
use crate::envelope::Envelope;
use crate::request::RequestContext;

/// Logs one line per handler call with status and handler latency.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestLogInterceptor;

impl Interceptor for RequestLogInterceptor {
    fn name(&self) -> &'static str {
        "request_log"
    }

    fn after(&self, ctx: &RequestContext, envelope: &mut Envelope, latency: Duration) {
        info!(
            request_id = %ctx.request_id(),
            method = %ctx.method(),
            version = ctx.version().unwrap_or("-"),
            url = %ctx.url(),
            client = %ctx.client(),
            status = envelope.status(),
            latency_us = latency.as_micros() as u64,
            "handled request"
        );
    }
}
