//! Interceptors wrapped around handler calls.
//!
//! Optional integrations plug in here instead of special-casing the
//! dispatch path. The built-in ones are enabled by name through
//! [`ApiConfig::integrations`](crate::config::ApiConfig::integrations).

mod core;
mod rate_limit;
mod request_log;

pub use core::Interceptor;
pub use rate_limit::{RateLimitInterceptor, TOO_MANY_REQUESTS};
pub use request_log::RequestLogInterceptor;
