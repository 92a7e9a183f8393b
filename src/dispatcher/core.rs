//! Dispatcher core - per-request pipeline.

use std::borrow::Cow;
use std::sync::Arc;

use http::header::{HeaderValue, CONTENT_TYPE};
use http::{Method, StatusCode};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::envelope::Envelope;
use crate::middleware::Interceptor;
use crate::node::{invoke, Handler};
use crate::registry::VersionRegistry;
use crate::request::{parse_method, HeaderVec, RequestContext};

/// Content type of every dispatched response.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// What the transport sends back to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResponse {
    pub status: u16,
    /// Serialized envelope: the body map plus `"message"`.
    pub body: String,
    pub content_type: &'static str,
}

impl From<Envelope> for DispatchResponse {
    fn from(envelope: Envelope) -> Self {
        Self {
            status: envelope.status(),
            body: envelope.to_json_string(),
            content_type: JSON_CONTENT_TYPE,
        }
    }
}

/// One reachable endpoint, as listed by [`Dispatcher::routes`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteInfo {
    pub version: String,
    pub path: String,
    pub methods: Vec<String>,
}

/// Immutable, shareable request dispatcher produced by
/// [`ApiBuilder::build`](crate::api::ApiBuilder::build).
///
/// Nothing can be registered once a dispatcher exists, so concurrent
/// `dispatch` calls from many threads only ever read the trees.
pub struct Dispatcher {
    config: ApiConfig,
    registry: VersionRegistry,
    default_version: Option<String>,
    default_endpoint: Box<dyn Handler>,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl Dispatcher {
    pub(crate) fn new(
        config: ApiConfig,
        registry: VersionRegistry,
        default_version: Option<String>,
        default_endpoint: Box<dyn Handler>,
        interceptors: Vec<Arc<dyn Interceptor>>,
    ) -> Self {
        Self {
            config,
            registry,
            default_version,
            default_endpoint,
            interceptors,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.config.host
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.config.port
    }

    #[must_use]
    pub fn default_version(&self) -> Option<&str> {
        self.default_version.as_deref()
    }

    #[must_use]
    pub fn registry(&self) -> &VersionRegistry {
        &self.registry
    }

    /// Version tag selected for `path` and the path remainder below it.
    #[must_use]
    pub fn resolve_version<'p>(&self, path: &'p str) -> (Option<&str>, &'p str) {
        let (entry, rest) = self.registry.resolve(path, self.default_version.as_deref());
        (entry.map(|e| e.tag()), rest)
    }

    /// Dispatch one request and serialize the result.
    pub fn dispatch(&self, method: &str, path: &str, headers: HeaderVec, client: &str) -> DispatchResponse {
        self.dispatch_envelope(method, path, headers, client).into()
    }

    /// Dispatch one request, returning the envelope before serialization.
    ///
    /// `path` is split on `/` as is; percent-decoding is the transport's
    /// job (see [`Dispatcher::handle`]).
    pub fn dispatch_envelope(&self, method: &str, path: &str, headers: HeaderVec, client: &str) -> Envelope {
        let path = path.strip_prefix('/').unwrap_or(path);
        let segments: Vec<&str> = if path.is_empty() {
            Vec::new()
        } else {
            path.split('/').collect()
        };
        self.dispatch_segments(method, &segments, headers, client)
    }

    /// Dispatch a request whose path is already split into segments.
    ///
    /// Each segment is matched as given, so a decoded segment may itself
    /// contain `/`. An envelope whose status lies outside `100..=999` is
    /// answered with 500, the same status [`Dispatcher::handle`] can put
    /// on the wire.
    pub fn dispatch_segments<S: AsRef<str>>(
        &self,
        method: &str,
        segments: &[S],
        headers: HeaderVec,
        client: &str,
    ) -> Envelope {
        let envelope = self.run_pipeline(method, segments, headers, client);
        if StatusCode::from_u16(envelope.status()).is_ok() {
            envelope
        } else {
            warn!(status = envelope.status(), "status code out of range, answering 500");
            Envelope::new(500)
        }
    }

    /// Steps: resolve the version, build the context, run the version's
    /// global request checks, route (default endpoint for an empty
    /// remainder, tree walk otherwise), run the global response checks.
    /// A global request check rejection is answered immediately.
    fn run_pipeline<S: AsRef<str>>(&self, method: &str, segments: &[S], headers: HeaderVec, client: &str) -> Envelope {
        let Some(method) = parse_method(method) else {
            debug!(%method, "unsupported method");
            return Envelope::new(405);
        };

        let (entry, rest) = self
            .registry
            .resolve_segments(segments, self.default_version.as_deref());
        let rest: Vec<&str> = rest.iter().map(AsRef::as_ref).collect();
        let Some(entry) = entry else {
            debug!(path = %rest.join("/"), "no version matches path and no default version is configured");
            return Envelope::new(404);
        };

        let ctx = RequestContext::new(method, headers, client, rest.join("/"), Some(entry.tag().to_string()));
        let span = tracing::debug_span!(
            "dispatch",
            request_id = %ctx.request_id(),
            method = %ctx.method(),
            version = entry.tag(),
            url = %ctx.url(),
        );
        let _guard = span.enter();

        if let Some(status) = entry.check_request(&ctx) {
            debug!(status, "global request check rejected request");
            return Envelope::new(status);
        }

        // `/v1` and `/v1/` both leave no path below the version.
        let mut envelope = if matches!(rest.as_slice(), [] | [""]) {
            let handler = entry.default_endpoint().unwrap_or(&*self.default_endpoint);
            invoke(handler, &ctx, &self.interceptors)
        } else {
            entry
                .tree()
                .find_node(entry.tree().root(), &rest, &ctx, &self.interceptors)
        };

        entry.check_response(&mut envelope);
        debug!(status = envelope.status(), "dispatched");
        envelope
    }

    /// Adapter for servers built on the `http` crate types.
    ///
    /// Path segments are percent-decoded one by one, so `%2F` stays inside
    /// its segment; a segment that does not decode to UTF-8 is matched
    /// raw. Header values that are not valid UTF-8 are skipped.
    pub fn handle<B>(&self, request: &http::Request<B>, client: &str) -> http::Response<String> {
        let headers: HeaderVec = request
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (Arc::from(name.as_str()), v.to_string()))
            })
            .collect();
        let path = request.uri().path();
        let path = path.strip_prefix('/').unwrap_or(path);
        let segments: Vec<Cow<'_, str>> = if path.is_empty() {
            Vec::new()
        } else {
            path.split('/').map(decode_segment).collect()
        };
        let res = DispatchResponse::from(self.dispatch_segments(
            request.method().as_str(),
            &segments,
            headers,
            client,
        ));

        let mut response = http::Response::new(res.body);
        *response.status_mut() =
            StatusCode::from_u16(res.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        response
    }

    /// Every reachable endpoint, grouped by version in registration order.
    #[must_use]
    pub fn routes(&self) -> Vec<RouteInfo> {
        self.registry
            .entries()
            .flat_map(|entry| {
                entry
                    .tree()
                    .endpoints()
                    .into_iter()
                    .map(move |(path, methods)| RouteInfo {
                        version: entry.tag().to_string(),
                        path,
                        methods: methods.iter().map(Method::to_string).collect(),
                    })
            })
            .collect()
    }
}

fn decode_segment(raw: &str) -> Cow<'_, str> {
    urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw))
}
