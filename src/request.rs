//! Per-request context handed to checks and handlers.

use http::Method;
use smallvec::SmallVec;
use std::sync::Arc;

use crate::ids::{RequestId, REQUEST_ID_HEADER};

/// Maximum inline headers before heap allocation.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Header storage for the dispatch path. Lookups are case-insensitive.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Accepted methods of a node. Most endpoints accept one or two verbs.
pub type MethodSet = SmallVec<[Method; 4]>;

/// The verbs this layer dispatches. Anything else is answered with 405.
pub const HTTP_METHODS: [Method; 9] = [
    Method::GET,
    Method::HEAD,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::CONNECT,
    Method::OPTIONS,
    Method::TRACE,
    Method::PATCH,
];

/// Parse an inbound method string, accepting only the standard verbs.
///
/// Matching is exact (methods are case-sensitive on the wire).
#[must_use]
pub fn parse_method(raw: &str) -> Option<Method> {
    HTTP_METHODS.iter().find(|m| m.as_str() == raw).cloned()
}

/// Build a [`MethodSet`] from anything yielding methods.
pub fn method_set<I>(methods: I) -> MethodSet
where
    I: IntoIterator<Item = Method>,
{
    let mut set = MethodSet::new();
    for m in methods {
        if !set.contains(&m) {
            set.push(m);
        }
    }
    set
}

/// Read-only view of one inbound request.
///
/// `url` is the path remainder after the version segment was stripped, so
/// a request for `/v2/users/me` under version `v2` has `url == "users/me"`.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: RequestId,
    method: Method,
    headers: HeaderVec,
    client: String,
    url: String,
    version: Option<String>,
}

impl RequestContext {
    #[must_use]
    pub fn new(
        method: Method,
        headers: HeaderVec,
        client: impl Into<String>,
        url: impl Into<String>,
        version: Option<String>,
    ) -> Self {
        let request_id = RequestId::from_header_or_new(
            headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(REQUEST_ID_HEADER))
                .map(|(_, v)| v.as_str()),
        );
        Self {
            request_id,
            method,
            headers,
            client: client.into(),
            url: url.into(),
            version,
        }
    }

    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderVec {
        &self.headers
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Client address as reported by the transport.
    #[must_use]
    pub fn client(&self) -> &str {
        &self.client
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Resolved version tag, `None` when no version matched.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

/// Collect `(name, value)` pairs into a [`HeaderVec`].
pub fn header_vec<I, K, V>(headers: I) -> HeaderVec
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    headers
        .into_iter()
        .map(|(k, v)| (Arc::from(k.as_ref()), v.into()))
        .collect()
}
