//! Response envelope and the closed set of handler result shapes.
//!
//! Handlers return a [`HandlerResult`]; the node that ran the handler
//! normalizes it into an [`Envelope`] holding a status code, a JSON body map
//! and a message. The message is never stored in the body map: the key
//! `"message"` is reserved and only merged back in when the envelope is
//! serialized.

use serde_json::{Map, Value};

use crate::status::{canonical_message, title_case};

/// JSON object used for envelope bodies and rate-limit metadata.
pub type Body = Map<String, Value>;

/// Body key that carries the envelope message on the wire.
pub const MESSAGE_KEY: &str = "message";

/// Normalized result of a dispatch.
///
/// Status and message are fixed at construction. Response checks may still
/// edit the body through [`Envelope::body_mut`].
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    status: u16,
    body: Body,
    message: String,
}

impl Envelope {
    /// Envelope with an empty body and the canonical message for `status`.
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            body: Body::new(),
            message: canonical_message(status),
        }
    }

    /// Envelope with a body. A `"message"` entry is lifted out of the body
    /// and becomes the envelope message.
    #[must_use]
    pub fn with_body(status: u16, mut body: Body) -> Self {
        let message = match body.remove(MESSAGE_KEY) {
            Some(Value::String(s)) => title_case(&s),
            Some(other) => title_case(&other.to_string()),
            None => canonical_message(status),
        };
        Self {
            status,
            body,
            message,
        }
    }

    /// Envelope with an explicit message and an empty body.
    #[must_use]
    pub fn with_message(status: u16, message: &str) -> Self {
        Self {
            status,
            body: Body::new(),
            message: title_case(message),
        }
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Mutable access to the body, used by response checks and interceptors.
    ///
    /// Writing a `"message"` key here does not change the envelope message;
    /// it is overwritten on serialization.
    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    /// Merge `extra` into the body; existing keys are overwritten.
    pub fn merge(&mut self, extra: Body) {
        self.body.extend(extra);
    }

    /// Body with the message merged in under `"message"`.
    #[must_use]
    pub fn into_json(self) -> Value {
        let mut body = self.body;
        body.insert(MESSAGE_KEY.to_string(), Value::String(self.message));
        Value::Object(body)
    }

    /// Serialize the envelope to the JSON text sent to the client.
    #[must_use]
    pub fn to_json_string(&self) -> String {
        self.clone().into_json().to_string()
    }
}

/// Rate-limit verdict attached to a handler result.
///
/// Produced by an external rate limiter and passed through untouched:
/// `allowed` decides between the handler's result and a 429, `meta` is
/// always merged into the response body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub meta: Body,
}

impl RateLimitDecision {
    #[must_use]
    pub fn new(allowed: bool, meta: Body) -> Self {
        Self { allowed, meta }
    }
}

impl From<(bool, Body)> for RateLimitDecision {
    fn from((allowed, meta): (bool, Body)) -> Self {
        Self { allowed, meta }
    }
}

/// Every shape a handler may return.
///
/// Handlers usually return one of the plain shapes through `Into`:
///
/// ```
/// use serde_json::{json, Map};
/// use treeroute::envelope::{Envelope, HandlerResult};
///
/// let bare: HandlerResult = 204u16.into();
/// let with_message: HandlerResult = (201u16, "created!").into();
/// let mut body = Map::new();
/// body.insert("id".into(), json!(7));
/// let with_body: HandlerResult = (200u16, body).into();
///
/// assert_eq!(Envelope::from(bare).status(), 204);
/// assert_eq!(Envelope::from(with_message).message(), "Created!");
/// assert_eq!(Envelope::from(with_body).body()["id"], json!(7));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerResult {
    /// Bare status code.
    Status(u16),
    /// Status code and body map.
    Body(u16, Body),
    /// Status code and message.
    Message(u16, String),
    /// Fully constructed envelope.
    Envelope(Envelope),
    /// Result wrapped with a rate-limit verdict. Unpacked by
    /// [`RateLimitInterceptor`](crate::middleware::RateLimitInterceptor).
    RateLimited(RateLimitDecision, Box<HandlerResult>),
}

impl HandlerResult {
    /// Wrap a result with a rate-limit verdict.
    #[must_use]
    pub fn rate_limited(decision: impl Into<RateLimitDecision>, result: impl Into<Self>) -> Self {
        Self::RateLimited(decision.into(), Box::new(result.into()))
    }
}

impl From<u16> for HandlerResult {
    fn from(status: u16) -> Self {
        Self::Status(status)
    }
}

impl From<Body> for HandlerResult {
    fn from(body: Body) -> Self {
        Self::Body(200, body)
    }
}

impl From<(u16, Body)> for HandlerResult {
    fn from((status, body): (u16, Body)) -> Self {
        Self::Body(status, body)
    }
}

impl From<(u16, String)> for HandlerResult {
    fn from((status, message): (u16, String)) -> Self {
        Self::Message(status, message)
    }
}

impl From<(u16, &str)> for HandlerResult {
    fn from((status, message): (u16, &str)) -> Self {
        Self::Message(status, message.to_string())
    }
}

impl From<Envelope> for HandlerResult {
    fn from(envelope: Envelope) -> Self {
        Self::Envelope(envelope)
    }
}

impl From<HandlerResult> for Envelope {
    /// Normalize a handler result.
    ///
    /// A rate-limit wrapper that no interceptor unpacked is treated as its
    /// inner result; the verdict is ignored.
    fn from(result: HandlerResult) -> Self {
        match result {
            HandlerResult::Status(status) => Envelope::new(status),
            HandlerResult::Body(status, body) => Envelope::with_body(status, body),
            HandlerResult::Message(status, message) => Envelope::with_message(status, &message),
            HandlerResult::Envelope(envelope) => envelope,
            HandlerResult::RateLimited(_, inner) => Envelope::from(*inner),
        }
    }
}
