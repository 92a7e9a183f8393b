//! # Dispatcher Module
//!
//! The dispatcher turns a transport-level request (method, path, headers,
//! client address) into a status code and a JSON body.
//!
//! ## Request Flow
//!
//! 1. **Resolve** - the first path segment selects a registered version
//!    tag and is stripped; otherwise the default version answers with the
//!    whole path
//! 2. **Context** - a [`RequestContext`](crate::request::RequestContext) is
//!    built from the request and the resolved version
//! 3. **Global request checks** - the version's checks run in order; the
//!    first rejection answers with its fallback status
//! 4. **Route** - an empty remainder goes to the default endpoint, anything
//!    else walks the version's node tree
//! 5. **Global response checks** - run in order on the envelope
//! 6. **Serialize** - the message is merged into the body under
//!    `"message"` and the body is rendered as JSON
//!
//! ## Error Handling
//!
//! Nothing in this pipeline returns an error. Routing misses answer 404,
//! verbs a node does not accept answer 405, and rejected checks answer
//! with their configured status. Handlers that panic are not caught; that
//! is left to the transport.
//!
//! ## Concurrency
//!
//! A [`Dispatcher`] is immutable and `Send + Sync`; share it behind an
//! `Arc` and call [`Dispatcher::dispatch`] from as many threads as the
//! transport uses. Each dispatch runs to completion on the calling thread.

mod core;

pub use core::{DispatchResponse, Dispatcher, RouteInfo, JSON_CONTENT_TYPE};
