//! # treeroute
//!
//! **treeroute** is a small embeddable HTTP request-dispatch layer. It maps
//! an incoming method and path to a registered handler through a tree of
//! named nodes, runs ordered checks around the handler and normalizes
//! whatever the handler returns into a uniform JSON envelope.
//!
//! It is not a web server: a transport hands it a method, a path, headers
//! and a client address and gets back a status code and a JSON body.
//!
//! ## Architecture
//!
//! - **[`api`]** - registration phase; [`ApiBuilder`] collects versions and
//!   endpoints and freezes them into a [`Dispatcher`]
//! - **[`registry`]** - version tags, per-version global checks, default
//!   endpoints and fallback layering
//! - **[`node`]** - the endpoint trie and the per-node check pipeline
//! - **[`dispatcher`]** - per-request pipeline and JSON serialization
//! - **[`envelope`]** - handler result shapes and the response envelope
//! - **[`middleware`]** - interceptors around handler calls (rate limit,
//!   request log)
//! - **[`config`]** / **[`error`]** - startup configuration and fatal
//!   configuration errors
//!
//! ## Request Flow
//!
//! ```text
//! transport ─► Dispatcher::dispatch(method, path, headers, client)
//!                │
//!                ├─ resolve version (first segment or default version)
//!                ├─ global request checks ──► first failure: fallback status
//!                ├─ route
//!                │    ├─ empty remainder ─► default endpoint
//!                │    └─ segments ─► Node ─► Node ─► ... ─► Node::run
//!                │                            ├─ method check (405)
//!                │                            ├─ request checks
//!                │                            ├─ handler + interceptors
//!                │                            └─ response checks
//!                ├─ global response checks
//!                └─ serialize {"message": ..., ...body}
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use http::Method;
//! use serde_json::json;
//! use treeroute::{ApiBuilder, ApiConfig, HeaderVec, RequestContext};
//!
//! let mut api = ApiBuilder::new(ApiConfig::default())?;
//! {
//!     let mut v1 = api.add_version(1);
//!     let mut users = v1.add("users", [Method::GET], |_: &RequestContext| 200u16);
//!     users.add("me", [Method::GET], |ctx: &RequestContext| {
//!         let mut body = treeroute::envelope::Body::new();
//!         body.insert("client".into(), json!(ctx.client()));
//!         (200u16, body)
//!     });
//! }
//! let dispatcher = api.build()?;
//!
//! let res = dispatcher.dispatch("GET", "/v1/users/me", HeaderVec::new(), "10.0.0.7");
//! assert_eq!(res.status, 200);
//! assert_eq!(
//!     serde_json::from_str::<serde_json::Value>(&res.body).unwrap(),
//!     json!({"client": "10.0.0.7", "message": "Ok"})
//! );
//! # Ok::<(), treeroute::ConfigError>(())
//! ```
//!
//! ## Concurrency
//!
//! Registration needs `&mut ApiBuilder`; serving needs only `&Dispatcher`.
//! Routes cannot be added while serving, so a dispatcher can be shared
//! across threads without locks.

pub mod api;
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod echo;
pub mod envelope;
pub mod error;
pub mod ids;
pub mod middleware;
pub mod node;
pub mod registry;
pub mod request;
pub mod status;

pub use api::ApiBuilder;
pub use config::ApiConfig;
pub use dispatcher::{DispatchResponse, Dispatcher};
pub use envelope::{Envelope, HandlerResult};
pub use error::ConfigError;
pub use request::{HeaderVec, RequestContext};
