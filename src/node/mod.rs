//! # Node Module
//!
//! Endpoints are organised as a tree of named nodes, one tree per API
//! version. A request path is split on `/` and every segment must name a
//! child of the previous node exactly; the node named by the last segment
//! runs.
//!
//! ## Running a node
//!
//! 1. **Method check** - a verb outside the node's method set yields 405
//! 2. **Request checks** - ordered predicates; the first one returning
//!    `false` answers with its fallback status, the handler is not called
//! 3. **Handler** - the result passes through the configured
//!    [`Interceptor`](crate::middleware::Interceptor)s and is normalized
//!    into an [`Envelope`](crate::envelope::Envelope)
//! 4. **Response checks** - ordered callbacks that may edit the body
//!
//! ## Example
//!
//! ```
//! use http::Method;
//! use treeroute::node::NodeTree;
//! use treeroute::request::RequestContext;
//!
//! let mut tree = NodeTree::new("v1");
//! let root = tree.root();
//! if let Some(mut root_node) = tree.builder(root) {
//!     let mut users = root_node.add("users", [Method::GET], |_: &RequestContext| 200u16);
//!     users.add("me", [Method::GET], |_: &RequestContext| 200u16);
//! }
//!
//! let me = tree.child(root, "users").and_then(|u| tree.child(u, "me"));
//! assert_eq!(tree.path_of(me.unwrap()), "/v1/users/me");
//! ```

mod core;
mod tree;
#[cfg(test)]
mod tests;

pub use core::{Handler, Node, RequestCheck, ResponseCheck};
pub(crate) use core::invoke;
pub use tree::{NodeBuilder, NodeId, NodeTree};
