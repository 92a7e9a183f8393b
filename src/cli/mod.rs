//! # CLI Module
//!
//! Command-line smoke tool for API configurations and route tables.
//!
//! ## Commands
//!
//! ### `check`
//!
//! Load and validate a configuration file:
//!
//! ```bash
//! treeroute check --config api.yaml
//! ```
//!
//! ### `dispatch`
//!
//! Register echo endpoints and dispatch a single request against them:
//!
//! ```bash
//! treeroute dispatch \
//!     --config api.yaml \
//!     --route 1:GET:users \
//!     --route 1:GET,POST:users/me \
//!     --header "x-request-id: 01ARZ3NDEKTSV4RRFFQ69G5FAV" \
//!     GET /v1/users/me
//! ```
//!
//! Routes are written `VERSION:METHODS:PATH`. Missing parent segments are
//! registered with the same methods. The status code is printed on the
//! first line and the JSON body on the second.
//!
//! ### `routes`
//!
//! Print the route table built from `--route` arguments:
//!
//! ```bash
//! treeroute routes --route 1:GET:users --route 2:GET:users --json
//! ```
//!
//! ## Logging
//!
//! Logs go to stderr. `RUST_LOG` selects the level (default `info`) and
//! `--json-logs` switches to JSON lines.

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{build_dispatcher, init_logging, run_cli, run_cli_with, Cli, Commands, RouteSpec};
