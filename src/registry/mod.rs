//! # Version Registry
//!
//! Maps version tags to their endpoint trees. Each version also owns an
//! ordered list of global request checks, an ordered list of global
//! response checks and an optional default endpoint.
//!
//! ## Tags and resolution
//!
//! Tags are produced by the configured pattern (`v{version}` by default).
//! For an inbound path the first segment is compared against the registered
//! tags; a match selects that version and strips the segment, otherwise the
//! default version answers with the path unchanged:
//!
//! ```
//! use treeroute::registry::VersionRegistry;
//!
//! let mut registry = VersionRegistry::new();
//! registry.entry_or_insert("v1");
//! registry.entry_or_insert("v2");
//!
//! let (entry, rest) = registry.resolve("/v2/users", Some("v1"));
//! assert_eq!((entry.map(|e| e.tag()), rest), (Some("v2"), "users"));
//!
//! let (entry, rest) = registry.resolve("/users", Some("v1"));
//! assert_eq!((entry.map(|e| e.tag()), rest), (Some("v1"), "users"));
//! ```
//!
//! ## Multi-pass registration
//!
//! Registering a tag that already exists reopens its entry. Fallback
//! endpoints registered in an earlier pass stay in place unless a later
//! pass registers the same name.

mod core;

pub use core::{VersionEntry, VersionRegistry, VersionSession};
