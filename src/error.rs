//! Fatal configuration errors.
//!
//! These are raised while the API is being configured or built, never while
//! a request is dispatched; per-request failures are envelopes.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The version pattern cannot produce distinct tags.
    #[error("version pattern {pattern:?} does not contain the {marker} marker")]
    MissingVersionMarker {
        pattern: String,
        marker: &'static str,
    },

    /// A default version was configured but never registered.
    #[error("can't use {tag:?} as default version: no such version was registered")]
    UnknownDefaultVersion { tag: String },

    /// An integration outside the supported set was requested.
    #[error("unknown integration {name:?} (allowed: {allowed})")]
    UnknownIntegration { name: String, allowed: String },

    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
