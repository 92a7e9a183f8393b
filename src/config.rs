//! # Configuration Module
//!
//! Startup configuration for an API: transport hints, the version tag
//! pattern, the default version and the optional integrations.
//!
//! ## File format
//!
//! ```yaml
//! name: Inventory API
//! host: 0.0.0.0
//! port: 8080
//! version_pattern: "v{version}"
//! default_version: 1
//! integrations:
//!   - rate_limit
//!   - request_log
//! warn_empty_methods: true
//! ```
//!
//! Every key is optional. `host`, `port` and `name` are not used by the
//! dispatcher itself; they are carried for the embedding server.
//!
//! ## Environment Variables
//!
//! [`ApiConfig::apply_env`] lets deployments override two keys:
//!
//! - `TREEROUTE_DEFAULT_VERSION` - default version identifier
//! - `TREEROUTE_VERSION_PATTERN` - version tag pattern
//!
//! ## Validation
//!
//! Invalid configuration is fatal and reported as a
//! [`ConfigError`]: a pattern without the `{version}` marker or an
//! integration name outside [`Integration::ALL`].

use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::middleware::{Interceptor, RateLimitInterceptor, RequestLogInterceptor};

/// Substitution marker the version pattern must contain.
pub const VERSION_MARKER: &str = "{version}";

pub const DEFAULT_VERSION_PATTERN: &str = "v{version}";

/// Version identifier as written in configuration: `1` and `"beta"` are
/// both accepted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum VersionId {
    Number(u64),
    Name(String),
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionId::Number(n) => write!(f, "{n}"),
            VersionId::Name(s) => f.write_str(s),
        }
    }
}

impl From<&str> for VersionId {
    fn from(value: &str) -> Self {
        match value.parse::<u64>() {
            Ok(n) => VersionId::Number(n),
            Err(_) => VersionId::Name(value.to_string()),
        }
    }
}

impl From<u64> for VersionId {
    fn from(value: u64) -> Self {
        VersionId::Number(value)
    }
}

/// Optional integrations. The set is closed: unknown names are rejected at
/// startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Integration {
    /// Handlers return `(verdict, result)`; see
    /// [`RateLimitInterceptor`](crate::middleware::RateLimitInterceptor).
    RateLimit,
    /// One log line per handler call.
    RequestLog,
}

impl Integration {
    pub const ALL: [Integration; 2] = [Integration::RateLimit, Integration::RequestLog];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Integration::RateLimit => "rate_limit",
            Integration::RequestLog => "request_log",
        }
    }

    /// Interceptor implementing this integration.
    #[must_use]
    pub fn interceptor(self) -> Arc<dyn Interceptor> {
        match self {
            Integration::RateLimit => Arc::new(RateLimitInterceptor),
            Integration::RequestLog => Arc::new(RequestLogInterceptor),
        }
    }
}

impl FromStr for Integration {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Integration::ALL
            .into_iter()
            .find(|i| i.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownIntegration {
                name: s.to_string(),
                allowed: Integration::ALL.map(Integration::as_str).join(", "),
            })
    }
}

impl fmt::Display for Integration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// API configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub name: String,
    pub host: String,
    pub port: u16,
    /// Pattern producing version tags; `{version}` is replaced by the
    /// version identifier.
    pub version_pattern: String,
    /// Version answering requests whose path has no version segment.
    pub default_version: Option<VersionId>,
    /// Names of enabled integrations, see [`Integration`].
    pub integrations: Vec<String>,
    /// Warn when an endpoint is bound with an empty method set.
    pub warn_empty_methods: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            name: "treeroute API".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8080,
            version_pattern: DEFAULT_VERSION_PATTERN.to_string(),
            default_version: None,
            integrations: Vec::new(),
            warn_empty_methods: true,
        }
    }
}

impl ApiConfig {
    /// Load and validate a YAML configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ApiConfig = serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `TREEROUTE_*` environment overrides.
    #[must_use]
    pub fn apply_env(mut self) -> Self {
        if let Ok(version) = env::var("TREEROUTE_DEFAULT_VERSION") {
            if !version.is_empty() {
                self.default_version = Some(VersionId::from(version.as_str()));
            }
        }
        if let Ok(pattern) = env::var("TREEROUTE_VERSION_PATTERN") {
            if !pattern.is_empty() {
                self.version_pattern = pattern;
            }
        }
        self
    }

    /// Check the pattern marker and the integration names.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.version_pattern.contains(VERSION_MARKER) {
            return Err(ConfigError::MissingVersionMarker {
                pattern: self.version_pattern.clone(),
                marker: VERSION_MARKER,
            });
        }
        self.parsed_integrations().map(|_| ())
    }

    /// Enabled integrations, in configuration order, without duplicates.
    pub fn parsed_integrations(&self) -> Result<Vec<Integration>, ConfigError> {
        let mut out = Vec::with_capacity(self.integrations.len());
        for name in &self.integrations {
            let integration: Integration = name.parse()?;
            if !out.contains(&integration) {
                out.push(integration);
            }
        }
        Ok(out)
    }

    /// Format a version identifier into its tag.
    #[must_use]
    pub fn version_tag(&self, id: impl fmt::Display) -> String {
        self.version_pattern.replace(VERSION_MARKER, &id.to_string())
    }

    /// Tag of the configured default version, if any.
    #[must_use]
    pub fn default_version_tag(&self) -> Option<String> {
        self.default_version.as_ref().map(|id| self.version_tag(id))
    }
}
