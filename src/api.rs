//! Registration phase: build the endpoint trees, then freeze them into a
//! [`Dispatcher`].

use std::fmt::Display;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::ApiConfig;
use crate::dispatcher::Dispatcher;
use crate::envelope::Envelope;
use crate::error::ConfigError;
use crate::middleware::Interceptor;
use crate::node::Handler;
use crate::registry::{VersionRegistry, VersionSession};
use crate::request::RequestContext;

/// Message of the built-in default endpoint.
pub const NO_PATH_MESSAGE: &str = "No Path!";

fn no_path(_ctx: &RequestContext) -> Envelope {
    Envelope::with_message(404, NO_PATH_MESSAGE)
}

/// Collects versions, endpoints and interceptors before serving starts.
///
/// # Example
///
/// ```
/// use http::Method;
/// use treeroute::api::ApiBuilder;
/// use treeroute::config::ApiConfig;
/// use treeroute::request::{HeaderVec, RequestContext};
///
/// let config = ApiConfig {
///     default_version: Some(1u64.into()),
///     ..ApiConfig::default()
/// };
/// let mut api = ApiBuilder::new(config)?;
/// {
///     let mut v1 = api.add_version(1);
///     v1.add("ping", [Method::GET], |_: &RequestContext| (200u16, "pong"));
/// }
/// let dispatcher = api.build()?;
///
/// let res = dispatcher.dispatch("GET", "/v1/ping", HeaderVec::new(), "127.0.0.1");
/// assert_eq!(res.status, 200);
/// assert_eq!(res.body, r#"{"message":"Pong"}"#);
/// # Ok::<(), treeroute::error::ConfigError>(())
/// ```
pub struct ApiBuilder {
    config: ApiConfig,
    registry: VersionRegistry,
    interceptors: Vec<Arc<dyn Interceptor>>,
    default_endpoint: Box<dyn Handler>,
}

impl ApiBuilder {
    /// Validate `config` and install the interceptors of its integrations.
    pub fn new(config: ApiConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let interceptors = config
            .parsed_integrations()?
            .into_iter()
            .map(|integration| {
                debug!(%integration, "integration enabled");
                integration.interceptor()
            })
            .collect();
        Ok(Self {
            config,
            registry: VersionRegistry::new(),
            interceptors,
            default_endpoint: Box::new(no_path),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Append a custom interceptor; it runs after the configured ones.
    pub fn interceptor(&mut self, interceptor: Arc<dyn Interceptor>) -> &mut Self {
        debug!(interceptor = interceptor.name(), "interceptor added");
        self.interceptors.push(interceptor);
        self
    }

    /// Default endpoint for versions that do not configure their own.
    pub fn default_endpoint<H>(&mut self, handler: H) -> &mut Self
    where
        H: Handler + 'static,
    {
        self.default_endpoint = Box::new(handler);
        self
    }

    /// Open (or reopen) the version identified by `id`.
    pub fn add_version(&mut self, id: impl Display) -> VersionSession<'_> {
        self.add_version_with_fallbacks(id, Vec::<fn(&mut VersionSession<'_>)>::new())
    }

    /// Open the version identified by `id`, running every fallback
    /// registration against it first.
    ///
    /// Fallback endpoints are flagged as such; the returned session registers
    /// primary endpoints, which replace fallbacks of the same name.
    pub fn add_version_with_fallbacks<I, F>(&mut self, id: impl Display, fallbacks: I) -> VersionSession<'_>
    where
        I: IntoIterator<Item = F>,
        F: FnOnce(&mut VersionSession<'_>),
    {
        let tag = self.config.version_tag(id);
        let warn_empty_methods = self.config.warn_empty_methods;
        let reopened = self.registry.contains(&tag);
        let entry = self.registry.entry_or_insert(&tag);

        let mut passes = 0usize;
        for register in fallbacks {
            let mut session = VersionSession::new(&mut *entry, true, warn_empty_methods);
            register(&mut session);
            passes += 1;
        }
        info!(version = %tag, reopened, fallback_passes = passes, "version registered");
        VersionSession::new(entry, false, warn_empty_methods)
    }

    /// Freeze the registration.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownDefaultVersion`] when the configured default
    /// version was never registered.
    pub fn build(self) -> Result<Dispatcher, ConfigError> {
        let default_version = self.config.default_version_tag();
        if let Some(tag) = &default_version {
            if !self.registry.contains(tag) {
                return Err(ConfigError::UnknownDefaultVersion { tag: tag.clone() });
            }
        }
        info!(
            name = %self.config.name,
            versions = self.registry.len(),
            default_version = default_version.as_deref().unwrap_or("-"),
            interceptors = self.interceptors.len(),
            "api ready"
        );
        Ok(Dispatcher::new(
            self.config,
            self.registry,
            default_version,
            self.default_endpoint,
            self.interceptors,
        ))
    }
}
