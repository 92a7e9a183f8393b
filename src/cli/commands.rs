use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use clap::{Parser, Subcommand};
use http::Method;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::api::ApiBuilder;
use crate::config::ApiConfig;
use crate::dispatcher::Dispatcher;
use crate::echo::echo_handler;
use crate::error::ConfigError;
use crate::node::NodeId;
use crate::registry::VersionSession;
use crate::request::{header_vec, parse_method};

/// Command-line interface for treeroute
#[derive(Parser, Debug)]
#[command(name = "treeroute")]
#[command(about = "treeroute CLI", long_about = None, version)]
pub struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true, default_value_t = false)]
    pub json_logs: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a configuration file
    Check {
        /// Path to the YAML configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Dispatch one request against echo endpoints
    Dispatch {
        /// Path to the YAML configuration file (defaults apply when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Endpoint to register, as VERSION:METHODS:PATH (repeatable)
        #[arg(short, long = "route", required = true)]
        routes: Vec<RouteSpec>,

        /// Request header, as NAME:VALUE (repeatable)
        #[arg(short = 'H', long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,

        /// Client address reported to handlers
        #[arg(long, default_value = "127.0.0.1")]
        client: String,

        /// Request method
        method: String,

        /// Request path, including the version segment
        path: String,
    },
    /// Print the route table
    Routes {
        /// Path to the YAML configuration file (defaults apply when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Endpoint to register, as VERSION:METHODS:PATH (repeatable)
        #[arg(short, long = "route")]
        routes: Vec<RouteSpec>,

        /// Print the table as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

/// One `--route` argument: `VERSION:METHODS:PATH`, e.g. `1:GET,POST:users/me`.
///
/// Methods are comma separated and case-insensitive; an empty list is
/// allowed and registers an endpoint that answers 405.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSpec {
    pub version: String,
    pub methods: Vec<Method>,
    pub path: String,
}

impl RouteSpec {
    fn depth(&self) -> usize {
        self.path.split('/').count()
    }
}

impl FromStr for RouteSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let (Some(version), Some(methods), Some(path)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(format!("expected VERSION:METHODS:PATH, got '{s}'"));
        };
        if version.is_empty() {
            return Err(format!("missing version in '{s}'"));
        }
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            return Err(format!("missing path in '{s}'"));
        }
        let methods = methods
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(|m| parse_method(&m.to_ascii_uppercase()).ok_or_else(|| format!("unknown method '{m}'")))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            version: version.to_string(),
            methods,
            path: path.to_string(),
        })
    }
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected NAME:VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing header name in '{raw}'"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Install the global `tracing` subscriber, writing to stderr.
///
/// # Errors
///
/// Fails when a global subscriber is already installed.
pub fn init_logging(json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init()
    };
    result.context("failed to initialize logging")
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ApiConfig> {
    let config = match path {
        Some(path) => ApiConfig::from_path(path)?,
        None => ApiConfig::default(),
    }
    .apply_env();
    config.validate()?;
    Ok(config)
}

/// Build a dispatcher with an echo endpoint for every route.
///
/// Shallow routes are registered first so a parent given explicitly is
/// never replaced after its children were attached.
pub fn build_dispatcher(config: ApiConfig, routes: &[RouteSpec]) -> Result<Dispatcher, ConfigError> {
    let mut api = ApiBuilder::new(config)?;
    let mut ordered: Vec<&RouteSpec> = routes.iter().collect();
    ordered.sort_by_key(|route| route.depth());
    for route in ordered {
        let mut session = api.add_version(&route.version);
        register_route(&mut session, route);
    }
    api.build()
}

fn register_route(session: &mut VersionSession<'_>, route: &RouteSpec) {
    let segments: Vec<&str> = route.path.split('/').collect();
    let Some((last, parents)) = segments.split_last() else {
        return;
    };
    let mut parent = None;
    for (depth, segment) in parents.iter().enumerate() {
        let prefix = segments[..=depth].join("/");
        let id = match session.find(&prefix) {
            Some(id) => id,
            None => add_echo(session, parent, segment, &route.methods),
        };
        parent = Some(id);
    }
    add_echo(session, parent, last, &route.methods);
}

fn add_echo(session: &mut VersionSession<'_>, parent: Option<NodeId>, name: &str, methods: &[Method]) -> NodeId {
    if let Some(id) = parent {
        if let Some(mut builder) = session.node(id) {
            return builder.add(name, methods.to_vec(), echo_handler).id();
        }
    }
    session.add(name, methods.to_vec(), echo_handler).id()
}

/// Execute the CLI command, writing results to stdout.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or is invalid,
/// or if stdout cannot be written.
pub fn run_cli(cli: &Cli) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_cli_with(cli, &mut out)
}

/// Execute the CLI command, writing results to `out`.
///
/// # Errors
///
/// See [`run_cli`].
pub fn run_cli_with<W: Write>(cli: &Cli, out: &mut W) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Check { config } => {
            let config = load_config(Some(config.as_path()))
                .with_context(|| format!("invalid configuration {}", config.display()))?;
            let integrations: Vec<String> = config
                .parsed_integrations()?
                .iter()
                .map(ToString::to_string)
                .collect();
            writeln!(out, "ok: {}", config.name)?;
            writeln!(out, "listen: {}:{}", config.host, config.port)?;
            writeln!(out, "version pattern: {}", config.version_pattern)?;
            writeln!(
                out,
                "default version: {}",
                config.default_version_tag().as_deref().unwrap_or("-")
            )?;
            writeln!(
                out,
                "integrations: {}",
                if integrations.is_empty() {
                    "-".to_string()
                } else {
                    integrations.join(", ")
                }
            )?;
            Ok(())
        }
        Commands::Dispatch {
            config,
            routes,
            headers,
            client,
            method,
            path,
        } => {
            let config = load_config(config.as_deref())?;
            let dispatcher = build_dispatcher(config, routes).context("failed to build dispatcher")?;
            let res = dispatcher.dispatch(method, path, header_vec(headers.iter().cloned()), client);
            writeln!(out, "{}", res.status)?;
            writeln!(out, "{}", res.body)?;
            Ok(())
        }
        Commands::Routes { config, routes, json } => {
            let config = load_config(config.as_deref())?;
            let dispatcher = build_dispatcher(config, routes).context("failed to build dispatcher")?;
            let table = dispatcher.routes();
            if *json {
                writeln!(out, "{}", serde_json::to_string_pretty(&table)?)?;
            } else {
                for route in &table {
                    writeln!(out, "{:<8} {:<24} {}", route.version, route.methods.join(","), route.path)?;
                }
            }
            Ok(())
        }
    }
}
