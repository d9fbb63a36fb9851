//! # Telemetry
//!
//! Subscriber setup for the CLI and the per-command [`TraceContext`]. The
//! context names the command being run and carries a correlation id that
//! [`crate::client::ApiClient`] forwards to the backend in
//! [`CORRELATION_HEADER`], so client logs and server logs of one command can
//! be joined.

use std::sync::OnceLock;

use reqwest::header::{HeaderName, HeaderValue};
use thiserror::Error;
use tokio::task_local;
use tracing_log::LogTracer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::{SubscriberInitExt, TryInitError},
};

use crate::config::AppConfig;

/// Header carrying the correlation id on every outgoing request.
pub const CORRELATION_HEADER: &str = "x-correlation-id";

/// Transport crates that are only interesting when something goes wrong.
const QUIET_TARGETS: &[&str] = &["hyper=warn", "hyper_util=warn", "reqwest=warn", "rustls=warn"];

/// Identity of one CLI command while it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    pub trace_id: String,
    pub command: &'static str,
}

impl TraceContext {
    /// Fresh context for `command` with a new correlation id.
    pub fn for_command(command: &'static str) -> Self {
        let id = uuid::Uuid::new_v4().simple().to_string();
        Self {
            trace_id: format!("booknet-{}", &id[..12]),
            command,
        }
    }

    /// The correlation id as a request header.
    pub fn header(&self) -> Option<(HeaderName, HeaderValue)> {
        let value = HeaderValue::from_str(&self.trace_id).ok()?;
        Some((HeaderName::from_static(CORRELATION_HEADER), value))
    }
}

task_local! {
    static ACTIVE_COMMAND: TraceContext;
}

#[derive(Debug, Error)]
pub enum TelemetryInitError {
    #[error("invalid log filter '{filter}': {source}")]
    Filter {
        filter: String,
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(#[from] TryInitError),
}

static INSTALLED: OnceLock<()> = OnceLock::new();

/// Filter for the configured level with the transport crates kept quiet.
///
/// `RUST_LOG` wins over the configuration when set.
pub fn log_filter(config: &AppConfig) -> Result<EnvFilter, TelemetryInitError> {
    let filter = std::env::var(EnvFilter::DEFAULT_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| {
            let mut directives = vec![config.log_level.clone()];
            directives.extend(QUIET_TARGETS.iter().map(|d| d.to_string()));
            directives.join(",")
        });

    EnvFilter::try_new(&filter).map_err(|source| TelemetryInitError::Filter { filter, source })
}

/// Install the global subscriber once. Logs go to stderr so that command
/// output on stdout stays machine readable.
pub fn init_tracing(config: &AppConfig) -> Result<(), TelemetryInitError> {
    if INSTALLED.get().is_some() {
        return Ok(());
    }

    // `log` records from dependencies; a bridge installed earlier is fine.
    let _ = LogTracer::init();

    let fmt_layer = if config.log_format == "json" {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(log_filter(config)?)
        .with(fmt_layer)
        .try_init()?;
    let _ = INSTALLED.set(());
    Ok(())
}

/// Run `future` as `context`'s command.
pub async fn with_trace_context<Fut, R>(context: TraceContext, future: Fut) -> R
where
    Fut: std::future::Future<Output = R>,
{
    ACTIVE_COMMAND.scope(context, future).await
}

/// The command context of the running task, if any.
pub fn current_context() -> Option<TraceContext> {
    ACTIVE_COMMAND.try_with(Clone::clone).ok()
}

pub fn current_trace_id() -> Option<String> {
    ACTIVE_COMMAND.try_with(|ctx| ctx.trace_id.clone()).ok()
}
