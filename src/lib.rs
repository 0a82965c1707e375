//! az-prom-rules-converter library
//!
//! This crate converts Prometheus alerting and recording rule groups into
//! Azure Resource Manager templates that deploy
//! `Microsoft.AlertsManagement/prometheusRuleGroups` resources.
//!
//! The entry point is [`pipeline::convert`]; the individual steps and
//! converters are public for callers that need only part of the flow.

pub mod arm;
pub mod cli;
pub mod config;
pub mod converter;
pub mod duration;
pub mod error;
pub mod pipeline;
pub mod schema;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging subsystem
///
/// Logs are written to stderr; stdout is reserved for the generated template.
///
/// # Arguments
/// * `level` - Log level string (trace, debug, info, warn, error)
///
/// # Errors
/// Returns an error if the logging system fails to initialize
pub fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
