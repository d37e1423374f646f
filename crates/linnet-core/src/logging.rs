//! Tracing subscriber setup.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{Error, Result};

/// Builds the filter: `RUST_LOG` when set, the configured level otherwise.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| Error::Config(format!("invalid log level {:?}: {e}", config.level)))
}

/// Installs the global subscriber. Returns [`Error::Config`] when one is
/// already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter(config)?);
    let installed = match config.format {
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
    };
    installed.map_err(|e| Error::Config(format!("tracing subscriber: {e}")))
}
