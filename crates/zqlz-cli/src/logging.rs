//! Console logging for the `zqlz` binary
//!
//! Logs go to stderr so command output on stdout stays pipeable.

use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default log level filter, used when `RUST_LOG` is not set
    pub default_filter: String,

    /// Whether to include file/line information in logs
    pub include_location: bool,

    /// Whether to color output
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_filter: "warn,zqlz_cli=info,zqlz_ai_diff=info".to_string(),
            include_location: cfg!(debug_assertions),
            ansi: true,
        }
    }
}

impl LoggingConfig {
    /// Verbose configuration for `--verbose`
    pub fn verbose() -> Self {
        Self {
            default_filter: "info,zqlz_cli=debug,zqlz_ai_diff=debug".to_string(),
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_filter = filter.into();
        self
    }

    /// Builds the filter. `RUST_LOG` takes precedence over the default filter.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.default_filter))
    }
}

/// Initialize the logging system with the given configuration
pub fn init(config: LoggingConfig) -> anyhow::Result<()> {
    let console_layer = fmt::layer()
        .with_target(true)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_ansi(config.ansi)
        .with_writer(std::io::stderr)
        .with_filter(config.env_filter())
        .boxed();

    tracing_subscriber::registry()
        .with(console_layer)
        .try_init()?;

    tracing::debug!(filter = %config.default_filter, "Logging initialized");
    Ok(())
}
