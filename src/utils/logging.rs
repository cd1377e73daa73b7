use std::sync::{Once, OnceLock};

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::fmt::{self, format::FmtSpan};
use tracing_subscriber::layer::Layer;
use tracing_subscriber::{prelude::*, registry, EnvFilter, Registry};

static INIT: Once = Once::new();
// Keeps the non-blocking file writer flushing for the process lifetime
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// LogConfig provides options for configuring the logging system
#[derive(Clone, Debug)]
pub struct LogConfig {
    /// The name of the application
    pub app_name: String,
    /// The log level (trace, debug, info, warn, error)
    pub log_level: Level,
    /// Whether to enable JSON log format (useful for log aggregation)
    pub json_format: bool,
    /// Directory where log files should be stored, None for console only
    pub log_dir: Option<String>,
    /// Whether to log to stdout in addition to files
    pub log_to_stdout: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: "datalink-protocol".to_string(),
            log_level: Level::INFO,
            json_format: false,
            log_dir: None,
            log_to_stdout: true,
        }
    }
}

/// Initialize the tracing system with the given configuration
///
/// Repeated calls are no-ops; the first configuration wins. A `RUST_LOG`
/// environment filter overrides the configured level.
///
/// # Example
/// ```
/// use datalink_protocol::utils::logging::{LogConfig, init_logging};
/// use tracing::Level;
///
/// let config = LogConfig {
///     app_name: "my-service".to_string(),
///     log_level: Level::DEBUG,
///     ..Default::default()
/// };
///
/// init_logging(&config);
/// ```
pub fn init_logging(config: &LogConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive(config)));

        let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

        if let Some(log_dir) = &config.log_dir {
            let appender = rolling::daily(log_dir, format!("{}.log", config.app_name));
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);

            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_span_events(FmtSpan::CLOSE);
            layers.push(if config.json_format {
                file_layer.json().boxed()
            } else {
                file_layer.boxed()
            });
        }

        // With no file output configured, stdout is the fallback even
        // when it was switched off.
        if config.log_to_stdout || config.log_dir.is_none() {
            let stdout_layer = fmt::layer()
                .with_writer(std::io::stdout)
                .with_span_events(FmtSpan::CLOSE);
            layers.push(if config.json_format {
                stdout_layer.json().boxed()
            } else {
                stdout_layer.with_ansi(true).boxed()
            });
        }

        registry().with(layers).with(filter).init();

        tracing::info!("Logging initialized at {} level", config.log_level);
    });
}

/// Setup default logging configuration for quick startup
pub fn setup_default_logging() {
    init_logging(&LogConfig::default());
}

// Filter directives name module targets, so the app name's hyphens
// become underscores; a hyphenated target would never match.
fn default_directive(config: &LogConfig) -> String {
    format!(
        "info,{}={}",
        config.app_name.replace('-', "_"),
        config.log_level
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directive_targets_the_crate_module() {
        let directive = default_directive(&LogConfig::default());
        assert_eq!(directive, "info,datalink_protocol=INFO");
    }

    #[test]
    fn default_directive_uses_the_configured_level() {
        let config = LogConfig {
            app_name: "my-service".to_string(),
            log_level: Level::DEBUG,
            ..Default::default()
        };
        assert_eq!(default_directive(&config), "info,my_service=DEBUG");
    }
}
