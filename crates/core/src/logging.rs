//! Logging initialization.
//!
//! Configures `tracing-subscriber` based on the `[general]` section
//! of `GcLogConfig`. Supports JSON structured logging and
//! human-readable pretty format.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::GeneralConfig;
use crate::error::{ConfigError, GcLogError, PipelineError};

/// Initialize the global tracing subscriber.
///
/// Must be called at most once per process. `RUST_LOG` takes precedence
/// over `log_level` when set.
///
/// # Formats
///
/// * `"json"` - Machine-parseable JSON lines
/// * `"pretty"` - Human-readable output
pub fn init_tracing(config: &GeneralConfig) -> Result<(), GcLogError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    match config.log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()
                .map_err(|e| {
                    PipelineError::InitFailed(format!(
                        "failed to initialize JSON tracing subscriber: {e}"
                    ))
                })?;
        }
        "pretty" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()
                .map_err(|e| {
                    PipelineError::InitFailed(format!(
                        "failed to initialize pretty tracing subscriber: {e}"
                    ))
                })?;
        }
        other => {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("unknown log format '{other}', expected 'json' or 'pretty'"),
            }
            .into());
        }
    }

    Ok(())
}
