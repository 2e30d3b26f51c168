//! Log Output
//!
//! Installs a `tracing-subscriber` pipeline for the actions, builders and
//! drivers, which emit through `tracing` macros. `RUST_LOG` takes precedence
//! over the configured level.
//!
//! ## Toyota Way Application
//!
//! - **Genchi Genbutsu**: Every action logs its name and outcome
//! - **Mieruka**: JSON output feeds log tooling without parsing text

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::result::{SpecBindError, SpecBindResult};

/// Filter from `RUST_LOG`, or from `level` when the variable is unset
pub fn build_filter(level: &str) -> SpecBindResult<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level)
        .map_err(|err| SpecBindError::config(format!("Invalid log level '{level}': {err}")))
}

/// Install the global subscriber. Returns `false` when one was already
/// installed, which leaves the existing subscriber in place.
pub fn init_tracing(config: &LoggingConfig) -> SpecBindResult<bool> {
    let filter = build_filter(&config.level)?;
    let registry = tracing_subscriber::registry().with(filter);
    let installed = if config.json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer()).try_init()
    };
    Ok(installed.is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let err = build_filter("specbind=loudest").unwrap_err();
        assert!(matches!(err, SpecBindError::Config { .. }));
    }

    #[test]
    fn test_repeated_init_is_harmless() {
        let config = LoggingConfig {
            level: "warn".to_string(),
            json: true,
        };
        let _ = init_tracing(&config).unwrap();
        assert!(!init_tracing(&config).unwrap());
    }
}
