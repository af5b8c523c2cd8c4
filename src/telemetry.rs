//! # Telemetry
//!
//! Tracing subscriber setup.

use crate::config::{LogFormat, LogSettings};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Builds the level filter: `RUST_LOG` if set and valid, otherwise the
/// configured directive, otherwise `info`.
#[must_use]
pub fn env_filter(settings: &LogSettings) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init(settings: &LogSettings) {
    let filter = env_filter(settings);
    let result = match settings.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init(),
    };
    if let Err(e) = result {
        tracing::debug!(error = %e, "tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_directive_falls_back() {
        let settings = LogSettings {
            filter: "not a [valid filter".to_string(),
            format: LogFormat::Pretty,
        };
        // Must not panic whatever RUST_LOG holds.
        let _ = env_filter(&settings);
    }

    #[test]
    fn init_twice_is_harmless() {
        let settings = LogSettings::default();
        init(&settings);
        init(&settings);
    }
}
