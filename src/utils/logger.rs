// Logger initialization

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub const DEFAULT_LOG_FILTER: &str = "csv_summary=debug,tower_http=debug,axum=debug";

/// Install the global tracing subscriber; `RUST_LOG` overrides the default filter.
/// Runs before configuration is loaded so startup failures are traced. Later
/// calls are no-ops.
pub fn init_logger() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_is_ready_before_config_and_reinit_is_harmless() {
        init_logger();
        init_logger();

        // Errors raised while loading config must reach the subscriber
        assert!(tracing::enabled!(tracing::Level::ERROR));
    }
}
