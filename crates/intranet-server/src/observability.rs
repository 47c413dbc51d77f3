//! Tracing setup for the server binary.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::LoggingConfig;

/// Filter for the configured level. A valid `RUST_LOG` takes precedence.
pub fn env_filter(logging: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level))
}

/// Installs the global subscriber. Only the first call has an effect.
pub fn init_tracing(logging: &LoggingConfig) {
    let _ = tracing_subscriber::registry()
        .with(env_filter(logging))
        .with(fmt::layer().with_target(false))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_harmless() {
        let logging = LoggingConfig::default();
        init_tracing(&logging);
        init_tracing(&logging);
        tracing::info!("still logging");
    }
}
