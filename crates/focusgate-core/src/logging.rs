//! Tracing subscriber setup for hosts embedding the core.

use tracing_subscriber::{fmt, EnvFilter};

use crate::storage::LoggingConfig;

/// Install a stderr subscriber.
///
/// `RUST_LOG` wins over the configured filter. Calling this twice (or after
/// the host installed its own subscriber) is harmless.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_does_not_panic() {
        init(&LoggingConfig::default());
        init(&LoggingConfig {
            filter: "not a [valid filter".into(),
        });
    }
}
