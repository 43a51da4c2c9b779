//! Logging setup.

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global fmt subscriber. `RUST_LOG` overrides `default_filter`.
pub fn init(default_filter: &str) {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    // A second call (tests, re-entry) keeps the first subscriber.
    let _ = fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_target(false)
        .try_init();
}
