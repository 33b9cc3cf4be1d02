//! Tracing subscriber setup for the command-line tools.

use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::SubscriberBuilder;

/// Installs the global fmt subscriber. `RUST_LOG` wins over `level`, which
/// defaults to `info`. Fails if a subscriber is already installed.
pub fn init_tracing(level: Option<&str>) -> Result<(), String> {
    let default_level = level.unwrap_or("info");
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    SubscriberBuilder::default()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| err.to_string())
}
