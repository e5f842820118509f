//! Logging configuration using tracing
//!
//! Log lines go to stderr so they never mix with the reports printed on
//! stdout. Filtering honours `RUST_LOG`, e.g. `RUST_LOG=pitwall=debug`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset; degraded fetches still show up
const DEFAULT_FILTER: &str = "warn";

/// Initialize the tracing subscriber
///
/// # Errors
/// Returns an error if a global subscriber has already been installed
pub fn init() -> Result<(), tracing_subscriber::util::TryInitError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .compact(),
        )
        .try_init()
}
