//! Tracing initialization for the CLI's own plumbing logs.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Filter used when `RUST_LOG` is unset. Diagnostics lines are not tracing
/// events, so the default stays quiet.
const DEFAULT_FILTER: &str = "warn";

/// Install the stderr `fmt` subscriber driven by `RUST_LOG`.
///
/// A subscriber that is already installed is left in place.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .unwrap_or_else(|_| EnvFilter::new("off"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true);

    if let Err(error) = tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init()
    {
        eprintln!("tracing already initialized: {error}");
    }
}
