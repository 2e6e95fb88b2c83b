//! Structured logging setup.
//!
//! Log output goes to stdout through the `tracing-subscriber` fmt layer. Verbosity comes from
//! `RUST_LOG` and defaults to `info`, for example:
//!
//! ```bash
//! export RUST_LOG="dayscore=debug,tower_http=info"
//! ```

use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the global tracing subscriber. Fails if one is already installed.
pub fn init_telemetry() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    info!("Telemetry initialized");
    Ok(())
}
