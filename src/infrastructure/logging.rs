//! Logging initialization.
//!
//! Library code only emits `tracing` events; the binary installs this
//! subscriber once at startup. `RUST_LOG` overrides the default filter.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Install a console subscriber with env-filter support. Calling it twice
/// is an error surfaced to the caller, not a panic.
pub fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,indiamart_scraper=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    Ok(())
}
