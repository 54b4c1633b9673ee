//! Logging setup.
//!
//! The library crates only emit `tracing` events; nothing is printed
//! until a binary installs a subscriber. [`init_tracing`] is the
//! one-liner for that.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs a formatting subscriber filtered by `RUST_LOG`.
///
/// Defaults to `info` when `RUST_LOG` is unset or unparseable. Calling
/// it again (or after another subscriber was installed) does nothing.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!("tracing initialized");
    }
}
