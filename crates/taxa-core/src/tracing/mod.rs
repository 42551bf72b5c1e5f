//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Initialize the taxa tracing/logging system.
///
/// Reads the `TAXA_LOG` environment variable for per-subsystem log levels.
/// Format: `TAXA_LOG=taxa_engine=debug,taxa_storage=warn`
///
/// Falls back to `taxa=info` if `TAXA_LOG` is not set or is invalid.
///
/// This function is idempotent — calling it multiple times is safe.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env("TAXA_LOG").unwrap_or_else(|_| EnvFilter::new("taxa=info"));

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true))
            .with(filter)
            .init();
    });
}
