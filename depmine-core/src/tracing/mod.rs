//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Initialize logging for depmine.
///
/// Reads the `DEPMINE_LOG` environment variable for per-subsystem levels,
/// e.g. `DEPMINE_LOG=depmine_discovery=debug,depmine_storage=warn`, and
/// falls back to `depmine=info` when unset or invalid.
///
/// Idempotent; later calls are no-ops.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("DEPMINE_LOG")
            .unwrap_or_else(|_| EnvFilter::new("depmine=info"));

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true))
            .with(filter)
            .init();
    });
}
