//! Logging and tracing initialization.
//!
//! Call [`init_logging`] once at startup, before creating the `App`.
//! The log level is controlled by the `RUST_LOG` environment variable:
//!
//! ```bash
//! RUST_LOG=sumi_server=debug,tower_http=debug cargo run
//! ```

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging with sensible defaults.
///
/// The level defaults to `info` when `RUST_LOG` is not set.
///
/// # Panics
///
/// Panics if called more than once.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize logging with a specific log level, ignoring `RUST_LOG` unless set.
pub fn init_logging_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
