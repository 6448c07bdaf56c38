//! Logging utilities for the Bookline application.
//!
//! This module provides a standardized approach to logging across all
//! crates in the workspace. It configures the tracing subscriber once at
//! startup; everything else uses the `tracing` macros directly.

use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber with the default log level (INFO).
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize the tracing subscriber with a specific log level.
///
/// `RUST_LOG` still takes precedence; the level given here only sets the
/// default directive for the workspace crates.
pub fn init_with_level(level: Level) {
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("bookline={}", level).parse().expect("valid directive"));

    // Use try_init to handle the case where a global default subscriber has already been set
    let result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}
