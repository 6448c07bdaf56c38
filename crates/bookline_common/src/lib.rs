// --- File: crates/bookline_common/src/lib.rs ---

// Declare modules within this crate
pub mod error; // Error handling
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod services; // Service abstractions

// Re-export error types for easier access
pub use error::{BookingError, HttpStatusCode};

// Re-export HTTP utilities for easier access
pub use http::{create_client, HTTP_CLIENT};
