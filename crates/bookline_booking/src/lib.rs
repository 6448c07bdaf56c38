// --- File: crates/bookline_booking/src/lib.rs ---
// Declare modules within this crate
pub mod doc;
pub mod handlers;
pub mod logic;
#[cfg(test)]
mod logic_proptest;
#[cfg(test)]
mod logic_test;
pub mod routes;
pub mod validation;

// Re-export the routes function to be used by the main backend service
pub use routes::routes;
