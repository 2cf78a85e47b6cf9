//! Proportional allocation of unmetered energy across room submeters.

/// REST API over the engine and store.
#[cfg(feature = "api")]
pub mod api;
/// Allocation engine, input normalization, and bill records.
pub mod billing;
pub mod cli;
pub mod config;
pub mod io;
pub mod logging;
pub mod property;
pub mod store;
