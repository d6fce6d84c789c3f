//! Projection Facade
//!
//! High-level API for stacked time series projection. Re-exports all public
//! types from the projection stack for convenient usage.

// Re-export everything from API (which includes SPI and core)
pub use projection_api::*;

// Explicit re-exports for documentation
pub use projection_api::prelude;

// Re-export SPI modules for direct access
pub use projection_spi::{contract, error, model};
