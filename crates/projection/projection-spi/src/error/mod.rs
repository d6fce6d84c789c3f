//! Error types for projection operations
//!
//! This module provides the [`ProjectionError`] enum and [`Result`] type alias
//! shared by every stage of the pipeline.

mod projection_error;

pub use projection_error::{ProjectionError, Result};
