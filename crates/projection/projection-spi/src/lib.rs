//! Projection Service Provider Interface
//!
//! Defines the data model, error types and collaborator traits shared by
//! the stacked projection pipeline:
//!
//! - [`Series`] / [`Sample`]: raw time-stamped input
//! - [`ProjectedSeries`] / [`ChartSeries`]: stacker input and output
//! - [`ProjectionConfig`]: typed pipeline configuration
//! - [`ProjectionError`]: standardized error type
//! - [`ValueFormatter`], [`SeriesAdapter`]: seams for external collaborators

pub mod contract;
pub mod error;
pub mod model;

// Re-export all public items at crate root for convenience
pub use contract::{SeriesAdapter, ValueFormatter};
pub use error::{ProjectionError, Result};
pub use model::{
    Algorithm, BoundaryPoint, CalendarUnit, ChartSeries, PartialSlicePolicy, ProjectedSeries,
    ProjectionConfig, Sample, Series, StackDiagnostic, StackedPoint, Track,
};
