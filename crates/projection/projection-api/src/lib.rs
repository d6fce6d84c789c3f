//! Projection Consumer API
//!
//! Consumer configuration and builder APIs for the stacked projection
//! pipeline.
//!
//! This crate provides:
//! - [`ProjectionConfigBuilder`] for validated configuration
//! - JSON config file loading ([`config::from_json_file`])
//! - Re-exports from SPI and core for convenience

pub mod config;

pub use config::{
    from_json_file, from_json_str, read_config_file, ConfigError, ConfigFile,
    ProjectionConfigBuilder, MAX_TIME_VALUE,
};

// Re-export from core
pub use projection_core::{
    boundary, engine, extent, format, pipeline, regression, stacking, window, boundary_track,
    filter_series, fit, fit_named, formatter_by_name, offset, BinarySizeFormatter, ChartData,
    ChartExtent, PipelineOutcome, Projection, ProjectionEngine, ProjectionPipeline, RawFormatter,
    RegressionFit, RegressionModel, SeriesFailure, SeriesStacker, Stacked, TimeWindow,
};

// Re-export types and traits from SPI
pub use projection_spi::{
    Algorithm, BoundaryPoint, CalendarUnit, ChartSeries, PartialSlicePolicy, ProjectedSeries,
    ProjectionConfig, ProjectionError, Result, Sample, Series, SeriesAdapter, StackDiagnostic,
    StackedPoint, Track, ValueFormatter,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{ConfigFile, ProjectionConfigBuilder};
    pub use projection_core::prelude::*;
    pub use projection_core::{ChartExtent, SeriesFailure};
}
