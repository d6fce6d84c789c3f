//! Projection Core Implementations
//!
//! Turns raw time series into a stacked chart with a forecast:
//!
//! - [`window`]: look-back window filtering
//! - [`regression`]: linear, exponential, logarithmic, power and polynomial fits
//! - [`engine`]: back-projection and forward projection of one series
//! - [`stacking`]: cumulative stacking across series, per track
//! - [`boundary`]: constant reference line
//! - [`extent`]: axis domains
//! - [`format`]: display formatters
//! - [`pipeline`]: all of the above in one call
//!
//! ## Example
//!
//! ```rust
//! use chrono::{DateTime, Duration};
//! use projection_core::prelude::*;
//!
//! let now = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
//! let series = Series::new(
//!     "ingress",
//!     vec![
//!         Sample::new(now - Duration::days(2), 10.0),
//!         Sample::new(now - Duration::days(1), 20.0),
//!     ],
//! );
//!
//! let config = ProjectionConfig::new(Algorithm::Linear, CalendarUnit::Days, 2);
//! let chart = ProjectionPipeline::new(config)
//!     .unwrap()
//!     .run(&[series], now)
//!     .unwrap()
//!     .into_chart()
//!     .unwrap();
//! assert_eq!(chart.series[0].projected.len(), 3);
//! ```

pub mod boundary;
pub mod engine;
pub mod extent;
pub mod format;
pub mod pipeline;
pub mod regression;
pub mod stacking;
pub mod window;

// Re-export from SPI
pub use projection_spi::{
    Algorithm, BoundaryPoint, CalendarUnit, ChartSeries, PartialSlicePolicy, ProjectedSeries,
    ProjectionConfig, ProjectionError, Result, Sample, Series, SeriesAdapter, StackDiagnostic,
    StackedPoint, Track, ValueFormatter,
};

pub use boundary::boundary_track;
pub use engine::{Projection, ProjectionEngine};
pub use extent::ChartExtent;
pub use format::{formatter_by_name, BinarySizeFormatter, RawFormatter};
pub use pipeline::{ChartData, PipelineOutcome, ProjectionPipeline, SeriesFailure};
pub use regression::{fit, fit_named, RegressionFit, RegressionModel};
pub use stacking::{SeriesStacker, Stacked};
pub use window::{filter_series, offset, TimeWindow};

/// Prelude module for convenient imports
pub mod prelude {
    pub use projection_spi::{
        Algorithm, CalendarUnit, PartialSlicePolicy, ProjectionConfig, Sample, Series,
        ValueFormatter,
    };
    // Pipeline
    pub use crate::pipeline::{ChartData, PipelineOutcome, ProjectionPipeline};
    // Building blocks
    pub use crate::boundary::boundary_track;
    pub use crate::engine::ProjectionEngine;
    pub use crate::regression::{fit, RegressionFit};
    pub use crate::stacking::SeriesStacker;
    pub use crate::window::{filter_series, TimeWindow};
    // Error types
    pub use projection_spi::{ProjectionError, Result};
}
