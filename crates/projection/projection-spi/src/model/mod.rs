//! Model module containing data structures

mod algorithm;
mod calendar_unit;
mod chart;
mod config;
mod sample;

pub use algorithm::Algorithm;
pub use calendar_unit::CalendarUnit;
pub use chart::{BoundaryPoint, ChartSeries, StackDiagnostic, StackedPoint, Track};
pub use config::{PartialSlicePolicy, ProjectionConfig};
pub use sample::{ProjectedSeries, Sample, Series};
