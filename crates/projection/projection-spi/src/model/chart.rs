//! Chart-ready output types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;

/// The three logical tracks every series is stacked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    Historical,
    Backprojected,
    Projected,
}

impl Track {
    pub const ALL: [Track; 3] = [Track::Historical, Track::Backprojected, Track::Projected];
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Track::Historical => "historical",
            Track::Backprojected => "backprojected",
            Track::Projected => "projected",
        };
        f.write_str(s)
    }
}

/// A stacked value at one timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StackedPoint {
    pub time: DateTime<Utc>,
    /// Running total of this and every earlier series at `time`
    pub cumulative_value: f64,
    /// This series' own value, for tooltips
    pub original_value: f64,
}

impl StackedPoint {
    /// Lower edge of this series' band (the total of the series below it).
    pub fn base_value(&self) -> f64 {
        self.cumulative_value - self.original_value
    }
}

/// One series ready for an area/line renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub name: String,
    pub historical: Vec<StackedPoint>,
    pub backprojected: Vec<StackedPoint>,
    pub projected: Vec<StackedPoint>,
}

impl ChartSeries {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn track(&self, track: Track) -> &[StackedPoint] {
        match track {
            Track::Historical => &self.historical,
            Track::Backprojected => &self.backprojected,
            Track::Projected => &self.projected,
        }
    }

    pub fn track_mut(&mut self, track: Track) -> &mut Vec<StackedPoint> {
        match track {
            Track::Historical => &mut self.historical,
            Track::Backprojected => &mut self.backprojected,
            Track::Projected => &mut self.projected,
        }
    }

    /// True when at least one track has a point to draw.
    pub fn is_displayable(&self) -> bool {
        Track::ALL.iter().any(|&track| !self.track(track).is_empty())
    }
}

/// A point on the constant boundary line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryPoint {
    pub time: DateTime<Utc>,
    pub limit: f64,
}

/// A point the stacker refused or dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StackDiagnostic {
    /// A series contributed twice to the same timestamp; the extra point was refused.
    StackingOverflow {
        track: Track,
        time: DateTime<Utc>,
        series: String,
    },
    /// A timestamp was present in only some of the series and was not stacked.
    PartialSlice {
        track: Track,
        time: DateTime<Utc>,
        present: usize,
        expected: usize,
    },
    /// A series had a NaN or infinite value at this timestamp. It counts as
    /// present for the slice but contributes nothing to the totals.
    NonFiniteValue {
        track: Track,
        time: DateTime<Utc>,
        series: String,
    },
    /// A series' forecast stopped at `time` because the model's value there
    /// was not finite. Earlier ticks are kept.
    ProjectionCutOff { time: DateTime<Utc>, series: String },
}

impl StackDiagnostic {
    pub fn track(&self) -> Track {
        match self {
            StackDiagnostic::StackingOverflow { track, .. } => *track,
            StackDiagnostic::PartialSlice { track, .. } => *track,
            StackDiagnostic::NonFiniteValue { track, .. } => *track,
            StackDiagnostic::ProjectionCutOff { .. } => Track::Projected,
        }
    }

    /// The series this diagnostic is about, if it concerns a single one.
    pub fn series(&self) -> Option<&str> {
        match self {
            StackDiagnostic::StackingOverflow { series, .. }
            | StackDiagnostic::NonFiniteValue { series, .. }
            | StackDiagnostic::ProjectionCutOff { series, .. } => Some(series),
            StackDiagnostic::PartialSlice { .. } => None,
        }
    }

    /// The matching error for a refused point. Everything else is reported
    /// as data, not an error, and maps to `None`.
    pub fn to_error(&self) -> Option<ProjectionError> {
        match self {
            StackDiagnostic::StackingOverflow {
                track,
                time,
                series,
            } => Some(ProjectionError::StackingOverflow {
                track: *track,
                timestamp_ms: time.timestamp_millis(),
                series: series.clone(),
            }),
            _ => None,
        }
    }
}

impl fmt::Display for StackDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackDiagnostic::StackingOverflow {
                track,
                time,
                series,
            } => write!(
                f,
                "refused duplicate {} point of series '{}' at {}",
                track,
                series,
                time.to_rfc3339()
            ),
            StackDiagnostic::PartialSlice {
                track,
                time,
                present,
                expected,
            } => write!(
                f,
                "dropped {} slice at {}: {} of {} series present",
                track,
                time.to_rfc3339(),
                present,
                expected
            ),
            StackDiagnostic::NonFiniteValue {
                track,
                time,
                series,
            } => write!(
                f,
                "skipped non-finite {} value of series '{}' at {}",
                track,
                series,
                time.to_rfc3339()
            ),
            StackDiagnostic::ProjectionCutOff { time, series } => write!(
                f,
                "projection of series '{}' cut off at {}: value not finite",
                series,
                time.to_rfc3339()
            ),
        }
    }
}
