//! Raw and projected sample types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Track;

/// A single time-stamped observation.
///
/// `value` is `None` when the source had no reading. NaN and infinite values
/// are treated the same as a missing value everywhere in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: DateTime<Utc>,
    pub value: Option<f64>,
}

impl Sample {
    pub fn new(time: DateTime<Utc>, value: f64) -> Self {
        Self {
            time,
            value: Some(value),
        }
    }

    /// A sample with no reading.
    pub fn missing(time: DateTime<Utc>) -> Self {
        Self { time, value: None }
    }

    /// The value if present and finite.
    pub fn finite_value(&self) -> Option<f64> {
        self.value.filter(|v| v.is_finite())
    }

    /// Milliseconds since the Unix epoch.
    pub fn timestamp_ms(&self) -> i64 {
        self.time.timestamp_millis()
    }
}

/// A named sequence of samples. Samples need not be time-ordered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    #[serde(default)]
    pub samples: Vec<Sample>,
}

impl Series {
    pub fn new(name: impl Into<String>, samples: Vec<Sample>) -> Self {
        Self {
            name: name.into(),
            samples,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// One series after projection, before stacking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectedSeries {
    pub name: String,
    /// Window-filtered raw history
    pub historical: Vec<Sample>,
    /// The model's reconstruction of the history
    pub backprojected: Vec<Sample>,
    /// Forecast ticks from `now` to the horizon
    pub projected: Vec<Sample>,
    /// Where the forecast stopped early; later ticks are not expected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cut_off: Option<DateTime<Utc>>,
}

impl ProjectedSeries {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// True if the series is expected to have a point at `time` on `track`.
    pub fn covers(&self, track: Track, time: &DateTime<Utc>) -> bool {
        match (track, self.cut_off) {
            (Track::Projected, Some(cut_off)) => *time < cut_off,
            _ => true,
        }
    }

    /// Samples of the given track.
    pub fn track(&self, track: Track) -> &[Sample] {
        match track {
            Track::Historical => &self.historical,
            Track::Backprojected => &self.backprojected,
            Track::Projected => &self.projected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    #[test]
    fn test_finite_value() {
        assert_eq!(Sample::new(at(0), 4.5).finite_value(), Some(4.5));
        assert_eq!(Sample::missing(at(0)).finite_value(), None);
        assert_eq!(Sample::new(at(0), f64::NAN).finite_value(), None);
        assert_eq!(Sample::new(at(0), f64::INFINITY).finite_value(), None);
    }

    #[test]
    fn test_timestamp_ms() {
        assert_eq!(Sample::new(at(1_234), 1.0).timestamp_ms(), 1_234);
    }

    #[test]
    fn test_series_len() {
        let series = Series::new("a", vec![Sample::new(at(0), 1.0), Sample::missing(at(1))]);
        assert_eq!(series.len(), 2);
        assert!(!series.is_empty());
        assert!(Series::new("b", vec![]).is_empty());
    }

    #[test]
    fn test_projected_series_track() {
        let mut series = ProjectedSeries::new("a");
        series.projected.push(Sample::new(at(5), 2.0));
        assert!(series.track(Track::Historical).is_empty());
        assert_eq!(series.track(Track::Projected).len(), 1);
    }

    #[test]
    fn test_cut_off_limits_projected_coverage() {
        let mut series = ProjectedSeries::new("a");
        assert!(series.covers(Track::Projected, &at(10)));
        series.cut_off = Some(at(5));
        assert!(series.covers(Track::Projected, &at(4)));
        assert!(!series.covers(Track::Projected, &at(5)));
        assert!(series.covers(Track::Historical, &at(10)));
    }

    #[test]
    fn test_sample_deserialize_null_value() {
        let json = r#"{"time":"2024-01-01T00:00:00Z","value":null}"#;
        let sample: Sample = serde_json::from_str(json).unwrap();
        assert_eq!(sample.value, None);
        assert_eq!(sample.timestamp_ms(), 1_704_067_200_000);
    }

    #[test]
    fn test_series_deserialize_without_samples() {
        let series: Series = serde_json::from_str(r#"{"name":"empty"}"#).unwrap();
        assert_eq!(series.name, "empty");
        assert!(series.is_empty());
    }
}
