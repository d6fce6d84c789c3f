//! Typed pipeline configuration.

use serde::{Deserialize, Deserializer, Serialize};

use super::{Algorithm, CalendarUnit};
use crate::error::{ProjectionError, Result};

/// What the stacker does with a timestamp that only some series have.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartialSlicePolicy {
    /// Drop the timestamp and record a diagnostic.
    #[default]
    Drop,
    /// Stack over the series that are present.
    Emit,
}

/// Settings for one pipeline run.
///
/// `time_value` is both the look-back window and the projection horizon,
/// counted in `time_unit`. Deserializing runs [`validate`](Self::validate);
/// values built in code are checked when a pipeline is created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionConfig {
    pub algorithm: Algorithm,
    pub time_unit: CalendarUnit,
    pub time_value: i64,
    /// Level of the boundary line, already multiplied by its units
    pub boundary: Option<f64>,
    pub partial_slices: PartialSlicePolicy,
}

impl ProjectionConfig {
    pub const DEFAULT_TIME_VALUE: i64 = 6;

    /// Largest look-back/horizon count accepted, in either direction.
    pub const MAX_TIME_VALUE: i64 = 10_000;

    pub fn new(algorithm: Algorithm, time_unit: CalendarUnit, time_value: i64) -> Self {
        Self {
            algorithm,
            time_unit,
            time_value,
            ..Self::default()
        }
    }

    pub fn with_boundary(mut self, boundary: f64) -> Self {
        self.boundary = Some(boundary);
        self
    }

    pub fn with_partial_slices(mut self, policy: PartialSlicePolicy) -> Self {
        self.partial_slices = policy;
        self
    }

    /// Check `time_value` against [`MAX_TIME_VALUE`](Self::MAX_TIME_VALUE)
    /// and that the boundary, when set, is finite.
    pub fn validate(&self) -> Result<()> {
        let max = Self::MAX_TIME_VALUE;
        if !(-max..=max).contains(&self.time_value) {
            return Err(ProjectionError::invalid(
                "time_value",
                format!("{} is outside +-{}", self.time_value, max),
            ));
        }
        match self.boundary {
            Some(b) if !b.is_finite() => Err(ProjectionError::invalid(
                "boundary",
                format!("must be finite, got {}", b),
            )),
            _ => Ok(()),
        }
    }

    /// Validate and return `self`.
    pub fn validated(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }
}

/// Wire form of [`ProjectionConfig`]; missing fields take the defaults.
#[derive(Deserialize)]
#[serde(default)]
struct ConfigDocument {
    algorithm: Algorithm,
    time_unit: CalendarUnit,
    time_value: i64,
    boundary: Option<f64>,
    partial_slices: PartialSlicePolicy,
}

impl Default for ConfigDocument {
    fn default() -> Self {
        let config = ProjectionConfig::default();
        Self {
            algorithm: config.algorithm,
            time_unit: config.time_unit,
            time_value: config.time_value,
            boundary: config.boundary,
            partial_slices: config.partial_slices,
        }
    }
}

impl<'de> Deserialize<'de> for ProjectionConfig {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let doc = ConfigDocument::deserialize(deserializer)?;
        ProjectionConfig {
            algorithm: doc.algorithm,
            time_unit: doc.time_unit,
            time_value: doc.time_value,
            boundary: doc.boundary,
            partial_slices: doc.partial_slices,
        }
        .validated()
        .map_err(serde::de::Error::custom)
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Polynomial,
            time_unit: CalendarUnit::Years,
            time_value: Self::DEFAULT_TIME_VALUE,
            boundary: None,
            partial_slices: PartialSlicePolicy::Drop,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProjectionConfig::default();
        assert_eq!(config.algorithm, Algorithm::Polynomial);
        assert_eq!(config.time_unit, CalendarUnit::Years);
        assert_eq!(config.time_value, 6);
        assert_eq!(config.boundary, None);
        assert_eq!(config.partial_slices, PartialSlicePolicy::Drop);
    }

    #[test]
    fn test_new_with_boundary() {
        let config = ProjectionConfig::new(Algorithm::Linear, CalendarUnit::Days, 3)
            .with_boundary(100.0)
            .with_partial_slices(PartialSlicePolicy::Emit);
        assert_eq!(config.algorithm, Algorithm::Linear);
        assert_eq!(config.time_unit, CalendarUnit::Days);
        assert_eq!(config.time_value, 3);
        assert_eq!(config.boundary, Some(100.0));
        assert_eq!(config.partial_slices, PartialSlicePolicy::Emit);
    }

    #[test]
    fn test_deserialize_partial_document() {
        let config: ProjectionConfig =
            serde_json::from_str(r#"{"algorithm":"linear","time_unit":"days"}"#).unwrap();
        assert_eq!(config.algorithm, Algorithm::Linear);
        assert_eq!(config.time_unit, CalendarUnit::Days);
        assert_eq!(config.time_value, ProjectionConfig::DEFAULT_TIME_VALUE);
    }

    #[test]
    fn test_validate_time_value_range() {
        let max = ProjectionConfig::MAX_TIME_VALUE;
        for count in [0, max, -max] {
            let config = ProjectionConfig::new(Algorithm::Linear, CalendarUnit::Days, count);
            assert!(config.validate().is_ok());
        }
        let err = ProjectionConfig::new(Algorithm::Linear, CalendarUnit::Days, max + 1)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidParameter { ref name, .. } if name == "time_value"));
    }

    #[test]
    fn test_validate_rejects_infinite_boundary() {
        let config = ProjectionConfig::default().with_boundary(f64::INFINITY);
        let err = config.validated().unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidParameter { ref name, .. } if name == "boundary"));
        assert!(ProjectionConfig::default().with_boundary(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_deserialize_rejects_out_of_range_time_value() {
        let json = r#"{"algorithm":"linear","time_unit":"seconds","time_value":2000000,"boundary":5.0}"#;
        let err = serde_json::from_str::<ProjectionConfig>(json).unwrap_err();
        assert!(err.to_string().contains("time_value"));
    }

    #[test]
    fn test_serialize_then_deserialize() {
        let config = ProjectionConfig::new(Algorithm::Power, CalendarUnit::Hours, 12).with_boundary(3.5);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(serde_json::from_str::<ProjectionConfig>(&json).unwrap(), config);
    }

    #[test]
    fn test_deserialize_unknown_algorithm_fails() {
        let result = serde_json::from_str::<ProjectionConfig>(r#"{"algorithm":"cubic"}"#);
        assert!(result.is_err());
    }
}
