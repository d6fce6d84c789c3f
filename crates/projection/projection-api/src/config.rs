//! Validated configuration and config file loading.

use std::fs;
use std::path::Path;

use projection_spi::{
    Algorithm, CalendarUnit, PartialSlicePolicy, ProjectionConfig, ProjectionError, Result,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest look-back/horizon count accepted, in either direction.
pub const MAX_TIME_VALUE: i64 = ProjectionConfig::MAX_TIME_VALUE;

/// Builder for [`ProjectionConfig`].
///
/// Name-based setters defer their parse error to [`build`](Self::build); the
/// first error recorded wins.
#[derive(Debug, Default)]
pub struct ProjectionConfigBuilder {
    algorithm: Option<Algorithm>,
    time_unit: Option<CalendarUnit>,
    time_value: Option<i64>,
    boundary: Option<f64>,
    boundary_units: Option<f64>,
    partial_slices: Option<PartialSlicePolicy>,
    error: Option<ProjectionError>,
}

impl ProjectionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    /// Set the algorithm by name (`linear`, `exponential`, ...).
    pub fn algorithm_name(mut self, name: &str) -> Self {
        match name.parse() {
            Ok(algorithm) => self.algorithm = Some(algorithm),
            Err(e) => self.record(e),
        }
        self
    }

    pub fn time_unit(mut self, unit: CalendarUnit) -> Self {
        self.time_unit = Some(unit);
        self
    }

    /// Set the time unit by name (`seconds` ... `years`).
    pub fn time_unit_name(mut self, name: &str) -> Self {
        match name.parse() {
            Ok(unit) => self.time_unit = Some(unit),
            Err(e) => self.record(e),
        }
        self
    }

    /// Look-back window and projection horizon, in time units.
    pub fn time_value(mut self, count: i64) -> Self {
        self.time_value = Some(count);
        self
    }

    pub fn boundary(mut self, boundary: f64) -> Self {
        self.boundary = Some(boundary);
        self
    }

    /// Multiplier applied to the boundary (e.g. `1024.0 * 1024.0` for Mib).
    pub fn boundary_units(mut self, units: f64) -> Self {
        self.boundary_units = Some(units);
        self
    }

    pub fn partial_slices(mut self, policy: PartialSlicePolicy) -> Self {
        self.partial_slices = Some(policy);
        self
    }

    fn record(&mut self, error: ProjectionError) {
        self.error.get_or_insert(error);
    }

    /// Build the configuration.
    pub fn build(self) -> Result<ProjectionConfig> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let time_value = self.time_value.unwrap_or(ProjectionConfig::DEFAULT_TIME_VALUE);

        let units = self.boundary_units.unwrap_or(1.0);
        if !units.is_finite() || units <= 0.0 {
            return Err(ProjectionError::invalid(
                "boundary_units",
                format!("must be positive and finite, got {}", units),
            ));
        }
        // A non-finite product is caught by `validated`
        let boundary = self.boundary.map(|b| b * units);

        ProjectionConfig {
            algorithm: self.algorithm.unwrap_or_default(),
            time_unit: self.time_unit.unwrap_or_default(),
            time_value,
            boundary,
            partial_slices: self.partial_slices.unwrap_or_default(),
        }
        .validated()
    }
}

/// On-disk configuration. Every field is optional and names are kept as
/// strings so unknown values report the pipeline's own errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub algorithm: Option<String>,
    pub time_unit: Option<String>,
    pub time_value: Option<i64>,
    pub boundary: Option<f64>,
    pub boundary_units: Option<f64>,
    pub partial_slices: Option<PartialSlicePolicy>,
}

impl ConfigFile {
    /// Fields set in `overrides` replace the ones here.
    pub fn merge(self, overrides: ConfigFile) -> ConfigFile {
        ConfigFile {
            algorithm: overrides.algorithm.or(self.algorithm),
            time_unit: overrides.time_unit.or(self.time_unit),
            time_value: overrides.time_value.or(self.time_value),
            boundary: overrides.boundary.or(self.boundary),
            boundary_units: overrides.boundary_units.or(self.boundary_units),
            partial_slices: overrides.partial_slices.or(self.partial_slices),
        }
    }

    pub fn builder(&self) -> ProjectionConfigBuilder {
        let mut builder = ProjectionConfigBuilder::new();
        if let Some(name) = &self.algorithm {
            builder = builder.algorithm_name(name);
        }
        if let Some(name) = &self.time_unit {
            builder = builder.time_unit_name(name);
        }
        if let Some(count) = self.time_value {
            builder = builder.time_value(count);
        }
        if let Some(boundary) = self.boundary {
            builder = builder.boundary(boundary);
        }
        if let Some(units) = self.boundary_units {
            builder = builder.boundary_units(units);
        }
        if let Some(policy) = self.partial_slices {
            builder = builder.partial_slices(policy);
        }
        builder
    }

    pub fn into_config(self) -> Result<ProjectionConfig> {
        self.builder().build()
    }
}

/// Errors from loading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] ProjectionError),
}

/// Parse and validate a JSON config document.
pub fn from_json_str(json: &str) -> std::result::Result<ProjectionConfig, ConfigError> {
    let file: ConfigFile = serde_json::from_str(json)?;
    Ok(file.into_config()?)
}

/// Read a [`ConfigFile`] without validating it, for merging with overrides.
pub fn read_config_file(path: impl AsRef<Path>) -> std::result::Result<ConfigFile, ConfigError> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Read, parse and validate a JSON config file.
pub fn from_json_file(path: impl AsRef<Path>) -> std::result::Result<ProjectionConfig, ConfigError> {
    Ok(read_config_file(path)?.into_config()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_builder_defaults() {
        let config = ProjectionConfigBuilder::new().build().unwrap();
        assert_eq!(config, ProjectionConfig::default());
        assert_eq!(config.algorithm, Algorithm::Polynomial);
        assert_eq!(config.time_unit, CalendarUnit::Years);
        assert_eq!(config.time_value, 6);
    }

    #[test]
    fn test_builder_success() {
        let config = ProjectionConfigBuilder::new()
            .algorithm(Algorithm::Linear)
            .time_unit(CalendarUnit::Days)
            .time_value(30)
            .partial_slices(PartialSlicePolicy::Emit)
            .build()
            .unwrap();
        assert_eq!(config.algorithm, Algorithm::Linear);
        assert_eq!(config.time_unit, CalendarUnit::Days);
        assert_eq!(config.time_value, 30);
        assert_eq!(config.partial_slices, PartialSlicePolicy::Emit);
    }

    #[test]
    fn test_builder_by_name() {
        let config = ProjectionConfigBuilder::new()
            .algorithm_name("Power")
            .time_unit_name("months")
            .build()
            .unwrap();
        assert_eq!(config.algorithm, Algorithm::Power);
        assert_eq!(config.time_unit, CalendarUnit::Months);
    }

    #[test]
    fn test_builder_unknown_names() {
        let err = ProjectionConfigBuilder::new()
            .algorithm_name("cubic")
            .time_unit_name("fortnights")
            .build()
            .unwrap_err();
        assert_eq!(err, ProjectionError::UnknownAlgorithm("cubic".to_string()));

        let err = ProjectionConfigBuilder::new()
            .time_unit_name("fortnights")
            .build()
            .unwrap_err();
        assert_eq!(err, ProjectionError::UnknownTimeUnit("fortnights".to_string()));
    }

    #[test]
    fn test_builder_time_value_limits() {
        assert!(ProjectionConfigBuilder::new()
            .time_value(MAX_TIME_VALUE)
            .build()
            .is_ok());
        assert!(ProjectionConfigBuilder::new()
            .time_value(-MAX_TIME_VALUE)
            .build()
            .is_ok());
        let err = ProjectionConfigBuilder::new()
            .time_value(MAX_TIME_VALUE + 1)
            .build()
            .unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidParameter { ref name, .. } if name == "time_value"));
    }

    #[test]
    fn test_boundary_units_multiply() {
        let config = ProjectionConfigBuilder::new()
            .boundary(2.0)
            .boundary_units(1024.0)
            .build()
            .unwrap();
        assert_eq!(config.boundary, Some(2048.0));
    }

    #[test]
    fn test_boundary_validation() {
        let err = ProjectionConfigBuilder::new()
            .boundary(f64::NAN)
            .build()
            .unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidParameter { ref name, .. } if name == "boundary"));

        for units in [0.0, -1.0, f64::INFINITY] {
            let err = ProjectionConfigBuilder::new()
                .boundary(1.0)
                .boundary_units(units)
                .build()
                .unwrap_err();
            assert!(
                matches!(err, ProjectionError::InvalidParameter { ref name, .. } if name == "boundary_units")
            );
        }

        let err = ProjectionConfigBuilder::new()
            .boundary(f64::MAX)
            .boundary_units(10.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidParameter { .. }));
    }

    #[test]
    fn test_merge_prefers_overrides() {
        let file = ConfigFile {
            algorithm: Some("linear".to_string()),
            time_value: Some(3),
            ..ConfigFile::default()
        };
        let overrides = ConfigFile {
            time_value: Some(9),
            ..ConfigFile::default()
        };
        let merged = file.merge(overrides);
        assert_eq!(merged.algorithm.as_deref(), Some("linear"));
        assert_eq!(merged.time_value, Some(9));
    }

    #[test]
    fn test_from_json_str() {
        let config = from_json_str(
            r#"{"algorithm": "exponential", "time_unit": "hours", "time_value": 12, "boundary": 5, "boundary_units": 1000}"#,
        )
        .unwrap();
        assert_eq!(config.algorithm, Algorithm::Exponential);
        assert_eq!(config.time_unit, CalendarUnit::Hours);
        assert_eq!(config.time_value, 12);
        assert_eq!(config.boundary, Some(5000.0));
    }

    #[test]
    fn test_from_json_str_errors() {
        assert!(matches!(from_json_str("{"), Err(ConfigError::Json(_))));
        assert!(matches!(
            from_json_str(r#"{"colour": "red"}"#),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            from_json_str(r#"{"algorithm": "cubic"}"#),
            Err(ConfigError::Invalid(ProjectionError::UnknownAlgorithm(_)))
        ));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"time_unit": "days", "partial_slices": "emit"}}"#).unwrap();
        let config = from_json_file(file.path()).unwrap();
        assert_eq!(config.time_unit, CalendarUnit::Days);
        assert_eq!(config.partial_slices, PartialSlicePolicy::Emit);
        assert_eq!(config.algorithm, Algorithm::Polynomial);
    }

    #[test]
    fn test_from_json_file_missing() {
        let err = from_json_file("/nonexistent/stackcast.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
        assert!(err.to_string().starts_with("Failed to read config"));
    }
}
