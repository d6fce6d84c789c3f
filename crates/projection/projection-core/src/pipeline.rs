//! End-to-end run: window, project, stack, boundary, extent.

use chrono::{DateTime, Utc};
use projection_spi::{
    BoundaryPoint, ChartSeries, ProjectedSeries, ProjectionConfig, ProjectionError, Result, Series,
    SeriesAdapter, StackDiagnostic,
};
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::boundary::boundary_track;
use crate::engine::ProjectionEngine;
use crate::extent::ChartExtent;
use crate::stacking::SeriesStacker;
use crate::window::TimeWindow;

/// A series that could not be projected. Its siblings are unaffected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesFailure {
    /// Position in the input list
    pub index: usize,
    pub name: String,
    #[serde(serialize_with = "error_message")]
    pub error: ProjectionError,
}

fn error_message<S>(error: &ProjectionError, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(error)
}

/// Everything a renderer needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    /// Stacked series, topmost band first
    pub series: Vec<ChartSeries>,
    pub boundary: Vec<BoundaryPoint>,
    pub extent: ChartExtent,
    pub failures: Vec<SeriesFailure>,
    pub diagnostics: Vec<StackDiagnostic>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PipelineOutcome {
    Chart(ChartData),
    /// No series had anything to draw.
    NothingToRender {
        failures: Vec<SeriesFailure>,
        diagnostics: Vec<StackDiagnostic>,
    },
}

impl PipelineOutcome {
    pub fn is_chart(&self) -> bool {
        matches!(self, PipelineOutcome::Chart(_))
    }

    pub fn failures(&self) -> &[SeriesFailure] {
        match self {
            PipelineOutcome::Chart(chart) => &chart.failures,
            PipelineOutcome::NothingToRender { failures, .. } => failures,
        }
    }

    pub fn diagnostics(&self) -> &[StackDiagnostic] {
        match self {
            PipelineOutcome::Chart(chart) => &chart.diagnostics,
            PipelineOutcome::NothingToRender { diagnostics, .. } => diagnostics,
        }
    }

    /// The chart, or [`ProjectionError::EmptyProjection`].
    pub fn into_chart(self) -> Result<ChartData> {
        match self {
            PipelineOutcome::Chart(chart) => Ok(chart),
            PipelineOutcome::NothingToRender { .. } => Err(ProjectionError::EmptyProjection),
        }
    }
}

/// Runs one configuration over a set of series.
#[derive(Debug, Clone)]
pub struct ProjectionPipeline {
    config: ProjectionConfig,
    engine: ProjectionEngine,
    stacker: SeriesStacker,
}

impl ProjectionPipeline {
    /// Validate `config` and build a pipeline for it.
    pub fn new(config: ProjectionConfig) -> Result<Self> {
        config.validate()?;
        let stacker = SeriesStacker::new(config.partial_slices);
        Ok(Self {
            config,
            engine: ProjectionEngine::new(),
            stacker,
        })
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Filter, project and stack every series against `now`.
    ///
    /// Fails only when the window itself cannot be represented. Series that
    /// cannot be fitted are reported in the outcome's failures.
    pub fn run(&self, series: &[Series], now: DateTime<Utc>) -> Result<PipelineOutcome> {
        let config = &self.config;
        let window = TimeWindow::around(now, config.time_unit, config.time_value)?;
        debug!(
            series = series.len(),
            algorithm = %config.algorithm,
            unit = %config.time_unit,
            count = config.time_value,
            "running projection pipeline"
        );

        let mut projected = Vec::with_capacity(series.len());
        let mut failures = Vec::new();
        let mut diagnostics = Vec::new();
        for (index, s) in series.iter().enumerate() {
            let filtered = window.filter(s);
            match self.engine.project(
                &filtered,
                config.algorithm,
                config.time_unit,
                config.time_value,
                now,
            ) {
                Ok(projection) => {
                    if let Some(time) = projection.cut_off {
                        let diagnostic = StackDiagnostic::ProjectionCutOff {
                            time,
                            series: filtered.name.clone(),
                        };
                        warn!(%diagnostic, "forecast truncated");
                        diagnostics.push(diagnostic);
                    }
                    projected.push(ProjectedSeries {
                        name: filtered.name,
                        historical: filtered.samples,
                        backprojected: projection.backprojected,
                        projected: projection.projected,
                        cut_off: projection.cut_off,
                    });
                }
                Err(error) => {
                    warn!(series = %s.name, %error, "series not projected");
                    failures.push(SeriesFailure {
                        index,
                        name: s.name.clone(),
                        error,
                    });
                }
            }
        }

        let stacked = self.stacker.stack(&projected);
        diagnostics.extend(stacked.diagnostics);
        if !stacked.series.iter().any(ChartSeries::is_displayable) {
            debug!(failures = failures.len(), "nothing to render");
            return Ok(PipelineOutcome::NothingToRender {
                failures,
                diagnostics,
            });
        }

        let boundary = boundary_track(config.boundary, config.time_unit, config.time_value, now)?;
        let extent = ChartExtent::compute(&boundary, &stacked.series);
        Ok(PipelineOutcome::Chart(ChartData {
            series: stacked.series,
            boundary,
            extent,
            failures,
            diagnostics,
        }))
    }

    /// Load series through `adapter` and run.
    pub fn run_adapter(
        &self,
        adapter: &dyn SeriesAdapter,
        now: DateTime<Utc>,
    ) -> Result<PipelineOutcome> {
        let series = adapter.load()?;
        debug!(source = %adapter.describe(), series = series.len(), "loaded series");
        self.run(&series, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use projection_spi::{Algorithm, CalendarUnit, Sample};

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()
    }

    fn daily(name: &str, values: &[f64]) -> Series {
        let n = values.len() as i64;
        Series::new(
            name,
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| Sample::new(now() - Duration::days(n - i as i64), v))
                .collect(),
        )
    }

    fn linear_days(count: i64) -> ProjectionConfig {
        ProjectionConfig::new(Algorithm::Linear, CalendarUnit::Days, count)
    }

    #[test]
    fn test_single_series_chart() {
        let outcome = ProjectionPipeline::new(linear_days(5))
            .unwrap()
            .run(&[daily("a", &[1.0, 2.0, 3.0])], now())
            .unwrap();
        let chart = outcome.into_chart().unwrap();
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series[0].historical.len(), 3);
        assert_eq!(chart.series[0].backprojected.len(), 3);
        assert_eq!(chart.series[0].projected.len(), 6);
        assert!(chart.boundary.is_empty());
        assert!(chart.failures.is_empty());
    }

    #[test]
    fn test_failing_series_does_not_abort_siblings() {
        let series = [daily("short", &[1.0]), daily("ok", &[1.0, 2.0, 3.0])];
        let outcome = ProjectionPipeline::new(linear_days(5))
            .unwrap()
            .run(&series, now())
            .unwrap();

        assert_eq!(outcome.failures().len(), 1);
        assert_eq!(outcome.failures()[0].index, 0);
        assert_eq!(outcome.failures()[0].name, "short");
        let chart = outcome.into_chart().unwrap();
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series[0].name, "ok");
    }

    #[test]
    fn test_nothing_to_render() {
        let outcome = ProjectionPipeline::new(linear_days(0))
            .unwrap()
            .run(&[daily("a", &[1.0, 2.0])], now())
            .unwrap();
        assert!(!outcome.is_chart());
        assert_eq!(
            outcome.failures()[0].error,
            ProjectionError::InsufficientData {
                required: 2,
                actual: 0
            }
        );
        assert_eq!(outcome.into_chart(), Err(ProjectionError::EmptyProjection));
    }

    #[test]
    fn test_no_series() {
        let outcome = ProjectionPipeline::new(ProjectionConfig::default())
            .unwrap()
            .run(&[], now())
            .unwrap();
        assert!(!outcome.is_chart());
        assert!(outcome.failures().is_empty());
    }

    #[test]
    fn test_boundary_included() {
        let config = linear_days(2).with_boundary(50.0);
        let chart = ProjectionPipeline::new(config)
            .unwrap()
            .run(&[daily("a", &[10.0, 20.0])], now())
            .unwrap()
            .into_chart()
            .unwrap();
        assert_eq!(chart.boundary.len(), 5);
        assert!(chart.extent.value.0 <= 0.0);
        assert!(chart.extent.value.1 >= 50.0);
    }

    #[test]
    fn test_window_overflow_is_an_error() {
        let config = ProjectionConfig::new(Algorithm::Linear, CalendarUnit::Years, 10_000);
        let far_future = DateTime::<Utc>::MAX_UTC - Duration::days(1);
        let err = ProjectionPipeline::new(config)
            .unwrap()
            .run(&[], far_future)
            .unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidParameter { .. }));
    }

    #[test]
    fn test_unchecked_config_is_rejected() {
        let too_long = ProjectionConfig::new(Algorithm::Linear, CalendarUnit::Seconds, 2_000_000);
        let err = ProjectionPipeline::new(too_long).unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidParameter { ref name, .. } if name == "time_value"));

        let unbounded = linear_days(1).with_boundary(f64::INFINITY);
        let err = ProjectionPipeline::new(unbounded).unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidParameter { ref name, .. } if name == "boundary"));
    }

    #[test]
    fn test_outcome_serializes_with_tag() {
        let outcome = ProjectionPipeline::new(linear_days(0))
            .unwrap()
            .run(&[daily("a", &[1.0])], now())
            .unwrap();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "nothing_to_render");
        assert_eq!(
            json["failures"][0]["error"],
            "Insufficient data: need at least 2 points, got 0"
        );
    }

    #[test]
    fn test_overflowing_series_keeps_sibling_forecast() {
        let flat = daily("flat", &[10.0; 10]);
        let values: Vec<f64> = (0..10).map(|i| 2f64.powi(10 * i)).collect();
        let doubling = daily("doubling", &values);
        let config = ProjectionConfig::new(Algorithm::Exponential, CalendarUnit::Days, 200);

        let chart = ProjectionPipeline::new(config)
            .unwrap()
            .run(&[flat, doubling], now())
            .unwrap()
            .into_chart()
            .unwrap();

        // output is reversed: the overflowing series is on top
        let (top, bottom) = (&chart.series[0], &chart.series[1]);
        assert_eq!(bottom.name, "flat");
        assert_eq!(bottom.projected.len(), 201);
        assert!(top.projected.len() < 201);
        assert!(top.projected.iter().all(|p| p.cumulative_value.is_finite()));

        assert_eq!(chart.diagnostics.len(), 1);
        assert!(matches!(
            &chart.diagnostics[0],
            StackDiagnostic::ProjectionCutOff { series, .. } if series == "doubling"
        ));
        assert!(chart.extent.value.1.is_finite());
    }

    struct Fixed(Vec<Series>);

    impl SeriesAdapter for Fixed {
        fn load(&self) -> Result<Vec<Series>> {
            Ok(self.0.clone())
        }

        fn describe(&self) -> String {
            "fixed".to_string()
        }
    }

    #[test]
    fn test_run_adapter() {
        let adapter = Fixed(vec![daily("a", &[1.0, 2.0]), daily("b", &[3.0, 4.0])]);
        let chart = ProjectionPipeline::new(linear_days(3))
            .unwrap()
            .run_adapter(&adapter, now())
            .unwrap()
            .into_chart()
            .unwrap();
        let names: Vec<&str> = chart.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
