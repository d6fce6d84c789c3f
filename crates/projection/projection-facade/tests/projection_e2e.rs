//! End-to-end tests for the projection facade
//!
//! Tests complete workflows using only this crate's API.

use chrono::{DateTime, Duration, Utc};
use projection_facade::prelude::*;
use projection_facade::{
    formatter_by_name, BinarySizeFormatter, ProjectionError, SeriesAdapter,
};

fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// Monthly storage usage, growing roughly quadratically.
fn usage(name: &str, base: f64, months: i64) -> Series {
    let samples = (0..months)
        .map(|i| {
            let t = i as f64;
            let time = now() - Duration::milliseconds((months - i) * CalendarUnit::Months.as_millis());
            Sample::new(time, base + 40.0 * t + 2.0 * t * t)
        })
        .collect();
    Series::new(name, samples)
}

struct InMemory(Vec<Series>);

impl SeriesAdapter for InMemory {
    fn load(&self) -> projection_facade::Result<Vec<Series>> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        format!("{} in-memory series", self.0.len())
    }
}

#[test]
fn e2e_capacity_forecast() {
    let adapter = InMemory(vec![usage("db", 1_000.0, 24), usage("logs", 300.0, 24)]);
    let config = ProjectionConfigBuilder::new()
        .algorithm(Algorithm::Polynomial)
        .time_unit(CalendarUnit::Years)
        .time_value(2)
        .boundary(8.0)
        .boundary_units(1024.0)
        .build()
        .unwrap();

    let chart = ProjectionPipeline::new(config)
        .unwrap()
        .run_adapter(&adapter, now())
        .unwrap()
        .into_chart()
        .unwrap();

    // topmost band first
    assert_eq!(chart.series[0].name, "logs");
    assert_eq!(chart.series[1].name, "db");
    assert_eq!(chart.series[0].historical.len(), 24);
    assert_eq!(chart.series[0].projected.len(), 3);
    assert_eq!(chart.boundary.len(), 5);
    assert!(chart.boundary.iter().all(|p| p.limit == 8192.0));

    // the quadratic keeps growing past the last sample
    let projected = &chart.series[0].projected;
    assert!(projected.windows(2).all(|w| w[1].cumulative_value > w[0].cumulative_value));
    let last_history = chart.series[0].historical.last().unwrap().cumulative_value;
    assert!(projected[0].cumulative_value > last_history);

    let (_, max) = chart.extent.value;
    assert!(max >= projected[2].cumulative_value);
    assert!(chart.failures.is_empty());
}

#[test]
fn e2e_outcome_serializes_for_renderer() {
    let config = ProjectionConfig::new(Algorithm::Linear, CalendarUnit::Months, 6).with_boundary(500.0);
    let outcome = ProjectionPipeline::new(config)
        .unwrap()
        .run(&[usage("db", 100.0, 6)], now())
        .unwrap();

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["outcome"], "chart");
    assert_eq!(json["series"][0]["name"], "db");
    assert_eq!(json["series"][0]["projected"].as_array().unwrap().len(), 7);
    assert_eq!(json["boundary"].as_array().unwrap().len(), 13);
    assert!(json["series"][0]["historical"][0]["cumulative_value"].is_number());
    assert!(json["failures"].as_array().unwrap().is_empty());
}

#[test]
fn e2e_every_series_failing() {
    let config = ProjectionConfig::new(Algorithm::Power, CalendarUnit::Days, 30);
    let series = [
        Series::new("empty", vec![]),
        Series::new("single", vec![Sample::new(now() - Duration::days(1), 5.0)]),
    ];
    let outcome = ProjectionPipeline::new(config)
        .unwrap()
        .run(&series, now())
        .unwrap();

    assert!(!outcome.is_chart());
    let names: Vec<&str> = outcome.failures().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["empty", "single"]);

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["outcome"], "nothing_to_render");
    assert_eq!(outcome.into_chart().unwrap_err(), ProjectionError::EmptyProjection);
}

#[test]
fn e2e_format_stacked_values() {
    let config = ProjectionConfig::new(Algorithm::Linear, CalendarUnit::Months, 3);
    let chart = ProjectionPipeline::new(config)
        .unwrap()
        .run(&[usage("db", 2048.0, 3)], now())
        .unwrap()
        .into_chart()
        .unwrap();

    let bytes = BinarySizeFormatter::bytes();
    let first = chart.series[0].historical[0].cumulative_value;
    assert_eq!(first, 2048.0);
    assert_eq!(bytes.format(first), "2.00 KB");

    let raw = formatter_by_name("raw").unwrap();
    assert_eq!(raw.format(first), "2048");
}
