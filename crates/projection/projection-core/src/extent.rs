//! Axis domains for a stacked chart.

use chrono::{DateTime, Utc};
use projection_spi::{BoundaryPoint, ChartSeries, StackedPoint};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Time and value domains covering everything drawn on the chart.
///
/// The time domain spans the boundary line, the stacked history and the
/// stacked projection. The value domain covers the same points (both edges of
/// every band) and always includes the baseline: the boundary limit when one
/// is drawn, zero otherwise. Back-projections are drawn inside these domains
/// and do not widen them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartExtent {
    /// `None` when there is nothing with a timestamp to draw
    pub time: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub value: (f64, f64),
}

impl ChartExtent {
    pub fn compute(boundary: &[BoundaryPoint], series: &[ChartSeries]) -> Self {
        let baseline = boundary.first().map(|p| p.limit).unwrap_or(0.0);
        let mut acc = Accumulator::new(baseline);

        for point in boundary {
            acc.time(point.time);
            acc.value(point.limit);
        }
        for s in series {
            acc.stacked(&s.historical);
        }
        for s in series {
            acc.stacked(&s.projected);
        }

        Self {
            time: acc.time_range,
            value: acc.value_range,
        }
    }

    pub fn duration(&self) -> Option<chrono::Duration> {
        self.time.map(|(min, max)| max - min)
    }
}

struct Accumulator {
    time_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    value_range: (f64, f64),
}

impl Accumulator {
    fn new(baseline: f64) -> Self {
        let baseline = if baseline.is_finite() { baseline } else { 0.0 };
        Self {
            time_range: None,
            value_range: (baseline, baseline),
        }
    }

    fn time(&mut self, time: DateTime<Utc>) {
        self.time_range = Some(match self.time_range {
            Some((min, max)) => (min.min(time), max.max(time)),
            None => (time, time),
        });
    }

    fn value(&mut self, value: f64) {
        if !value.is_finite() {
            debug!(value, "skipping non-finite value in extent");
            return;
        }
        let (min, max) = self.value_range;
        self.value_range = (min.min(value), max.max(value));
    }

    fn stacked(&mut self, points: &[StackedPoint]) {
        for point in points {
            self.time(point.time);
            self.value(point.base_value());
            self.value(point.cumulative_value);
        }
    }
}
