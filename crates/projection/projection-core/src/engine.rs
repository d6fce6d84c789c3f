//! Per-series projection
//!
//! Fits a regression to a series' windowed history and evaluates it twice:
//! once over the history itself (the back-projection) and once at each tick
//! from `now` to the horizon.

use chrono::{DateTime, Utc};
use projection_spi::{Algorithm, CalendarUnit, Result, Sample, Series};
use tracing::debug;

use crate::regression::{self, RegressionFit};
use crate::window::offset;

/// Output of projecting one series.
#[derive(Debug, Clone)]
pub struct Projection {
    /// The model's reading of each historical sample
    pub backprojected: Vec<Sample>,
    /// Forecast ticks starting at `now`: `horizon + 1` of them, or fewer
    /// when the model stops producing finite values
    pub projected: Vec<Sample>,
    /// First tick whose prediction was not finite, if any
    pub cut_off: Option<DateTime<Utc>>,
    pub fit: RegressionFit,
}

/// Stateless projector; every call owns its own fit.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectionEngine;

impl ProjectionEngine {
    pub fn new() -> Self {
        Self
    }

    /// Project an already-filtered series.
    ///
    /// Values are floored before fitting. A series the model cannot fit
    /// returns the error for that series alone. The forecast stops at the
    /// first tick the model cannot represent as a finite value.
    pub fn project(
        &self,
        filtered: &Series,
        algorithm: Algorithm,
        unit: CalendarUnit,
        horizon: i64,
        now: DateTime<Utc>,
    ) -> Result<Projection> {
        let history: Vec<&Sample> = filtered
            .samples
            .iter()
            .filter(|s| s.finite_value().is_some())
            .collect();
        let pairs: Vec<(f64, f64)> = history
            .iter()
            .filter_map(|s| {
                s.finite_value()
                    .map(|v| (s.timestamp_ms() as f64, v.floor()))
            })
            .collect();

        let fit = regression::fit(&pairs, algorithm)?;
        debug!(
            series = %filtered.name,
            %algorithm,
            points = pairs.len(),
            equation = %fit.equation(),
            "fitted series"
        );

        let backprojected = history
            .iter()
            .zip(fit.points())
            .map(|(sample, point)| Sample::new(sample.time, point[1]))
            .collect();

        let mut projected = Vec::new();
        let mut cut_off = None;
        for i in 0..=horizon {
            let time = offset(now, unit, i)?;
            let value = fit.predict(time.timestamp_millis() as f64);
            if !value.is_finite() {
                debug!(series = %filtered.name, %time, "projection left the finite range");
                cut_off = Some(time);
                break;
            }
            projected.push(Sample::new(time, value));
        }

        Ok(Projection {
            backprojected,
            projected,
            cut_off,
            fit,
        })
    }
}
