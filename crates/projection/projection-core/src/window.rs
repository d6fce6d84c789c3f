//! Rolling time window around an injected "now"
//!
//! The window spans `count` calendar units either side of `now`. Only its
//! past half is used to select history; `max` bounds the boundary track and
//! the chart extent.

use chrono::{DateTime, Duration, Utc};
use projection_spi::{CalendarUnit, ProjectionError, Result, Sample, Series};
use serde::{Deserialize, Serialize};

/// Inclusive `[min, max]` window centred on `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub min: DateTime<Utc>,
    pub now: DateTime<Utc>,
    pub max: DateTime<Utc>,
}

impl TimeWindow {
    /// Window of `count` units either side of `now`.
    ///
    /// Zero and negative counts are taken literally: zero collapses the
    /// window onto `now` and a negative count puts `min` after `now`.
    pub fn around(now: DateTime<Utc>, unit: CalendarUnit, count: i64) -> Result<Self> {
        Ok(Self {
            min: offset(now, unit, negate(count)?)?,
            now,
            max: offset(now, unit, count)?,
        })
    }

    /// True if `time` is a past-or-present instant inside the window.
    pub fn contains_history(&self, time: &DateTime<Utc>) -> bool {
        *time <= self.now && *time >= self.min
    }

    /// True if the sample lies in the historical half and has a finite value.
    pub fn accepts(&self, sample: &Sample) -> bool {
        self.contains_history(&sample.time) && sample.finite_value().is_some()
    }

    /// Keep the accepted samples of `series`, in their original order.
    pub fn filter(&self, series: &Series) -> Series {
        Series {
            name: series.name.clone(),
            samples: series
                .samples
                .iter()
                .filter(|s| self.accepts(s))
                .copied()
                .collect(),
        }
    }
}

/// `time` moved by `count` units, failing when the result is not representable.
pub fn offset(time: DateTime<Utc>, unit: CalendarUnit, count: i64) -> Result<DateTime<Utc>> {
    let out_of_range = || {
        ProjectionError::invalid(
            "time_value",
            format!("{} {} from {} is out of range", count, unit, time.to_rfc3339()),
        )
    };
    let millis = unit.span_millis(count).ok_or_else(out_of_range)?;
    let delta = Duration::try_milliseconds(millis).ok_or_else(out_of_range)?;
    time.checked_add_signed(delta).ok_or_else(out_of_range)
}

pub(crate) fn negate(count: i64) -> Result<i64> {
    count.checked_neg().ok_or_else(|| {
        ProjectionError::invalid("time_value", format!("{} cannot be negated", count))
    })
}

/// Filter one series to the window of `count` units before `now`.
pub fn filter_series(
    series: &Series,
    unit: CalendarUnit,
    count: i64,
    now: DateTime<Utc>,
) -> Result<Series> {
    Ok(TimeWindow::around(now, unit, count)?.filter(series))
}
