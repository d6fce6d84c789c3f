//! Constant boundary line spanning the look-back window and the horizon.

use chrono::{DateTime, Utc};
use projection_spi::{BoundaryPoint, CalendarUnit, Result};

use crate::window::{negate, offset};

/// Points of the boundary line at `now + i * unit` for `i` in `-count..=count`.
///
/// Empty when `boundary` is absent, zero or NaN.
pub fn boundary_track(
    boundary: Option<f64>,
    unit: CalendarUnit,
    count: i64,
    now: DateTime<Utc>,
) -> Result<Vec<BoundaryPoint>> {
    let limit = match boundary {
        Some(limit) if limit != 0.0 && !limit.is_nan() => limit,
        _ => return Ok(Vec::new()),
    };
    (negate(count)?..=count)
        .map(|i| {
            Ok(BoundaryPoint {
                time: offset(now, unit, i)?,
                limit,
            })
        })
        .collect()
}
