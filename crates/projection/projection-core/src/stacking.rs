//! Multi-series stacking
//!
//! Series are stacked bottom-up in input order: at each timestamp the first
//! series' value is the running total and every later series adds its own.
//! Each of the three tracks is stacked independently.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use projection_spi::{
    ChartSeries, PartialSlicePolicy, ProjectedSeries, StackDiagnostic, StackedPoint, Track,
};
use tracing::warn;

/// Stacker output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stacked {
    /// One entry per input series, in reverse input order
    pub series: Vec<ChartSeries>,
    /// Points that were refused or dropped
    pub diagnostics: Vec<StackDiagnostic>,
}

/// Every contribution at one timestamp, in series order.
#[derive(Debug)]
struct TimeSlice {
    time: DateTime<Utc>,
    contributions: Vec<(usize, f64)>,
    /// Series with a non-finite value here
    skipped: Vec<usize>,
}

impl TimeSlice {
    fn has(&self, index: usize) -> bool {
        self.contributions.iter().any(|&(i, _)| i == index) || self.skipped.contains(&index)
    }

    fn present(&self) -> usize {
        self.contributions.len() + self.skipped.len()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SeriesStacker {
    policy: PartialSlicePolicy,
}

impl SeriesStacker {
    pub fn new(policy: PartialSlicePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> PartialSlicePolicy {
        self.policy
    }

    /// Stack every track of `series`.
    ///
    /// A slice is complete when every series expected at its timestamp is
    /// present; a projected track that was cut off is not expected past its
    /// cut-off. Missing values do not contribute. NaN and infinite values do not
    /// contribute either but still count the series as present, and are
    /// reported as [`StackDiagnostic::NonFiniteValue`]. A series that appears
    /// twice at one timestamp keeps its first point; the rest are reported
    /// as [`StackDiagnostic::StackingOverflow`].
    pub fn stack(&self, series: &[ProjectedSeries]) -> Stacked {
        let mut charts: Vec<ChartSeries> =
            series.iter().map(|s| ChartSeries::new(s.name.clone())).collect();
        let mut diagnostics = Vec::new();

        for track in Track::ALL {
            let slices = group(series, track, &mut diagnostics);
            for slice in slices.into_values() {
                let expected = series
                    .iter()
                    .filter(|s| s.covers(track, &slice.time))
                    .count();
                if slice.present() < expected && self.policy == PartialSlicePolicy::Drop {
                    let diagnostic = StackDiagnostic::PartialSlice {
                        track,
                        time: slice.time,
                        present: slice.present(),
                        expected,
                    };
                    warn!(%diagnostic, "partial slice");
                    diagnostics.push(diagnostic);
                    continue;
                }

                let mut total = 0.0;
                for (index, value) in slice.contributions {
                    total += value;
                    charts[index].track_mut(track).push(StackedPoint {
                        time: slice.time,
                        cumulative_value: total,
                        original_value: value,
                    });
                }
            }
        }

        charts.reverse();
        Stacked {
            series: charts,
            diagnostics,
        }
    }
}

fn group(
    series: &[ProjectedSeries],
    track: Track,
    diagnostics: &mut Vec<StackDiagnostic>,
) -> BTreeMap<i64, TimeSlice> {
    let mut slices: BTreeMap<i64, TimeSlice> = BTreeMap::new();
    for (index, s) in series.iter().enumerate() {
        for sample in s.track(track) {
            let Some(value) = sample.value else {
                continue;
            };
            let slice = slices.entry(sample.timestamp_ms()).or_insert_with(|| TimeSlice {
                time: sample.time,
                contributions: Vec::with_capacity(series.len()),
                skipped: Vec::new(),
            });
            if slice.has(index) {
                let diagnostic = StackDiagnostic::StackingOverflow {
                    track,
                    time: sample.time,
                    series: s.name.clone(),
                };
                if let Some(error) = diagnostic.to_error() {
                    warn!(%error, "refusing to insert point");
                }
                diagnostics.push(diagnostic);
                continue;
            }
            if !value.is_finite() {
                let diagnostic = StackDiagnostic::NonFiniteValue {
                    track,
                    time: sample.time,
                    series: s.name.clone(),
                };
                warn!(%diagnostic, "skipping value");
                diagnostics.push(diagnostic);
                slice.skipped.push(index);
                continue;
            }
            slice.contributions.push((index, value));
        }
    }
    slices
}
