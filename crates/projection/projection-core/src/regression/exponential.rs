//! Exponential regression
//!
//! Fits `y = a * e^(b x)` by least squares on `ln y`, weighting each point
//! by `y` so large readings are not flattened by the log transform. Only
//! points with `y > 0` take part.

use super::{has_spread, mean, usable};
use projection_spi::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialModel {
    /// `ln y` at `origin`
    ln_level: f64,
    rate: f64,
    origin: f64,
}

impl ExponentialModel {
    pub fn fit(points: &[(f64, f64)]) -> Result<Self> {
        let points = usable(points, |_, y| y > 0.0)?;
        let origin = mean(points.iter().map(|p| p.0));

        let mut s_y = 0.0;
        let mut s_uy = 0.0;
        let mut s_uuy = 0.0;
        let mut s_ylny = 0.0;
        let mut s_uylny = 0.0;
        for &(x, y) in &points {
            let u = x - origin;
            let ln_y = y.ln();
            s_y += y;
            s_uy += u * y;
            s_uuy += u * u * y;
            s_ylny += y * ln_y;
            s_uylny += u * y * ln_y;
        }

        let denominator = s_y * s_uuy - s_uy * s_uy;
        let (ln_level, rate) =
            if has_spread(points.iter().map(|p| p.0)) && denominator.abs() > f64::EPSILON {
                (
                    (s_uuy * s_ylny - s_uy * s_uylny) / denominator,
                    (s_y * s_uylny - s_uy * s_ylny) / denominator,
                )
            } else {
                (s_ylny / s_y, 0.0)
            };

        Ok(Self {
            ln_level,
            rate,
            origin,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        (self.ln_level + self.rate * (x - self.origin)).exp()
    }

    /// Multiplier `a` at `x = 0`. Underflows to zero for steep fits on
    /// epoch timestamps; [`predict`](Self::predict) does not depend on it.
    pub fn scale(&self) -> f64 {
        (self.ln_level - self.rate * self.origin).exp()
    }

    /// Growth rate `b` per millisecond
    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn equation(&self) -> String {
        format!("y = {}e^({}x)", self.scale(), self.rate)
    }
}
