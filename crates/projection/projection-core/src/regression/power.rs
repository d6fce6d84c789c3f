//! Power regression
//!
//! Fits `y = a * x^b` by least squares on `ln y` against `ln x`. Only points
//! with `x > 0` and `y > 0` take part.

use super::{centered_slope, usable};
use projection_spi::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct PowerModel {
    exponent: f64,
    ln_x_mean: f64,
    ln_y_mean: f64,
}

impl PowerModel {
    pub fn fit(points: &[(f64, f64)]) -> Result<Self> {
        let points = usable(points, |x, y| x > 0.0 && y > 0.0)?;
        let transformed: Vec<(f64, f64)> =
            points.iter().map(|&(x, y)| (x.ln(), y.ln())).collect();
        let (exponent, ln_x_mean, ln_y_mean) = centered_slope(&transformed);
        Ok(Self {
            exponent,
            ln_x_mean,
            ln_y_mean,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        (self.ln_y_mean + self.exponent * (x.ln() - self.ln_x_mean)).exp()
    }

    /// `a` in `y = a x^b`. Over- or underflows for the large exponents
    /// epoch timestamps produce; [`predict`](Self::predict) does not use it.
    pub fn scale(&self) -> f64 {
        (self.ln_y_mean - self.exponent * self.ln_x_mean).exp()
    }

    /// `b` in `y = a x^b`
    pub fn exponent(&self) -> f64 {
        self.exponent
    }

    pub fn equation(&self) -> String {
        format!("y = {}x^{}", self.scale(), self.exponent)
    }
}
