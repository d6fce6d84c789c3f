//! Logarithmic regression
//!
//! Fits `y = a + b ln(x)`. Only points with `x > 0` take part, which holds
//! for any timestamp after the Unix epoch.

use super::{centered_slope, usable};
use projection_spi::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct LogarithmicModel {
    slope: f64,
    ln_x_mean: f64,
    y_mean: f64,
}

impl LogarithmicModel {
    pub fn fit(points: &[(f64, f64)]) -> Result<Self> {
        let points = usable(points, |x, _| x > 0.0)?;
        let transformed: Vec<(f64, f64)> = points.iter().map(|&(x, y)| (x.ln(), y)).collect();
        let (slope, ln_x_mean, y_mean) = centered_slope(&transformed);
        Ok(Self {
            slope,
            ln_x_mean,
            y_mean,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.y_mean + self.slope * (x.ln() - self.ln_x_mean)
    }

    /// `a` in `y = a + b ln(x)`
    pub fn intercept(&self) -> f64 {
        self.y_mean - self.slope * self.ln_x_mean
    }

    /// `b` in `y = a + b ln(x)`
    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn equation(&self) -> String {
        format!("y = {} + {} ln(x)", self.intercept(), self.slope)
    }
}
