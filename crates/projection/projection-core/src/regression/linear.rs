//! Linear regression
//!
//! Fits `y = intercept + slope * x` by ordinary least squares.
//!
//! ## When to Use
//!
//! - Throughput or usage growing at a steady rate
//! - Quick baseline for the other families

use super::{centered_slope, usable};
use projection_spi::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    slope: f64,
    x_mean: f64,
    y_mean: f64,
}

impl LinearModel {
    pub fn fit(points: &[(f64, f64)]) -> Result<Self> {
        let points = usable(points, |_, _| true)?;
        let (slope, x_mean, y_mean) = centered_slope(&points);
        Ok(Self {
            slope,
            x_mean,
            y_mean,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.y_mean + self.slope * (x - self.x_mean)
    }

    /// Change in `y` per millisecond
    pub fn slope(&self) -> f64 {
        self.slope
    }

    /// Value at `x = 0`
    pub fn intercept(&self) -> f64 {
        self.y_mean - self.slope * self.x_mean
    }

    pub fn equation(&self) -> String {
        format!("y = {}x + {}", self.slope, self.intercept())
    }
}
