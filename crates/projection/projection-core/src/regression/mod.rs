//! Regression families used to project a series forward
//!
//! Each family fits `(x, y)` pairs where `x` is a millisecond timestamp and
//! `y` is the (floored) sample value, and returns a [`RegressionFit`] that can
//! be evaluated anywhere, including far outside the sampled domain.
//!
//! ## Algorithms
//!
//! - **Linear**: ordinary least squares
//! - **Exponential**: weighted least squares on `ln y`
//! - **Logarithmic**: least squares on `ln x`
//! - **Power**: least squares on `ln y` against `ln x`
//! - **Polynomial**: degree 2 normal equations, 13 significant digits
//!
//! Millisecond timestamps are around `1e12`, so every family works on
//! centered inputs internally; the raw-x closed forms lose most of their
//! digits to cancellation at that magnitude.

pub mod exponential;
pub mod linear;
pub mod logarithmic;
pub mod polynomial;
pub mod power;

pub use exponential::ExponentialModel;
pub use linear::LinearModel;
pub use logarithmic::LogarithmicModel;
pub use polynomial::PolynomialModel;
pub use power::PowerModel;

use projection_spi::{Algorithm, ProjectionError, Result};

/// Minimum number of usable points any family accepts.
pub const MIN_POINTS: usize = 2;

/// A fitted model of one of the five families.
#[derive(Debug, Clone, PartialEq)]
pub enum RegressionModel {
    Linear(LinearModel),
    Exponential(ExponentialModel),
    Logarithmic(LogarithmicModel),
    Power(PowerModel),
    Polynomial(PolynomialModel),
}

impl RegressionModel {
    pub fn predict(&self, x: f64) -> f64 {
        match self {
            RegressionModel::Linear(m) => m.predict(x),
            RegressionModel::Exponential(m) => m.predict(x),
            RegressionModel::Logarithmic(m) => m.predict(x),
            RegressionModel::Power(m) => m.predict(x),
            RegressionModel::Polynomial(m) => m.predict(x),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            RegressionModel::Linear(_) => Algorithm::Linear,
            RegressionModel::Exponential(_) => Algorithm::Exponential,
            RegressionModel::Logarithmic(_) => Algorithm::Logarithmic,
            RegressionModel::Power(_) => Algorithm::Power,
            RegressionModel::Polynomial(_) => Algorithm::Polynomial,
        }
    }

    /// Coefficients in the family's natural form.
    ///
    /// Linear and logarithmic: `[intercept, slope]`. Exponential: `[scale, rate]`.
    /// Power: `[scale, exponent]`. Polynomial: ascending powers of the
    /// normalized abscissa.
    pub fn coefficients(&self) -> Vec<f64> {
        match self {
            RegressionModel::Linear(m) => vec![m.intercept(), m.slope()],
            RegressionModel::Exponential(m) => vec![m.scale(), m.rate()],
            RegressionModel::Logarithmic(m) => vec![m.intercept(), m.slope()],
            RegressionModel::Power(m) => vec![m.scale(), m.exponent()],
            RegressionModel::Polynomial(m) => m.coefficients().to_vec(),
        }
    }

    pub fn equation(&self) -> String {
        match self {
            RegressionModel::Linear(m) => m.equation(),
            RegressionModel::Exponential(m) => m.equation(),
            RegressionModel::Logarithmic(m) => m.equation(),
            RegressionModel::Power(m) => m.equation(),
            RegressionModel::Polynomial(m) => m.equation(),
        }
    }
}

/// The result of fitting one series.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionFit {
    model: RegressionModel,
    /// `[x, predict(x)]` for every input point, in input order
    points: Vec<[f64; 2]>,
    r_squared: f64,
}

impl RegressionFit {
    fn new(model: RegressionModel, input: &[(f64, f64)]) -> Self {
        let points: Vec<[f64; 2]> = input.iter().map(|&(x, _)| [x, model.predict(x)]).collect();
        let r_squared = r_squared(input, &points);
        Self {
            model,
            points,
            r_squared,
        }
    }

    /// Evaluate the fitted curve at `x` (milliseconds).
    pub fn predict(&self, x: f64) -> f64 {
        self.model.predict(x)
    }

    /// The model's reconstruction of the input, one point per input pair.
    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    pub fn model(&self) -> &RegressionModel {
        &self.model
    }

    pub fn algorithm(&self) -> Algorithm {
        self.model.algorithm()
    }

    pub fn coefficients(&self) -> Vec<f64> {
        self.model.coefficients()
    }

    pub fn equation(&self) -> String {
        self.model.equation()
    }

    /// Coefficient of determination against the fitted input.
    pub fn r_squared(&self) -> f64 {
        self.r_squared
    }
}

/// Fit `points` with the selected family.
pub fn fit(points: &[(f64, f64)], algorithm: Algorithm) -> Result<RegressionFit> {
    let model = match algorithm {
        Algorithm::Linear => RegressionModel::Linear(LinearModel::fit(points)?),
        Algorithm::Exponential => RegressionModel::Exponential(ExponentialModel::fit(points)?),
        Algorithm::Logarithmic => RegressionModel::Logarithmic(LogarithmicModel::fit(points)?),
        Algorithm::Power => RegressionModel::Power(PowerModel::fit(points)?),
        Algorithm::Polynomial => RegressionModel::Polynomial(PolynomialModel::fit(points)?),
    };
    Ok(RegressionFit::new(model, points))
}

/// Parse an algorithm name and fit in one step.
pub fn fit_named(points: &[(f64, f64)], algorithm: &str) -> Result<RegressionFit> {
    fit(points, algorithm.parse()?)
}

/// Keep the finite pairs the family's domain accepts, failing below [`MIN_POINTS`].
pub(crate) fn usable<F>(points: &[(f64, f64)], domain: F) -> Result<Vec<(f64, f64)>>
where
    F: Fn(f64, f64) -> bool,
{
    let kept: Vec<(f64, f64)> = points
        .iter()
        .copied()
        .filter(|&(x, y)| x.is_finite() && y.is_finite() && domain(x, y))
        .collect();
    if kept.len() < MIN_POINTS {
        return Err(ProjectionError::InsufficientData {
            required: MIN_POINTS,
            actual: kept.len(),
        });
    }
    Ok(kept)
}

pub(crate) fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Least squares slope of `v` against `u`; zero when `u` has no spread.
pub(crate) fn centered_slope(pairs: &[(f64, f64)]) -> (f64, f64, f64) {
    let u_mean = mean(pairs.iter().map(|p| p.0));
    let v_mean = mean(pairs.iter().map(|p| p.1));
    if !has_spread(pairs.iter().map(|p| p.0)) {
        return (0.0, u_mean, v_mean);
    }
    let (suv, suu) = pairs.iter().fold((0.0, 0.0), |(suv, suu), &(u, v)| {
        let du = u - u_mean;
        (suv + du * (v - v_mean), suu + du * du)
    });
    let slope = if suu > 0.0 { suv / suu } else { 0.0 };
    (slope, u_mean, v_mean)
}

pub(crate) fn has_spread(mut values: impl Iterator<Item = f64>) -> bool {
    match values.next() {
        Some(first) => values.any(|v| v != first),
        None => false,
    }
}

fn r_squared(input: &[(f64, f64)], fitted: &[[f64; 2]]) -> f64 {
    let pairs: Vec<(f64, f64)> = input
        .iter()
        .zip(fitted)
        .filter(|((_, y), [_, f])| y.is_finite() && f.is_finite())
        .map(|(&(_, y), &[_, f])| (y, f))
        .collect();
    if pairs.is_empty() {
        return 0.0;
    }
    let y_mean = mean(pairs.iter().map(|p| p.0));
    let ss_tot: f64 = pairs.iter().map(|(y, _)| (y - y_mean).powi(2)).sum();
    let ss_res: f64 = pairs.iter().map(|(y, f)| (y - f).powi(2)).sum();
    if ss_tot > 1e-10 {
        1.0 - ss_res / ss_tot
    } else {
        1.0
    }
}
