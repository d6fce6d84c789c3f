//! Polynomial regression
//!
//! Fits `y = c0 + c1 u + c2 u^2` by least squares, where `u` is `x` shifted to
//! the sample mean and scaled into `[-1, 1]`. The normal equations are solved
//! by Gaussian elimination with partial pivoting and each coefficient is
//! rounded to [`PRECISION`] significant digits.
//!
//! When the system is singular (fewer distinct `x` values than coefficients)
//! the degree is lowered until it is not, so two points give a line and a
//! single repeated `x` gives the mean.

use super::{has_spread, mean, usable};
use projection_spi::Result;

/// Degree fitted when the data supports it.
pub const DEGREE: usize = 2;

/// Significant digits kept in each coefficient.
pub const PRECISION: i32 = 13;

const PIVOT_EPSILON: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialModel {
    /// Lowest power first, in terms of `u`
    coefficients: Vec<f64>,
    origin: f64,
    scale: f64,
}

impl PolynomialModel {
    pub fn fit(points: &[(f64, f64)]) -> Result<Self> {
        let points = usable(points, |_, _| true)?;
        let origin = mean(points.iter().map(|p| p.0));
        let scale = points
            .iter()
            .map(|p| (p.0 - origin).abs())
            .fold(0.0, f64::max);

        if !has_spread(points.iter().map(|p| p.0)) || scale == 0.0 {
            return Ok(Self {
                coefficients: vec![round_significant(mean(points.iter().map(|p| p.1)), PRECISION)],
                origin,
                scale: 1.0,
            });
        }

        let scaled: Vec<(f64, f64)> = points
            .iter()
            .map(|&(x, y)| ((x - origin) / scale, y))
            .collect();

        let mut coefficients = Vec::new();
        for degree in (0..=DEGREE).rev() {
            if let Some(solution) = solve_normal_equations(&scaled, degree) {
                coefficients = solution;
                break;
            }
        }
        if coefficients.is_empty() {
            coefficients.push(mean(points.iter().map(|p| p.1)));
        }

        Ok(Self {
            coefficients: coefficients
                .into_iter()
                .map(|c| round_significant(c, PRECISION))
                .collect(),
            origin,
            scale,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        let u = (x - self.origin) / self.scale;
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, &c| acc * u + c)
    }

    /// Degree actually fitted (may be below [`DEGREE`] for degenerate input).
    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Coefficients in terms of `u = (x - origin) / scale`, lowest power first.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn origin(&self) -> f64 {
        self.origin
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn equation(&self) -> String {
        let terms: Vec<String> = self
            .coefficients
            .iter()
            .enumerate()
            .map(|(power, c)| match power {
                0 => format!("{}", c),
                1 => format!("{}u", c),
                _ => format!("{}u^{}", c, power),
            })
            .collect();
        format!(
            "y = {}, u = (x - {}) / {}",
            terms.join(" + "),
            self.origin,
            self.scale
        )
    }
}

/// Least squares polynomial of `degree`, or `None` if the system is singular.
fn solve_normal_equations(points: &[(f64, f64)], degree: usize) -> Option<Vec<f64>> {
    let k = degree + 1;
    if points.len() < k {
        return None;
    }

    // Power sums: sums[p] = sum(u^p) for p in 0..=2*degree
    let mut sums = vec![0.0; 2 * degree + 1];
    let mut rhs = vec![0.0; k];
    for &(u, y) in points {
        let mut power = 1.0;
        for (p, sum) in sums.iter_mut().enumerate() {
            *sum += power;
            if p < k {
                rhs[p] += power * y;
            }
            power *= u;
        }
    }

    let mut matrix: Vec<Vec<f64>> = (0..k)
        .map(|i| {
            let mut row: Vec<f64> = (0..k).map(|j| sums[i + j]).collect();
            row.push(rhs[i]);
            row
        })
        .collect();

    gaussian_elimination(&mut matrix, sums[0])
}

/// Solve an augmented `k x (k + 1)` system in place.
fn gaussian_elimination(matrix: &mut [Vec<f64>], magnitude: f64) -> Option<Vec<f64>> {
    let k = matrix.len();
    let tolerance = PIVOT_EPSILON * magnitude.max(1.0);

    for col in 0..k {
        let pivot_row = (col..k).max_by(|&a, &b| {
            matrix[a][col]
                .abs()
                .partial_cmp(&matrix[b][col].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        let pivot = matrix[pivot_row][col].abs();
        if pivot.is_nan() || pivot <= tolerance {
            return None;
        }
        matrix.swap(col, pivot_row);

        for row in (col + 1)..k {
            let factor = matrix[row][col] / matrix[col][col];
            for j in col..=k {
                matrix[row][j] -= factor * matrix[col][j];
            }
        }
    }

    let mut solution = vec![0.0; k];
    for row in (0..k).rev() {
        let tail: f64 = ((row + 1)..k).map(|j| matrix[row][j] * solution[j]).sum();
        solution[row] = (matrix[row][k] - tail) / matrix[row][row];
    }

    if solution.iter().all(|c| c.is_finite()) {
        Some(solution)
    } else {
        None
    }
}

/// Round `value` to `digits` significant digits.
pub fn round_significant(value: f64, digits: i32) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }
    let magnitude = value.abs().log10().floor() as i32;
    let shift = digits - 1 - magnitude;
    if !(-300..=300).contains(&shift) {
        return value;
    }
    let factor = 10f64.powi(shift);
    let rounded = (value * factor).round() / factor;
    if rounded.is_finite() {
        rounded
    } else {
        value
    }
}
