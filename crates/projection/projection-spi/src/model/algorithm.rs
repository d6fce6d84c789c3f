//! Regression algorithm selector.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;

/// The closed set of regression families a series can be projected with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// `y = a + b x`
    Linear,
    /// `y = a e^(b x)`
    Exponential,
    /// `y = a + b ln(x)`
    Logarithmic,
    /// `y = a x^b`
    Power,
    /// `y = c0 + c1 x + c2 x^2`
    #[default]
    Polynomial,
}

impl Algorithm {
    pub const ALL: [Algorithm; 5] = [
        Algorithm::Linear,
        Algorithm::Exponential,
        Algorithm::Logarithmic,
        Algorithm::Power,
        Algorithm::Polynomial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Linear => "linear",
            Algorithm::Exponential => "exponential",
            Algorithm::Logarithmic => "logarithmic",
            Algorithm::Power => "power",
            Algorithm::Polynomial => "polynomial",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| ProjectionError::UnknownAlgorithm(s.to_string()))
    }
}
