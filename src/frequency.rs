use anyhow::{Result, bail};
use log::warn;
use serde::{Deserialize, Serialize};

/// Default zero-mode tolerance, as a fraction of the dynamical matrix scale.
pub const DEFAULT_ZERO_MODE_TOLERANCE: f64 = 1e-8;

/// Relative size below which a negative eigenvalue counts as rounding noise.
const NEGATIVE_NOISE: f64 = 1e-8;

/// `ω = sqrt(|λ|)`
pub fn angular_frequency(eigenvalue: f64) -> f64 {
    eigenvalue.abs().sqrt()
}

/// Maps squared angular frequencies to angular frequencies.
///
/// The absolute value hides genuinely negative eigenvalues (an unstable lattice), so
/// those are logged before being folded in with the rest.
pub fn angular_frequencies(eigenvalues: &[f64]) -> Vec<f64> {
    let scale = eigenvalues
        .iter()
        .filter(|v| v.is_finite())
        .fold(1.0f64, |acc, v| acc.max(v.abs()));
    for (index, &value) in eigenvalues.iter().enumerate() {
        if value < -NEGATIVE_NOISE * scale {
            warn!(
                "eigenvalue {} = {:e} is negative beyond rounding noise; reporting sqrt(|λ|)",
                index, value
            );
        }
    }
    eigenvalues.iter().copied().map(angular_frequency).collect()
}

/// Rigid-translation mode of an open chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZeroMode {
    pub eigenvalue: f64,
    pub frequency: f64,
    /// Physical displacement per site, largest amplitude scaled to 1.
    pub displacement: Vec<f64>,
}

impl ZeroMode {
    /// Accepts the computed lowest eigenpair only if `|λ₀|` lies within the absolute `tolerance`.
    pub fn from_lowest(eigenvalue: f64, displacement: Vec<f64>, tolerance: f64) -> Result<Self> {
        if !(eigenvalue.abs() <= tolerance) {
            bail!(
                "lowest eigenvalue {:e} is not a zero mode (tolerance {:e})",
                eigenvalue,
                tolerance
            );
        }
        Ok(Self {
            eigenvalue,
            frequency: angular_frequency(eigenvalue),
            displacement,
        })
    }
}
