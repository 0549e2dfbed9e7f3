use std::f64::consts::PI;

use anyhow::{Context, Result, anyhow, ensure};
use log::debug;
use nalgebra::{Complex, DMatrix, Matrix2};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::dynamical::{ChainBuilder, TridiagonalMatrix, TwoAtomBuilder, Wavevector};
use crate::eigen::{Eigenpairs, TridiagonalSolver, TwoAtomSolver};
use crate::frequency::{ZeroMode, angular_frequencies};
use crate::lattice::{ChainParams, TwoAtomParams};

/// Frequencies and mode shapes of the two-atom cell at one wavevector.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchModes {
    pub wavevector: Wavevector,
    pub matrix: Matrix2<Complex<f64>>,
    pub eigenvalues: Vec<f64>,
    pub frequencies: Vec<f64>,
    /// Column `i` is the mode oscillating at `frequencies[i]`.
    pub modes: DMatrix<Complex<f64>>,
}

impl BranchModes {
    pub fn compute(params: &TwoAtomParams, wavevector: Wavevector) -> Result<Self> {
        let Eigenpairs {
            eigenvalues,
            eigenvectors,
        } = TwoAtomSolver::solve(params, wavevector)
            .with_context(|| format!("solve two-atom cell at {}", wavevector))?;
        let frequencies = angular_frequencies(&eigenvalues);
        Ok(Self {
            wavevector,
            matrix: TwoAtomBuilder::build(params, wavevector),
            eigenvalues,
            frequencies,
            modes: eigenvectors,
        })
    }

    /// Real part of mode `index`; the imaginary part vanishes at `q = 0` and `q = π`.
    pub fn displacement(&self, index: usize) -> [f64; 2] {
        [self.modes[(0, index)].re, self.modes[(1, index)].re]
    }

    pub fn report(&self) -> BranchReport {
        BranchReport {
            wavevector: self.wavevector.to_string(),
            q: self.wavevector.value(),
            eigenvalues: self.eigenvalues.clone(),
            frequencies: self.frequencies.clone(),
            modes: self
                .modes
                .column_iter()
                .map(|column| ModeShape {
                    re: column.iter().map(|c| c.re).collect(),
                    im: column.iter().map(|c| c.im).collect(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TwoAtomModes {
    pub params: TwoAtomParams,
    pub q0: BranchModes,
    pub qpi: BranchModes,
}

impl TwoAtomModes {
    pub fn report(&self) -> TwoAtomReport {
        TwoAtomReport {
            params: self.params,
            q0: self.q0.report(),
            qpi: self.qpi.report(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeShape {
    pub re: Vec<f64>,
    pub im: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchReport {
    pub wavevector: String,
    pub q: f64,
    pub eigenvalues: Vec<f64>,
    pub frequencies: Vec<f64>,
    pub modes: Vec<ModeShape>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwoAtomReport {
    pub params: TwoAtomParams,
    pub q0: BranchReport,
    pub qpi: BranchReport,
}

/// Normal modes of the two-atom cell at the zone centre and the zone edge.
pub fn compute_modes(m1: f64, m2: f64, k: f64) -> Result<TwoAtomModes> {
    let params = TwoAtomParams::new(m1, m2, k);
    debug!("computing two-atom modes for {:?}", params);
    Ok(TwoAtomModes {
        params,
        q0: BranchModes::compute(&params, Wavevector::Zero)?,
        qpi: BranchModes::compute(&params, Wavevector::Pi)?,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DispersionPoint {
    pub q: f64,
    pub acoustic: f64,
    pub optical: f64,
}

/// Acoustic and optical branches sampled at `samples` evenly spaced points of `[-π, π]`.
pub fn dispersion(params: &TwoAtomParams, samples: usize) -> Result<Vec<DispersionPoint>> {
    ensure!(samples >= 2, "dispersion needs at least 2 samples, got {}", samples);
    Array1::linspace(-PI, PI, samples)
        .iter()
        .map(|&q| -> Result<DispersionPoint> {
            let wavevector = if q == 0.0 {
                Wavevector::Zero
            } else {
                Wavevector::Arbitrary(q)
            };
            let pairs = TwoAtomSolver::solve(params, wavevector)?;
            let frequencies = angular_frequencies(&pairs.eigenvalues);
            Ok(DispersionPoint {
                q,
                acoustic: frequencies[0],
                optical: frequencies[1],
            })
        })
        .collect()
}

/// Normal modes of an open chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainModes {
    pub params: ChainParams,
    pub matrix: TridiagonalMatrix,
    pub eigenpairs: Eigenpairs<f64>,
    pub frequencies: Vec<f64>,
}

impl ChainModes {
    pub fn compute(params: ChainParams) -> Result<Self> {
        let matrix = ChainBuilder::build(&params)?;
        let eigenpairs = TridiagonalSolver::eigenpairs(&matrix)
            .with_context(|| format!("diagonalize chain of {} masses", params.len()))?;
        let frequencies = angular_frequencies(&eigenpairs.eigenvalues);
        debug!(
            "chain of {} masses: lowest eigenvalue {:e}, highest frequency {:.6}",
            params.len(),
            eigenpairs.eigenvalues.first().copied().unwrap_or(f64::NAN),
            frequencies.last().copied().unwrap_or(f64::NAN)
        );
        Ok(Self {
            params,
            matrix,
            eigenpairs,
            frequencies,
        })
    }

    pub fn len(&self) -> usize {
        self.eigenpairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eigenpairs.is_empty()
    }

    /// Site displacements `v_i / sqrt(m_i)` of mode `index`, scaled so the largest
    /// amplitude is 1 and the net displacement is non-negative.
    pub fn displacement(&self, index: usize) -> Result<Vec<f64>> {
        let vector = self.eigenpairs.vector(index).ok_or_else(|| {
            anyhow!("mode {} out of range for chain of {} masses", index, self.len())
        })?;
        let mut displacement: Vec<f64> = vector
            .iter()
            .zip(self.params.masses.iter())
            .map(|(v, m)| v / m.sqrt())
            .collect();

        let peak = displacement.iter().fold(0.0f64, |acc, u| acc.max(u.abs()));
        if peak > 0.0 && peak.is_finite() {
            let net: f64 = displacement.iter().sum();
            let leading = displacement.iter().copied().find(|u| u.abs() > 0.0).unwrap_or(0.0);
            let orientation = if net < 0.0 || (net == 0.0 && leading < 0.0) {
                -1.0
            } else {
                1.0
            };
            displacement
                .iter_mut()
                .for_each(|u| *u *= orientation / peak);
        }
        Ok(displacement)
    }

    /// Rigid translation, accepted when `|λ₀| <= tolerance * max_i |D_ii|`.
    ///
    /// Rounding in `λ₀` grows with `k/m`, so the tolerance is relative to the largest
    /// diagonal entry rather than absolute.
    pub fn zero_mode(&self, tolerance: f64) -> Result<ZeroMode> {
        let eigenvalue = self
            .eigenpairs
            .eigenvalues
            .first()
            .copied()
            .ok_or_else(|| anyhow!("chain has no modes"))?;
        let scale = self
            .matrix
            .diagonal
            .iter()
            .fold(0.0f64, |acc, d| acc.max(d.abs()));
        ZeroMode::from_lowest(eigenvalue, self.displacement(0)?, tolerance * scale)
    }
}

/// Frequencies of an open chain without forming eigenvectors.
pub fn chain_frequencies(params: &ChainParams) -> Result<Vec<f64>> {
    let matrix = ChainBuilder::build(params)?;
    Ok(angular_frequencies(&TridiagonalSolver::eigenvalues(&matrix)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_keeps_mode_columns() {
        let modes = compute_modes(1.0, 2.0, 1.0).expect("modes");
        let report = modes.report();
        assert_eq!(report.q0.modes.len(), 2);
        assert_eq!(report.q0.wavevector, "q=0");
        assert!(report.qpi.modes.iter().all(|m| m.im.iter().all(|v| *v == 0.0)));
    }

    #[test]
    fn displacement_rejects_missing_mode() {
        let chain = ChainModes::compute(ChainParams::uniform(3, 1.0, 1.0)).expect("chain");
        assert!(chain.displacement(3).is_err());
    }

    #[test]
    fn dispersion_spans_the_zone() {
        let points = dispersion(&TwoAtomParams::new(1.0, 2.0, 1.0), 5).expect("dispersion");
        assert_eq!(points.len(), 5);
        assert!((points[0].q + PI).abs() < 1e-12);
        assert!(points[2].acoustic.abs() < 1e-7);
        assert!(points.iter().all(|p| p.acoustic <= p.optical));
    }
}
