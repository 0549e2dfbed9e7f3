use anyhow::Result;
use nalgebra::{Complex, DMatrix};

use crate::dynamical::{TwoAtomBuilder, Wavevector};
use crate::eigen::{Eigenpairs, hermitian_eigenpairs};
use crate::lattice::TwoAtomParams;

/// Eigenpairs of the two-atom dynamical matrix `D(q)`.
pub struct TwoAtomSolver;

impl TwoAtomSolver {
    /// Solves the Hermitian form `M^{1/2} D M^{-1/2}` and maps each eigenvector back with
    /// `M^{-1/2}`, so the returned columns are unit-length eigenvectors of `D(q)` itself.
    pub fn solve(params: &TwoAtomParams, q: Wavevector) -> Result<Eigenpairs<Complex<f64>>> {
        let weighted = TwoAtomBuilder::mass_weighted(params, q);
        let pairs = hermitian_eigenpairs(DMatrix::from_column_slice(2, 2, weighted.as_slice()))?;

        let inv_sqrt_mass = params.masses().map(|m| 1.0 / m.sqrt());
        let mut eigenvectors = pairs.eigenvectors;
        for mut column in eigenvectors.column_iter_mut() {
            for (row, scale) in inv_sqrt_mass.iter().enumerate() {
                column[row] *= *scale;
            }
            let norm = column.norm();
            if norm > 0.0 && norm.is_finite() {
                column.unscale_mut(norm);
            }
        }

        Ok(Eigenpairs {
            eigenvalues: pairs.eigenvalues,
            eigenvectors,
        })
    }
}
