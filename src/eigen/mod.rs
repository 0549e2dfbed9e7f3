use std::cmp::Ordering;

use anyhow::{Result, anyhow, ensure};
use log::debug;
use nalgebra::{ComplexField, DMatrix, DVector, SymmetricEigen};

pub mod tridiagonal;
pub mod two_atom;

pub use tridiagonal::TridiagonalSolver;
pub use two_atom::TwoAtomSolver;

const SWEEPS_PER_ROW: usize = 64;

/// Eigenvalues in ascending order; column `i` of `eigenvectors` belongs to `eigenvalues[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Eigenpairs<T: ComplexField> {
    pub eigenvalues: Vec<f64>,
    pub eigenvectors: DMatrix<T>,
}

impl<T> Eigenpairs<T>
where
    T: ComplexField<RealField = f64>,
{
    pub fn len(&self) -> usize {
        self.eigenvalues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eigenvalues.is_empty()
    }

    pub fn vector(&self, index: usize) -> Option<DVector<T>> {
        (index < self.len()).then(|| self.eigenvectors.column(index).into_owned())
    }

    fn not_a_number(order: usize) -> Self {
        Self {
            eigenvalues: vec![f64::NAN; order],
            eigenvectors: DMatrix::from_element(order, order, T::from_real(f64::NAN)),
        }
    }
}

/// Diagonalizes a real symmetric or complex Hermitian matrix and sorts the pairs ascending.
///
/// Only the lower triangle is read. Matrices holding NaN or Inf yield NaN eigenpairs
/// instead of an error so unphysical inputs stay visible in the output.
pub fn hermitian_eigenpairs<T>(matrix: DMatrix<T>) -> Result<Eigenpairs<T>>
where
    T: ComplexField<RealField = f64>,
{
    ensure!(
        matrix.is_square(),
        "eigendecomposition expects a square matrix, got {}x{}",
        matrix.nrows(),
        matrix.ncols()
    );
    let order = matrix.nrows();
    if order == 0 {
        return Ok(Eigenpairs {
            eigenvalues: Vec::new(),
            eigenvectors: DMatrix::zeros(0, 0),
        });
    }
    if matrix.iter().any(|entry| !entry.is_finite()) {
        debug!("matrix of order {} has non-finite entries", order);
        return Ok(Eigenpairs::not_a_number(order));
    }

    let eigen = SymmetricEigen::try_new(matrix, f64::EPSILON, SWEEPS_PER_ROW * order)
        .ok_or_else(|| anyhow!("symmetric eigensolver did not converge for order {}", order))?;

    let mut indices: Vec<usize> = (0..order).collect();
    indices.sort_by(|&a, &b| {
        eigen.eigenvalues[a]
            .partial_cmp(&eigen.eigenvalues[b])
            .unwrap_or(Ordering::Equal)
    });

    let eigenvalues = indices.iter().map(|&i| eigen.eigenvalues[i]).collect();
    let columns: Vec<DVector<T>> = indices
        .iter()
        .map(|&i| eigen.eigenvectors.column(i).into_owned())
        .collect();

    Ok(Eigenpairs {
        eigenvalues,
        eigenvectors: DMatrix::from_columns(&columns),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Complex;

    #[test]
    fn sorts_eigenpairs_ascending() {
        let matrix = DMatrix::<f64>::from_row_slice(3, 3, &[5.0, 0.0, 0.0, 0.0, -1.0, 0.0, 0.0, 0.0, 2.0]);
        let pairs = hermitian_eigenpairs(matrix).expect("eigenpairs");
        let expected = [-1.0, 2.0, 5.0];
        for (value, want) in pairs.eigenvalues.iter().zip(expected) {
            assert!((value - want).abs() < 1e-12, "{value} != {want}");
        }
        let lowest = pairs.vector(0).expect("first vector");
        assert!((lowest[1].abs() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn hermitian_complex_spectrum_is_real() {
        let i = Complex::new(0.0, 1.0);
        let one = Complex::new(1.0, 0.0);
        let matrix = DMatrix::from_row_slice(2, 2, &[one * 2.0, -i, i, one * 2.0]);
        let pairs = hermitian_eigenpairs(matrix).expect("eigenpairs");
        assert!((pairs.eigenvalues[0] - 1.0).abs() < 1e-12);
        assert!((pairs.eigenvalues[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn non_finite_entries_propagate_as_nan() {
        let matrix = DMatrix::from_row_slice(2, 2, &[f64::INFINITY, 0.0, 0.0, 1.0]);
        let pairs = hermitian_eigenpairs(matrix).expect("eigenpairs");
        assert!(pairs.eigenvalues.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn rejects_rectangular_input() {
        assert!(hermitian_eigenpairs(DMatrix::<f64>::zeros(2, 3)).is_err());
    }
}
