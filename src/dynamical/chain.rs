use anyhow::{Result, ensure};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::lattice::ChainParams;

/// Real symmetric tridiagonal matrix stored by its two distinct diagonals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TridiagonalMatrix {
    pub diagonal: Vec<f64>,
    pub off_diagonal: Vec<f64>,
}

impl TridiagonalMatrix {
    pub fn new(diagonal: Vec<f64>, off_diagonal: Vec<f64>) -> Result<Self> {
        ensure!(
            off_diagonal.len() + 1 == diagonal.len(),
            "tridiagonal matrix of order {} needs {} off-diagonal entries, got {}",
            diagonal.len(),
            diagonal.len().saturating_sub(1),
            off_diagonal.len()
        );
        Ok(Self {
            diagonal,
            off_diagonal,
        })
    }

    pub fn order(&self) -> usize {
        self.diagonal.len()
    }

    pub fn to_dense(&self) -> DMatrix<f64> {
        let n = self.order();
        let mut matrix = DMatrix::zeros(n, n);
        for i in 0..n {
            matrix[(i, i)] = self.diagonal[i];
        }
        for (i, &value) in self.off_diagonal.iter().enumerate() {
            matrix[(i, i + 1)] = value;
            matrix[(i + 1, i)] = value;
        }
        matrix
    }
}

/// Builds the mass-weighted dynamical matrix of an open (free-ended) chain.
pub struct ChainBuilder;

impl ChainBuilder {
    /// Diagonal `k/m` at both ends and `2k/m` inside; off-diagonal `-k/sqrt(m_i m_{i+1})`.
    ///
    /// The halved end terms leave the rigid translation as an exact zero mode.
    pub fn build(params: &ChainParams) -> Result<TridiagonalMatrix> {
        let n = params.len();
        ensure!(n >= 2, "chain needs at least 2 masses, got {}", n);
        let k = params.k;
        let masses = &params.masses;

        let diagonal: Vec<f64> = masses
            .iter()
            .enumerate()
            .map(|(i, m)| {
                if i == 0 || i == n - 1 {
                    k / m
                } else {
                    2.0 * k / m
                }
            })
            .collect();
        let off_diagonal: Vec<f64> = masses
            .windows(2)
            .map(|pair| -k / (pair[0] * pair[1]).sqrt())
            .collect();

        TridiagonalMatrix::new(diagonal, off_diagonal)
    }
}
