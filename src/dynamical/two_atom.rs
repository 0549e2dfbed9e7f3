use std::f64::consts::PI;
use std::fmt;

use nalgebra::{Complex, Matrix2};
use serde::{Deserialize, Serialize};

use crate::lattice::TwoAtomParams;

/// Wavevector at which the two-atom cell is evaluated.
///
/// The Brillouin zone centre and edge carry exact phase factors so the coupling terms at
/// `q = π` cancel to exactly zero instead of leaving rounding residue from `e^{iπ}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Wavevector {
    Zero,
    Pi,
    Arbitrary(f64),
}

impl Wavevector {
    pub fn value(&self) -> f64 {
        match self {
            Wavevector::Zero => 0.0,
            Wavevector::Pi => PI,
            Wavevector::Arbitrary(q) => *q,
        }
    }

    /// `e^{iq}`
    pub fn phase(&self) -> Complex<f64> {
        match self {
            Wavevector::Zero => Complex::new(1.0, 0.0),
            Wavevector::Pi => Complex::new(-1.0, 0.0),
            Wavevector::Arbitrary(q) => Complex::from_polar(1.0, *q),
        }
    }
}

impl fmt::Display for Wavevector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Wavevector::Zero => write!(f, "q=0"),
            Wavevector::Pi => write!(f, "q=π"),
            Wavevector::Arbitrary(q) => write!(f, "q={q:.4}"),
        }
    }
}

/// Builds the 2×2 dynamical matrix of a periodic diatomic chain.
pub struct TwoAtomBuilder;

impl TwoAtomBuilder {
    /// `D(q) = [[2k/m1, -k/m1 (1 + e^{iq})], [-k/m2 (1 + e^{-iq}), 2k/m2]]`
    pub fn build(params: &TwoAtomParams, q: Wavevector) -> Matrix2<Complex<f64>> {
        let TwoAtomParams { m1, m2, k } = *params;
        let one = Complex::new(1.0, 0.0);
        let phase = q.phase();

        Matrix2::new(
            Complex::from(2.0 * k / m1),
            -(one + phase) * (k / m1),
            -(one + phase.conj()) * (k / m2),
            Complex::from(2.0 * k / m2),
        )
    }

    /// Hermitian form `M^{1/2} D(q) M^{-1/2}`. Same spectrum as [`TwoAtomBuilder::build`].
    pub fn mass_weighted(params: &TwoAtomParams, q: Wavevector) -> Matrix2<Complex<f64>> {
        let TwoAtomParams { m1, m2, k } = *params;
        let one = Complex::new(1.0, 0.0);
        let coupling = -(one + q.phase()) * (k / (m1 * m2).sqrt());

        Matrix2::new(
            Complex::from(2.0 * k / m1),
            coupling,
            coupling.conj(),
            Complex::from(2.0 * k / m2),
        )
    }
}
