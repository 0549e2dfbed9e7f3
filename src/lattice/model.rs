use log::warn;
use serde::{Deserialize, Serialize};

/// Masses and spring constant of the two-atom unit cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TwoAtomParams {
    pub m1: f64,
    pub m2: f64,
    pub k: f64,
}

impl TwoAtomParams {
    pub fn new(m1: f64, m2: f64, k: f64) -> Self {
        let params = Self { m1, m2, k };
        params.warn_if_unphysical();
        params
    }

    pub fn masses(&self) -> [f64; 2] {
        [self.m1, self.m2]
    }

    /// Non-positive inputs are not rejected; they surface as Inf/NaN downstream.
    fn warn_if_unphysical(&self) {
        if !(self.m1 > 0.0 && self.m2 > 0.0 && self.k > 0.0) {
            warn!(
                "non-positive lattice parameters m1={} m2={} k={}; results will contain Inf/NaN",
                self.m1, self.m2, self.k
            );
        }
    }
}

impl Default for TwoAtomParams {
    fn default() -> Self {
        Self {
            m1: 1.0,
            m2: 1.0,
            k: 1.0,
        }
    }
}

/// Open chain of `masses.len()` particles joined by identical springs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainParams {
    pub masses: Vec<f64>,
    pub k: f64,
}

impl ChainParams {
    pub fn new(masses: Vec<f64>, k: f64) -> Self {
        if k <= 0.0 || masses.iter().any(|m| !(*m > 0.0)) {
            warn!(
                "chain of {} masses has non-positive parameters (k={}); results will contain Inf/NaN",
                masses.len(),
                k
            );
        }
        Self { masses, k }
    }

    pub fn uniform(n: usize, mass: f64, k: f64) -> Self {
        Self::new(vec![mass; n], k)
    }

    pub fn len(&self) -> usize {
        self.masses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masses.is_empty()
    }
}
