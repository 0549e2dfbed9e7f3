use anyhow::{Result, anyhow, ensure};
use log::debug;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::lattice::model::ChainParams;

/// Isotope-style mass defects scattered along a chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefectConfig {
    /// Fraction of sites whose mass is replaced, in `[0, 1]`.
    pub fraction: f64,
    /// Replacement mass. `None` keeps the chain uniform.
    pub mass: Option<f64>,
    pub seed: u64,
}

impl Default for DefectConfig {
    fn default() -> Self {
        Self {
            fraction: 0.05,
            mass: None,
            seed: 0,
        }
    }
}

/// Builds the per-site mass array of a chain.
#[derive(Debug, Default)]
pub struct MassProfile;

impl MassProfile {
    pub fn uniform(n: usize, mass: f64) -> Vec<f64> {
        vec![mass; n]
    }

    /// Uniform masses with a seeded random subset of sites replaced by `defects.mass`.
    ///
    /// Each site is replaced independently with probability `defects.fraction`, so the
    /// same seed always produces the same chain.
    pub fn with_defects(n: usize, mass: f64, defects: &DefectConfig) -> Result<Vec<f64>> {
        let Some(defect_mass) = defects.mass else {
            return Ok(Self::uniform(n, mass));
        };
        ensure!(
            (0.0..=1.0).contains(&defects.fraction),
            "defect fraction {} outside [0, 1]",
            defects.fraction
        );

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(defects.seed);
        let masses: Vec<f64> = (0..n)
            .map(|_| {
                if rng.gen_bool(defects.fraction) {
                    defect_mass
                } else {
                    mass
                }
            })
            .collect();
        debug!(
            "placed {} defects of mass {} among {} sites",
            masses.iter().filter(|m| **m == defect_mass && defect_mass != mass).count(),
            defect_mass,
            n
        );
        Ok(masses)
    }

    pub fn chain(n: usize, mass: f64, k: f64, defects: &DefectConfig) -> Result<ChainParams> {
        if n < 2 {
            return Err(anyhow!("chain needs at least 2 masses, got {}", n));
        }
        Ok(ChainParams::new(Self::with_defects(n, mass, defects)?, k))
    }
}
