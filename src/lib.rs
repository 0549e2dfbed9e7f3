//! Normal modes of one-dimensional mass-spring lattices.
//!
//! The numeric path is `lattice` → `dynamical` → `eigen` → `frequency`, wrapped by
//! `modes`; `session` and `render` consume its output.

pub mod config;
pub mod dynamical;
pub mod eigen;
pub mod frequency;
pub mod lattice;
pub mod modes;
pub mod render;
pub mod session;

pub use config::{ChainConfig, Config, TwoAtomConfig};
pub use dynamical::{ChainBuilder, TridiagonalMatrix, TwoAtomBuilder, Wavevector};
pub use eigen::{Eigenpairs, TridiagonalSolver, TwoAtomSolver, hermitian_eigenpairs};
pub use frequency::{DEFAULT_ZERO_MODE_TOLERANCE, ZeroMode, angular_frequencies};
pub use lattice::{ChainParams, DefectConfig, MassProfile, TwoAtomParams};
pub use modes::{
    BranchModes, ChainModes, DispersionPoint, TwoAtomModes, chain_frequencies, compute_modes,
    dispersion,
};
pub use render::{AnimationConfig, FigureConfig, animate_mode, render_modes_figure};
pub use session::{Session, SliderRange};
