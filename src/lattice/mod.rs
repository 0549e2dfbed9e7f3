pub mod construction;
pub mod model;

pub use construction::{DefectConfig, MassProfile};
pub use model::{ChainParams, TwoAtomParams};
