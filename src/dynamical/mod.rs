pub mod chain;
pub mod two_atom;

pub use chain::{ChainBuilder, TridiagonalMatrix};
pub use two_atom::{TwoAtomBuilder, Wavevector};
