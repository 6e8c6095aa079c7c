//! Minimal readers for the two input formats.
//!
//! These are not general parsers. [`cif`] only exposes blocks, categories, and rows, and [`pdb`]
//! only recovers the model/chain/residue hierarchy with atom names.
pub mod cif;
pub mod error;
pub mod pdb;

pub use error::Error;
