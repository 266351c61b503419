pub mod aromaticity;
pub mod atom;
pub mod bond;
pub mod canon;
pub mod element;
pub mod graph_ops;
pub mod mol;
pub mod rings;
pub mod smiles;
pub mod stereo;
pub mod valence;

pub use atom::{Atom, Chirality};
pub use bond::{Bond, BondOrder, BondStereo};
pub use canon::canonical_ranks;
pub use element::Element;
pub use mol::Molecule;
pub use rings::RingInfo;
pub use smiles::{generate, parse, to_canonical_smiles, to_smiles, ParseResult, SmilesError};

#[cfg(test)]
mod tests;
