mod builder;
pub mod error;
mod tokenizer;
mod writer;

use log::debug;

use crate::aromaticity::validate_aromaticity;
use crate::mol::Molecule;
use crate::stereo::{cleanup_chirality, perceive_ez_bonds};
use crate::valence::check_valence;

pub use error::SmilesError;
pub use writer::{generate, to_canonical_smiles, to_smiles};

/// Outcome of parsing one SMILES string.
///
/// `errors` non-empty means the input was malformed or chemically invalid;
/// whatever could still be built is in `molecules`, so tools can inspect
/// partial results. Check `errors` before trusting the graphs.
#[derive(Debug)]
pub struct ParseResult {
    /// One molecule per connected component, in input order.
    pub molecules: Vec<Molecule>,
    /// Human-readable problems, in roughly source order.
    pub errors: Vec<String>,
}

impl ParseResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse a SMILES string into molecular graphs.
///
/// Never panics on malformed input: lexical and structural problems are
/// recovered from where possible, semantic validation runs on whatever was
/// built, and everything lands in [`ParseResult::errors`] as strings. An
/// empty (or all-whitespace) input is zero molecules and zero errors.
pub fn parse(input: &str) -> ParseResult {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return ParseResult {
            molecules: Vec::new(),
            errors: Vec::new(),
        };
    }

    let (tokens, tok_errors) = tokenizer::tokenize(trimmed);
    let mut errors: Vec<String> = tok_errors.iter().map(|e| e.to_string()).collect();

    let (mut molecules, build_errors) = builder::build(&tokens);
    errors.extend(build_errors.iter().map(|e| e.to_string()));

    for mol in &mut molecules {
        errors.extend(cleanup_chirality(mol).iter().map(|e| e.to_string()));
        errors.extend(validate_aromaticity(mol).iter().map(|e| e.to_string()));
        if let Err(valence_errors) = check_valence(mol) {
            errors.extend(valence_errors.iter().map(|e| e.to_string()));
        }
        let (_, stereo_errors) = perceive_ez_bonds(mol);
        errors.extend(stereo_errors.iter().map(|e| e.to_string()));
    }

    if !errors.is_empty() {
        debug!(
            "parsed {:?}: {} molecule(s), {} error(s)",
            trimmed,
            molecules.len(),
            errors.len()
        );
    }

    ParseResult { molecules, errors }
}
