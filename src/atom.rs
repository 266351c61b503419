use crate::element::Element;

/// Tetrahedral or extended chirality tag on an atom.
///
/// `Ccw` (`@`) and `Cw` (`@@`) are stored parity-normalized against the
/// molecule's neighbor ordering, so the stored value does not depend on the
/// order neighbors were written in the source SMILES. The extended tags
/// (`@TH1`, `@AL2`, `@SP3`, `@TB12`, `@OH26`, …) are carried through
/// unchanged; their geometric meaning is not interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Chirality {
    /// No chirality specified.
    #[default]
    None,
    /// Counterclockwise (`@`).
    Ccw,
    /// Clockwise (`@@`).
    Cw,
    /// Tetrahedral class tag `@TH1` or `@TH2`.
    Th(u8),
    /// Allene tag `@AL1` or `@AL2`.
    Al(u8),
    /// Square-planar tag `@SP1`..`@SP3`.
    Sp(u8),
    /// Trigonal-bipyramidal tag `@TB1`..`@TB20`.
    Tb(u8),
    /// Octahedral tag `@OH1`..`@OH30`.
    Oh(u8),
}

impl Chirality {
    pub fn is_none(self) -> bool {
        self == Chirality::None
    }

    /// The two plain tags that participate in parity bookkeeping.
    pub fn is_parity(self) -> bool {
        matches!(self, Chirality::Ccw | Chirality::Cw)
    }

    pub fn flipped(self) -> Chirality {
        match self {
            Chirality::Ccw => Chirality::Cw,
            Chirality::Cw => Chirality::Ccw,
            other => other,
        }
    }
}

/// An atom in a molecular graph.
///
/// Stores the intrinsic properties read off the SMILES token. The written
/// symbol is not kept; it is derived from `atomic_num` and `is_aromatic`.
/// There is no separate bracket-atom type — `is_bracket` records how the
/// atom was written and the bracket-only fields are optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Atom {
    /// Atomic number (1 = H, 6 = C, …). `0` is the `*` wildcard.
    pub atomic_num: u8,
    /// Formal charge in elementary charge units.
    pub formal_charge: i8,
    /// Mass number. `0` means natural isotopic abundance.
    pub isotope: u16,
    /// Number of implicit (suppressed) hydrogens.
    ///
    /// Filled from the default-valence table for organic-subset atoms,
    /// taken verbatim from the `H` count for bracket atoms.
    pub hydrogen_count: u8,
    /// Whether the atom was written lowercase (or validated aromatic).
    pub is_aromatic: bool,
    /// Chirality tag, if any.
    pub chirality: Chirality,
    /// Atom-map class from `:n` inside brackets.
    pub atom_class: Option<u16>,
    /// Whether the atom was written inside `[...]`.
    pub is_bracket: bool,
}

impl Atom {
    pub fn element(&self) -> Option<Element> {
        Element::from_atomic_num(self.atomic_num)
    }

    pub fn is_wildcard(&self) -> bool {
        self.atomic_num == 0
    }
}
