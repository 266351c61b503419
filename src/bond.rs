/// Bond order as written in SMILES.
///
/// Aromatic bonds stay aromatic; there is no kekulization step. The
/// aromaticity validator promotes ring bonds of validated aromatic rings
/// to `Aromatic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondOrder {
    /// A single bond (`-`, or implicit).
    #[default]
    Single,
    /// A double bond (`=`).
    Double,
    /// A triple bond (`#`).
    Triple,
    /// A quadruple bond (`$`).
    Quadruple,
    /// An aromatic bond (`:`, or implicit between two aromatic atoms).
    Aromatic,
}

impl BondOrder {
    /// Integer order used by the canonical ranker (aromatic sorts last).
    pub fn numeric(self) -> u8 {
        match self {
            BondOrder::Single => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
            BondOrder::Quadruple => 4,
            BondOrder::Aromatic => 5,
        }
    }

    /// Twice the valence contribution, so the aromatic 1.5 stays integral.
    pub fn twice_valence(self) -> u16 {
        match self {
            BondOrder::Single => 2,
            BondOrder::Double => 4,
            BondOrder::Triple => 6,
            BondOrder::Quadruple => 8,
            BondOrder::Aromatic => 3,
        }
    }
}

/// Directional marker on a single bond adjacent to a double bond.
///
/// `Up` is `/` and `Down` is `\`, read along the bond's stored endpoint
/// order (source atom first). `Either` is accepted in the data model but
/// never produced by the parser; the writer treats it as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondStereo {
    #[default]
    None,
    Up,
    Down,
    Either,
}

impl BondStereo {
    pub fn flipped(self) -> BondStereo {
        match self {
            BondStereo::Up => BondStereo::Down,
            BondStereo::Down => BondStereo::Up,
            other => other,
        }
    }
}

/// A bond between two atoms.
#[derive(Debug, Clone, PartialEq)]
pub struct Bond {
    pub order: BondOrder,
    pub stereo: BondStereo,
}

impl Bond {
    pub fn new(order: BondOrder) -> Self {
        Self {
            order,
            stereo: BondStereo::None,
        }
    }
}

impl Default for Bond {
    fn default() -> Self {
        Self::new(BondOrder::Single)
    }
}
