use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::bond::{BondOrder, BondStereo};
use crate::mol::Molecule;

/// Sentinel standing in for a suppressed hydrogen in neighbor-order lists.
pub(crate) fn h_sentinel() -> NodeIndex {
    NodeIndex::new(usize::MAX)
}

/// Stereochemistry problems found while validating a molecule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StereoError {
    /// Chirality tag on an atom with fewer than three heavy neighbors.
    NonStereocenter { atom: usize },
    /// Two directional bonds on the same double-bond end claim the same side.
    ConflictingDirections { atom: usize },
}

impl std::fmt::Display for StereoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonStereocenter { atom } => {
                write!(f, "stereo tag on non-stereocenter atom {}", atom)
            }
            Self::ConflictingDirections { atom } => {
                write!(f, "conflicting directional bonds at atom {}", atom)
            }
        }
    }
}

impl std::error::Error for StereoError {}

/// Strip chirality tags from atoms that cannot be stereocenters.
///
/// An atom needs at least three heavy neighbors for its tag to mean
/// anything; stripping is reported but non-fatal.
pub fn cleanup_chirality(mol: &mut Molecule) -> Vec<StereoError> {
    let mut errors = Vec::new();
    let indices: Vec<NodeIndex> = mol.atoms().collect();
    for idx in indices {
        if mol.atom(idx).chirality.is_none() {
            continue;
        }
        let heavy = mol
            .neighbors(idx)
            .filter(|&nb| mol.atom(nb).atomic_num != 1)
            .count();
        if heavy < 3 {
            mol.atom_mut(idx).chirality = crate::atom::Chirality::None;
            errors.push(StereoError::NonStereocenter { atom: idx.index() });
        }
    }
    errors
}

/// Cis/trans configuration of a double bond relative to one reference
/// neighbor on each end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoubleBondConfig {
    /// References on the same side.
    Cis,
    /// References on opposite sides.
    Trans,
}

impl DoubleBondConfig {
    pub fn flipped(self) -> Self {
        match self {
            DoubleBondConfig::Cis => DoubleBondConfig::Trans,
            DoubleBondConfig::Trans => DoubleBondConfig::Cis,
        }
    }
}

/// A perceived stereo double bond: `left`/`right` are the bond endpoints in
/// stored order, and the configuration relates `left_ref` to `right_ref`.
#[derive(Debug, Clone)]
pub struct EzBond {
    pub edge: EdgeIndex,
    pub left: NodeIndex,
    pub right: NodeIndex,
    pub left_ref: NodeIndex,
    pub right_ref: NodeIndex,
    pub config: DoubleBondConfig,
}

impl EzBond {
    /// Re-anchor one end to a different neighbor, flipping the
    /// configuration (the two substituents on one end sit on opposite
    /// sides).
    pub fn reanchor(&mut self, end: NodeIndex, new_ref: NodeIndex) {
        if end == self.left && new_ref != self.left_ref {
            self.left_ref = new_ref;
            self.config = self.config.flipped();
        } else if end == self.right && new_ref != self.right_ref {
            self.right_ref = new_ref;
            self.config = self.config.flipped();
        }
    }
}

/// Direction of a marked single bond read outward from `endpoint`.
fn marker_outward(mol: &Molecule, edge: EdgeIndex, endpoint: NodeIndex) -> Option<BondStereo> {
    let bond = mol.bond(edge);
    if bond.order != BondOrder::Single {
        return None;
    }
    let dir = match bond.stereo {
        BondStereo::Up => BondStereo::Up,
        BondStereo::Down => BondStereo::Down,
        BondStereo::None | BondStereo::Either => return None,
    };
    let (a, _) = mol.bond_endpoints(edge)?;
    Some(if a == endpoint { dir } else { dir.flipped() })
}

/// Collect the marked single-bond neighbors of one double-bond end.
fn marked_neighbors(
    mol: &Molecule,
    endpoint: NodeIndex,
    double_edge: EdgeIndex,
) -> Vec<(NodeIndex, BondStereo)> {
    let mut found = Vec::new();
    for e in mol.bonds_of(endpoint) {
        if e == double_edge {
            continue;
        }
        if let Some(dir) = marker_outward(mol, e, endpoint) {
            found.push((mol.other_endpoint(e, endpoint).unwrap(), dir));
        }
    }
    found
}

/// Derive cis/trans configurations from the raw `/` `\` markers.
///
/// Equal outward directions put the two references on the same side (cis);
/// opposite directions mean trans. Double bonds with markers on only one
/// end are ambiguous and yield nothing.
pub fn perceive_ez_bonds(mol: &Molecule) -> (Vec<EzBond>, Vec<StereoError>) {
    let mut bonds = Vec::new();
    let mut errors = Vec::new();

    for edge in mol.bonds() {
        if mol.bond(edge).order != BondOrder::Double {
            continue;
        }
        let (left, right) = mol.bond_endpoints(edge).unwrap();

        let left_marks = marked_neighbors(mol, left, edge);
        let right_marks = marked_neighbors(mol, right, edge);

        let mut conflict = false;
        for (end, marks) in [(left, &left_marks), (right, &right_marks)] {
            if marks.len() >= 2 && marks[0].1 == marks[1].1 {
                errors.push(StereoError::ConflictingDirections { atom: end.index() });
                conflict = true;
            }
        }
        if conflict || left_marks.is_empty() || right_marks.is_empty() {
            continue;
        }

        let (left_ref, left_dir) = left_marks[0];
        let (right_ref, right_dir) = right_marks[0];
        let config = if left_dir == right_dir {
            DoubleBondConfig::Cis
        } else {
            DoubleBondConfig::Trans
        };
        bonds.push(EzBond {
            edge,
            left,
            right,
            left_ref,
            right_ref,
            config,
        });
    }

    (bonds, errors)
}
