use std::collections::HashSet;

use petgraph::graph::NodeIndex;

use crate::bond::BondOrder;
use crate::mol::Molecule;
use crate::rings::RingInfo;

/// A ring or atom that breaks the aromaticity rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AromaticityError {
    /// A ring mixes aromatic and non-aromatic atoms.
    MixedRing { ring: Vec<usize> },
    /// An aromatic ring of a size outside {5, 6, 7}.
    RingSize { ring: Vec<usize>, size: usize },
    /// An aromatic ring whose pi-electron count fails Hückel's rule.
    Huckel { ring: Vec<usize>, pi: u32 },
    /// An atom flagged aromatic that sits in no ring.
    NotInRing { atom: usize },
}

impl std::fmt::Display for AromaticityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MixedRing { ring } => {
                write!(f, "ring {:?} mixes aromatic and non-aromatic atoms", ring)
            }
            Self::RingSize { ring, size } => {
                write!(f, "aromatic ring {:?} has unsupported size {}", ring, size)
            }
            Self::Huckel { ring, pi } => write!(
                f,
                "aromatic ring {:?} has {} pi electrons, violating Huckel's rule",
                ring, pi
            ),
            Self::NotInRing { atom } => {
                write!(f, "aromatic atom {} is not in a ring", atom)
            }
        }
    }
}

impl std::error::Error for AromaticityError {}

/// Check every ring touched by an aromatic atom and promote the bonds of
/// valid aromatic rings to [`BondOrder::Aromatic`].
///
/// A ring passes when all of its atoms are aromatic, its size is 5–7, and
/// its pi count satisfies Hückel's rule — either on its own or summed over
/// the fused system it belongs to (azulene-style systems are aromatic as a
/// whole but not ring-by-ring).
pub fn validate_aromaticity(mol: &mut Molecule) -> Vec<AromaticityError> {
    let mut errors = Vec::new();
    let ring_info = RingInfo::sssr(mol);
    let rings = ring_info.rings();

    for atom in mol.atoms() {
        if mol.atom(atom).is_aromatic && !ring_info.is_ring_atom(atom) {
            errors.push(AromaticityError::NotInRing { atom: atom.index() });
        }
    }

    let systems = fused_ring_systems(rings);
    let mut valid = vec![false; rings.len()];

    for (ri, ring) in rings.iter().enumerate() {
        if !ring.iter().any(|&a| mol.atom(a).is_aromatic) {
            continue;
        }
        let ids: Vec<usize> = ring.iter().map(|a| a.index()).collect();

        if !ring.iter().all(|&a| mol.atom(a).is_aromatic) {
            errors.push(AromaticityError::MixedRing { ring: ids });
            continue;
        }
        if !(5..=7).contains(&ring.len()) {
            errors.push(AromaticityError::RingSize {
                ring: ids,
                size: ring.len(),
            });
            continue;
        }

        let pi: u32 = ring.iter().map(|&a| pi_electrons(mol, a)).sum();
        if pi % 4 == 2 {
            valid[ri] = true;
            continue;
        }

        // Per-ring count failed; fall back to the fused system's total.
        let system = systems.iter().find(|s| s.contains(&ri)).unwrap();
        let mut system_atoms: HashSet<NodeIndex> = HashSet::new();
        for &other in system {
            system_atoms.extend(rings[other].iter().copied());
        }
        let all_aromatic = system_atoms.iter().all(|&a| mol.atom(a).is_aromatic);
        let system_pi: u32 = system_atoms.iter().map(|&a| pi_electrons(mol, a)).sum();
        if system.len() > 1 && all_aromatic && system_pi % 4 == 2 {
            valid[ri] = true;
        } else {
            errors.push(AromaticityError::Huckel { ring: ids, pi });
        }
    }

    for (ri, ring) in rings.iter().enumerate() {
        if !valid[ri] {
            continue;
        }
        let len = ring.len();
        for i in 0..len {
            if let Some(edge) = mol.bond_between(ring[i], ring[(i + 1) % len]) {
                mol.bond_mut(edge).order = BondOrder::Aromatic;
            }
        }
    }

    errors
}

/// Pi electrons an aromatic ring atom donates to the ring system.
///
/// Small per-element table following the reference implicit rules: carbonyl
/// carbons and boron donate none, pyrrole-type N/P and the chalcogens donate
/// their lone pair, everything else donates one.
fn pi_electrons(mol: &Molecule, idx: NodeIndex) -> u32 {
    let atom = mol.atom(idx);
    let has_double = mol
        .bonds_of(idx)
        .any(|e| mol.bond(e).order == BondOrder::Double);
    match atom.atomic_num {
        5 => 0,
        6 => {
            if has_double || atom.formal_charge > 0 {
                0
            } else if atom.formal_charge < 0 {
                2
            } else {
                1
            }
        }
        7 | 15 | 33 => {
            if has_double || atom.formal_charge > 0 {
                1
            } else if atom.formal_charge < 0
                || atom.hydrogen_count > 0
                || mol.degree(idx) == 3
            {
                2
            } else {
                1
            }
        }
        8 | 16 | 34 | 52 => {
            if atom.formal_charge > 0 {
                1
            } else {
                2
            }
        }
        _ => 1,
    }
}

/// Group rings into fused systems: rings sharing at least two atoms (an
/// edge) belong to the same system.
fn fused_ring_systems(rings: &[Vec<NodeIndex>]) -> Vec<Vec<usize>> {
    let n = rings.len();
    let mut adj = vec![vec![false; n]; n];
    for i in 0..n {
        let set_i: HashSet<NodeIndex> = rings[i].iter().copied().collect();
        for j in (i + 1)..n {
            let shared = rings[j].iter().filter(|a| set_i.contains(a)).count();
            if shared >= 2 {
                adj[i][j] = true;
                adj[j][i] = true;
            }
        }
    }

    let mut visited = vec![false; n];
    let mut systems = Vec::new();
    for i in 0..n {
        if visited[i] {
            continue;
        }
        let mut system = Vec::new();
        let mut stack = vec![i];
        while let Some(cur) = stack.pop() {
            if visited[cur] {
                continue;
            }
            visited[cur] = true;
            system.push(cur);
            for j in 0..n {
                if adj[cur][j] && !visited[j] {
                    stack.push(j);
                }
            }
        }
        systems.push(system);
    }
    systems
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Atom;
    use crate::bond::Bond;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    fn aromatic_atom(num: u8, h: u8) -> Atom {
        Atom {
            atomic_num: num,
            hydrogen_count: h,
            is_aromatic: true,
            ..Atom::default()
        }
    }

    fn aromatic_ring(nums_h: &[(u8, u8)]) -> Molecule {
        let mut mol = Molecule::new();
        for &(num, h) in nums_h {
            mol.add_atom(aromatic_atom(num, h));
        }
        let len = nums_h.len();
        for i in 0..len {
            mol.add_bond(n(i), n((i + 1) % len), Bond::new(BondOrder::Aromatic));
        }
        mol
    }

    #[test]
    fn benzene_passes() {
        let mut mol = aromatic_ring(&[(6, 1); 6]);
        assert!(validate_aromaticity(&mut mol).is_empty());
    }

    #[test]
    fn pyrrole_passes() {
        let mut mol = aromatic_ring(&[(7, 1), (6, 1), (6, 1), (6, 1), (6, 1)]);
        assert!(validate_aromaticity(&mut mol).is_empty());
    }

    #[test]
    fn pyridine_passes() {
        let mut mol = aromatic_ring(&[(7, 0), (6, 1), (6, 1), (6, 1), (6, 1), (6, 1)]);
        assert!(validate_aromaticity(&mut mol).is_empty());
    }

    #[test]
    fn furan_and_thiophene_pass() {
        for het in [8u8, 16u8] {
            let mut mol = aromatic_ring(&[(het, 0), (6, 1), (6, 1), (6, 1), (6, 1)]);
            assert!(validate_aromaticity(&mut mol).is_empty(), "het {}", het);
        }
    }

    #[test]
    fn cyclobutadiene_fails_huckel() {
        let mut mol = aromatic_ring(&[(6, 1); 4]);
        let errors = validate_aromaticity(&mut mol);
        // four-membered: rejected for size before pi is counted
        assert!(matches!(errors[0], AromaticityError::RingSize { .. }));
    }

    #[test]
    fn aromatic_cyclopentadiene_fails_huckel() {
        // five aromatic CH: 5 pi electrons
        let mut mol = aromatic_ring(&[(6, 1); 5]);
        let errors = validate_aromaticity(&mut mol);
        assert!(matches!(errors[0], AromaticityError::Huckel { pi: 5, .. }));
    }

    #[test]
    fn cyclopentadienyl_anion_passes() {
        let mut mol = aromatic_ring(&[(6, 1); 5]);
        mol.atom_mut(n(0)).formal_charge = -1;
        mol.atom_mut(n(0)).is_bracket = true;
        assert!(validate_aromaticity(&mut mol).is_empty());
    }

    #[test]
    fn mixed_ring_rejected() {
        let mut mol = aromatic_ring(&[(6, 1); 6]);
        mol.atom_mut(n(2)).is_aromatic = false;
        let errors = validate_aromaticity(&mut mol);
        assert!(matches!(errors[0], AromaticityError::MixedRing { .. }));
    }

    #[test]
    fn isolated_aromatic_atom_rejected() {
        let mut mol = Molecule::new();
        mol.add_atom(aromatic_atom(6, 3));
        let errors = validate_aromaticity(&mut mol);
        assert_eq!(errors, vec![AromaticityError::NotInRing { atom: 0 }]);
    }

    #[test]
    fn promotes_ring_bonds() {
        let mut mol = aromatic_ring(&[(6, 1); 6]);
        // write one ring bond as single; the validator promotes it
        let e = mol.bond_between(n(0), n(1)).unwrap();
        mol.bond_mut(e).order = BondOrder::Single;
        assert!(validate_aromaticity(&mut mol).is_empty());
        assert_eq!(mol.bond(e).order, BondOrder::Aromatic);
    }

    #[test]
    fn carbonyl_carbon_donates_nothing() {
        // pyranone-like: aromatic C with exocyclic =O contributes 0
        let mut mol = aromatic_ring(&[(6, 1); 6]);
        mol.atom_mut(n(0)).hydrogen_count = 0;
        let o = mol.add_atom(Atom {
            atomic_num: 8,
            ..Atom::default()
        });
        mol.add_bond(n(0), o, Bond::new(BondOrder::Double));
        let errors = validate_aromaticity(&mut mol);
        assert!(matches!(errors[0], AromaticityError::Huckel { pi: 5, .. }));
    }
}
