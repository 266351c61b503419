//! Cross-module integration checks on a small shared corpus.

use crate::bond::BondOrder;
use crate::rings::RingInfo;
use crate::smiles::{generate, parse};

const CORPUS: &[&str] = &[
    "C",
    "CCO",
    "CC(=O)O",
    "CC(C)(C)C",
    "C1CC1",
    "C1CCCCC1",
    "c1ccccc1",
    "c1ccncc1",
    "c1cc[nH]c1",
    "c1ccoc1",
    "c1ccc2ccccc2c1",
    "Oc1ccccc1",
    "C[N+](=O)[O-]",
    "[NH4+]",
    "[13C]",
    "[2H]O[2H]",
    "F/C=C/F",
    r"F/C=C\F",
    "N[C@@H](C)C(=O)O",
    "[Na+].[Cl-]",
    "CCO.O",
    "CC(=O)Oc1ccccc1C(=O)O",
    "Cn1cnc2c1c(=O)n(c(=O)n2C)C",
];

#[test]
fn corpus_parses_cleanly() {
    for &smiles in CORPUS {
        let result = parse(smiles);
        assert!(
            result.errors.is_empty(),
            "errors for {:?}: {:?}",
            smiles,
            result.errors
        );
        assert!(!result.molecules.is_empty(), "no molecules for {:?}", smiles);
    }
}

#[test]
fn bonds_reference_existing_distinct_atoms() {
    for &smiles in CORPUS {
        for mol in parse(smiles).molecules {
            for e in mol.bonds() {
                let (a, b) = mol.bond_endpoints(e).expect("endpoints");
                assert_ne!(a, b, "{:?}", smiles);
                assert!(a.index() < mol.atom_count());
                assert!(b.index() < mol.atom_count());
            }
        }
    }
}

#[test]
fn no_duplicate_bonds() {
    for &smiles in CORPUS {
        for mol in parse(smiles).molecules {
            let mut seen = std::collections::HashSet::new();
            for e in mol.bonds() {
                let (a, b) = mol.bond_endpoints(e).unwrap();
                assert!(
                    seen.insert((a.min(b), a.max(b))),
                    "duplicate bond in {:?}",
                    smiles
                );
            }
        }
    }
}

#[test]
fn aromatic_rings_are_uniform() {
    for &smiles in CORPUS {
        for mol in parse(smiles).molecules {
            let ring_info = RingInfo::sssr(&mol);
            for ring in ring_info.rings() {
                if !ring.iter().any(|&a| mol.atom(a).is_aromatic) {
                    continue;
                }
                assert!(
                    ring.iter().all(|&a| mol.atom(a).is_aromatic),
                    "mixed aromatic ring in {:?}",
                    smiles
                );
                let len = ring.len();
                for i in 0..len {
                    if let Some(e) = mol.bond_between(ring[i], ring[(i + 1) % len]) {
                        assert_eq!(
                            mol.bond(e).order,
                            BondOrder::Aromatic,
                            "unpromoted ring bond in {:?}",
                            smiles
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn canonical_round_trip_preserves_structure() {
    for &smiles in CORPUS {
        let first = parse(smiles);
        let out = generate(&first.molecules, true);
        let second = parse(&out);
        assert!(
            second.errors.is_empty(),
            "reparse errors for {:?} -> {:?}: {:?}",
            smiles,
            out,
            second.errors
        );
        let atoms1: usize = first.molecules.iter().map(|m| m.atom_count()).sum();
        let atoms2: usize = second.molecules.iter().map(|m| m.atom_count()).sum();
        assert_eq!(atoms1, atoms2, "atom count changed for {:?}", smiles);
        let bonds1: usize = first.molecules.iter().map(|m| m.bond_count()).sum();
        let bonds2: usize = second.molecules.iter().map(|m| m.bond_count()).sum();
        assert_eq!(bonds1, bonds2, "bond count changed for {:?}", smiles);
    }
}

#[test]
fn hydrogen_totals_preserved_by_round_trip() {
    for &smiles in CORPUS {
        let first = parse(smiles);
        let out = generate(&first.molecules, true);
        let second = parse(&out);
        let h1: u32 = first
            .molecules
            .iter()
            .flat_map(|m| m.atoms().map(|i| m.atom(i).hydrogen_count as u32).collect::<Vec<_>>())
            .sum();
        let h2: u32 = second
            .molecules
            .iter()
            .flat_map(|m| m.atoms().map(|i| m.atom(i).hydrogen_count as u32).collect::<Vec<_>>())
            .sum();
        assert_eq!(h1, h2, "hydrogen total changed for {:?} -> {:?}", smiles, out);
    }
}
