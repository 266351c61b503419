use cansmi::{generate, parse, to_canonical_smiles, Molecule};

fn parse_one(smiles: &str) -> Molecule {
    let mut result = parse(smiles);
    assert!(
        result.errors.is_empty(),
        "parse errors for {:?}: {:?}",
        smiles,
        result.errors
    );
    assert_eq!(result.molecules.len(), 1, "expected one molecule from {:?}", smiles);
    result.molecules.remove(0)
}

fn canonical(smiles: &str) -> String {
    let result = parse(smiles);
    assert!(
        result.errors.is_empty(),
        "parse errors for {:?}: {:?}",
        smiles,
        result.errors
    );
    generate(&result.molecules, true)
}

// Fragment ordering must not depend on input order
#[test]
fn fragment_ordering_nacl() {
    let a = canonical("[Na+].[Cl-]");
    let b = canonical("[Cl-].[Na+]");
    assert_eq!(a, b, "fragment ordering: '{a}' vs '{b}'");
}

#[test]
fn fragment_ordering_three() {
    let a = canonical("[Na+].[Cl-].O");
    let b = canonical("O.[Na+].[Cl-]");
    assert_eq!(a, b, "fragment ordering: '{a}' vs '{b}'");
}

// Chirality must be stable under different input orderings
#[test]
fn chirality_stability_1() {
    let a = canonical("[C@@H](F)(Cl)Br");
    let b = canonical("F[C@H](Cl)Br");
    assert_eq!(a, b, "chirality stability: '{a}' vs '{b}'");
}

#[test]
fn chirality_stability_2() {
    let a = canonical("[C@@H](F)(Cl)Br");
    let b = canonical("Cl[C@@H](F)Br");
    assert_eq!(a, b, "chirality stability: '{a}' vs '{b}'");
}

#[test]
fn chirality_stability_3() {
    let a = canonical("[C@@H](F)(Cl)Br");
    let b = canonical("Br[C@H](F)Cl");
    assert_eq!(a, b, "chirality stability: '{a}' vs '{b}'");
}

#[test]
fn chirality_stability_4() {
    let a = canonical("[C@](F)(Cl)(Br)I");
    let b = canonical("F[C@](Cl)(Br)I");
    assert_eq!(a, b, "chirality stability: '{a}' vs '{b}'");
}

#[test]
fn chirality_stability_alanine() {
    let a = canonical("N[C@@H](C)C(=O)O");
    let b = canonical("[C@H](N)(C)C(=O)O");
    assert_eq!(a, b, "chirality stability alanine: '{a}' vs '{b}'");
}

#[test]
fn enantiomers_stay_distinct() {
    let a = canonical("N[C@@H](C)C(=O)O");
    let b = canonical("N[C@H](C)C(=O)O");
    assert_ne!(a, b, "enantiomers collapsed to '{a}'");
}

// E/Z stereo must survive atom renumbering
#[test]
fn ez_renumber_trans() {
    let mol = parse_one("F/C=C/F");
    let n = mol.atom_count();
    let reversed: Vec<usize> = (0..n).rev().collect();
    let renum = mol.renumber(&reversed).unwrap();
    let s1 = to_canonical_smiles(&mol);
    let s2 = to_canonical_smiles(&renum);
    assert_eq!(s1, s2, "E/Z renumber trans: '{s1}' vs '{s2}'");
}

#[test]
fn ez_renumber_cis() {
    let mol = parse_one(r"F/C=C\F");
    let n = mol.atom_count();
    let reversed: Vec<usize> = (0..n).rev().collect();
    let renum = mol.renumber(&reversed).unwrap();
    let s1 = to_canonical_smiles(&mol);
    let s2 = to_canonical_smiles(&renum);
    assert_eq!(s1, s2, "E/Z renumber cis: '{s1}' vs '{s2}'");
}

#[test]
fn ez_renumber_chlorine() {
    let mol = parse_one("Cl/C=C/Cl");
    let n = mol.atom_count();
    let reversed: Vec<usize> = (0..n).rev().collect();
    let renum = mol.renumber(&reversed).unwrap();
    assert_eq!(to_canonical_smiles(&mol), to_canonical_smiles(&renum));
}

#[test]
fn ez_renumber_mixed() {
    let mol = parse_one(r"F/C=C/[C@@H](Cl)Br");
    let n = mol.atom_count();
    let reversed: Vec<usize> = (0..n).rev().collect();
    let renum = mol.renumber(&reversed).unwrap();
    assert_eq!(to_canonical_smiles(&mol), to_canonical_smiles(&renum));
}

#[test]
fn ez_renumber_shifted() {
    let mol = parse_one("F/C=C/F");
    let renum = mol.renumber(&[1, 2, 3, 0]).unwrap();
    assert_eq!(to_canonical_smiles(&mol), to_canonical_smiles(&renum));
}

#[test]
fn ez_equivalent_spellings() {
    let a = canonical(r"Cl/C=C(\F)Br");
    let b = canonical(r"F/C(Br)=C\Cl");
    assert_eq!(a, b, "equivalent E/Z spellings: '{a}' vs '{b}'");
}

// Idempotence on stereo-rich molecules
#[test]
fn glucose_idempotence() {
    let first = canonical("OC[C@H]1OC(O)[C@H](O)[C@@H](O)[C@@H]1O");
    let second = canonical(&first);
    assert_eq!(first, second, "glucose idempotence: '{first}' vs '{second}'");
}

#[test]
fn caffeine_idempotence() {
    let first = canonical("Cn1cnc2c1c(=O)n(c(=O)n2C)C");
    let second = canonical(&first);
    assert_eq!(first, second, "caffeine idempotence: '{first}' vs '{second}'");
}

#[test]
fn aspirin_idempotence() {
    let first = canonical("CC(=O)Oc1ccccc1C(=O)O");
    let second = canonical(&first);
    assert_eq!(first, second, "aspirin idempotence: '{first}' vs '{second}'");
}
