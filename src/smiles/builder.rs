use std::collections::HashMap;

use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder, BondStereo};
use crate::graph_ops::get_fragments;
use crate::mol::{permutation_parity, Molecule};
use crate::smiles::error::SmilesError;
use crate::smiles::tokenizer::{AtomToken, BondToken, Token};
use crate::stereo::h_sentinel;

/// One entry of an atom's neighbor list in written order, used to resolve
/// chirality parity. Ring entries hold the digit until the closure patches
/// in the partner atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Written {
    Atom(NodeIndex),
    Ring(u16),
    H,
}

#[derive(Debug, Clone, Copy)]
struct RingOpen {
    atom: NodeIndex,
    bond: Option<BondToken>,
}

/// Build molecules from a token stream.
///
/// Implements the single-pass builder: `prev` is the attachment point,
/// `pending` the bond symbol waiting for its second atom, the branch stack
/// restores `prev` on `)`, and the ring table pairs closure digits. The
/// ring table deliberately survives `.` so closures may bridge what the dot
/// separated. All problems are recorded and building continues; the result
/// is one `Molecule` per connected component, atoms in parse order.
pub fn build(tokens: &[Token]) -> (Vec<Molecule>, Vec<SmilesError>) {
    let mut mol = Molecule::new();
    let mut errors = Vec::new();
    let mut written: Vec<Vec<Written>> = Vec::new();

    let mut prev: Option<NodeIndex> = None;
    let mut pending: Option<(BondToken, usize)> = None;
    let mut branch_stack: Vec<(NodeIndex, usize)> = Vec::new();
    let mut ring_table: HashMap<u16, RingOpen> = HashMap::new();
    let mut trailing_dot: Option<usize> = None;

    for token in tokens {
        match token {
            Token::Atom(tok) => {
                trailing_dot = None;
                let idx = add_atom(&mut mol, &mut written, tok);

                if let Some(p) = prev {
                    let bond_tok = pending.take().map(|(b, _)| b);
                    let bond = bond_from_token(
                        bond_tok,
                        mol.atom(p).is_aromatic,
                        mol.atom(idx).is_aromatic,
                    );
                    mol.add_bond(p, idx, bond);
                    written[p.index()].push(Written::Atom(idx));
                    // the preceding atom is written before the bracket H
                    written[idx.index()].insert(0, Written::Atom(p));
                }
                prev = Some(idx);
            }
            Token::Bond { bond, pos } => {
                if pending.is_some() {
                    errors.push(SmilesError::BadBondSequence { pos: *pos });
                } else if prev.is_none() {
                    errors.push(SmilesError::StrayBond { pos: *pos });
                } else {
                    pending = Some((*bond, *pos));
                }
            }
            Token::RingClosure { digit, pos } => {
                let Some(cur) = prev else {
                    errors.push(SmilesError::BadRingNumber { pos: *pos });
                    pending = None;
                    continue;
                };
                let ring_bond = pending.take().map(|(b, _)| b);
                match ring_table.remove(digit) {
                    Some(open) => {
                        if let Err(e) =
                            close_ring(&mut mol, &mut written, open, cur, ring_bond, *digit)
                        {
                            errors.push(e);
                        }
                    }
                    None => {
                        ring_table.insert(
                            *digit,
                            RingOpen {
                                atom: cur,
                                bond: ring_bond,
                            },
                        );
                        written[cur.index()].push(Written::Ring(*digit));
                    }
                }
            }
            Token::OpenParen(pos) => {
                if let Some((_, bond_pos)) = pending.take() {
                    errors.push(SmilesError::BadBondSequence { pos: bond_pos });
                }
                match prev {
                    Some(p) => branch_stack.push((p, *pos)),
                    None => errors.push(SmilesError::UnbalancedParen { pos: *pos }),
                }
            }
            Token::CloseParen(pos) => {
                if let Some((_, bond_pos)) = pending.take() {
                    errors.push(SmilesError::StrayBond { pos: bond_pos });
                }
                match branch_stack.pop() {
                    Some((p, _)) => prev = Some(p),
                    None => errors.push(SmilesError::UnbalancedParen { pos: *pos }),
                }
            }
            Token::Dot(pos) => {
                if let Some((_, bond_pos)) = pending.take() {
                    errors.push(SmilesError::StrayBond { pos: bond_pos });
                }
                if prev.is_none() {
                    errors.push(SmilesError::MisplacedDot { pos: *pos });
                } else {
                    trailing_dot = Some(*pos);
                }
                prev = None;
            }
        }
    }

    if let Some((_, pos)) = pending {
        errors.push(SmilesError::StrayBond { pos });
    }
    for &(_, pos) in &branch_stack {
        errors.push(SmilesError::UnbalancedParen { pos });
    }
    if let Some(pos) = trailing_dot {
        errors.push(SmilesError::MisplacedDot { pos });
    }
    let mut dangling: Vec<u16> = ring_table.keys().copied().collect();
    dangling.sort_unstable();
    for digit in dangling {
        errors.push(SmilesError::DanglingRingClosure { digit });
    }

    // drop placeholders of rings that never closed
    for list in &mut written {
        list.retain(|w| !matches!(w, Written::Ring(_)));
    }

    fill_implicit_hydrogens(&mut mol);
    resolve_chirality(&mut mol, &written);

    (get_fragments(&mol), errors)
}

fn add_atom(mol: &mut Molecule, written: &mut Vec<Vec<Written>>, tok: &AtomToken) -> NodeIndex {
    let atom = Atom {
        atomic_num: tok.element.map(|e| e.atomic_num()).unwrap_or(0),
        formal_charge: tok.charge,
        isotope: tok.isotope,
        hydrogen_count: if tok.is_bracket {
            tok.hcount.unwrap_or(0)
        } else {
            0
        },
        is_aromatic: tok.is_aromatic,
        chirality: tok.chirality,
        atom_class: tok.atom_class,
        is_bracket: tok.is_bracket,
    };
    let has_h = tok.is_bracket && tok.hcount.unwrap_or(0) > 0;
    let idx = mol.add_atom(atom);
    let mut list = Vec::new();
    if has_h {
        list.push(Written::H);
    }
    written.push(list);
    idx
}

fn bond_from_token(tok: Option<BondToken>, a_aromatic: bool, b_aromatic: bool) -> Bond {
    match tok {
        None => {
            if a_aromatic && b_aromatic {
                Bond::new(BondOrder::Aromatic)
            } else {
                Bond::new(BondOrder::Single)
            }
        }
        Some(BondToken::Single) => Bond::new(BondOrder::Single),
        Some(BondToken::Double) => Bond::new(BondOrder::Double),
        Some(BondToken::Triple) => Bond::new(BondOrder::Triple),
        Some(BondToken::Quadruple) => Bond::new(BondOrder::Quadruple),
        Some(BondToken::Aromatic) => Bond::new(BondOrder::Aromatic),
        Some(BondToken::Up) => Bond {
            order: BondOrder::Single,
            stereo: BondStereo::Up,
        },
        Some(BondToken::Down) => Bond {
            order: BondOrder::Single,
            stereo: BondStereo::Down,
        },
    }
}

/// Directional tokens flip when read from the closing side: the closer
/// writes the bond toward the opener, but the bond is stored opener-first.
fn normalize_close_bond(tok: BondToken) -> BondToken {
    match tok {
        BondToken::Up => BondToken::Down,
        BondToken::Down => BondToken::Up,
        other => other,
    }
}

fn close_ring(
    mol: &mut Molecule,
    written: &mut [Vec<Written>],
    open: RingOpen,
    cur: NodeIndex,
    close_bond: Option<BondToken>,
    digit: u16,
) -> Result<(), SmilesError> {
    let unpatch = |written: &mut [Vec<Written>]| {
        let list = &mut written[open.atom.index()];
        if let Some(pos) = list.iter().rposition(|w| *w == Written::Ring(digit)) {
            list.remove(pos);
        }
    };

    if open.atom == cur {
        unpatch(written);
        return Err(SmilesError::RingSelfBond { digit });
    }
    if mol.bond_between(open.atom, cur).is_some() {
        unpatch(written);
        return Err(SmilesError::DuplicateBond { digit });
    }

    let close_norm = close_bond.map(normalize_close_bond);
    let bond_tok = match (open.bond, close_norm) {
        (None, None) => None,
        (Some(b), None) | (None, Some(b)) => Some(b),
        (Some(a), Some(b)) => {
            if a == b {
                Some(a)
            } else {
                unpatch(written);
                return Err(SmilesError::RingBondConflict { digit });
            }
        }
    };

    let bond = bond_from_token(
        bond_tok,
        mol.atom(open.atom).is_aromatic,
        mol.atom(cur).is_aromatic,
    );
    mol.add_bond(open.atom, cur, bond);

    let list = &mut written[open.atom.index()];
    if let Some(pos) = list.iter().rposition(|w| *w == Written::Ring(digit)) {
        list[pos] = Written::Atom(cur);
    }
    written[cur.index()].push(Written::Atom(open.atom));
    Ok(())
}

/// Fill implicit hydrogens on organic-subset atoms: smallest default
/// valence that fits the bond-order sum, aromatic bonds counting one, and
/// aromatic atoms giving one hydrogen back to the ring.
fn fill_implicit_hydrogens(mol: &mut Molecule) {
    let indices: Vec<NodeIndex> = mol.atoms().collect();
    for idx in indices {
        let atom = mol.atom(idx);
        if atom.is_bracket || atom.is_wildcard() {
            continue;
        }
        let Some(elem) = atom.element() else { continue };
        let valences = elem.default_valences();
        if valences.is_empty() {
            continue;
        }
        let is_aromatic = atom.is_aromatic;

        let bond_sum: u8 = mol
            .bonds_of(idx)
            .map(|e| match mol.bond(e).order {
                BondOrder::Single => 1u8,
                BondOrder::Double => 2,
                BondOrder::Triple => 3,
                BondOrder::Quadruple => 4,
                BondOrder::Aromatic => 1,
            })
            .sum();

        let target = valences
            .iter()
            .find(|&&v| v >= bond_sum)
            .copied()
            .unwrap_or(0);
        let mut h = target.saturating_sub(bond_sum);
        if is_aromatic && h > 0 {
            h -= 1;
        }
        mol.atom_mut(idx).hydrogen_count = h;
    }
}

/// Normalize `@`/`@@` from the written neighbor order to the molecule's
/// neighbor iteration order, so the stored tag no longer depends on how the
/// source spelled the neighborhood.
fn resolve_chirality(mol: &mut Molecule, written: &[Vec<Written>]) {
    let indices: Vec<NodeIndex> = mol.atoms().collect();
    for idx in indices {
        let atom = mol.atom(idx);
        if !atom.chirality.is_parity() {
            continue;
        }
        let has_h = atom.is_bracket && atom.hydrogen_count > 0;

        let written_order: Vec<NodeIndex> = written[idx.index()]
            .iter()
            .filter_map(|w| match w {
                Written::Atom(n) => Some(*n),
                Written::H => Some(h_sentinel()),
                Written::Ring(_) => None,
            })
            .collect();

        let mut graph_order: Vec<NodeIndex> = Vec::new();
        if has_h {
            graph_order.push(h_sentinel());
        }
        graph_order.extend(mol.neighbors(idx));

        if !permutation_parity(&written_order, &graph_order) {
            let atom = mol.atom_mut(idx);
            atom.chirality = atom.chirality.flipped();
        }
    }
}
