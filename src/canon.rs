use std::cmp::Reverse;

use log::debug;
use petgraph::graph::NodeIndex;

use crate::mol::Molecule;
use crate::rings::RingInfo;

/// Initial atom invariant: element, degree, charge, aromaticity, implicit
/// hydrogens (descending — hydrogen-rich atoms rank earlier, which is what
/// puts carbonyl branches before hydroxyl chains), isotope, ring
/// membership count, chirality presence.
type Invariant = (u8, u8, i8, bool, Reverse<u8>, u16, u8, bool);

fn initial_invariant(mol: &Molecule, ring_info: &RingInfo, idx: NodeIndex) -> Invariant {
    let atom = mol.atom(idx);
    (
        atom.atomic_num,
        mol.degree(idx) as u8,
        atom.formal_charge,
        atom.is_aromatic,
        Reverse(atom.hydrogen_count),
        atom.isotope,
        ring_info.ring_count_for(idx) as u8,
        !atom.chirality.is_none(),
    )
}

/// Dense ranks 0..k-1 from sortable keys, ties collapsed.
fn ranks_from_keys<K: Ord>(keys: &[K]) -> Vec<usize> {
    let n = keys.len();
    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by(|&a, &b| keys[a].cmp(&keys[b]));
    let mut ranks = vec![0usize; n];
    let mut rank = 0usize;
    for i in 1..n {
        if keys[indices[i]] != keys[indices[i - 1]] {
            rank += 1;
        }
        ranks[indices[i]] = rank;
    }
    ranks
}

fn count_distinct(ranks: &[usize]) -> usize {
    let mut sorted: Vec<usize> = ranks.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.len()
}

/// One round of neighborhood refinement: an atom's new key is its old rank
/// plus the sorted multiset of (neighbor rank, bond order) pairs. Iterates
/// until the number of distinct ranks stops increasing.
fn refine(mol: &Molecule, ranks: &mut Vec<usize>) {
    let mut prev_distinct = count_distinct(ranks);
    loop {
        let keys: Vec<(usize, Vec<(usize, u8)>)> = mol
            .atoms()
            .map(|node| {
                let mut env: Vec<(usize, u8)> = mol
                    .bonds_of(node)
                    .map(|e| {
                        let nb = mol.other_endpoint(e, node).unwrap();
                        (ranks[nb.index()], mol.bond(e).order.numeric())
                    })
                    .collect();
                env.sort_unstable();
                (ranks[node.index()], env)
            })
            .collect();
        let new_ranks = ranks_from_keys(&keys);
        let distinct = count_distinct(&new_ranks);
        if distinct <= prev_distinct {
            return;
        }
        *ranks = new_ranks;
        prev_distinct = distinct;
    }
}

/// Total canonical order on the atoms of one molecule.
///
/// Refinement alone cannot separate symmetry-equivalent atoms, so remaining
/// ties are broken by forcing one tied atom — smallest original invariant,
/// then smallest id as the last resort — below its bucket and refining
/// again, until every atom has a unique rank. The result is insensitive to
/// the input numbering except through that last-resort id comparison, which
/// only fires between symmetry-equivalent atoms.
pub fn canonical_ranks(mol: &Molecule) -> Vec<usize> {
    let n = mol.atom_count();
    if n == 0 {
        return Vec::new();
    }

    let ring_info = RingInfo::sssr(mol);
    let invariants: Vec<Invariant> = (0..n)
        .map(|i| initial_invariant(mol, &ring_info, NodeIndex::new(i)))
        .collect();

    let mut ranks = ranks_from_keys(&invariants);
    refine(mol, &mut ranks);

    let mut tie_breaks = 0usize;
    while count_distinct(&ranks) < n {
        let min_tied = find_min_tied_rank(&ranks);
        let tied: Vec<usize> = (0..n).filter(|&i| ranks[i] == min_tied).collect();
        let chosen = *tied
            .iter()
            .min_by(|&&a, &&b| invariants[a].cmp(&invariants[b]).then_with(|| a.cmp(&b)))
            .unwrap();

        // Push every other member of the bucket one half-step up, keeping
        // the chosen atom at the bucket's bottom rank.
        let keys: Vec<(usize, u8)> = (0..n)
            .map(|i| {
                let bump = u8::from(ranks[i] == min_tied && i != chosen);
                (ranks[i], bump)
            })
            .collect();
        ranks = ranks_from_keys(&keys);
        refine(mol, &mut ranks);
        tie_breaks += 1;
    }

    if tie_breaks > 0 {
        debug!("canonical ranking needed {} tie break(s)", tie_breaks);
    }

    ranks
}

fn find_min_tied_rank(ranks: &[usize]) -> usize {
    let mut counts = std::collections::HashMap::new();
    for &r in ranks {
        *counts.entry(r).or_insert(0usize) += 1;
    }
    *counts
        .iter()
        .filter(|(_, &count)| count > 1)
        .map(|(rank, _)| rank)
        .min()
        .unwrap()
}
