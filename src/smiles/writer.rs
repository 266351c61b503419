use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::Chirality;
use crate::bond::{BondOrder, BondStereo};
use crate::canon::canonical_ranks;
use crate::element::Element;
use crate::mol::{permutation_parity, Molecule};
use crate::stereo::{h_sentinel, perceive_ez_bonds, DoubleBondConfig};

/// Render molecules as SMILES, joined by `.`.
///
/// Canonical mode starts each fragment at its rank-0 atom, walks children
/// highest-rank-first so the lowest-rank child continues the main chain,
/// normalizes directional markers, and orders fragments deterministically.
/// Plain mode follows the original atom ids and passes raw markers through.
/// Empty input renders as the empty string.
pub fn generate(molecules: &[Molecule], canonical: bool) -> String {
    let mut parts: Vec<String> = molecules
        .iter()
        .flat_map(|mol| fragment_strings(mol, canonical))
        .collect();
    if canonical {
        parts.sort();
    }
    parts.join(".")
}

pub fn to_canonical_smiles(mol: &Molecule) -> String {
    generate(std::slice::from_ref(mol), true)
}

pub fn to_smiles(mol: &Molecule) -> String {
    generate(std::slice::from_ref(mol), false)
}

/// Direction of a marked single bond, read along the stored endpoint order.
type DirMap = HashMap<EdgeIndex, BondStereo>;

fn dir_along(mol: &Molecule, dirs: &DirMap, edge: EdgeIndex, from: NodeIndex) -> Option<BondStereo> {
    let d = *dirs.get(&edge)?;
    let (a, _) = mol.bond_endpoints(edge).unwrap();
    Some(if a == from { d } else { d.flipped() })
}

fn assign_dir(mol: &Molecule, dirs: &mut DirMap, edge: EdgeIndex, from: NodeIndex, dir: BondStereo) {
    let (a, _) = mol.bond_endpoints(edge).unwrap();
    let stored = if a == from { dir } else { dir.flipped() };
    dirs.insert(edge, stored);
}

/// Markers for plain output: keep what the parser stored, minus markers
/// whose bond no longer sits next to a double bond.
fn raw_directions(mol: &Molecule) -> DirMap {
    let mut dirs = DirMap::new();
    for edge in mol.bonds() {
        let bond = mol.bond(edge);
        if bond.order != BondOrder::Single {
            continue;
        }
        let dir = match bond.stereo {
            BondStereo::Up | BondStereo::Down => bond.stereo,
            BondStereo::None | BondStereo::Either => continue,
        };
        let (a, b) = mol.bond_endpoints(edge).unwrap();
        let beside_double = [a, b].into_iter().any(|end| {
            mol.bonds_of(end)
                .any(|e| mol.bond(e).order == BondOrder::Double)
        });
        if beside_double {
            dirs.insert(edge, dir);
        }
    }
    dirs
}

/// Markers for canonical output: each perceived double bond is re-anchored
/// to the highest-rank single-bond neighbor on both ends and its directions
/// reassigned from scratch, so every equivalent input spelling collapses to
/// one form. Bonds shared between conjugated double bonds keep whichever
/// direction was fixed first; processing order follows the ranks.
fn normalized_directions(mol: &Molecule, ranks: &[usize]) -> DirMap {
    let (mut ez_bonds, _) = perceive_ez_bonds(mol);
    ez_bonds.sort_by_key(|ez| {
        let a = ranks[ez.left.index()];
        let b = ranks[ez.right.index()];
        (a.min(b), a.max(b))
    });

    let mut dirs = DirMap::new();
    for ez in &mut ez_bonds {
        for end in [ez.left, ez.right] {
            let best = mol
                .bonds_of(end)
                .filter(|&e| e != ez.edge && mol.bond(e).order == BondOrder::Single)
                .map(|e| mol.other_endpoint(e, end).unwrap())
                .max_by_key(|nb| ranks[nb.index()]);
            if let Some(nb) = best {
                ez.reanchor(end, nb);
            }
        }

        // Seed directions from the lower-rank end so the choice does not
        // depend on the stored endpoint order of the double bond.
        let (lo, lo_ref, hi, hi_ref) = if ranks[ez.left.index()] <= ranks[ez.right.index()] {
            (ez.left, ez.left_ref, ez.right, ez.right_ref)
        } else {
            (ez.right, ez.right_ref, ez.left, ez.left_ref)
        };
        let lo_edge = mol.bond_between(lo, lo_ref).unwrap();
        let hi_edge = mol.bond_between(hi, hi_ref).unwrap();
        let trans = ez.config == DoubleBondConfig::Trans;
        match (
            dir_along(mol, &dirs, lo_edge, lo),
            dir_along(mol, &dirs, hi_edge, hi),
        ) {
            (None, None) => {
                assign_dir(mol, &mut dirs, lo_edge, lo, BondStereo::Down);
                let d = if trans { BondStereo::Up } else { BondStereo::Down };
                assign_dir(mol, &mut dirs, hi_edge, hi, d);
            }
            (Some(l), None) => {
                let d = if trans { l.flipped() } else { l };
                assign_dir(mol, &mut dirs, hi_edge, hi, d);
            }
            (None, Some(r)) => {
                let d = if trans { r.flipped() } else { r };
                assign_dir(mol, &mut dirs, lo_edge, lo, d);
            }
            (Some(_), Some(_)) => {}
        }
    }
    dirs
}

#[derive(Debug, Clone, Copy)]
struct RingBond {
    edge: EdgeIndex,
    other: NodeIndex,
}

struct FragTree {
    start: NodeIndex,
    preorder: Vec<NodeIndex>,
    parent: Vec<Option<NodeIndex>>,
    children: Vec<Vec<NodeIndex>>,
    /// back-edges whose earlier (ancestor) endpoint is this atom
    opens: Vec<Vec<RingBond>>,
    /// back-edges whose later endpoint is this atom
    closes: Vec<Vec<RingBond>>,
}

fn fragment_strings(mol: &Molecule, canonical: bool) -> Vec<String> {
    let n = mol.atom_count();
    if n == 0 {
        return Vec::new();
    }
    let ranks: Vec<usize> = if canonical {
        canonical_ranks(mol)
    } else {
        (0..n).collect()
    };
    let dirs = if canonical {
        normalized_directions(mol, &ranks)
    } else {
        raw_directions(mol)
    };

    let mut visited = vec![false; n];
    let mut parts = Vec::new();
    while let Some(start) = (0..n)
        .filter(|&i| !visited[i])
        .min_by_key(|&i| ranks[i])
    {
        let tree = build_tree(mol, NodeIndex::new(start), &ranks, canonical, &mut visited);
        parts.push(emit_fragment(mol, &tree, &dirs));
    }
    parts
}

/// First pass: fix the DFS tree. Children are recorded in visit order;
/// every non-tree edge becomes a ring bond opening at its ancestor
/// endpoint. Visiting highest rank first means lower-rank neighbors get
/// absorbed into deeper chains, which is what keeps rings unbranched.
fn build_tree(
    mol: &Molecule,
    start: NodeIndex,
    ranks: &[usize],
    canonical: bool,
    visited: &mut [bool],
) -> FragTree {
    let n = mol.atom_count();
    let mut parent = vec![None; n];
    let mut children: Vec<Vec<NodeIndex>> = vec![Vec::new(); n];
    let mut opens: Vec<Vec<RingBond>> = vec![Vec::new(); n];
    let mut closes: Vec<Vec<RingBond>> = vec![Vec::new(); n];
    let mut used_edge = vec![false; mol.bond_count()];
    let mut preorder = Vec::new();

    let sorted_neighbors = |node: NodeIndex| -> Vec<(EdgeIndex, NodeIndex)> {
        let mut v: Vec<(EdgeIndex, NodeIndex)> = mol
            .bonds_of(node)
            .map(|e| (e, mol.other_endpoint(e, node).unwrap()))
            .collect();
        if canonical {
            v.sort_by_key(|&(_, nb)| Reverse(ranks[nb.index()]));
        } else {
            v.sort_by_key(|&(_, nb)| nb.index());
        }
        v
    };

    visited[start.index()] = true;
    preorder.push(start);
    let mut stack: Vec<(NodeIndex, Vec<(EdgeIndex, NodeIndex)>, usize)> =
        vec![(start, sorted_neighbors(start), 0)];

    while let Some(frame) = stack.last_mut() {
        if frame.2 >= frame.1.len() {
            stack.pop();
            continue;
        }
        let node = frame.0;
        let (edge, nb) = frame.1[frame.2];
        frame.2 += 1;

        if used_edge[edge.index()] {
            continue;
        }
        used_edge[edge.index()] = true;

        if !visited[nb.index()] {
            visited[nb.index()] = true;
            parent[nb.index()] = Some(node);
            children[node.index()].push(nb);
            preorder.push(nb);
            let frame = (nb, sorted_neighbors(nb), 0);
            stack.push(frame);
        } else {
            // undirected DFS: the visited endpoint is an ancestor
            opens[nb.index()].push(RingBond { edge, other: node });
            closes[node.index()].push(RingBond { edge, other: nb });
        }
    }

    FragTree {
        start,
        preorder,
        parent,
        children,
        opens,
        closes,
    }
}

/// Second pass: hand out ring-closure digits in emission order, smallest
/// free digit first, returning a digit to the pool once its closing atom
/// has been written.
fn assign_digits(tree: &FragTree) -> HashMap<usize, u8> {
    let mut free: BTreeSet<u8> = (1..=99).collect();
    let mut digits: HashMap<usize, u8> = HashMap::new();
    for &node in &tree.preorder {
        for rb in &tree.opens[node.index()] {
            let d = *free.iter().next().expect("ring-closure digits exhausted");
            free.remove(&d);
            digits.insert(rb.edge.index(), d);
        }
        for rb in &tree.closes[node.index()] {
            free.insert(digits[&rb.edge.index()]);
        }
    }
    digits
}

fn emit_fragment(mol: &Molecule, tree: &FragTree, dirs: &DirMap) -> String {
    let digits = assign_digits(tree);
    let mut out = String::new();
    write_node(mol, tree, dirs, &digits, tree.start, &mut out);
    out
}

fn write_node(
    mol: &Molecule,
    tree: &FragTree,
    dirs: &DirMap,
    digits: &HashMap<usize, u8>,
    node: NodeIndex,
    out: &mut String,
) {
    let chir = output_chirality(mol, tree, node);
    write_atom_token(mol, node, chir, out);

    for rb in &tree.closes[node.index()] {
        write_bond_symbol(mol, dirs, rb.edge, node, rb.other, out);
        write_ring_digit(digits[&rb.edge.index()], out);
    }
    for rb in &tree.opens[node.index()] {
        write_ring_digit(digits[&rb.edge.index()], out);
    }

    let kids = &tree.children[node.index()];
    if kids.is_empty() {
        return;
    }
    let last = kids.len() - 1;
    for (i, &child) in kids.iter().enumerate() {
        let edge = mol.bond_between(node, child).unwrap();
        let is_branch = i < last;
        if is_branch {
            out.push('(');
        }
        write_bond_symbol(mol, dirs, edge, node, child, out);
        write_node(mol, tree, dirs, digits, child, out);
        if is_branch {
            out.push(')');
        }
    }
}

fn write_bond_symbol(
    mol: &Molecule,
    dirs: &DirMap,
    edge: EdgeIndex,
    from: NodeIndex,
    to: NodeIndex,
    out: &mut String,
) {
    if let Some(d) = dir_along(mol, dirs, edge, from) {
        out.push(match d {
            BondStereo::Up => '/',
            _ => '\\',
        });
        return;
    }
    let both_aromatic = mol.atom(from).is_aromatic && mol.atom(to).is_aromatic;
    match mol.bond(edge).order {
        BondOrder::Single => {
            if both_aromatic {
                out.push('-');
            }
        }
        BondOrder::Double => out.push('='),
        BondOrder::Triple => out.push('#'),
        BondOrder::Quadruple => out.push('$'),
        BondOrder::Aromatic => {
            if !both_aromatic {
                out.push(':');
            }
        }
    }
}

fn write_ring_digit(digit: u8, out: &mut String) {
    if digit <= 9 {
        out.push(char::from(b'0' + digit));
    } else {
        out.push('%');
        out.push(char::from(b'0' + digit / 10));
        out.push(char::from(b'0' + digit % 10));
    }
}

/// Re-permute `@`/`@@` from the stored neighbor frame into the order the
/// neighbors appear in the output: parent, bracket hydrogen, ring digits,
/// then children. Extended tags pass through untouched.
fn output_chirality(mol: &Molecule, tree: &FragTree, node: NodeIndex) -> Chirality {
    let atom = mol.atom(node);
    let tag = atom.chirality;
    if !tag.is_parity() {
        return tag;
    }
    let has_h = atom.hydrogen_count > 0;

    let mut emission: Vec<NodeIndex> = Vec::new();
    if let Some(p) = tree.parent[node.index()] {
        emission.push(p);
    }
    if has_h {
        emission.push(h_sentinel());
    }
    for rb in &tree.closes[node.index()] {
        emission.push(rb.other);
    }
    for rb in &tree.opens[node.index()] {
        emission.push(rb.other);
    }
    emission.extend(tree.children[node.index()].iter().copied());

    let mut reference: Vec<NodeIndex> = Vec::new();
    if has_h {
        reference.push(h_sentinel());
    }
    reference.extend(mol.neighbors(node));

    if permutation_parity(&reference, &emission) {
        tag
    } else {
        tag.flipped()
    }
}

fn write_atom_token(mol: &Molecule, node: NodeIndex, chir: Chirality, out: &mut String) {
    let atom = mol.atom(node);

    if chir.is_none() && can_write_bare(mol, node) {
        push_symbol(atom.element().unwrap(), atom.is_aromatic, out);
        return;
    }

    out.push('[');
    if atom.isotope != 0 {
        out.push_str(&atom.isotope.to_string());
    }
    match atom.element() {
        Some(e) => push_symbol(e, atom.is_aromatic, out),
        None => out.push('*'),
    }
    push_chirality(chir, out);
    if atom.hydrogen_count > 0 {
        out.push('H');
        if atom.hydrogen_count > 1 {
            out.push_str(&atom.hydrogen_count.to_string());
        }
    }
    if atom.formal_charge > 0 {
        out.push('+');
        if atom.formal_charge > 1 {
            out.push_str(&atom.formal_charge.to_string());
        }
    } else if atom.formal_charge < 0 {
        out.push('-');
        if atom.formal_charge < -1 {
            out.push_str(&atom.formal_charge.abs().to_string());
        }
    }
    if let Some(class) = atom.atom_class {
        out.push(':');
        out.push_str(&class.to_string());
    }
    out.push(']');
}

fn push_symbol(elem: Element, aromatic: bool, out: &mut String) {
    if aromatic {
        for c in elem.symbol().chars() {
            out.push(c.to_ascii_lowercase());
        }
    } else {
        out.push_str(elem.symbol());
    }
}

fn push_chirality(chir: Chirality, out: &mut String) {
    match chir {
        Chirality::None => {}
        Chirality::Ccw => out.push('@'),
        Chirality::Cw => out.push_str("@@"),
        Chirality::Th(n) => {
            out.push_str("@TH");
            out.push_str(&n.to_string());
        }
        Chirality::Al(n) => {
            out.push_str("@AL");
            out.push_str(&n.to_string());
        }
        Chirality::Sp(n) => {
            out.push_str("@SP");
            out.push_str(&n.to_string());
        }
        Chirality::Tb(n) => {
            out.push_str("@TB");
            out.push_str(&n.to_string());
        }
        Chirality::Oh(n) => {
            out.push_str("@OH");
            out.push_str(&n.to_string());
        }
    }
}

fn can_write_bare(mol: &Molecule, node: NodeIndex) -> bool {
    let atom = mol.atom(node);
    let Some(elem) = atom.element() else {
        return false;
    };
    if !elem.is_organic_subset() {
        return false;
    }
    if atom.is_aromatic
        && !matches!(
            elem,
            Element::B | Element::C | Element::N | Element::O | Element::P | Element::S
        )
    {
        return false;
    }
    if atom.isotope != 0 || atom.formal_charge != 0 || atom.atom_class.is_some() {
        return false;
    }
    let expected = implicit_h_for_bare(elem, atom.is_aromatic, reader_bond_sum(mol, node));
    atom.hydrogen_count == expected
}

/// What a reader would fill in for this atom written bare — the mirror of
/// the builder's implicit-hydrogen rule.
fn implicit_h_for_bare(elem: Element, aromatic: bool, bond_sum: u8) -> u8 {
    let valences = elem.default_valences();
    if valences.is_empty() {
        return 0;
    }
    let target = valences
        .iter()
        .find(|&&v| v >= bond_sum)
        .copied()
        .unwrap_or(0);
    let mut h = target.saturating_sub(bond_sum);
    if aromatic && h > 0 {
        h -= 1;
    }
    h
}

fn reader_bond_sum(mol: &Molecule, node: NodeIndex) -> u8 {
    mol.bonds_of(node)
        .map(|e| match mol.bond(e).order {
            BondOrder::Single => 1u8,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
            BondOrder::Quadruple => 4,
            BondOrder::Aromatic => 1,
        })
        .sum()
}
