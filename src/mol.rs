use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::atom::Atom;
use crate::bond::Bond;

/// A molecular graph: atoms on nodes, bonds on edges.
///
/// One connected component per molecule — the parser splits disconnected
/// fragments into separate `Molecule` values. Atom ids are node indices;
/// freshly parsed molecules number their atoms 0..n in parse order. Bond
/// endpoints keep parse order (source atom first), which is what directional
/// bond markers are interpreted against.
pub struct Molecule {
    graph: UnGraph<Atom, Bond>,
}

impl Molecule {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::default(),
        }
    }

    pub fn atom(&self, idx: NodeIndex) -> &Atom {
        &self.graph[idx]
    }

    pub fn atom_mut(&mut self, idx: NodeIndex) -> &mut Atom {
        &mut self.graph[idx]
    }

    pub fn bond(&self, idx: EdgeIndex) -> &Bond {
        &self.graph[idx]
    }

    pub fn bond_mut(&mut self, idx: EdgeIndex) -> &mut Bond {
        &mut self.graph[idx]
    }

    pub fn add_atom(&mut self, atom: Atom) -> NodeIndex {
        self.graph.add_node(atom)
    }

    pub fn add_bond(&mut self, a: NodeIndex, b: NodeIndex, bond: Bond) -> EdgeIndex {
        self.graph.add_edge(a, b, bond)
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn neighbors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(idx)
    }

    pub fn bonds_of(&self, idx: NodeIndex) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edges(idx).map(|e| e.id())
    }

    pub fn atoms(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn bonds(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edge_indices()
    }

    pub fn bond_between(&self, a: NodeIndex, b: NodeIndex) -> Option<EdgeIndex> {
        self.graph.find_edge(a, b)
    }

    pub fn bond_endpoints(&self, idx: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(idx)
    }

    pub fn degree(&self, idx: NodeIndex) -> usize {
        self.graph.neighbors(idx).count()
    }

    /// The neighbor on the far side of a bond.
    pub fn other_endpoint(&self, edge: EdgeIndex, atom: NodeIndex) -> Option<NodeIndex> {
        let (a, b) = self.bond_endpoints(edge)?;
        if a == atom {
            Some(b)
        } else if b == atom {
            Some(a)
        } else {
            None
        }
    }

    /// Rebuild the molecule with atom `i` moved to index `perm[i]`.
    ///
    /// Semantics are preserved: chirality parity is recomputed against the
    /// new neighbor ordering and directional bond markers are flipped where
    /// the stored endpoint order reverses. Mainly useful for testing that
    /// canonicalization is insensitive to input numbering.
    pub fn renumber(&self, perm: &[usize]) -> Result<Molecule, RenumberError> {
        let n = self.atom_count();
        if perm.len() != n {
            return Err(RenumberError { len: perm.len(), expected: n });
        }
        let mut seen = vec![false; n];
        for &p in perm {
            if p >= n || seen[p] {
                return Err(RenumberError { len: perm.len(), expected: n });
            }
            seen[p] = true;
        }

        // inverse[j] = old index of the atom placed at new index j
        let mut inverse = vec![0usize; n];
        for (old, &new) in perm.iter().enumerate() {
            inverse[new] = old;
        }

        let mut mol = Molecule::new();
        for &old in &inverse {
            mol.add_atom(self.atom(NodeIndex::new(old)).clone());
        }

        // Bonds sorted by renumbered endpoints so the edge order carries no
        // trace of the original insertion order.
        let mut edges: Vec<(usize, usize, Bond)> = self
            .bonds()
            .map(|e| {
                let (a, b) = self.bond_endpoints(e).unwrap();
                let (na, nb) = (perm[a.index()], perm[b.index()]);
                let mut bond = self.bond(e).clone();
                if na <= nb {
                    (na, nb, bond)
                } else {
                    bond.stereo = bond.stereo.flipped();
                    (nb, na, bond)
                }
            })
            .collect();
        edges.sort_by_key(|&(a, b, _)| (a, b));
        for (a, b, bond) in edges {
            mol.add_bond(NodeIndex::new(a), NodeIndex::new(b), bond);
        }

        // Chirality is parity-relative to the neighbor iteration order,
        // which the rebuild just changed.
        let new_indices: Vec<NodeIndex> = mol.atoms().collect();
        for new_idx in new_indices {
            let old_idx = NodeIndex::new(inverse[new_idx.index()]);
            if !mol.atom(new_idx).chirality.is_parity() {
                continue;
            }
            let old_order: Vec<usize> = self
                .neighbors(old_idx)
                .map(|nb| perm[nb.index()])
                .collect();
            let new_order: Vec<usize> = mol.neighbors(new_idx).map(|nb| nb.index()).collect();
            if !permutation_parity(&old_order, &new_order) {
                let atom = mol.atom_mut(new_idx);
                atom.chirality = atom.chirality.flipped();
            }
        }

        Ok(mol)
    }
}

impl Clone for Molecule {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
        }
    }
}

impl Default for Molecule {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Molecule {
    fn eq(&self, other: &Self) -> bool {
        if self.atom_count() != other.atom_count() || self.bond_count() != other.bond_count() {
            return false;
        }
        for idx in self.atoms() {
            if self.atom(idx) != other.atom(idx) {
                return false;
            }
        }
        for idx in self.bonds() {
            if self.bond(idx) != other.bond(idx)
                || self.bond_endpoints(idx) != other.bond_endpoints(idx)
            {
                return false;
            }
        }
        true
    }
}

impl std::fmt::Debug for Molecule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Molecule")
            .field("atom_count", &self.atom_count())
            .field("bond_count", &self.bond_count())
            .finish()
    }
}

/// Invalid permutation passed to [`Molecule::renumber`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenumberError {
    pub len: usize,
    pub expected: usize,
}

impl std::fmt::Display for RenumberError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "not a permutation of 0..{} (got {} entries)",
            self.expected, self.len
        )
    }
}

impl std::error::Error for RenumberError {}

/// Whether mapping `from` onto `to` is an even permutation.
pub(crate) fn permutation_parity<T: Eq>(from: &[T], to: &[T]) -> bool {
    let n = from.len();
    if n != to.len() {
        return true;
    }
    let perm: Vec<usize> = from
        .iter()
        .map(|f| to.iter().position(|t| t == f).unwrap_or(0))
        .collect();
    let mut visited = vec![false; n];
    let mut swaps = 0usize;
    for i in 0..n {
        if visited[i] {
            continue;
        }
        let mut cycle_len = 0;
        let mut j = i;
        while !visited[j] {
            visited[j] = true;
            j = perm[j];
            cycle_len += 1;
        }
        swaps += cycle_len - 1;
    }
    swaps % 2 == 0
}
