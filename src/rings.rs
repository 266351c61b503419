use std::collections::VecDeque;

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::graph_ops::num_components;
use crate::mol::Molecule;

/// Ring membership computed as a smallest set of smallest rings.
///
/// Built by repeated shortest-cycle extraction: for every bond, find the
/// shortest cycle through it (BFS with the bond removed), then greedily keep
/// the shortest candidates until every cyclic bond is covered and the cycle
/// rank is reached.
#[derive(Debug, Clone)]
pub struct RingInfo {
    rings: Vec<Vec<NodeIndex>>,
}

impl RingInfo {
    pub fn sssr(mol: &Molecule) -> Self {
        let num_expected = Self::expected_ring_count(mol);
        if num_expected == 0 {
            return Self { rings: vec![] };
        }

        let mut candidates: Vec<Vec<NodeIndex>> = Vec::new();
        for edge in mol.bonds() {
            if let Some(ring) = shortest_cycle_through(mol, edge) {
                candidates.push(normalize_ring(&ring));
            }
        }
        candidates.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        candidates.dedup();

        let mut covered = vec![false; mol.bond_count()];
        let mut rings = Vec::with_capacity(num_expected);
        for ring in candidates {
            if rings.len() >= num_expected {
                break;
            }
            let edges = ring_edges(mol, &ring);
            if edges.iter().any(|e| !covered[e.index()]) {
                for e in &edges {
                    covered[e.index()] = true;
                }
                rings.push(ring);
            }
        }

        Self { rings }
    }

    pub fn num_rings(&self) -> usize {
        self.rings.len()
    }

    pub fn rings(&self) -> &[Vec<NodeIndex>] {
        &self.rings
    }

    pub fn is_ring_atom(&self, atom: NodeIndex) -> bool {
        self.rings.iter().any(|ring| ring.contains(&atom))
    }

    /// Number of SSSR rings the atom belongs to.
    pub fn ring_count_for(&self, atom: NodeIndex) -> usize {
        self.rings.iter().filter(|ring| ring.contains(&atom)).count()
    }

    pub fn is_ring_bond(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.rings.iter().any(|ring| {
            let len = ring.len();
            (0..len).any(|i| {
                let j = (i + 1) % len;
                (ring[i] == a && ring[j] == b) || (ring[i] == b && ring[j] == a)
            })
        })
    }

    pub fn expected_ring_count(mol: &Molecule) -> usize {
        let v = mol.atom_count();
        let e = mol.bond_count();
        let c = num_components(mol);
        (e + c).saturating_sub(v)
    }
}

/// Shortest cycle containing `edge`: the shortest path between its endpoints
/// in the graph with `edge` removed, closed by the edge itself.
fn shortest_cycle_through(mol: &Molecule, edge: EdgeIndex) -> Option<Vec<NodeIndex>> {
    let (from, to) = mol.bond_endpoints(edge)?;
    let n = mol.atom_count();
    let mut pred = vec![None::<NodeIndex>; n];
    let mut visited = vec![false; n];
    visited[from.index()] = true;
    let mut queue = VecDeque::new();
    queue.push_back(from);
    while let Some(current) = queue.pop_front() {
        for e in mol.bonds_of(current) {
            if e == edge {
                continue;
            }
            let neighbor = mol.other_endpoint(e, current).unwrap();
            if visited[neighbor.index()] {
                continue;
            }
            visited[neighbor.index()] = true;
            pred[neighbor.index()] = Some(current);
            if neighbor == to {
                let mut path = vec![to];
                let mut node = to;
                while let Some(p) = pred[node.index()] {
                    path.push(p);
                    node = p;
                }
                path.reverse();
                return Some(path);
            }
            queue.push_back(neighbor);
        }
    }
    None
}

fn ring_edges(mol: &Molecule, ring: &[NodeIndex]) -> Vec<EdgeIndex> {
    let len = ring.len();
    (0..len)
        .filter_map(|i| mol.bond_between(ring[i], ring[(i + 1) % len]))
        .collect()
}

/// Rotate to put the smallest atom first, then pick the direction with the
/// smaller second atom, so equal rings compare equal.
fn normalize_ring(ring: &[NodeIndex]) -> Vec<NodeIndex> {
    let len = ring.len();
    if len == 0 {
        return Vec::new();
    }
    let min_pos = ring
        .iter()
        .enumerate()
        .min_by_key(|(_, node)| *node)
        .map(|(i, _)| i)
        .unwrap();
    let forward: Vec<NodeIndex> = (0..len).map(|i| ring[(min_pos + i) % len]).collect();
    let backward: Vec<NodeIndex> = (0..len).map(|i| ring[(min_pos + len - i) % len]).collect();
    if forward <= backward {
        forward
    } else {
        backward
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Atom;
    use crate::bond::Bond;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    fn cycle(len: usize) -> Molecule {
        let mut mol = Molecule::new();
        for _ in 0..len {
            mol.add_atom(Atom {
                atomic_num: 6,
                ..Atom::default()
            });
        }
        for i in 0..len {
            mol.add_bond(n(i), n((i + 1) % len), Bond::default());
        }
        mol
    }

    #[test]
    fn acyclic_has_no_rings() {
        let mut mol = Molecule::new();
        let a = mol.add_atom(Atom::default());
        let b = mol.add_atom(Atom::default());
        mol.add_bond(a, b, Bond::default());
        let info = RingInfo::sssr(&mol);
        assert_eq!(info.num_rings(), 0);
        assert!(!info.is_ring_atom(a));
    }

    #[test]
    fn single_ring() {
        let mol = cycle(6);
        let info = RingInfo::sssr(&mol);
        assert_eq!(info.num_rings(), 1);
        assert_eq!(info.rings()[0].len(), 6);
        for i in 0..6 {
            assert!(info.is_ring_atom(n(i)));
            assert_eq!(info.ring_count_for(n(i)), 1);
        }
        assert!(info.is_ring_bond(n(0), n(5)));
        assert!(!info.is_ring_bond(n(0), n(3)));
    }

    #[test]
    fn fused_bicyclic() {
        // Two fused four-membered rings sharing an edge.
        let mut mol = cycle(4);
        let e = mol.add_atom(Atom::default());
        let f = mol.add_atom(Atom::default());
        mol.add_bond(n(0), e, Bond::default());
        mol.add_bond(e, f, Bond::default());
        mol.add_bond(f, n(1), Bond::default());

        let info = RingInfo::sssr(&mol);
        assert_eq!(info.num_rings(), 2);
        assert_eq!(info.rings()[0].len(), 4);
        assert_eq!(info.rings()[1].len(), 4);
        // the shared edge atoms sit in both rings
        assert_eq!(info.ring_count_for(n(0)), 2);
        assert_eq!(info.ring_count_for(n(1)), 2);
        assert_eq!(info.ring_count_for(n(3)), 1);
    }

    #[test]
    fn spiro_rings() {
        // Two triangles joined at one atom.
        let mut mol = cycle(3);
        let d = mol.add_atom(Atom::default());
        let e = mol.add_atom(Atom::default());
        mol.add_bond(n(0), d, Bond::default());
        mol.add_bond(d, e, Bond::default());
        mol.add_bond(e, n(0), Bond::default());

        let info = RingInfo::sssr(&mol);
        assert_eq!(info.num_rings(), 2);
        assert_eq!(info.ring_count_for(n(0)), 2);
    }

    #[test]
    fn expected_count_disconnected() {
        let mut mol = cycle(3);
        mol.add_atom(Atom::default());
        assert_eq!(RingInfo::expected_ring_count(&mol), 1);
    }
}
