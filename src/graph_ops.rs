use petgraph::graph::NodeIndex;

use crate::mol::Molecule;

/// Connected components, each sorted by atom id, in order of their
/// lowest atom id.
pub fn connected_components(mol: &Molecule) -> Vec<Vec<NodeIndex>> {
    let n = mol.atom_count();
    let mut visited = vec![false; n];
    let mut components = Vec::new();
    for node in mol.atoms() {
        if visited[node.index()] {
            continue;
        }
        let mut component = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if visited[current.index()] {
                continue;
            }
            visited[current.index()] = true;
            component.push(current);
            for neighbor in mol.neighbors(current) {
                if !visited[neighbor.index()] {
                    stack.push(neighbor);
                }
            }
        }
        component.sort();
        components.push(component);
    }
    components
}

pub fn num_components(mol: &Molecule) -> usize {
    connected_components(mol).len()
}

/// Split a graph into one `Molecule` per connected component.
///
/// Atoms keep their relative parse order within each fragment, and bonds
/// are re-added in the original edge order with the original endpoint
/// orientation, so chirality parity and directional markers carry over
/// without adjustment.
pub fn get_fragments(mol: &Molecule) -> Vec<Molecule> {
    let components = connected_components(mol);
    let mut fragments = Vec::with_capacity(components.len());
    for component in &components {
        let mut frag = Molecule::new();
        let mut index_map = vec![None::<NodeIndex>; mol.atom_count()];
        for &old_idx in component {
            index_map[old_idx.index()] = Some(frag.add_atom(mol.atom(old_idx).clone()));
        }
        for edge in mol.bonds() {
            let (a, b) = mol.bond_endpoints(edge).unwrap();
            if let (Some(na), Some(nb)) = (index_map[a.index()], index_map[b.index()]) {
                frag.add_bond(na, nb, mol.bond(edge).clone());
            }
        }
        fragments.push(frag);
    }
    fragments
}
