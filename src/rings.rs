use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::mol::Mol;

/// Precomputed smallest-set-of-smallest-rings, supplied by the caller.
///
/// Ring perception is outside this crate; `RingInfo` only answers the
/// membership queries the engine needs. Each ring is an ordered atom
/// cycle (consecutive entries bonded, last wraps to first).
#[derive(Debug, Clone, Default)]
pub struct RingInfo {
    rings: Vec<Vec<NodeIndex>>,
}

impl RingInfo {
    pub fn from_rings(rings: Vec<Vec<NodeIndex>>) -> Self {
        Self { rings }
    }

    /// No rings: the correct value for acyclic molecules.
    pub fn empty() -> Self {
        Self::default()
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

    pub fn is_ring_bond(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.rings.iter().any(|ring| {
            let len = ring.len();
            (0..len).any(|i| {
                let j = (i + 1) % len;
                (ring[i] == a && ring[j] == b) || (ring[i] == b && ring[j] == a)
            })
        })
    }

    /// The consecutive bonds of one ring, or `None` if the cycle is not
    /// fully present in the graph. `edges[i]` connects `ring[i]` to
    /// `ring[i + 1]` (wrapping).
    pub fn ring_edges<A, B>(&self, mol: &Mol<A, B>, ring: &[NodeIndex]) -> Option<Vec<EdgeIndex>> {
        let len = ring.len();
        (0..len)
            .map(|i| mol.bond_between(ring[i], ring[(i + 1) % len]))
            .collect()
    }
}
