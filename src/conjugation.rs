//! Conjugated-system treatment: pick out the planar-ring bonds that can
//! carry alternating double bonds and place those doubles with a maximum
//! matching, so every participating atom that can take a double gets one.

use petgraph::graph::{EdgeIndex, NodeIndex};
use tracing::debug;

use crate::element::Element;
use crate::geometry::Geometry;
use crate::matching::{adjacency, maximum_matching};
use crate::mol::Mol;
use crate::rings::RingInfo;
use crate::state::AssignState;
use crate::traits::{HasAromaticity, HasElement};

/// Bonds eligible for alternating-double placement.
///
/// A ring qualifies when it has 5 or 6 members, every member atom is
/// trigonal planar and a conjugation candidate element, and no carbon in
/// it already sits between two defined single ring bonds (such a carbon
/// could never receive its double). Aromatic-flagged bonds qualify
/// directly.
pub fn conjugated_mask<A, B>(
    mol: &Mol<A, B>,
    rings: &RingInfo,
    geometries: &[Geometry],
    state: &AssignState,
) -> Vec<bool>
where
    A: HasElement,
    B: HasAromaticity,
{
    let mut mask = vec![false; mol.bond_count()];

    for bond in mol.bonds() {
        if mol.bond(bond).is_aromatic() {
            mask[bond.index()] = true;
        }
    }

    'ring: for ring in rings.rings() {
        if ring.len() != 5 && ring.len() != 6 {
            continue;
        }
        for &atom in ring {
            if geometries[atom.index()] != Geometry::TrigonalPlanar {
                continue 'ring;
            }
            if !mol.atom(atom).element().is_conjugation_candidate() {
                continue 'ring;
            }
        }
        let edges = match rings.ring_edges(mol, ring) {
            Some(edges) => edges,
            None => continue,
        };
        // a carbon flanked by two defined single ring bonds is stranded
        let n = ring.len();
        for i in 0..n {
            let prev = edges[(i + n - 1) % n];
            let next = edges[i];
            if mol.atom(ring[i]).element() == Element::C
                && state.is_defined(prev)
                && state.order(prev) == 1
                && state.is_defined(next)
                && state.order(next) == 1
            {
                continue 'ring;
            }
        }
        for edge in edges {
            mask[edge.index()] = true;
        }
    }

    mask
}

/// Connected fragments of undefined masked bonds, each a list of edges.
fn undefined_fragments<A, B>(
    mol: &Mol<A, B>,
    mask: &[bool],
    state: &AssignState,
) -> Vec<Vec<EdgeIndex>> {
    let mut assigned = vec![false; mol.bond_count()];
    let mut fragments = Vec::new();

    for seed in mol.bonds() {
        if assigned[seed.index()] || !mask[seed.index()] || state.is_defined(seed) {
            continue;
        }
        let mut fragment = Vec::new();
        let mut stack = vec![seed];
        assigned[seed.index()] = true;
        while let Some(bond) = stack.pop() {
            fragment.push(bond);
            let (a, b) = match mol.bond_endpoints(bond) {
                Some(ends) => ends,
                None => continue,
            };
            for atom in [a, b] {
                for next in mol.bonds_of(atom) {
                    if !assigned[next.index()] && mask[next.index()] && !state.is_defined(next) {
                        assigned[next.index()] = true;
                        stack.push(next);
                    }
                }
            }
        }
        fragments.push(fragment);
    }

    fragments
}

/// Greedy seed matching: pair edges up carbon-first so the blossom search
/// starts from a deterministic, mostly-maximum matching.
fn seed_matching<A, B>(
    mol: &Mol<A, B>,
    edges: &[(usize, usize, EdgeIndex)],
    mate: &mut [Option<usize>],
) where
    A: HasElement,
{
    let mut order: Vec<usize> = (0..edges.len()).collect();
    // carbon-carbon edges first; heteroatom endpoints sort later so
    // carbons are paired before heteroatoms claim a partner
    order.sort_by_key(|&i| carbon_rank(mol, edges[i].2, Second));
    order.sort_by_key(|&i| carbon_rank(mol, edges[i].2, First));
    for &i in &order {
        let (a, b, _) = edges[i];
        if mate[a].is_none() && mate[b].is_none() {
            mate[a] = Some(b);
            mate[b] = Some(a);
        }
    }
}

use EndpointSide::{First, Second};

#[derive(Clone, Copy)]
enum EndpointSide {
    First,
    Second,
}

fn carbon_rank<A, B>(mol: &Mol<A, B>, bond: EdgeIndex, side: EndpointSide) -> u8
where
    A: HasElement,
{
    let (a, b) = match mol.bond_endpoints(bond) {
        Some(ends) => ends,
        None => return 1,
    };
    let atom = match side {
        First => a,
        Second => b,
    };
    if mol.atom(atom).element() == Element::C {
        0
    } else {
        1
    }
}

/// Assign alternating doubles over every conjugated fragment. Matched
/// edges become double bonds; unmatched edges stay single. All fragment
/// bonds end up defined.
pub fn assign_conjugated<A, B>(
    mol: &Mol<A, B>,
    rings: &RingInfo,
    geometries: &[Geometry],
    state: &mut AssignState,
) where
    A: HasElement,
    B: HasAromaticity,
{
    let mask = conjugated_mask(mol, rings, geometries, state);
    let fragments = undefined_fragments(mol, &mask, state);

    for fragment in fragments {
        // every fragment bond is at least single
        for &bond in &fragment {
            state.commit(mol, bond, 1);
        }

        // edges whose both endpoints can still take one more unit
        let mut atoms: Vec<NodeIndex> = Vec::new();
        let local_of = |atoms: &mut Vec<NodeIndex>, atom: NodeIndex| {
            match atoms.iter().position(|&a| a == atom) {
                Some(i) => i,
                None => {
                    atoms.push(atom);
                    atoms.len() - 1
                }
            }
        };
        let mut capable: Vec<(usize, usize, EdgeIndex)> = Vec::new();
        for &bond in &fragment {
            let (a, b) = match mol.bond_endpoints(bond) {
                Some(ends) => ends,
                None => continue,
            };
            if state.free_valence(a) >= 1 && state.free_valence(b) >= 1 {
                let la = local_of(&mut atoms, a);
                let lb = local_of(&mut atoms, b);
                capable.push((la, lb, bond));
            }
        }
        if capable.is_empty() {
            continue;
        }

        let n = atoms.len();
        let mut mate: Vec<Option<usize>> = vec![None; n];
        seed_matching(mol, &capable, &mut mate);
        let pairs: Vec<(usize, usize)> = capable.iter().map(|&(a, b, _)| (a, b)).collect();
        let adj = adjacency(n, &pairs);
        maximum_matching(&adj, &mut mate);

        let mut doubles = 0usize;
        for &(la, lb, bond) in &capable {
            if mate[la] == Some(lb) {
                state.raise_to_double(mol, bond);
                doubles += 1;
            }
        }
        debug!(
            bonds = fragment.len(),
            doubles, "conjugated fragment assigned"
        );
    }
}
