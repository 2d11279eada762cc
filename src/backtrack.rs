//! Order assignment for whatever the earlier phases left undefined: a
//! dihedral pre-pass that pins visibly twisted bonds to single, a scored
//! exhaustive search over each remaining fragment, and a terminal
//! double-bond length check afterwards.

use petgraph::graph::{EdgeIndex, NodeIndex};
use tracing::{debug, warn};

use crate::bond::BondOrder;
use crate::element::Element;
use crate::geometry::{dihedral_angle, distance, fold_to_quadrant, Geometry};
use crate::mol::Mol;
use crate::rings::RingInfo;
use crate::state::AssignState;
use crate::traits::{HasElement, HasPosition3D};

/// Wing dihedrals below this (after folding into [0, 90]) count as
/// coplanar; at or above it the bond cannot be part of a pi system.
const COPLANARITY_DEG: f64 = 30.0;

/// Fragments larger than this are not searched exhaustively.
const MAX_FRAGMENT_BONDS: usize = 24;

/// Average dihedral between the two substituent planes of `bond`, folded
/// into [0, 90]. `None` when an endpoint has no other neighbor.
fn average_wing_dihedral<A, B>(mol: &Mol<A, B>, bond: EdgeIndex) -> Option<f64>
where
    A: HasPosition3D,
{
    let (a, b) = mol.bond_endpoints(bond)?;
    let pa = mol.atom(a).position_3d();
    let pb = mol.atom(b).position_3d();

    let mut sum = 0.0;
    let mut count = 0usize;
    for na in mol.neighbors(a) {
        if na == b {
            continue;
        }
        for nb in mol.neighbors(b) {
            if nb == a {
                continue;
            }
            let d = dihedral_angle(
                mol.atom(na).position_3d(),
                pa,
                pb,
                mol.atom(nb).position_3d(),
            );
            sum += fold_to_quadrant(d);
            count += 1;
        }
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Pin every undefined bond between two trigonal-planar atoms whose
/// substituent planes are twisted out of each other to order 1.
pub fn fix_twisted_singles<A, B>(
    mol: &Mol<A, B>,
    geometries: &[Geometry],
    state: &mut AssignState,
) where
    A: HasPosition3D,
{
    for bond in mol.bonds() {
        if state.is_defined(bond) {
            continue;
        }
        let (a, b) = match mol.bond_endpoints(bond) {
            Some(ends) => ends,
            None => continue,
        };
        if geometries[a.index()] != Geometry::TrigonalPlanar
            || geometries[b.index()] != Geometry::TrigonalPlanar
        {
            continue;
        }
        if let Some(twist) = average_wing_dihedral(mol, bond) {
            if twist >= COPLANARITY_DEG {
                debug!(bond = bond.index(), twist, "twisted bond pinned single");
                state.commit(mol, bond, 1);
            }
        }
    }
}

/// One fragment of still-undefined bonds plus the atoms it touches.
struct Fragment {
    bonds: Vec<EdgeIndex>,
    atoms: Vec<NodeIndex>,
}

impl Fragment {
    fn local(&self, atom: NodeIndex) -> usize {
        self.atoms
            .iter()
            .position(|&a| a == atom)
            .expect("fragment atom")
    }
}

fn collect_fragments<A, B>(mol: &Mol<A, B>, state: &AssignState) -> Vec<Fragment> {
    let mut seen = vec![false; mol.bond_count()];
    let mut fragments = Vec::new();

    for seed in mol.bonds() {
        if seen[seed.index()] || state.is_defined(seed) {
            continue;
        }
        let mut bonds = Vec::new();
        let mut atoms: Vec<NodeIndex> = Vec::new();
        let mut stack = vec![seed];
        seen[seed.index()] = true;
        while let Some(bond) = stack.pop() {
            bonds.push(bond);
            let (a, b) = match mol.bond_endpoints(bond) {
                Some(ends) => ends,
                None => continue,
            };
            for atom in [a, b] {
                if !atoms.contains(&atom) {
                    atoms.push(atom);
                }
                for next in mol.bonds_of(atom) {
                    if !seen[next.index()] && !state.is_defined(next) {
                        seen[next.index()] = true;
                        stack.push(next);
                    }
                }
            }
        }
        fragments.push(Fragment { bonds, atoms });
    }

    fragments
}

/// Mutable search counters for one fragment, indexed by local atom.
struct Search<'a, A, B> {
    mol: &'a Mol<A, B>,
    rings: &'a RingInfo,
    geometries: &'a [Geometry],
    fragment: &'a Fragment,
    ends: Vec<(usize, usize)>,
    lengths: Vec<f64>,
    free: Vec<i16>,
    has_multi: Vec<bool>,
    doubles: Vec<u8>,
    triples: Vec<u8>,
    assigned: Vec<u8>,
    best_score: f64,
    best: Option<Vec<u8>>,
}

impl<'a, A, B> Search<'a, A, B>
where
    A: HasElement + HasPosition3D,
{
    fn new(
        mol: &'a Mol<A, B>,
        rings: &'a RingInfo,
        geometries: &'a [Geometry],
        fragment: &'a Fragment,
        state: &AssignState,
    ) -> Self {
        let n = fragment.atoms.len();
        let mut free = vec![0i16; n];
        let mut has_multi = vec![false; n];
        let mut doubles = vec![0u8; n];
        let mut triples = vec![0u8; n];
        for (i, &atom) in fragment.atoms.iter().enumerate() {
            free[i] = state.free_valence(atom);
            for bond in mol.bonds_of(atom) {
                if state.is_defined(bond) {
                    match state.order(bond) {
                        2 => {
                            has_multi[i] = true;
                            doubles[i] += 1;
                        }
                        3 => {
                            has_multi[i] = true;
                            triples[i] += 1;
                        }
                        _ => {}
                    }
                }
            }
        }
        let ends: Vec<(usize, usize)> = fragment
            .bonds
            .iter()
            .map(|&bond| {
                let (a, b) = mol.bond_endpoints(bond).expect("bond endpoints exist");
                (fragment.local(a), fragment.local(b))
            })
            .collect();
        let lengths: Vec<f64> = fragment
            .bonds
            .iter()
            .map(|&bond| {
                let (a, b) = mol.bond_endpoints(bond).expect("bond endpoints exist");
                distance(mol.atom(a).position_3d(), mol.atom(b).position_3d())
            })
            .collect();
        Self {
            mol,
            rings,
            geometries,
            fragment,
            ends,
            lengths,
            free,
            has_multi,
            doubles,
            triples,
            assigned: vec![0u8; fragment.bonds.len()],
            best_score: f64::NEG_INFINITY,
            best: None,
        }
    }

    fn order_cap(&self, local: usize) -> u8 {
        match self.geometries[self.fragment.atoms[local].index()] {
            Geometry::Linear => 3,
            Geometry::TrigonalPlanar => {
                if self.has_multi[local] {
                    1
                } else {
                    2
                }
            }
            Geometry::Tetrahedral => 2,
            Geometry::Terminal | Geometry::Undefined => 3,
        }
    }

    fn bond_score(&self, idx: usize, order: u8) -> f64 {
        let bond = self.fragment.bonds[idx];
        let (a, b) = self.mol.bond_endpoints(bond).expect("bond endpoints exist");
        let ea = self.mol.atom(a).element();
        let eb = self.mol.atom(b).element();
        let mut score = match BondOrder::from_u8(order)
            .and_then(|o| Some(ea.covalent_radius(o)? + eb.covalent_radius(o)?))
        {
            Some(expected) => 1.0 - (self.lengths[idx] - expected).abs(),
            None => 0.0,
        };
        if order > 1 {
            if self.rings.is_ring_bond(a, b) {
                score += 0.5;
            }
            if let (Some(xa), Some(xb)) = (ea.electronegativity(), eb.electronegativity()) {
                score += 0.5 * (xa - xb).abs();
            }
        }
        score
    }

    /// +1 for every fragment atom whose realized multiple-bond pattern is
    /// the one its geometry predicts.
    fn leaf_bonus(&self) -> f64 {
        let mut bonus = 0.0;
        for (i, &atom) in self.fragment.atoms.iter().enumerate() {
            let is_carbon = self.mol.atom(atom).element() == Element::C;
            let matched = match self.geometries[atom.index()] {
                Geometry::Linear => self.triples[i] == 1 || self.doubles[i] == 2,
                Geometry::TrigonalPlanar => is_carbon && self.doubles[i] == 1,
                Geometry::Tetrahedral => is_carbon && self.doubles[i] == 0,
                _ => false,
            };
            if matched {
                bonus += 1.0;
            }
        }
        bonus
    }

    fn recurse(&mut self, idx: usize, score: f64) {
        if idx == self.fragment.bonds.len() {
            let total = score + self.leaf_bonus();
            if total > self.best_score {
                self.best_score = total;
                self.best = Some(self.assigned.clone());
            }
            return;
        }

        let (la, lb) = self.ends[idx];
        let cap = self
            .order_cap(la)
            .min(self.order_cap(lb))
            .min(self.free[la].min(self.free[lb]).max(0) as u8)
            .min(3);
        for order in 1..=cap {
            self.assigned[idx] = order;
            self.free[la] -= order as i16;
            self.free[lb] -= order as i16;
            let saved = (self.has_multi[la], self.has_multi[lb]);
            if order >= 2 {
                self.has_multi[la] = true;
                self.has_multi[lb] = true;
                if order == 2 {
                    self.doubles[la] += 1;
                    self.doubles[lb] += 1;
                } else {
                    self.triples[la] += 1;
                    self.triples[lb] += 1;
                }
            }

            self.recurse(idx + 1, score + self.bond_score(idx, order));

            if order >= 2 {
                if order == 2 {
                    self.doubles[la] -= 1;
                    self.doubles[lb] -= 1;
                } else {
                    self.triples[la] -= 1;
                    self.triples[lb] -= 1;
                }
            }
            self.has_multi[la] = saved.0;
            self.has_multi[lb] = saved.1;
            self.free[la] += order as i16;
            self.free[lb] += order as i16;
        }
        self.assigned[idx] = 0;
    }
}

/// Enumerate order assignments for every fragment of still-undefined
/// bonds and commit the best-scoring one.
pub fn search_fragments<A, B>(
    mol: &Mol<A, B>,
    rings: &RingInfo,
    geometries: &[Geometry],
    state: &mut AssignState,
) where
    A: HasElement + HasPosition3D,
{
    for fragment in collect_fragments(mol, state) {
        if fragment.bonds.len() > MAX_FRAGMENT_BONDS {
            warn!(
                bonds = fragment.bonds.len(),
                "oversized undefined fragment, assigning all singles"
            );
            for &bond in &fragment.bonds {
                state.commit(mol, bond, 1);
            }
            continue;
        }

        let mut search = Search::new(mol, rings, geometries, &fragment, state);
        search.recurse(0, 0.0);
        let best = search
            .best
            .unwrap_or_else(|| vec![1u8; fragment.bonds.len()]);
        debug!(
            bonds = fragment.bonds.len(),
            score = search.best_score,
            "fragment search committed"
        );
        for (&bond, &order) in fragment.bonds.iter().zip(&best) {
            state.commit(mol, bond, order);
        }
    }
}

/// Downgrade order-2 bonds whose measured length does not actually fit a
/// double bond. Applies to trigonal-planar atoms with at most two
/// explicit bonds carrying a terminal neighbor.
pub fn correct_terminal_doubles<A, B>(
    mol: &Mol<A, B>,
    geometries: &[Geometry],
    state: &mut AssignState,
) where
    A: HasElement + HasPosition3D,
{
    for bond in mol.bonds() {
        if !state.is_defined(bond) || state.order(bond) != 2 {
            continue;
        }
        let (a, b) = match mol.bond_endpoints(bond) {
            Some(ends) => ends,
            None => continue,
        };
        let (ga, gb) = (geometries[a.index()], geometries[b.index()]);
        let trigonal = if ga == Geometry::TrigonalPlanar && gb == Geometry::Terminal {
            a
        } else if gb == Geometry::TrigonalPlanar && ga == Geometry::Terminal {
            b
        } else {
            continue;
        };
        if mol.degree(trigonal) > 2 {
            continue;
        }

        let len = distance(mol.atom(a).position_3d(), mol.atom(b).position_3d());
        let ea = mol.atom(a).element();
        let eb = mol.atom(b).element();
        let mut best_order = 0u8;
        let mut best_dev = f64::INFINITY;
        for order in [BondOrder::Single, BondOrder::Double, BondOrder::Triple] {
            let expected = match (ea.covalent_radius(order), eb.covalent_radius(order)) {
                (Some(ra), Some(rb)) => ra + rb,
                _ => continue,
            };
            let dev = (len - expected).abs();
            if dev < best_dev {
                best_dev = dev;
                best_order = order.as_u8();
            }
        }
        if best_order != 0 && best_order != 2 {
            debug!(bond = bond.index(), len, "terminal double downgraded");
            state.lower_to_single(mol, bond);
        }
    }
}
