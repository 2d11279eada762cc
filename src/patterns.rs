//! Functional-group resolution: match a fixed library of query patterns
//! against the target graph and commit their prescribed bond orders.
//!
//! Patterns are small query graphs with literal orders on their bonds.
//! Competing embeddings over the same target bonds are grouped, ranked by
//! ring membership and bond-length fit, and applied best-first; a match
//! that cannot fully balance its valence is rolled back and the next
//! candidate tried.

use petgraph::graph::{EdgeIndex, NodeIndex};
use tracing::debug;

use crate::bond::BondOrder;
use crate::element::Element;
use crate::geometry::{distance, Geometry};
use crate::mol::Mol;
use crate::rings::RingInfo;
use crate::state::AssignState;
use crate::substruct::{find_matches, Match};
use crate::traits::{HasElement, HasFormalCharge, HasPosition3D};

/// Query atom of a functional-group pattern. `None` fields match anything.
#[derive(Debug, Clone)]
pub struct QueryAtom {
    pub element: Option<Element>,
    pub charge: Option<i8>,
}

/// Query bond carrying the order the pattern prescribes for its target.
#[derive(Debug, Clone)]
pub struct QueryBond {
    pub order: u8,
}

/// One named functional-group query.
pub struct Pattern {
    pub name: &'static str,
    pub query: Mol<QueryAtom, QueryBond>,
}

/// Immutable, eagerly built pattern library.
///
/// Built once (typically at startup) and passed by reference into each
/// `generate_with` call; there is no hidden global state.
pub struct PatternLibrary {
    patterns: Vec<Pattern>,
}

struct Builder {
    query: Mol<QueryAtom, QueryBond>,
}

impl Builder {
    fn new() -> Self {
        Self { query: Mol::new() }
    }

    fn atom(&mut self, element: Element) -> NodeIndex {
        self.query.add_atom(QueryAtom {
            element: Some(element),
            charge: Some(0),
        })
    }

    fn charged(&mut self, element: Element, charge: i8) -> NodeIndex {
        self.query.add_atom(QueryAtom {
            element: Some(element),
            charge: Some(charge),
        })
    }

    fn any_charge(&mut self, element: Element) -> NodeIndex {
        self.query.add_atom(QueryAtom {
            element: Some(element),
            charge: None,
        })
    }

    fn bond(&mut self, a: NodeIndex, b: NodeIndex, order: u8) {
        self.query.add_bond(a, b, QueryBond { order });
    }

    fn build(self, name: &'static str) -> Pattern {
        Pattern {
            name,
            query: self.query,
        }
    }
}

impl PatternLibrary {
    /// The standard library, highest priority first. Earlier patterns
    /// claim their bonds before later, more generic ones run.
    pub fn standard() -> Self {
        let mut patterns = Vec::new();

        // O=S(=O)(-O)-O : sulfate esters and the dianion
        let mut b = Builder::new();
        let s = b.atom(Element::S);
        let o1 = b.atom(Element::O);
        let o2 = b.atom(Element::O);
        let o3 = b.any_charge(Element::O);
        let o4 = b.any_charge(Element::O);
        b.bond(s, o1, 2);
        b.bond(s, o2, 2);
        b.bond(s, o3, 1);
        b.bond(s, o4, 1);
        patterns.push(b.build("sulfate"));

        // O=S=O : sulfones
        let mut b = Builder::new();
        let s = b.atom(Element::S);
        let o1 = b.atom(Element::O);
        let o2 = b.atom(Element::O);
        b.bond(s, o1, 2);
        b.bond(s, o2, 2);
        patterns.push(b.build("sulfone"));

        // O=P(-O)-O : phosphoryl / phosphate
        let mut b = Builder::new();
        let p = b.atom(Element::P);
        let od = b.atom(Element::O);
        let os1 = b.any_charge(Element::O);
        let os2 = b.any_charge(Element::O);
        b.bond(p, od, 2);
        b.bond(p, os1, 1);
        b.bond(p, os2, 1);
        patterns.push(b.build("phosphoryl"));

        // [N+](=O)[O-] : nitro (charge-separated form)
        let mut b = Builder::new();
        let n = b.charged(Element::N, 1);
        let od = b.atom(Element::O);
        let om = b.charged(Element::O, -1);
        b.bond(n, od, 2);
        b.bond(n, om, 1);
        patterns.push(b.build("nitro"));

        // N(=O)=O : nitro (hypervalent neutral form)
        let mut b = Builder::new();
        let n = b.atom(Element::N);
        let o1 = b.atom(Element::O);
        let o2 = b.atom(Element::O);
        b.bond(n, o1, 2);
        b.bond(n, o2, 2);
        patterns.push(b.build("nitro-neutral"));

        // C(=O)[O-] : carboxylate
        let mut b = Builder::new();
        let c = b.atom(Element::C);
        let od = b.atom(Element::O);
        let om = b.charged(Element::O, -1);
        b.bond(c, od, 2);
        b.bond(c, om, 1);
        patterns.push(b.build("carboxylate"));

        // C(=O)O : carboxyl / ester
        let mut b = Builder::new();
        let c = b.atom(Element::C);
        let od = b.atom(Element::O);
        let os = b.atom(Element::O);
        b.bond(c, od, 2);
        b.bond(c, os, 1);
        patterns.push(b.build("carboxyl"));

        // C(=S)O : thiocarboxyl
        let mut b = Builder::new();
        let c = b.atom(Element::C);
        let sd = b.atom(Element::S);
        let os = b.any_charge(Element::O);
        b.bond(c, sd, 2);
        b.bond(c, os, 1);
        patterns.push(b.build("thiocarboxyl"));

        // O=S : sulfoxides (after sulfone/sulfate have claimed theirs)
        let mut b = Builder::new();
        let s = b.atom(Element::S);
        let o = b.atom(Element::O);
        b.bond(s, o, 2);
        patterns.push(b.build("sulfoxide"));

        // C(=[N+])(-N)-N : guanidinium
        let mut b = Builder::new();
        let c = b.atom(Element::C);
        let nd = b.charged(Element::N, 1);
        let n1 = b.atom(Element::N);
        let n2 = b.atom(Element::N);
        b.bond(c, nd, 2);
        b.bond(c, n1, 1);
        b.bond(c, n2, 1);
        patterns.push(b.build("guanidinium"));

        // C(=[N+])-N : amidinium
        let mut b = Builder::new();
        let c = b.atom(Element::C);
        let nd = b.charged(Element::N, 1);
        let ns = b.atom(Element::N);
        b.bond(c, nd, 2);
        b.bond(c, ns, 1);
        patterns.push(b.build("amidinium"));

        Self { patterns }
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Expected length of `bond` at the prescribed order, from the covalent
/// radii of its endpoints. `None` when either radius is unknown.
fn expected_length<A, B>(mol: &Mol<A, B>, bond: EdgeIndex, order: u8) -> Option<f64>
where
    A: HasElement,
{
    let (a, b) = mol.bond_endpoints(bond)?;
    let order = BondOrder::from_u8(order)?;
    let ra = mol.atom(a).element().covalent_radius(order)?;
    let rb = mol.atom(b).element().covalent_radius(order)?;
    Some(ra + rb)
}

fn observed_length<A, B>(mol: &Mol<A, B>, bond: EdgeIndex) -> f64
where
    A: HasPosition3D,
{
    let (a, b) = mol.bond_endpoints(bond).expect("bond endpoints exist");
    distance(mol.atom(a).position_3d(), mol.atom(b).position_3d())
}

/// Rank a match: +1 per prescribed multiple bond lying in a target ring,
/// minus the total deviation of observed lengths from the lengths the
/// prescribed orders predict.
fn score_match<A, B>(
    mol: &Mol<A, B>,
    rings: &RingInfo,
    query: &Mol<QueryAtom, QueryBond>,
    m: &Match,
) -> f64
where
    A: HasElement + HasPosition3D,
{
    let mut score = 0.0;
    for &(qe, te) in &m.bonds {
        let order = query.bond(qe).order;
        if order >= 2 {
            let (ta, tb) = mol.bond_endpoints(te).expect("bond endpoints exist");
            if rings.is_ring_bond(ta, tb) {
                score += 1.0;
            }
        }
        if let Some(expected) = expected_length(mol, te, order) {
            score -= (observed_length(mol, te) - expected).abs();
        }
    }
    score
}

/// Commit a match's prescribed orders, walking its bonds in pattern
/// order. Any bond that cannot be committed rolls back everything this
/// match already placed.
fn try_apply<A, B>(
    mol: &Mol<A, B>,
    query: &Mol<QueryAtom, QueryBond>,
    m: &Match,
    state: &mut AssignState,
) -> bool {
    let mut committed: Vec<EdgeIndex> = Vec::new();
    for &(qe, te) in &m.bonds {
        let order = query.bond(qe).order;
        if state.is_defined(te) {
            if state.order(te) == order {
                continue;
            }
        } else if state.try_commit_balanced(mol, te, order) {
            committed.push(te);
            continue;
        }
        for &bond in committed.iter().rev() {
            state.rollback(mol, bond);
        }
        return false;
    }
    true
}

/// Run the full library against the target graph, committing prescribed
/// orders group by group.
pub fn resolve_functional_groups<A, B>(
    mol: &Mol<A, B>,
    rings: &RingInfo,
    geometries: &[Geometry],
    library: &PatternLibrary,
    state: &mut AssignState,
) where
    A: HasElement + HasFormalCharge + HasPosition3D,
{
    for pattern in library.patterns() {
        let query = &pattern.query;

        let atom_ok = |t: NodeIndex, q: NodeIndex| {
            let qa = query.atom(q);
            if let Some(el) = qa.element {
                if mol.atom(t).element() != el {
                    return false;
                }
            }
            if let Some(ch) = qa.charge {
                if mol.atom(t).formal_charge() != ch {
                    return false;
                }
            }
            true
        };
        let bond_ok = |te: EdgeIndex, qe: EdgeIndex| {
            let order = query.bond(qe).order;
            if state.is_defined(te) && state.order(te) != order {
                return false;
            }
            if order >= 2 {
                // a multiple bond on a tetrahedral center is VSEPR-forbidden
                let (ta, tb) = match mol.bond_endpoints(te) {
                    Some(ends) => ends,
                    None => return false,
                };
                if geometries[ta.index()] == Geometry::Tetrahedral
                    || geometries[tb.index()] == Geometry::Tetrahedral
                {
                    return false;
                }
            }
            true
        };

        let matches = find_matches(mol, query, atom_ok, bond_ok);
        if matches.is_empty() {
            continue;
        }

        // group embeddings covering identical target bond sets
        let mut groups: Vec<(Vec<usize>, Vec<&Match>)> = Vec::new();
        for m in &matches {
            let mut key: Vec<usize> = m.bonds.iter().map(|&(_, te)| te.index()).collect();
            key.sort_unstable();
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, members)) => members.push(m),
                None => groups.push((key, vec![m])),
            }
        }

        for (key, members) in &groups {
            if key.iter().all(|&i| state.is_defined(EdgeIndex::new(i))) {
                continue;
            }
            let mut ranked: Vec<(f64, &Match)> = members
                .iter()
                .map(|&m| (score_match(mol, rings, query, m), m))
                .collect();
            ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

            for &(score, m) in &ranked {
                if try_apply(mol, query, m, state) {
                    debug!(pattern = pattern.name, score, "functional group committed");
                    break;
                }
            }
        }
    }
}
