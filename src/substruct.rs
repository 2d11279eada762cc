//! Substructure matching with caller-supplied predicates.
//!
//! A VF2-style backtracking isomorphism search. Unlike a payload-based
//! matcher, the predicates receive graph *indices*, so callers can match
//! against per-index side tables (geometry classes, assignment state)
//! rather than only intrinsic atom data.

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::mol::Mol;

/// One embedding of a query graph in a target graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// (query atom, target atom) pairs, sorted by query atom index.
    pub atoms: Vec<(NodeIndex, NodeIndex)>,
    /// (query bond, target bond) pairs, in query bond insertion order.
    pub bonds: Vec<(EdgeIndex, EdgeIndex)>,
}

impl Match {
    /// Target atom mapped to the given query atom.
    pub fn target_atom(&self, query_atom: NodeIndex) -> Option<NodeIndex> {
        self.atoms
            .iter()
            .find(|&&(q, _)| q == query_atom)
            .map(|&(_, t)| t)
    }
}

/// All embeddings of `query` in `target` that satisfy the predicates.
///
/// `atom_ok(target_atom, query_atom)` and `bond_ok(target_bond, query_bond)`
/// decide compatibility; the structural (adjacency) constraints are
/// enforced by the search itself.
pub fn find_matches<A1, B1, A2, B2, FA, FB>(
    target: &Mol<A1, B1>,
    query: &Mol<A2, B2>,
    atom_ok: FA,
    bond_ok: FB,
) -> Vec<Match>
where
    FA: Fn(NodeIndex, NodeIndex) -> bool,
    FB: Fn(EdgeIndex, EdgeIndex) -> bool,
{
    Vf2::new(target, query, atom_ok, bond_ok).find_all()
}

struct Vf2<'a, A1, B1, A2, B2, FA, FB> {
    target: &'a Mol<A1, B1>,
    query: &'a Mol<A2, B2>,
    atom_ok: FA,
    bond_ok: FB,
    query_order: Vec<NodeIndex>,
    query_map: Vec<Option<NodeIndex>>,
    target_used: Vec<bool>,
}

impl<'a, A1, B1, A2, B2, FA, FB> Vf2<'a, A1, B1, A2, B2, FA, FB>
where
    FA: Fn(NodeIndex, NodeIndex) -> bool,
    FB: Fn(EdgeIndex, EdgeIndex) -> bool,
{
    fn new(target: &'a Mol<A1, B1>, query: &'a Mol<A2, B2>, atom_ok: FA, bond_ok: FB) -> Self {
        // most-constrained-first: high-degree query atoms prune earliest
        let mut query_order: Vec<NodeIndex> = query.atoms().collect();
        query_order.sort_by(|&a, &b| query.degree(b).cmp(&query.degree(a)));
        Self {
            target,
            query,
            atom_ok,
            bond_ok,
            query_order,
            query_map: vec![None; query.atom_count()],
            target_used: vec![false; target.atom_count()],
        }
    }

    fn find_all(&mut self) -> Vec<Match> {
        let mut results = Vec::new();
        self.recurse(0, &mut results);
        results
    }

    fn recurse(&mut self, depth: usize, results: &mut Vec<Match>) {
        if depth == self.query_order.len() {
            results.push(self.build_match());
            return;
        }

        let query_node = self.query_order[depth];
        for t_idx in 0..self.target_used.len() {
            if self.target_used[t_idx] {
                continue;
            }
            let target_node = NodeIndex::new(t_idx);
            if !self.is_feasible(query_node, target_node) {
                continue;
            }

            self.query_map[query_node.index()] = Some(target_node);
            self.target_used[t_idx] = true;

            self.recurse(depth + 1, results);

            self.query_map[query_node.index()] = None;
            self.target_used[t_idx] = false;
        }
    }

    fn is_feasible(&self, query_node: NodeIndex, target_node: NodeIndex) -> bool {
        if !(self.atom_ok)(target_node, query_node) {
            return false;
        }
        for q_neighbor in self.query.neighbors(query_node) {
            if let Some(t_mapped) = self.query_map[q_neighbor.index()] {
                let q_bond = self
                    .query
                    .bond_between(query_node, q_neighbor)
                    .expect("bond must exist between neighbors");
                match self.target.bond_between(target_node, t_mapped) {
                    Some(t_bond) => {
                        if !(self.bond_ok)(t_bond, q_bond) {
                            return false;
                        }
                    }
                    None => return false,
                }
            }
        }
        true
    }

    fn build_match(&self) -> Match {
        let mut atoms: Vec<(NodeIndex, NodeIndex)> = self
            .query_map
            .iter()
            .enumerate()
            .map(|(qi, t)| (NodeIndex::new(qi), t.expect("complete mapping at leaf")))
            .collect();
        atoms.sort_by_key(|&(q, _)| q.index());

        let bonds = self
            .query
            .bonds()
            .map(|qe| {
                let (qa, qb) = self
                    .query
                    .bond_endpoints(qe)
                    .expect("query bond endpoints exist");
                let ta = self.query_map[qa.index()].expect("complete mapping at leaf");
                let tb = self.query_map[qb.index()].expect("complete mapping at leaf");
                let te = self
                    .target
                    .bond_between(ta, tb)
                    .expect("feasibility guaranteed the target bond");
                (qe, te)
            })
            .collect();

        Match { atoms, bonds }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Atom;
    use crate::bond::Bond;
    use crate::element::Element;
    use crate::traits::HasElement;

    fn add_chain(mol: &mut Mol<Atom, Bond>, elements: &[Element]) -> Vec<NodeIndex> {
        let nodes: Vec<_> = elements
            .iter()
            .map(|&e| mol.add_atom(Atom::new(e)))
            .collect();
        for w in nodes.windows(2) {
            mol.add_bond(w[0], w[1], Bond::default());
        }
        nodes
    }

    fn element_match<'a>(
        target: &'a Mol<Atom, Bond>,
        query: &'a Mol<Atom, Bond>,
    ) -> impl Fn(NodeIndex, NodeIndex) -> bool + 'a {
        move |t, q| target.atom(t).element() == query.atom(q).element()
    }

    #[test]
    fn chain_in_chain() {
        let mut target = Mol::new();
        add_chain(&mut target, &[Element::C, Element::C, Element::O]);
        let mut query = Mol::new();
        add_chain(&mut query, &[Element::C, Element::O]);

        let matches = find_matches(&target, &query, element_match(&target, &query), |_, _| true);
        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.atoms.len(), 2);
        assert_eq!(m.bonds.len(), 1);
        assert_eq!(
            target.atom(m.target_atom(NodeIndex::new(1)).unwrap()).element,
            Element::O
        );
    }

    #[test]
    fn symmetric_query_yields_both_numberings() {
        let mut target = Mol::new();
        add_chain(&mut target, &[Element::C, Element::C]);
        let mut query = Mol::new();
        add_chain(&mut query, &[Element::C, Element::C]);

        let matches = find_matches(&target, &query, element_match(&target, &query), |_, _| true);
        assert_eq!(matches.len(), 2);
        assert_ne!(matches[0], matches[1]);
    }

    #[test]
    fn no_match_on_wrong_element() {
        let mut target = Mol::new();
        add_chain(&mut target, &[Element::C, Element::C]);
        let mut query = Mol::new();
        add_chain(&mut query, &[Element::C, Element::N]);

        let matches = find_matches(&target, &query, element_match(&target, &query), |_, _| true);
        assert!(matches.is_empty());
    }

    #[test]
    fn bond_predicate_prunes() {
        let mut target = Mol::new();
        let nodes = add_chain(&mut target, &[Element::C, Element::C, Element::C]);
        let forbidden = target.bond_between(nodes[0], nodes[1]).unwrap();
        let mut query = Mol::new();
        add_chain(&mut query, &[Element::C, Element::C]);

        let matches = find_matches(
            &target,
            &query,
            element_match(&target, &query),
            |t, _| t != forbidden,
        );
        // only the second target edge remains, in two numberings
        assert_eq!(matches.len(), 2);
        for m in &matches {
            assert_ne!(m.bonds[0].1, forbidden);
        }
    }

    #[test]
    fn branched_query_maps_all_bonds() {
        // target: central C bonded to O, O, N
        let mut target: Mol<Atom, Bond> = Mol::new();
        let c = target.add_atom(Atom::new(Element::C));
        let o1 = target.add_atom(Atom::new(Element::O));
        let o2 = target.add_atom(Atom::new(Element::O));
        let n = target.add_atom(Atom::new(Element::N));
        target.add_bond(c, o1, Bond::default());
        target.add_bond(c, o2, Bond::default());
        target.add_bond(c, n, Bond::default());

        // query: C(O)(O)
        let mut query: Mol<Atom, Bond> = Mol::new();
        let qc = query.add_atom(Atom::new(Element::C));
        let qo1 = query.add_atom(Atom::new(Element::O));
        let qo2 = query.add_atom(Atom::new(Element::O));
        query.add_bond(qc, qo1, Bond::default());
        query.add_bond(qc, qo2, Bond::default());

        let matches = find_matches(&target, &query, element_match(&target, &query), |_, _| true);
        // two numberings of the two oxygens
        assert_eq!(matches.len(), 2);
        for m in &matches {
            assert_eq!(m.bonds.len(), 2);
            assert_eq!(m.target_atom(qc), Some(c));
            // every query bond maps to a real target bond
            for &(qe, te) in &m.bonds {
                let (qa, qb) = query.bond_endpoints(qe).unwrap();
                let (ta, tb) = target.bond_endpoints(te).unwrap();
                let mapped = [m.target_atom(qa).unwrap(), m.target_atom(qb).unwrap()];
                assert!(mapped.contains(&ta) && mapped.contains(&tb));
            }
        }
    }

    #[test]
    fn empty_query_matches_once() {
        let mut target = Mol::new();
        add_chain(&mut target, &[Element::C]);
        let query: Mol<Atom, Bond> = Mol::new();
        let matches = find_matches(&target, &query, |_, _| true, |_, _| true);
        assert_eq!(matches.len(), 1);
        assert!(matches[0].atoms.is_empty());
    }
}
