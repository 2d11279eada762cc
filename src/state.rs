use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::bond::BondOrder;
use crate::mol::Mol;

/// Shared assignment state threaded through every perception phase:
/// the defined-order bit-mask, the working order array, and the per-atom
/// free-valence table.
///
/// Invariants:
/// - an order slot is meaningful only while its defined bit is set;
/// - free valence never goes negative; a violation is an algorithm defect
///   and aborts via assertion;
/// - every commit of `n` units of order decrements both endpoints' free
///   valence by exactly `n`, and rollback restores exactly that.
#[derive(Debug, Clone)]
pub struct AssignState {
    orders: Vec<u8>,
    defined: Vec<bool>,
    free_valence: Vec<i16>,
}

impl AssignState {
    /// Seed from the caller's order slice: `Some` slots are already
    /// defined and stay untouched, `None` slots are the engine's to fill.
    pub fn from_orders<A, B>(mol: &Mol<A, B>, orders: &[Option<BondOrder>]) -> Self {
        debug_assert_eq!(orders.len(), mol.bond_count());
        let mut order_vals = vec![0u8; orders.len()];
        let mut defined = vec![false; orders.len()];
        for (i, slot) in orders.iter().enumerate() {
            if let Some(o) = slot {
                order_vals[i] = o.as_u8();
                defined[i] = true;
            }
        }
        Self {
            orders: order_vals,
            defined,
            free_valence: vec![0; mol.atom_count()],
        }
    }

    pub fn order(&self, bond: EdgeIndex) -> u8 {
        self.orders[bond.index()]
    }

    pub fn is_defined(&self, bond: EdgeIndex) -> bool {
        self.defined[bond.index()]
    }

    pub fn num_undefined(&self) -> usize {
        self.defined.iter().filter(|&&d| !d).count()
    }

    pub fn orders(&self) -> &[u8] {
        &self.orders
    }

    pub fn free_valence(&self, atom: NodeIndex) -> i16 {
        self.free_valence[atom.index()]
    }

    pub fn set_free_valence(&mut self, atom: NodeIndex, value: i16) {
        assert!(value >= 0, "free valence must be non-negative");
        self.free_valence[atom.index()] = value;
    }

    pub fn consume_free_valence(&mut self, atom: NodeIndex, amount: i16) {
        let v = &mut self.free_valence[atom.index()];
        assert!(*v >= amount, "free valence underflow at atom {}", atom.index());
        *v -= amount;
    }

    pub fn restore_free_valence(&mut self, atom: NodeIndex, amount: i16) {
        self.free_valence[atom.index()] += amount;
    }

    /// Count of still-undefined bonds incident to `atom`.
    pub fn undefined_incident<A, B>(&self, mol: &Mol<A, B>, atom: NodeIndex) -> usize {
        mol.bonds_of(atom).filter(|&e| !self.is_defined(e)).count()
    }

    /// Set a bond's order without touching free valence. Only the
    /// free-valence pass uses this; it accounts for capacity itself while
    /// the table is still being built.
    pub fn define_raw(&mut self, bond: EdgeIndex, order: u8) {
        assert!(!self.is_defined(bond), "bond {} already defined", bond.index());
        self.orders[bond.index()] = order;
        self.defined[bond.index()] = true;
    }

    /// Commit `order` to an undefined bond, consuming free valence on
    /// both endpoints. Asserts the capacity is there; callers decide
    /// feasibility beforehand.
    pub fn commit<A, B>(&mut self, mol: &Mol<A, B>, bond: EdgeIndex, order: u8) {
        assert!(!self.is_defined(bond), "bond {} already defined", bond.index());
        let (a, b) = mol
            .bond_endpoints(bond)
            .expect("bond endpoints exist in graph");
        self.consume_free_valence(a, order as i16);
        self.consume_free_valence(b, order as i16);
        self.orders[bond.index()] = order;
        self.defined[bond.index()] = true;
    }

    /// Commit only if both endpoints keep at least one unit of free
    /// valence for each of their other still-undefined bonds, so no
    /// neighbor bond can be stranded without capacity.
    pub fn try_commit_balanced<A, B>(
        &mut self,
        mol: &Mol<A, B>,
        bond: EdgeIndex,
        order: u8,
    ) -> bool {
        debug_assert!(!self.is_defined(bond));
        let (a, b) = match mol.bond_endpoints(bond) {
            Some(ends) => ends,
            None => return false,
        };
        for atom in [a, b] {
            let others = self.undefined_incident(mol, atom) as i16 - 1;
            if self.free_valence(atom) - (order as i16) < others {
                return false;
            }
        }
        self.commit(mol, bond, order);
        true
    }

    /// Undo a commit: restore the mask bit, free valence, and order slot.
    pub fn rollback<A, B>(&mut self, mol: &Mol<A, B>, bond: EdgeIndex) {
        assert!(self.is_defined(bond), "rollback of undefined bond");
        let order = self.orders[bond.index()] as i16;
        let (a, b) = mol
            .bond_endpoints(bond)
            .expect("bond endpoints exist in graph");
        self.restore_free_valence(a, order);
        self.restore_free_valence(b, order);
        self.orders[bond.index()] = 0;
        self.defined[bond.index()] = false;
    }

    /// Raise a committed single bond to a double, consuming one more unit
    /// of free valence per endpoint (conjugated-ring alternation).
    pub fn raise_to_double<A, B>(&mut self, mol: &Mol<A, B>, bond: EdgeIndex) {
        assert_eq!(self.orders[bond.index()], 1, "only singles can be raised");
        let (a, b) = mol
            .bond_endpoints(bond)
            .expect("bond endpoints exist in graph");
        self.consume_free_valence(a, 1);
        self.consume_free_valence(b, 1);
        self.orders[bond.index()] = 2;
    }

    /// Lower a committed double back to a single, releasing one unit of
    /// free valence per endpoint (terminal-bond correction).
    pub fn lower_to_single<A, B>(&mut self, mol: &Mol<A, B>, bond: EdgeIndex) {
        assert_eq!(self.orders[bond.index()], 2, "only doubles can be lowered");
        let (a, b) = mol
            .bond_endpoints(bond)
            .expect("bond endpoints exist in graph");
        self.restore_free_valence(a, 1);
        self.restore_free_valence(b, 1);
        self.orders[bond.index()] = 1;
    }
}
