//! Top-level driver: runs every assignment phase in sequence over one
//! molecular graph and writes the resulting orders into the caller's
//! slice. Slots already holding an order are left untouched.

use std::error::Error;
use std::fmt;

use tracing::debug;

use crate::backtrack::{correct_terminal_doubles, fix_twisted_singles, search_fragments};
use crate::bond::BondOrder;
use crate::conjugation::assign_conjugated;
use crate::geometry::{perceive_geometries, Geometry};
use crate::mol::Mol;
use crate::patterns::{resolve_functional_groups, PatternLibrary};
use crate::rings::RingInfo;
use crate::state::AssignState;
use crate::traits::{
    HasAromaticity, HasElement, HasFormalCharge, HasHydrogenCount, HasPosition3D,
};
use crate::valence::calc_free_valences;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    /// The output slice does not have one slot per bond.
    OrderSliceMismatch { expected: usize, got: usize },
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GenerateError::OrderSliceMismatch { expected, got } => write!(
                f,
                "order slice holds {got} slots but the graph has {expected} bonds"
            ),
        }
    }
}

impl Error for GenerateError {}

/// Assign an order to every bond whose slot in `orders` is `None`.
///
/// Builds the standard pattern library on each call; callers assigning
/// many graphs should build one [`PatternLibrary`] and use
/// [`generate_with`].
pub fn generate<A, B>(
    mol: &Mol<A, B>,
    rings: &RingInfo,
    orders: &mut [Option<BondOrder>],
) -> Result<(), GenerateError>
where
    A: HasElement + HasFormalCharge + HasHydrogenCount + HasPosition3D,
    B: HasAromaticity,
{
    generate_with(mol, rings, &PatternLibrary::standard(), orders)
}

/// [`generate`] with a caller-owned pattern library.
pub fn generate_with<A, B>(
    mol: &Mol<A, B>,
    rings: &RingInfo,
    library: &PatternLibrary,
    orders: &mut [Option<BondOrder>],
) -> Result<(), GenerateError>
where
    A: HasElement + HasFormalCharge + HasHydrogenCount + HasPosition3D,
    B: HasAromaticity,
{
    if orders.len() != mol.bond_count() {
        return Err(GenerateError::OrderSliceMismatch {
            expected: mol.bond_count(),
            got: orders.len(),
        });
    }
    if orders.iter().all(|o| o.is_some()) {
        return Ok(());
    }

    let mut state = AssignState::from_orders(mol, orders);
    calc_free_valences(mol, &mut state);
    debug!(undefined = state.num_undefined(), "free valences computed");

    let geometries = perceive_geometries(mol, rings, &state);

    // bonds touching a tetrahedral center cannot be multiple
    for bond in mol.bonds() {
        if state.is_defined(bond) {
            continue;
        }
        let (a, b) = match mol.bond_endpoints(bond) {
            Some(ends) => ends,
            None => continue,
        };
        if geometries[a.index()] == Geometry::Tetrahedral
            || geometries[b.index()] == Geometry::Tetrahedral
        {
            state.commit(mol, bond, 1);
        }
    }
    debug!(undefined = state.num_undefined(), "tetrahedral bonds fixed");

    resolve_functional_groups(mol, rings, &geometries, library, &mut state);
    debug!(undefined = state.num_undefined(), "functional groups resolved");

    assign_conjugated(mol, rings, &geometries, &mut state);
    debug!(undefined = state.num_undefined(), "conjugated systems assigned");

    fix_twisted_singles(mol, &geometries, &mut state);
    search_fragments(mol, rings, &geometries, &mut state);
    correct_terminal_doubles(mol, &geometries, &mut state);
    debug!(undefined = state.num_undefined(), "search complete");

    for (slot, bond) in orders.iter_mut().zip(mol.bonds()) {
        if slot.is_none() {
            *slot = BondOrder::from_u8(state.order(bond));
        }
    }
    Ok(())
}
