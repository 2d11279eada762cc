//! Free-valence calculation: how many more bonding electrons each atom
//! can still distribute among its undefined bonds.

use petgraph::graph::EdgeIndex;

use crate::element::Element;
use crate::mol::Mol;
use crate::state::AssignState;
use crate::traits::{HasElement, HasFormalCharge, HasHydrogenCount};

/// Sum of defined bond orders plus implicit hydrogens.
pub fn used_valence<A, B>(
    mol: &Mol<A, B>,
    atom: petgraph::graph::NodeIndex,
    state: &AssignState,
) -> i16
where
    A: HasHydrogenCount,
{
    let bond_sum: i16 = mol
        .bonds_of(atom)
        .filter(|&e| state.is_defined(e))
        .map(|e| state.order(e) as i16)
        .sum();
    bond_sum + mol.atom(atom).hydrogen_count() as i16
}

/// Fill the free-valence table for every atom, in one forward pass.
///
/// For each atom, walk its allowed total valences smallest-first. The
/// first valence leaving strictly more capacity than the number of
/// undefined incident bonds becomes the atom's free valence. A valence
/// leaving exactly one unit per undefined bond closes the atom off: all
/// of its undefined bonds are fixed to order 1 on the spot, and each
/// already-processed neighbor (lower index) pays one unit of its own
/// free valence. Later-indexed neighbors see the bond as used when their
/// own turn comes, so they are not decremented here.
///
/// Carbon folds its formal charge in as `-|charge|` (a charge of either
/// sign removes one bonding slot); other elements add the signed charge.
/// Hypervalent chalcogens with four or more explicit neighbors switch to
/// their alternate valence list.
pub fn calc_free_valences<A, B>(mol: &Mol<A, B>, state: &mut AssignState)
where
    A: HasElement + HasFormalCharge + HasHydrogenCount,
{
    for atom in mol.atoms() {
        let data = mol.atom(atom);
        let element = data.element();

        let undefined: Vec<EdgeIndex> = mol
            .bonds_of(atom)
            .filter(|&e| !state.is_defined(e))
            .collect();
        if undefined.is_empty() {
            state.set_free_valence(atom, 0);
            continue;
        }
        let undef_count = undefined.len() as i16;

        let charge = data.formal_charge() as i16;
        let charge_adjust = if element == Element::C {
            -charge.abs()
        } else {
            charge
        };

        let valences: &[u8] = if mol.degree(atom) >= 4 {
            element
                .hypervalent_valences()
                .unwrap_or_else(|| element.allowed_valences())
        } else {
            element.allowed_valences()
        };

        let used = used_valence(mol, atom, state);
        let mut slack = None;
        for &v in valences {
            let avail = v as i16 + charge_adjust - used;
            if avail > undef_count {
                slack = Some(avail);
                break;
            }
            if avail == undef_count {
                break;
            }
        }

        match slack {
            Some(free) => state.set_free_valence(atom, free),
            None => {
                // No slack beyond one unit per bond (or no valence model
                // at all): close the atom off with singles.
                for &bond in &undefined {
                    state.define_raw(bond, 1);
                    let nbr = mol
                        .bond_other_end(bond, atom)
                        .expect("bond endpoint exists");
                    if nbr.index() < atom.index() {
                        state.consume_free_valence(nbr, 1);
                    }
                }
                state.set_free_valence(atom, 0);
            }
        }
    }
}
