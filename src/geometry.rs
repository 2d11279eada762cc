//! 3D geometry utilities and local atom-geometry perception.
//!
//! Classification happens in three passes: a per-atom pass from neighbor
//! counts and averaged bond angles, a ring pass forcing flat 5/6-rings to
//! trigonal-planar, and a saturation pass demoting atoms whose
//! neighborhood cannot support a multiple bond.

use petgraph::graph::NodeIndex;

use crate::mol::Mol;
use crate::rings::RingInfo;
use crate::state::AssignState;
use crate::traits::{HasElement, HasPosition3D};

/// Local geometry class of an atom's substituents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Geometry {
    #[default]
    Undefined,
    Terminal,
    Linear,
    TrigonalPlanar,
    Tetrahedral,
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

pub fn distance(a: [f64; 3], b: [f64; 3]) -> f64 {
    norm(sub(a, b))
}

/// Angle a–center–b in degrees. Degenerate positions yield NaN, which
/// every threshold comparison treats as "not above".
pub fn bond_angle(a: [f64; 3], center: [f64; 3], b: [f64; 3]) -> f64 {
    let u = sub(a, center);
    let v = sub(b, center);
    let cos = dot(u, v) / (norm(u) * norm(v));
    cos.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Signed dihedral a–b–c–d in degrees, in (−180°, 180°].
pub fn dihedral_angle(a: [f64; 3], b: [f64; 3], c: [f64; 3], d: [f64; 3]) -> f64 {
    let v1 = sub(b, a);
    let v2 = sub(c, b);
    let v3 = sub(d, c);
    let n1 = cross(v1, v2);
    let n2 = cross(v2, v3);
    let cos = dot(n1, n2) / (norm(n1) * norm(n2));
    let angle = cos.clamp(-1.0, 1.0).acos().to_degrees();
    if dot(cross(n1, n2), v2) < 0.0 {
        -angle
    } else {
        angle
    }
}

/// Reflect an absolute torsion past 90° back into [0°, 90°].
pub fn fold_to_quadrant(angle_deg: f64) -> f64 {
    let a = angle_deg.abs() % 180.0;
    if a > 90.0 {
        180.0 - a
    } else {
        a
    }
}

/// Average pairwise bond angle over all neighbor pairs of `atom`.
pub fn average_bond_angle<A, B>(mol: &Mol<A, B>, atom: NodeIndex) -> f64
where
    A: HasPosition3D,
{
    let center = mol.atom(atom).position_3d();
    let nbrs: Vec<[f64; 3]> = mol
        .neighbors(atom)
        .map(|n| mol.atom(n).position_3d())
        .collect();
    let mut sum = 0.0;
    let mut count = 0usize;
    for i in 0..nbrs.len() {
        for j in (i + 1)..nbrs.len() {
            sum += bond_angle(nbrs[i], center, nbrs[j]);
            count += 1;
        }
    }
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Average absolute torsion over each consecutive wrapped 4-atom window
/// of a ring. Near zero for planar rings.
pub fn ring_torsion_average<A, B>(mol: &Mol<A, B>, ring: &[NodeIndex]) -> f64
where
    A: HasPosition3D,
{
    let len = ring.len();
    if len < 4 {
        return f64::NAN;
    }
    let pos = |i: usize| mol.atom(ring[i % len]).position_3d();
    let sum: f64 = (0..len)
        .map(|i| dihedral_angle(pos(i), pos(i + 1), pos(i + 2), pos(i + 3)).abs())
        .sum();
    sum / len as f64
}

const LINEAR_ANGLE_DEG: f64 = 155.0;
const TRIGONAL_ANGLE_DEG: f64 = 115.0;
const FLATNESS_5RING_DEG: f64 = 7.5;
const FLATNESS_6RING_DEG: f64 = 12.0;

fn classify_atom<A, B>(mol: &Mol<A, B>, atom: NodeIndex) -> Geometry
where
    A: HasPosition3D,
{
    let degree = mol.degree(atom);
    match degree {
        0 => Geometry::Undefined,
        1 => Geometry::Terminal,
        2 => {
            let avg = average_bond_angle(mol, atom);
            if avg > LINEAR_ANGLE_DEG {
                Geometry::Linear
            } else if avg > TRIGONAL_ANGLE_DEG {
                Geometry::TrigonalPlanar
            } else {
                Geometry::Tetrahedral
            }
        }
        3 => {
            if average_bond_angle(mol, atom) > TRIGONAL_ANGLE_DEG {
                Geometry::TrigonalPlanar
            } else {
                Geometry::Tetrahedral
            }
        }
        4 => {
            if average_bond_angle(mol, atom) <= TRIGONAL_ANGLE_DEG {
                Geometry::Tetrahedral
            } else {
                Geometry::Undefined
            }
        }
        _ => Geometry::Undefined,
    }
}

/// Flat 5/6-rings force their 2-connected members to trigonal-planar,
/// whatever the raw angle average said.
fn flatten_planar_rings<A, B>(mol: &Mol<A, B>, rings: &RingInfo, geoms: &mut [Geometry])
where
    A: HasPosition3D,
{
    for ring in rings.rings() {
        let threshold = match ring.len() {
            5 => FLATNESS_5RING_DEG,
            6 => FLATNESS_6RING_DEG,
            _ => continue,
        };
        let avg_torsion = ring_torsion_average(mol, ring);
        if !(avg_torsion < threshold) {
            continue;
        }
        for &atom in ring {
            if mol.degree(atom) == 2 {
                geoms[atom.index()] = Geometry::TrigonalPlanar;
            }
        }
    }
}

/// Demote Linear/TrigonalPlanar atoms that have no unsaturation partner:
/// no neighbor that is itself unsaturable and either already shares a
/// multiple bond or still has matching free valence. Ring heteroatoms of
/// aromatic-capable types keep their planarity (lone-pair donation).
fn demote_saturated<A, B>(
    mol: &Mol<A, B>,
    rings: &RingInfo,
    state: &AssignState,
    geoms: &mut [Geometry],
) where
    A: HasElement + HasPosition3D,
{
    for atom in mol.atoms() {
        let geom = geoms[atom.index()];
        if !matches!(geom, Geometry::Linear | Geometry::TrigonalPlanar) {
            continue;
        }
        if rings.is_ring_atom(atom) && mol.atom(atom).element().is_aromatic_heteroatom() {
            continue;
        }
        let has_partner = mol.neighbors_with_bonds(atom).any(|(bond, nbr)| {
            let nbr_geom = geoms[nbr.index()];
            if !matches!(
                nbr_geom,
                Geometry::Terminal | Geometry::Linear | Geometry::TrigonalPlanar
            ) {
                return false;
            }
            (state.is_defined(bond) && state.order(bond) >= 2)
                || (state.free_valence(atom) >= 2 && state.free_valence(nbr) >= 2)
        });
        if !has_partner {
            geoms[atom.index()] = match geom {
                Geometry::TrigonalPlanar => Geometry::Tetrahedral,
                Geometry::Linear => Geometry::TrigonalPlanar,
                other => other,
            };
        }
    }
}

/// Classify every atom's local geometry, including ring-flatness and
/// saturation fix-ups. Relies on free valences already being computed.
pub fn perceive_geometries<A, B>(
    mol: &Mol<A, B>,
    rings: &RingInfo,
    state: &AssignState,
) -> Vec<Geometry>
where
    A: HasElement + HasPosition3D,
{
    let mut geoms: Vec<Geometry> = mol.atoms().map(|a| classify_atom(mol, a)).collect();
    flatten_planar_rings(mol, rings, &mut geoms);
    demote_saturated(mol, rings, state, &mut geoms);
    geoms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Atom;
    use crate::bond::Bond;
    use crate::element::Element;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn right_angle() {
        let a = [1.0, 0.0, 0.0];
        let c = [0.0, 0.0, 0.0];
        let b = [0.0, 1.0, 0.0];
        assert!(approx(bond_angle(a, c, b), 90.0));
    }

    #[test]
    fn straight_line_angle() {
        let a = [-1.0, 0.0, 0.0];
        let c = [0.0, 0.0, 0.0];
        let b = [2.0, 0.0, 0.0];
        assert!(approx(bond_angle(a, c, b), 180.0));
    }

    #[test]
    fn dihedral_signs() {
        let a = [1.0, 1.0, 0.0];
        let b = [1.0, 0.0, 0.0];
        let c = [0.0, 0.0, 0.0];
        // cis (0°), trans (180°), and ±90° out of plane
        assert!(approx(dihedral_angle(a, b, c, [0.0, 1.0, 0.0]), 0.0));
        assert!(approx(dihedral_angle(a, b, c, [0.0, -1.0, 0.0]).abs(), 180.0));
        assert!(approx(dihedral_angle(a, b, c, [0.0, 0.0, 1.0]).abs(), 90.0));
    }

    #[test]
    fn quadrant_folding() {
        assert!(approx(fold_to_quadrant(30.0), 30.0));
        assert!(approx(fold_to_quadrant(-30.0), 30.0));
        assert!(approx(fold_to_quadrant(150.0), 30.0));
        assert!(approx(fold_to_quadrant(-170.0), 10.0));
        assert!(approx(fold_to_quadrant(90.0), 90.0));
    }

    fn atom_at(element: Element, position: [f64; 3]) -> Atom {
        Atom {
            position,
            ..Atom::new(element)
        }
    }

    #[test]
    fn classify_terminal_linear_trigonal_tetrahedral() {
        let mut mol: Mol<Atom, Bond> = Mol::new();
        // linear center
        let n = mol.add_atom(atom_at(Element::N, [0.0, 0.0, 2.66]));
        let c_mid = mol.add_atom(atom_at(Element::C, [0.0, 0.0, 1.50]));
        let c_end = mol.add_atom(atom_at(Element::C, [0.0, 0.0, 0.0]));
        mol.add_bond(n, c_mid, Bond::default());
        mol.add_bond(c_mid, c_end, Bond::default());
        assert_eq!(classify_atom(&mol, n), Geometry::Terminal);
        assert_eq!(classify_atom(&mol, c_mid), Geometry::Linear);

        // trigonal center: three neighbors at 120°
        let c = mol.add_atom(atom_at(Element::C, [10.0, 0.0, 0.0]));
        for k in 0..3 {
            let theta = (k as f64) * 120.0_f64.to_radians();
            let p = [10.0 + 1.4 * theta.cos(), 1.4 * theta.sin(), 0.0];
            let nb = mol.add_atom(atom_at(Element::C, p));
            mol.add_bond(c, nb, Bond::default());
        }
        assert_eq!(classify_atom(&mol, c), Geometry::TrigonalPlanar);

        // tetrahedral center: four neighbors at ~109.5°
        let t = mol.add_atom(atom_at(Element::C, [20.0, 0.0, 0.0]));
        let dirs = [
            [1.0, 1.0, 1.0],
            [1.0, -1.0, -1.0],
            [-1.0, 1.0, -1.0],
            [-1.0, -1.0, 1.0],
        ];
        for d in dirs {
            let p = [20.0 + d[0], d[1], d[2]];
            let nb = mol.add_atom(atom_at(Element::H, p));
            mol.add_bond(t, nb, Bond::default());
        }
        assert_eq!(classify_atom(&mol, t), Geometry::Tetrahedral);
    }

    #[test]
    fn flat_ring_forces_trigonal() {
        let mut mol: Mol<Atom, Bond> = Mol::new();
        let nodes: Vec<_> = (0..6)
            .map(|k| {
                let theta = (k as f64) * 60.0_f64.to_radians();
                mol.add_atom(atom_at(
                    Element::C,
                    [1.39 * theta.cos(), 1.39 * theta.sin(), 0.0],
                ))
            })
            .collect();
        for i in 0..6 {
            mol.add_bond(nodes[i], nodes[(i + 1) % 6], Bond::default());
        }
        let rings = RingInfo::from_rings(vec![nodes.clone()]);
        assert!(ring_torsion_average(&mol, &nodes) < 1e-6);

        let mut geoms: Vec<Geometry> = mol.atoms().map(|a| classify_atom(&mol, a)).collect();
        flatten_planar_rings(&mol, &rings, &mut geoms);
        assert!(geoms.iter().all(|&g| g == Geometry::TrigonalPlanar));
    }

    #[test]
    fn saturated_trigonal_demoted() {
        // planar-looking carbon whose only unsaturable neighbor has no
        // free valence left: must fall back to tetrahedral
        let mut mol: Mol<Atom, Bond> = Mol::new();
        let a = mol.add_atom(atom_at(Element::C, [0.0, 0.0, 0.0]));
        let b = mol.add_atom(atom_at(Element::C, [1.5, 0.0, 0.0]));
        let c = mol.add_atom(atom_at(Element::C, [-0.75, 1.3, 0.0]));
        let e_ab = mol.add_bond(a, b, Bond::default());
        mol.add_bond(a, c, Bond::default());

        let mut state = AssignState::from_orders(&mol, &[None, None]);
        state.set_free_valence(a, 2);
        state.set_free_valence(b, 1);
        state.set_free_valence(c, 1);

        let rings = RingInfo::empty();
        let geoms = perceive_geometries(&mol, &rings, &state);
        assert_eq!(geoms[a.index()], Geometry::Tetrahedral);

        // a defined double bond on the connecting edge keeps it planar
        let mut state2 = AssignState::from_orders(&mol, &[None, None]);
        state2.set_free_valence(a, 2);
        state2.set_free_valence(b, 2);
        state2.set_free_valence(c, 1);
        state2.commit(&mol, e_ab, 2);
        let geoms2 = perceive_geometries(&mol, &rings, &state2);
        assert_eq!(geoms2[a.index()], Geometry::TrigonalPlanar);
    }
}
