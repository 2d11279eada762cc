use crate::element::Element;

/// Default atom type for a molecular graph node.
///
/// `Atom` stores what the engine consumes: element, formal charge,
/// implicit-hydrogen count, and a 3D position. Computed properties
/// (free valence, geometry class) live in engine-local tables keyed by
/// node index, never on the atom itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub element: Element,
    /// Formal charge in elementary charge units.
    pub formal_charge: i8,
    /// Number of suppressed hydrogens implied by this atom's valence.
    pub hydrogen_count: u8,
    /// Cartesian coordinates in Å. Perception assumes these are valid;
    /// degenerate positions yield undefined (NaN) angle classifications,
    /// not errors.
    pub position: [f64; 3],
}

impl Atom {
    pub fn new(element: Element) -> Self {
        Self {
            element,
            formal_charge: 0,
            hydrogen_count: 0,
            position: [0.0; 3],
        }
    }
}

impl Default for Atom {
    fn default() -> Self {
        Self::new(Element::C)
    }
}

impl crate::traits::HasElement for Atom {
    fn element(&self) -> Element {
        self.element
    }
}

impl crate::traits::HasFormalCharge for Atom {
    fn formal_charge(&self) -> i8 {
        self.formal_charge
    }
}

impl crate::traits::HasHydrogenCount for Atom {
    fn hydrogen_count(&self) -> u8 {
        self.hydrogen_count
    }
}

impl crate::traits::HasPosition3D for Atom {
    fn position_3d(&self) -> [f64; 3] {
        self.position
    }
}
