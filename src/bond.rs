/// Integer multiplicity of a covalent bond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
}

impl BondOrder {
    pub fn as_u8(self) -> u8 {
        match self {
            BondOrder::Single => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
        }
    }

    pub fn from_u8(order: u8) -> Option<BondOrder> {
        match order {
            1 => Some(BondOrder::Single),
            2 => Some(BondOrder::Double),
            3 => Some(BondOrder::Triple),
            _ => None,
        }
    }
}

/// Default bond payload for a molecular graph edge.
///
/// The order being computed lives in the caller's order array, not here;
/// the only intrinsic bond property the engine reads is the pre-existing
/// aromaticity annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bond {
    /// Whether this bond was annotated aromatic before perception ran.
    /// Read-only for the engine; aromatic bonds are always eligible for
    /// conjugated-ring alternation.
    pub is_aromatic: bool,
}

impl crate::traits::HasAromaticity for Bond {
    fn is_aromatic(&self) -> bool {
        self.is_aromatic
    }
}
