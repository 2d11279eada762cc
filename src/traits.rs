//! Accessor traits decoupling the engine from concrete atom/bond payloads.
//!
//! Every engine entry point is generic over these, so callers with richer
//! atom types (extra annotations, residue info) can run perception
//! without converting their graphs.

use crate::element::Element;

pub trait HasElement {
    fn element(&self) -> Element;
}

pub trait HasFormalCharge {
    fn formal_charge(&self) -> i8;
}

pub trait HasHydrogenCount {
    /// Implicit (suppressed) hydrogens; these consume valence but are not
    /// graph nodes.
    fn hydrogen_count(&self) -> u8;
}

pub trait HasPosition3D {
    fn position_3d(&self) -> [f64; 3];
}

pub trait HasAromaticity {
    fn is_aromatic(&self) -> bool;
}
