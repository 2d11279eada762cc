pub mod atom;
pub mod backtrack;
pub mod bond;
pub mod conjugation;
pub mod element;
pub mod generate;
pub mod geometry;
pub mod matching;
pub mod mol;
pub mod patterns;
pub mod rings;
pub mod state;
pub mod substruct;
pub mod traits;
pub mod valence;

pub use atom::Atom;
pub use bond::{Bond, BondOrder};
pub use element::Element;
pub use generate::{generate, generate_with, GenerateError};
pub use geometry::Geometry;
pub use mol::Mol;
pub use patterns::PatternLibrary;
pub use rings::RingInfo;
pub use traits::{
    HasAromaticity, HasElement, HasFormalCharge, HasHydrogenCount, HasPosition3D,
};
