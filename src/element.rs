use crate::bond::BondOrder;

/// Periodic table data for elements 1–118.
///
/// Only the accessors this engine needs are provided: allowed total
/// valences, per-bond-order covalent radii, and Pauling
/// electronegativities. Elements outside the covered main group return
/// `None`/empty and are handled conservatively by the callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Element {
    H = 1,
    He = 2,
    Li = 3,
    Be = 4,
    B = 5,
    C = 6,
    N = 7,
    O = 8,
    F = 9,
    Ne = 10,
    Na = 11,
    Mg = 12,
    Al = 13,
    Si = 14,
    P = 15,
    S = 16,
    Cl = 17,
    Ar = 18,
    K = 19,
    Ca = 20,
    Sc = 21,
    Ti = 22,
    V = 23,
    Cr = 24,
    Mn = 25,
    Fe = 26,
    Co = 27,
    Ni = 28,
    Cu = 29,
    Zn = 30,
    Ga = 31,
    Ge = 32,
    As = 33,
    Se = 34,
    Br = 35,
    Kr = 36,
    Rb = 37,
    Sr = 38,
    Y = 39,
    Zr = 40,
    Nb = 41,
    Mo = 42,
    Tc = 43,
    Ru = 44,
    Rh = 45,
    Pd = 46,
    Ag = 47,
    Cd = 48,
    In = 49,
    Sn = 50,
    Sb = 51,
    Te = 52,
    I = 53,
    Xe = 54,
    Cs = 55,
    Ba = 56,
    La = 57,
    Ce = 58,
    Pr = 59,
    Nd = 60,
    Pm = 61,
    Sm = 62,
    Eu = 63,
    Gd = 64,
    Tb = 65,
    Dy = 66,
    Ho = 67,
    Er = 68,
    Tm = 69,
    Yb = 70,
    Lu = 71,
    Hf = 72,
    Ta = 73,
    W = 74,
    Re = 75,
    Os = 76,
    Ir = 77,
    Pt = 78,
    Au = 79,
    Hg = 80,
    Tl = 81,
    Pb = 82,
    Bi = 83,
    Po = 84,
    At = 85,
    Rn = 86,
    Fr = 87,
    Ra = 88,
    Ac = 89,
    Th = 90,
    Pa = 91,
    U = 92,
    Np = 93,
    Pu = 94,
    Am = 95,
    Cm = 96,
    Bk = 97,
    Cf = 98,
    Es = 99,
    Fm = 100,
    Md = 101,
    No = 102,
    Lr = 103,
    Rf = 104,
    Db = 105,
    Sg = 106,
    Bh = 107,
    Hs = 108,
    Mt = 109,
    Ds = 110,
    Rg = 111,
    Cn = 112,
    Nh = 113,
    Fl = 114,
    Mc = 115,
    Lv = 116,
    Ts = 117,
    Og = 118,
}

impl Element {
    pub fn from_atomic_num(n: u8) -> Option<Element> {
        if (1..=118).contains(&n) {
            // SAFETY: Element is repr(u8) with variants 1..=118, and we checked bounds.
            Some(unsafe { std::mem::transmute::<u8, Element>(n) })
        } else {
            None
        }
    }

    pub fn atomic_num(self) -> u8 {
        self as u8
    }

    pub fn symbol(self) -> &'static str {
        SYMBOLS[self as usize - 1]
    }

    /// Chemically allowed total valences, smallest first.
    ///
    /// This is the list the free-valence calculator walks; an empty slice
    /// means "no valence model" and such atoms are closed off with single
    /// bonds only.
    pub fn allowed_valences(self) -> &'static [u8] {
        match self {
            Element::H => &[1],
            Element::B => &[3],
            Element::C => &[4],
            Element::N => &[3, 5],
            Element::O => &[2],
            Element::F | Element::Cl | Element::Br | Element::At => &[1],
            Element::Si | Element::Ge => &[4],
            Element::P | Element::As | Element::Sb => &[3, 5],
            Element::S | Element::Se | Element::Te => &[2, 4, 6],
            Element::I => &[1, 3, 5, 7],
            _ => &[],
        }
    }

    /// Alternate valence list for hypervalent chalcogens carrying four or
    /// more explicit neighbors (sulfones, sulfates and their Se/Te
    /// analogues). The low valence states would close such atoms off
    /// before their double bonds could be placed.
    pub fn hypervalent_valences(self) -> Option<&'static [u8]> {
        match self {
            Element::S | Element::Se | Element::Te => Some(&[6]),
            _ => None,
        }
    }

    /// Covalent radius in Å for a bond of the given order.
    ///
    /// Pyykkö's single/double/triple-bond radii for the main group most
    /// likely to appear in perceived structures, plus single-bond values
    /// for a few common metals. `None` when no reliable value exists for
    /// that element/order pair.
    pub fn covalent_radius(self, order: BondOrder) -> Option<f64> {
        let radii: [f64; 3] = match self {
            Element::H => [0.32, -1.0, -1.0],
            Element::Li => [1.33, 1.24, -1.0],
            Element::Be => [1.02, 0.90, 0.85],
            Element::B => [0.85, 0.78, 0.73],
            Element::C => [0.75, 0.67, 0.60],
            Element::N => [0.71, 0.60, 0.54],
            Element::O => [0.63, 0.57, 0.53],
            Element::F => [0.64, 0.59, 0.53],
            Element::Na => [1.55, 1.60, -1.0],
            Element::Mg => [1.39, 1.32, 1.27],
            Element::Al => [1.26, 1.13, 1.11],
            Element::Si => [1.16, 1.07, 1.02],
            Element::P => [1.11, 1.02, 0.94],
            Element::S => [1.03, 0.94, 0.95],
            Element::Cl => [0.99, 0.95, 0.93],
            Element::K => [1.96, 1.93, -1.0],
            Element::Ca => [1.71, 1.47, 1.33],
            Element::Fe => [1.16, 1.09, 1.02],
            Element::Cu => [1.12, 1.15, 1.20],
            Element::Zn => [1.18, 1.20, -1.0],
            Element::Ga => [1.24, 1.17, 1.21],
            Element::Ge => [1.21, 1.11, 1.14],
            Element::As => [1.21, 1.14, 1.06],
            Element::Se => [1.16, 1.07, 1.07],
            Element::Br => [1.14, 1.09, 1.10],
            Element::Sn => [1.40, 1.30, 1.32],
            Element::Sb => [1.40, 1.33, 1.27],
            Element::Te => [1.36, 1.28, 1.21],
            Element::I => [1.33, 1.29, 1.25],
            _ => [-1.0, -1.0, -1.0],
        };
        let v = radii[order.as_u8() as usize - 1];
        if v < 0.0 {
            None
        } else {
            Some(v)
        }
    }

    /// Pauling electronegativity. `None` where no reliable value exists.
    pub fn electronegativity(self) -> Option<f64> {
        let v = match self {
            Element::H => 2.20,
            Element::Li => 0.98,
            Element::Be => 1.57,
            Element::B => 2.04,
            Element::C => 2.55,
            Element::N => 3.04,
            Element::O => 3.44,
            Element::F => 3.98,
            Element::Na => 0.93,
            Element::Mg => 1.31,
            Element::Al => 1.61,
            Element::Si => 1.90,
            Element::P => 2.19,
            Element::S => 2.58,
            Element::Cl => 3.16,
            Element::K => 0.82,
            Element::Ca => 1.00,
            Element::Fe => 1.83,
            Element::Cu => 1.90,
            Element::Zn => 1.65,
            Element::Ga => 1.81,
            Element::Ge => 2.01,
            Element::As => 2.18,
            Element::Se => 2.55,
            Element::Br => 2.96,
            Element::Sn => 1.96,
            Element::Sb => 2.05,
            Element::Te => 2.10,
            Element::I => 2.66,
            _ => -1.0,
        };
        if v < 0.0 {
            None
        } else {
            Some(v)
        }
    }

    /// Elements eligible for conjugated-ring alternation.
    pub fn is_conjugation_candidate(self) -> bool {
        matches!(
            self,
            Element::C | Element::N | Element::O | Element::S | Element::Se
        )
    }

    /// Ring heteroatoms of these types may stay planar even when their
    /// neighborhood looks saturated (pyrrole-style lone-pair donation).
    pub fn is_aromatic_heteroatom(self) -> bool {
        matches!(self, Element::N | Element::O | Element::S | Element::Se)
    }
}

static SYMBOLS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne",
    "Na", "Mg", "Al", "Si", "P", "S", "Cl", "Ar", "K", "Ca",
    "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn",
    "Ga", "Ge", "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr",
    "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In", "Sn",
    "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd",
    "Pm", "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb",
    "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg",
    "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th",
    "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk", "Cf", "Es", "Fm",
    "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds",
    "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_num_round_trip() {
        assert_eq!(Element::from_atomic_num(6), Some(Element::C));
        assert_eq!(Element::from_atomic_num(118), Some(Element::Og));
        assert_eq!(Element::from_atomic_num(0), None);
        assert_eq!(Element::from_atomic_num(119), None);
        assert_eq!(Element::C.atomic_num(), 6);
    }

    #[test]
    fn symbols() {
        assert_eq!(Element::C.symbol(), "C");
        assert_eq!(Element::Se.symbol(), "Se");
        assert_eq!(Element::Og.symbol(), "Og");
    }

    #[test]
    fn allowed_valences() {
        assert_eq!(Element::C.allowed_valences(), &[4]);
        assert_eq!(Element::N.allowed_valences(), &[3, 5]);
        assert_eq!(Element::S.allowed_valences(), &[2, 4, 6]);
        assert!(Element::Fe.allowed_valences().is_empty());
    }

    #[test]
    fn hypervalent_chalcogens() {
        assert_eq!(Element::S.hypervalent_valences(), Some(&[6][..]));
        assert_eq!(Element::Te.hypervalent_valences(), Some(&[6][..]));
        assert_eq!(Element::O.hypervalent_valences(), None);
        assert_eq!(Element::C.hypervalent_valences(), None);
    }

    #[test]
    fn covalent_radii_by_order() {
        let c1 = Element::C.covalent_radius(BondOrder::Single).unwrap();
        let c2 = Element::C.covalent_radius(BondOrder::Double).unwrap();
        let c3 = Element::C.covalent_radius(BondOrder::Triple).unwrap();
        assert!(c1 > c2 && c2 > c3);
        assert!((c1 - 0.75).abs() < 1e-9);
        assert_eq!(Element::H.covalent_radius(BondOrder::Double), None);
        assert_eq!(Element::Og.covalent_radius(BondOrder::Single), None);
    }

    #[test]
    fn electronegativity() {
        assert!((Element::F.electronegativity().unwrap() - 3.98).abs() < 1e-9);
        assert!(Element::N.electronegativity().unwrap() > Element::C.electronegativity().unwrap());
        assert_eq!(Element::He.electronegativity(), None);
    }

    #[test]
    fn conjugation_candidates() {
        assert!(Element::C.is_conjugation_candidate());
        assert!(Element::Se.is_conjugation_candidate());
        assert!(!Element::P.is_conjugation_candidate());
        assert!(Element::N.is_aromatic_heteroatom());
        assert!(!Element::C.is_aromatic_heteroatom());
    }
}
