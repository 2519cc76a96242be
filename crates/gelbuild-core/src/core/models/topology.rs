use super::ids::AtomId;

/// Returns the unordered pair `(a, b)` in canonical `(min, max)` order.
pub fn canonical_pair(a: AtomId, b: AtomId) -> (AtomId, AtomId) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Harmonic bond parameters as written to the `[ bonds ]` section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BondParams {
    /// GROMACS function type.
    pub funct: u8,
    /// Equilibrium length in nm.
    pub length: f64,
    /// Force constant in kJ/mol/nm^2.
    pub force_constant: f64,
}

impl Default for BondParams {
    fn default() -> Self {
        Self {
            funct: 1,
            length: 0.249,
            force_constant: 10000.0,
        }
    }
}

/// Angle parameters as written to the `[ angles ]` section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleParams {
    pub funct: u8,
    /// Equilibrium angle in degrees.
    pub theta0: f64,
    pub force_constant: f64,
}

impl AngleParams {
    pub fn new(funct: u8, theta0: f64, force_constant: f64) -> Self {
        Self {
            funct,
            theta0,
            force_constant,
        }
    }
}

impl Default for AngleParams {
    fn default() -> Self {
        Self::new(0, 180.0, 75.0)
    }
}

/// A bond between two atoms, stored with `atom1_id < atom2_id`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bond {
    pub atom1_id: AtomId,
    pub atom2_id: AtomId,
    pub params: BondParams,
}

impl Bond {
    pub fn new(a: AtomId, b: AtomId, params: BondParams) -> Self {
        let (atom1_id, atom2_id) = canonical_pair(a, b);
        Self {
            atom1_id,
            atom2_id,
            params,
        }
    }

    pub fn key(&self) -> (AtomId, AtomId) {
        (self.atom1_id, self.atom2_id)
    }

    pub fn contains(&self, atom_id: AtomId) -> bool {
        self.atom1_id == atom_id || self.atom2_id == atom_id
    }

    /// Returns the endpoint opposite to `atom_id`, if `atom_id` is part of this bond.
    pub fn partner(&self, atom_id: AtomId) -> Option<AtomId> {
        if self.atom1_id == atom_id {
            Some(self.atom2_id)
        } else if self.atom2_id == atom_id {
            Some(self.atom1_id)
        } else {
            None
        }
    }
}

/// Elastic-network bond emitted inside the `RUBBER_BANDS` block.
///
/// A missing force constant is written as the `RUBBER_FC` macro.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkBond {
    pub atom1_id: AtomId,
    pub atom2_id: AtomId,
    pub funct: u8,
    pub length: f64,
    pub force_constant: Option<f64>,
}

impl NetworkBond {
    pub fn new(a: AtomId, b: AtomId, length: f64) -> Self {
        let (atom1_id, atom2_id) = canonical_pair(a, b);
        Self {
            atom1_id,
            atom2_id,
            funct: 1,
            length,
            force_constant: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraint {
    pub atom1_id: AtomId,
    pub atom2_id: AtomId,
    pub funct: u8,
    pub length: f64,
}

impl Constraint {
    pub fn new(a: AtomId, b: AtomId, length: f64) -> Self {
        let (atom1_id, atom2_id) = canonical_pair(a, b);
        Self {
            atom1_id,
            atom2_id,
            funct: 1,
            length,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Exclusion {
    pub atom1_id: AtomId,
    pub atom2_id: AtomId,
}

impl Exclusion {
    pub fn new(a: AtomId, b: AtomId) -> Self {
        let (atom1_id, atom2_id) = canonical_pair(a, b);
        Self { atom1_id, atom2_id }
    }
}

/// An angle `side1 - center - side2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Angle {
    pub side1: AtomId,
    pub center: AtomId,
    pub side2: AtomId,
    pub params: AngleParams,
}

impl Angle {
    pub fn atoms(&self) -> [AtomId; 3] {
        [self.side1, self.center, self.side2]
    }
}

/// A dihedral over four atoms with a phase angle and optional force constant and multiplicity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dihedral {
    pub atoms: [AtomId; 4],
    pub funct: u8,
    pub phase: f64,
    pub force_constant: Option<f64>,
    pub multiplicity: Option<u32>,
}

impl Dihedral {
    pub fn new(atoms: [AtomId; 4], phase: f64) -> Self {
        Self {
            atoms,
            funct: 0,
            phase,
            force_constant: None,
            multiplicity: None,
        }
    }
}
