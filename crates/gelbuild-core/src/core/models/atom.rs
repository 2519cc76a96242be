use super::ids::{AngleId, AtomId};
use nalgebra::Point3;
use std::str::FromStr;

/// Represents the structural role of a bead within a generated topology.
///
/// Angle classification and side-chain placement both key off this role, so every
/// generator assigns it explicitly when materializing a bead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum AtomRole {
    /// Main-chain bead of a hydrogel strand or of a linear polymer.
    Backbone,
    /// Bead of a crosslinker bridge or of a lattice-vertex link.
    Crosslinker,
    /// Bead belonging to a side chain grafted onto the backbone.
    Sidechain,
    /// Unclassified bead.
    #[default]
    Other,
}

impl FromStr for AtomRole {
    type Err = ();

    /// Parses a role name, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `()` if the input string does not match any known role.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "backbone" => Ok(AtomRole::Backbone),
            "crosslinker" | "linker" => Ok(AtomRole::Crosslinker),
            "sidechain" | "side-chain" | "side_chain" => Ok(AtomRole::Sidechain),
            "other" | "unknown" => Ok(AtomRole::Other),
            _ => Err(()),
        }
    }
}

/// Marks the structural position of a bead in the lattice-derived network.
///
/// The numeric codes are the ones used throughout the stitching stage: chain ends (`1`)
/// are paired with crosslink ends (`2`), and periodic-link ends (`4`) are paired with each
/// other across cell boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum EndTag {
    #[default]
    Interior,
    ChainEnd,
    CrosslinkEnd,
    CrosslinkMidpoint,
    PeriodicLink,
}

impl EndTag {
    pub fn code(self) -> u8 {
        match self {
            EndTag::Interior => 0,
            EndTag::ChainEnd => 1,
            EndTag::CrosslinkEnd => 2,
            EndTag::CrosslinkMidpoint => 3,
            EndTag::PeriodicLink => 4,
        }
    }
}

/// Per-role attribute table used to stamp out beads.
///
/// Collaborators supply one template per role (backbone, each crosslinker role, polymer
/// side bead); the generators copy it into every bead they create for that role.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomTemplate {
    /// Force-field bead type (e.g. "C1", "SN4a").
    pub bead_type: String,
    /// Residue number written to output files.
    pub residue_number: isize,
    /// Residue name, at most five characters in coordinate files.
    pub residue_name: String,
    /// Atom name, at most five characters in coordinate files.
    pub atom_name: String,
    /// Charge-group number.
    pub charge_group: i32,
    /// Mass in atomic mass units.
    pub mass: f64,
    /// Charge in elementary charge units.
    pub charge: f64,
    /// Structural role assigned to beads created from this template.
    pub role: AtomRole,
}

impl Default for AtomTemplate {
    fn default() -> Self {
        Self {
            bead_type: "C1".to_string(),
            residue_number: 1,
            residue_name: "HDG".to_string(),
            atom_name: "AT".to_string(),
            charge_group: 0,
            mass: 72.0,
            charge: 0.0,
            role: AtomRole::Other,
        }
    }
}

/// A coarse-grained bead with its classification, position and adjacency lists.
///
/// Adjacency lists and degree counters are owned by the [`World`](super::system::World)
/// registry; they are only mutated through its `add_*`/`remove_*` operations so that
/// `bonded_atoms().len() == number_of_bonds()` holds at all times.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    id: AtomId,
    /// Force-field bead type.
    pub bead_type: String,
    /// Residue number.
    pub residue_number: isize,
    /// Residue name.
    pub residue_name: String,
    /// Atom name.
    pub name: String,
    /// Charge-group number.
    pub charge_group: i32,
    /// Mass in atomic mass units.
    pub mass: f64,
    /// Charge in elementary charge units.
    pub charge: f64,
    /// Position in nanometres.
    pub position: Point3<f64>,
    /// Structural role of the bead.
    pub role: AtomRole,
    /// Structural position within the lattice network.
    pub end_tag: EndTag,
    bonded: Vec<AtomId>,
    network_bonded: Vec<AtomId>,
    constrained: Vec<AtomId>,
    excluded: Vec<AtomId>,
    angles: Vec<AngleId>,
    number_of_bonds: usize,
    number_of_network_bonds: usize,
    number_of_angles: usize,
}

impl Atom {
    /// Creates a new `Atom` with the default attribute table.
    ///
    /// The id is a placeholder until the atom is registered with a `World`.
    ///
    /// # Arguments
    ///
    /// * `name` - The atom name.
    /// * `position` - The 3D coordinates of the bead.
    pub fn new(name: &str, position: Point3<f64>) -> Self {
        let template = AtomTemplate {
            atom_name: name.to_string(),
            ..AtomTemplate::default()
        };
        Self::from_template(&template, position)
    }

    /// Creates a new `Atom` by copying a role template.
    ///
    /// # Arguments
    ///
    /// * `template` - The attribute table for the bead's role.
    /// * `position` - The 3D coordinates of the bead.
    pub fn from_template(template: &AtomTemplate, position: Point3<f64>) -> Self {
        Self {
            id: AtomId::default(),
            bead_type: template.bead_type.clone(),
            residue_number: template.residue_number,
            residue_name: template.residue_name.clone(),
            name: template.atom_name.clone(),
            charge_group: template.charge_group,
            mass: template.mass,
            charge: template.charge,
            position,
            role: template.role,
            end_tag: EndTag::Interior,
            bonded: Vec::new(),
            network_bonded: Vec::new(),
            constrained: Vec::new(),
            excluded: Vec::new(),
            angles: Vec::new(),
            number_of_bonds: 0,
            number_of_network_bonds: 0,
            number_of_angles: 0,
        }
    }

    pub fn with_end_tag(mut self, end_tag: EndTag) -> Self {
        self.end_tag = end_tag;
        self
    }

    pub fn id(&self) -> AtomId {
        self.id
    }

    pub fn bonded_atoms(&self) -> &[AtomId] {
        &self.bonded
    }

    pub fn network_bonded_atoms(&self) -> &[AtomId] {
        &self.network_bonded
    }

    pub fn constrained_atoms(&self) -> &[AtomId] {
        &self.constrained
    }

    pub fn excluded_atoms(&self) -> &[AtomId] {
        &self.excluded
    }

    pub fn angles(&self) -> &[AngleId] {
        &self.angles
    }

    pub fn number_of_bonds(&self) -> usize {
        self.number_of_bonds
    }

    pub fn number_of_network_bonds(&self) -> usize {
        self.number_of_network_bonds
    }

    pub fn number_of_angles(&self) -> usize {
        self.number_of_angles
    }

    pub(crate) fn assign_id(&mut self, id: AtomId) {
        self.id = id;
    }

    pub(crate) fn link_bond(&mut self, other: AtomId) {
        self.bonded.push(other);
        self.number_of_bonds += 1;
    }

    pub(crate) fn unlink_bond(&mut self, other: AtomId) -> bool {
        match self.bonded.iter().position(|&id| id == other) {
            Some(index) => {
                self.bonded.remove(index);
                self.number_of_bonds -= 1;
                true
            }
            None => false,
        }
    }

    pub(crate) fn link_network_bond(&mut self, other: AtomId) {
        self.network_bonded.push(other);
        self.number_of_network_bonds += 1;
    }

    pub(crate) fn link_constraint(&mut self, other: AtomId) {
        self.constrained.push(other);
    }

    pub(crate) fn link_exclusion(&mut self, other: AtomId) {
        self.excluded.push(other);
    }

    pub(crate) fn link_angle(&mut self, angle: AngleId) {
        self.angles.push(angle);
        self.number_of_angles += 1;
    }

    pub(crate) fn detach(&mut self) {
        self.bonded.clear();
        self.network_bonded.clear();
        self.constrained.clear();
        self.excluded.clear();
        self.angles.clear();
        self.number_of_bonds = 0;
        self.number_of_network_bonds = 0;
        self.number_of_angles = 0;
    }

    pub(crate) fn clear_angles(&mut self) {
        self.angles.clear();
        self.number_of_angles = 0;
    }
}
