use crate::core::models::topology::BondParams;

/// One bead of a side-chain monomer.
#[derive(Debug, Clone, PartialEq)]
pub struct BeadDefinition {
    pub bead_type: String,
    pub name: String,
    pub mass: f64,
    pub charge: f64,
}

/// Start point of a monomer bond: the backbone bead carrying the side chain, or a bead of
/// the monomer itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondAnchor {
    Backbone,
    Bead(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonomerBond {
    pub from: BondAnchor,
    /// 0-based index of the target bead.
    pub to: usize,
    pub params: BondParams,
}

/// A side-chain monomer: ordered beads plus the bond graph that links them to each other
/// and to the backbone.
///
/// Inline configuration and topology-file sources both resolve into this one type.
#[derive(Debug, Clone, PartialEq)]
pub struct MonomerDefinition {
    /// Identifier referenced by sequence schedules and placement statistics.
    pub id: String,
    pub residue_name: String,
    pub beads: Vec<BeadDefinition>,
    pub bonds: Vec<MonomerBond>,
}

impl MonomerDefinition {
    /// Distance between bead `index` and its predecessor along the placement direction.
    ///
    /// Uses the length of the first bond targeting the bead and falls back to `default`
    /// when no such bond exists.
    pub fn step_length(&self, index: usize, default: f64) -> f64 {
        self.bonds
            .iter()
            .find(|bond| bond.to == index)
            .map_or(default, |bond| bond.params.length)
    }

    /// Checks that the monomer is non-empty, attached to the backbone, and that every bond
    /// references existing beads.
    pub fn validate(&self) -> Result<(), String> {
        if self.beads.is_empty() {
            return Err(format!("monomer '{}' has no beads", self.id));
        }
        if !self.bonds.iter().any(|bond| bond.from == BondAnchor::Backbone) {
            return Err(format!("monomer '{}' has no bond to the backbone", self.id));
        }
        for bond in &self.bonds {
            let from_ok = match bond.from {
                BondAnchor::Backbone => true,
                BondAnchor::Bead(index) => index < self.beads.len(),
            };
            if !from_ok || bond.to >= self.beads.len() {
                return Err(format!(
                    "monomer '{}' has a bond referencing a missing bead",
                    self.id
                ));
            }
            if bond.from == BondAnchor::Bead(bond.to) {
                return Err(format!("monomer '{}' has a bead bonded to itself", self.id));
            }
        }
        Ok(())
    }
}

/// A monomer together with its weight in a random sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct MonomerEntry {
    pub definition: MonomerDefinition,
    pub ratio: f64,
}
