use super::traits::TopologyFile;
use crate::core::models::system::World;
use crate::core::models::topology::{AngleParams, BondParams};
use std::collections::HashMap;
use std::hash::Hash;
use std::io::{self, Write};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct LammpsMetadata {
    pub title: String,
}

impl Default for LammpsMetadata {
    fn default() -> Self {
        Self {
            title: "gelbuild initial configuration".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LammpsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Assigns 1-based type ids to distinct keys in first-seen order.
struct TypeTable<K, V> {
    ids: HashMap<K, usize>,
    entries: Vec<V>,
}

impl<K: Eq + Hash, V> TypeTable<K, V> {
    fn new() -> Self {
        Self {
            ids: HashMap::new(),
            entries: Vec::new(),
        }
    }

    fn id_of(&mut self, key: K, value: V) -> usize {
        let next = self.entries.len() + 1;
        let id = *self.ids.entry(key).or_insert(next);
        if id == next {
            self.entries.push(value);
        }
        id
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

fn bond_key(params: &BondParams) -> (u8, u64, u64) {
    (
        params.funct,
        params.length.to_bits(),
        params.force_constant.to_bits(),
    )
}

fn angle_key(params: &AngleParams) -> (u8, u64, u64) {
    (
        params.funct,
        params.theta0.to_bits(),
        params.force_constant.to_bits(),
    )
}

/// LAMMPS data file in the `full` atom style.
///
/// Atom types are the distinct bead types, bond and angle types the distinct parameter sets,
/// each numbered in order of first appearance. Bonds are written in canonical pair order and
/// the box spans `[0, box_length]` on every axis.
pub struct LammpsFile;

impl TopologyFile for LammpsFile {
    type Metadata = LammpsMetadata;
    type Error = LammpsError;

    fn write_to(
        world: &World,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        let mut atom_types = TypeTable::new();
        let atom_type_ids: Vec<usize> = world
            .atoms()
            .iter()
            .map(|atom| {
                atom_types.id_of(atom.bead_type.clone(), (atom.bead_type.clone(), atom.mass))
            })
            .collect();

        let mut bonds: Vec<_> = world.bonds_iter().map(|(_, bond)| *bond).collect();
        bonds.sort_unstable_by_key(|bond| bond.key());
        let mut bond_types = TypeTable::new();
        let bond_type_ids: Vec<usize> = bonds
            .iter()
            .map(|bond| bond_types.id_of(bond_key(&bond.params), bond.params))
            .collect();

        let mut angle_types = TypeTable::new();
        let angle_type_ids: Vec<usize> = world
            .angles()
            .iter()
            .map(|angle| angle_types.id_of(angle_key(&angle.params), angle.params))
            .collect();

        writeln!(writer, "{}\n", metadata.title)?;
        writeln!(writer, "{} atoms", world.atom_count())?;
        writeln!(writer, "{} bonds", bonds.len())?;
        writeln!(writer, "{} angles", world.angles().len())?;
        writeln!(writer, "{} dihedrals", world.dihedrals().len())?;
        writeln!(writer, "{} atom types", atom_types.len())?;
        writeln!(writer, "{} bond types", bond_types.len())?;
        writeln!(writer, "{} angle types", angle_types.len())?;
        if !world.dihedrals().is_empty() {
            writeln!(writer, "1 dihedral types")?;
        }
        writeln!(writer)?;

        let edge = world.box_length;
        for axis in ["x", "y", "z"] {
            writeln!(writer, "{:.8} {:.8} {axis}lo {axis}hi", 0.0, edge)?;
        }

        writeln!(writer, "\nMasses\n")?;
        for (k, (bead_type, mass)) in atom_types.entries.iter().enumerate() {
            writeln!(writer, "{} {:.8}  # {}", k + 1, mass, bead_type)?;
        }

        if !bond_types.entries.is_empty() {
            writeln!(writer, "\nBond Coeffs\n")?;
            for (k, params) in bond_types.entries.iter().enumerate() {
                writeln!(writer, "{} {:.6} {:.6}", k + 1, params.force_constant, params.length)?;
            }
        }
        if !angle_types.entries.is_empty() {
            writeln!(writer, "\nAngle Coeffs\n")?;
            for (k, params) in angle_types.entries.iter().enumerate() {
                writeln!(writer, "{} {:.6} {:.6}", k + 1, params.force_constant, params.theta0)?;
            }
        }

        writeln!(writer, "\nAtoms  # full\n")?;
        for (atom, type_id) in world.atoms().iter().zip(&atom_type_ids) {
            writeln!(
                writer,
                "{} {} {} {:.6} {:.8} {:.8} {:.8}",
                atom.id().serial(),
                atom.residue_number,
                type_id,
                atom.charge,
                atom.position.x,
                atom.position.y,
                atom.position.z,
            )?;
        }

        if !bonds.is_empty() {
            writeln!(writer, "\nBonds\n")?;
            for (k, (bond, type_id)) in bonds.iter().zip(&bond_type_ids).enumerate() {
                writeln!(
                    writer,
                    "{} {} {} {}",
                    k + 1,
                    type_id,
                    bond.atom1_id.serial(),
                    bond.atom2_id.serial()
                )?;
            }
        }

        if !world.angles().is_empty() {
            writeln!(writer, "\nAngles\n")?;
            for (k, (angle, type_id)) in world.angles().iter().zip(&angle_type_ids).enumerate() {
                let [a, b, c] = angle.atoms();
                writeln!(
                    writer,
                    "{} {} {} {} {}",
                    k + 1,
                    type_id,
                    a.serial(),
                    b.serial(),
                    c.serial()
                )?;
            }
        }

        if !world.dihedrals().is_empty() {
            writeln!(writer, "\nDihedrals\n")?;
            for (k, dihedral) in world.dihedrals().iter().enumerate() {
                let [a, b, c, d] = dihedral.atoms;
                writeln!(
                    writer,
                    "{} 1 {} {} {} {}",
                    k + 1,
                    a.serial(),
                    b.serial(),
                    c.serial(),
                    d.serial()
                )?;
            }
        }
        Ok(())
    }
}
