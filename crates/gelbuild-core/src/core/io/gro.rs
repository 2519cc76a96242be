use super::traits::TopologyFile;
use crate::core::models::system::World;
use std::io::{self, Write};
use thiserror::Error;

const SERIAL_MODULUS: usize = 100_000;

#[derive(Debug, Clone, PartialEq)]
pub struct GroMetadata {
    pub title: String,
}

impl Default for GroMetadata {
    fn default() -> Self {
        Self {
            title: "Gromacs.gro file".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum GroError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// GROMACS coordinate file.
///
/// Residue numbers and atom serials wrap at 100000 as the fixed-width columns require; the
/// final line repeats the cubic box edge three times.
pub struct GroFile;

impl TopologyFile for GroFile {
    type Metadata = GroMetadata;
    type Error = GroError;

    fn write_to(
        world: &World,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        writeln!(writer, "{}", metadata.title)?;
        writeln!(writer, "    {}", world.atom_count())?;
        for atom in world.atoms() {
            let residue_number = atom.residue_number.rem_euclid(SERIAL_MODULUS as isize);
            writeln!(
                writer,
                "{:>5}{:<5}{:<5}{:>5}{:>8.3}{:>8.3}{:>8.3}",
                residue_number,
                atom.residue_name,
                atom.name,
                atom.id().serial() % SERIAL_MODULUS,
                atom.position.x,
                atom.position.y,
                atom.position.z,
            )?;
        }
        let edge = world.box_length;
        writeln!(writer, "   {:.5}    {:.5}    {:.5}", edge, edge, edge)?;
        Ok(())
    }
}
