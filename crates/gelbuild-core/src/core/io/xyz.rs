use super::traits::TopologyFile;
use crate::core::models::system::World;
use std::io::{self, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XyzError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Plain XYZ dump for quick visual inspection.
pub struct XyzFile;

impl TopologyFile for XyzFile {
    type Metadata = ();
    type Error = XyzError;

    fn write_to(world: &World, _metadata: &(), writer: &mut impl Write) -> Result<(), Self::Error> {
        writeln!(writer, "{}", world.atom_count())?;
        writeln!(writer)?;
        for atom in world.atoms() {
            writeln!(
                writer,
                "{}  {:.8}  {:.8}  {:.8}",
                atom.name, atom.position.x, atom.position.y, atom.position.z
            )?;
        }
        Ok(())
    }
}
