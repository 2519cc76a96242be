pub mod hydrogel;
pub mod polymer;

use crate::config::OutputSettings;
use crate::error::Result;
use anyhow::Context;
use gelbuild::core::io::{
    gro::{GroFile, GroMetadata},
    itp::{ItpFile, ItpMetadata},
    lammps::{LammpsFile, LammpsMetadata},
    traits::TopologyFile,
    xyz::XyzFile,
};
use gelbuild::core::models::system::World;
use std::path::PathBuf;
use tracing::info;

/// Writes the coordinate and topology files, plus the `.xyz` dump and the LAMMPS data file
/// when requested.
///
/// Returns the written paths in order.
pub fn write_structure(world: &World, output: &OutputSettings) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(&output.directory)?;
    let mut written = Vec::new();

    let gro_path = output.path_with_extension("gro");
    let gro_metadata = GroMetadata {
        title: output.title.clone(),
    };
    GroFile::write_to_path(world, &gro_metadata, &gro_path)
        .with_context(|| format!("Failed to write coordinate file {}", gro_path.display()))?;
    written.push(gro_path);

    let itp_path = output.path_with_extension("itp");
    let itp_metadata = ItpMetadata {
        molecule_name: output.molecule.clone(),
    };
    ItpFile::write_to_path(world, &itp_metadata, &itp_path)
        .with_context(|| format!("Failed to write topology file {}", itp_path.display()))?;
    written.push(itp_path);

    if output.xyz {
        let xyz_path = output.path_with_extension("xyz");
        XyzFile::write_to_path(world, &(), &xyz_path)
            .with_context(|| format!("Failed to write xyz file {}", xyz_path.display()))?;
        written.push(xyz_path);
    }

    if output.lammps {
        let data_path = output.path_with_extension("data");
        let data_metadata = LammpsMetadata {
            title: output.title.clone(),
        };
        LammpsFile::write_to_path(world, &data_metadata, &data_path)
            .with_context(|| format!("Failed to write LAMMPS data file {}", data_path.display()))?;
        written.push(data_path);
    }

    for path in &written {
        info!("Wrote {}", path.display());
    }
    Ok(written)
}
