//! Readers and writers for the simulation-input formats the builders emit.
//!
//! Writers serialize a populated [`World`](crate::core::models::system::World) into GROMACS
//! coordinate (`.gro`) and topology (`.itp`) files, LAMMPS data files, a plain `.xyz` dump and
//! the periodic-bond report. The `.itp` reader resolves side-chain monomer definitions from
//! coarse-grained topology files.

pub mod gro;
pub mod itp;
pub mod lammps;
pub mod report;
pub mod traits;
pub mod xyz;
