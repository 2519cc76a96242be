//! # Core Module
//!
//! Stateless building blocks shared by the generators.
//!
//! - **Molecular Representation** ([`models`]) - Atoms, bonds, angles and the `World` registry
//!   that owns them and keeps mirrored adjacency consistent.
//! - **Geometry** ([`utils`]) - Minimum-image vector math, interpolation and the random
//!   perpendicular-direction generator used by side-chain placement.
//! - **Monomers** ([`monomers`]) - Side-chain monomer definitions and sequence strategies.
//! - **File I/O** ([`io`]) - Coordinate/topology writers and the coarse-grained topology reader.

pub mod io;
pub mod models;
pub mod monomers;
pub mod utils;
