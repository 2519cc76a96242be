//! # gelbuild Core Library
//!
//! A procedural builder for coarse-grained molecular topologies: diamond-lattice hydrogel
//! networks and single linear polymer chains, decorated with side chains under periodic
//! boundary conditions.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer layout so that each concern can be tested in isolation.
//!
//! - **[`core`]: The Foundation.** The entity registry (`World`) with its atoms, bonds, angles
//!   and auxiliary pair entities, the periodic geometry kernel, monomer definitions and the
//!   readers/writers for coarse-grained topology formats.
//!
//! - **[`engine`]: The Logic Core.** Typed configuration, the diamond-lattice blueprint, bond
//!   stitching, the collision-avoiding side-chain search, angle classification and the
//!   connectivity-preserving bond cutter.
//!
//! - **[`workflows`]: The Public API.** `hydrogel::run` and `polymer::run` drive a complete
//!   generation from a validated configuration and a single seeded random source, returning the
//!   populated registry.

pub mod core;
pub mod engine;
pub mod workflows;
