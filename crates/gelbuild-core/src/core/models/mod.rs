//! # Core Models Module
//!
//! Data structures describing a coarse-grained topology.
//!
//! - [`ids`] - Dense atom handles and slot-map keys for bonds
//! - [`atom`] - Bead classification, structural end tags and per-atom adjacency
//! - [`topology`] - Bond, angle, dihedral and the auxiliary pair entities
//! - [`system`] - The `World` registry that owns every entity
//!
//! ```ignore
//! use gelbuild::core::models::{atom::{Atom, AtomTemplate}, system::World, topology::BondParams};
//!
//! let mut world = World::new(0.24);
//! let a = world.add_atom(Atom::from_template(&AtomTemplate::default(), Point3::origin()));
//! let b = world.add_atom(Atom::from_template(&AtomTemplate::default(), Point3::new(0.24, 0.0, 0.0)));
//! world.add_bond(a, b, BondParams::default());
//! ```

pub mod atom;
pub mod ids;
pub mod system;
pub mod topology;
