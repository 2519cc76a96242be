//! # Engine Module
//!
//! The construction engine behind the hydrogel and polymer workflows.
//!
//! ## Overview
//!
//! Every stage mutates a [`World`](crate::core::models::system::World) registry passed in by
//! reference and draws its randomness from the caller's single seeded generator, so a seed
//! plus a configuration reproduces the same topology.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Validated per-role tables and run parameters
//! - **Lattice** ([`lattice`]) - Unit-cell sizing and the bead layout of one diamond cell
//! - **Network assembly** ([`network`]) - Cell population and stitching of terminal beads
//! - **Placement** ([`placement`]) - Collision-avoiding side-chain and side-bead searches
//! - **Angles** ([`angles`]) - Triple enumeration and role- or type-based classification
//! - **Cutting** ([`cutter`]) - Connectivity-preserving random bond removal
//! - **Progress Monitoring** ([`progress`]) - Phase and task events for front ends
//! - **Error Handling** ([`error`]) - Engine-wide error type

pub mod angles;
pub mod config;
pub mod cutter;
pub mod error;
pub mod lattice;
pub mod network;
pub mod placement;
pub mod progress;
pub(crate) mod utils;
