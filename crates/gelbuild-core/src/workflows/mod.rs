//! # Workflows Module
//!
//! End-to-end builds, one per topology.
//!
//! - **Hydrogel** ([`hydrogel`]) - Diamond-lattice network: assembly, optional cutting,
//!   side chains and angles.
//! - **Polymer** ([`polymer`]) - A single straight chain with optional side beads and
//!   rule-based angles.
//!
//! Each `run` seeds one random generator from its configuration, emits progress events and
//! returns the populated registry together with per-phase statistics.

pub mod hydrogel;
pub mod polymer;
