//! Numeric helpers shared by the generators.

pub mod geometry;
