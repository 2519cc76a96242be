//! Spatial helpers shared by the placement searches.

pub mod neighbors;
