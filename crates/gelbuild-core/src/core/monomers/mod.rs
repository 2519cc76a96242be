//! Side-chain monomer definitions and the sequence schedules that pick them.

pub mod definition;
pub mod library;
pub mod sequence;
