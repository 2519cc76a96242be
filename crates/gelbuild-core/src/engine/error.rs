use thiserror::Error;

use super::config::ConfigError;
use crate::core::models::ids::AtomId;
use crate::core::monomers::sequence::SequenceError;
use crate::core::utils::geometry::GeometryError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(
        "Unit-cell equation has no positive root for mean_sep = {mean_sep}, segment_length = {segment_length}"
    )]
    UnitCell { mean_sep: f64, segment_length: usize },

    #[error("Degenerate geometry at atom {atom}: {source}")]
    DegenerateGeometry {
        atom: AtomId,
        source: GeometryError,
    },

    #[error("Network is not connected before cutting: reached {reached} of {total} atoms")]
    DisconnectedNetwork { reached: usize, total: usize },

    #[error(
        "Cannot remove {requested} bonds without disconnecting the network: only {removed} of {bonds} bonds were removable"
    )]
    Connectivity {
        requested: usize,
        removed: usize,
        bonds: usize,
    },

    #[error("Monomer sequence error: {0}")]
    Sequence(#[from] SequenceError),

    #[error("Internal logic error: {0}")]
    Internal(String),
}
