use super::definition::MonomerEntry;
use rand::distributions::{WeightedError, WeightedIndex};
use rand::prelude::*;
use thiserror::Error;
use tracing::warn;

/// How side-chain monomers are drawn from the palette along the backbone.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SequenceStrategy {
    /// Independent weighted draws using each entry's `ratio`.
    #[default]
    Random,
    /// Cycles through the palette in declaration order.
    Alternating,
    /// Repeats `(monomer id, run length)` blocks in order.
    Block(Vec<(String, usize)>),
}

#[derive(Debug, Error)]
pub enum SequenceError {
    #[error("Monomer palette is empty, cannot build a sequence")]
    EmptyPalette,
    #[error("Block schedule references no known monomer")]
    EmptySchedule,
    #[error("Invalid monomer ratios: {source}")]
    InvalidWeights {
        #[from]
        source: WeightedError,
    },
}

#[derive(Debug, Clone)]
enum Schedule {
    Weighted(WeightedIndex<f64>),
    Cycle { order: Vec<usize>, cursor: usize },
}

/// Infinite stream of palette indices following a [`SequenceStrategy`].
///
/// Random draws come from the caller's generator so that a run stays reproducible from its
/// single seed.
#[derive(Debug, Clone)]
pub struct SequenceGenerator {
    schedule: Schedule,
}

impl SequenceGenerator {
    /// Prepares a generator for `palette`.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError`] for an empty palette, invalid ratios, or a block schedule
    /// whose ids are all unknown. Unknown ids in an otherwise valid schedule are skipped with
    /// a warning.
    pub fn new(strategy: &SequenceStrategy, palette: &[MonomerEntry]) -> Result<Self, SequenceError> {
        if palette.is_empty() {
            return Err(SequenceError::EmptyPalette);
        }

        let schedule = match strategy {
            SequenceStrategy::Random => {
                let weights = palette.iter().map(|entry| entry.ratio);
                Schedule::Weighted(WeightedIndex::new(weights)?)
            }
            SequenceStrategy::Alternating => Schedule::Cycle {
                order: (0..palette.len()).collect(),
                cursor: 0,
            },
            SequenceStrategy::Block(blocks) => {
                let mut order = Vec::new();
                for (id, size) in blocks {
                    match palette.iter().position(|entry| &entry.definition.id == id) {
                        Some(index) => order.extend(std::iter::repeat_n(index, *size)),
                        None => warn!("Block schedule references unknown monomer '{}', skipping", id),
                    }
                }
                if order.is_empty() {
                    return Err(SequenceError::EmptySchedule);
                }
                Schedule::Cycle { order, cursor: 0 }
            }
        };

        Ok(Self { schedule })
    }

    /// Returns the palette index of the next monomer.
    pub fn next_index<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        match &mut self.schedule {
            Schedule::Weighted(dist) => dist.sample(rng),
            Schedule::Cycle { order, cursor } => {
                let index = order[*cursor];
                *cursor = (*cursor + 1) % order.len();
                index
            }
        }
    }
}
