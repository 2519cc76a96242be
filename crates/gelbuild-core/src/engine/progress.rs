use std::fmt;

/// A named stage of a hydrogel or polymer build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Unit-cell sizing and bead placement for every populated cell.
    Lattice,
    /// Periodic closure and chain-end attachment bonds.
    Stitch,
    Cut,
    /// Side-chain decoration of a hydrogel backbone.
    Decorate,
    /// Straight backbone of a linear polymer.
    Backbone,
    SideBeads,
    Angles,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Lattice => "Building Lattice",
            Stage::Stitch => "Stitching Network",
            Stage::Cut => "Cutting Bonds",
            Stage::Decorate => "Decorating Backbone",
            Stage::Backbone => "Placing Backbone",
            Stage::SideBeads => "Placing Side Beads",
            Stage::Angles => "Building Angles",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Entity counts and per-stage statistics of a finished build.
///
/// Stages that did not run leave their fields at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub atoms: usize,
    pub bonds: usize,
    pub angles: usize,
    pub cuts_requested: usize,
    pub cuts_removed: usize,
    pub side_chains_placed: usize,
    /// Backbone beads left bare because every candidate direction overlapped.
    pub side_chains_skipped: usize,
    pub side_beads_placed: usize,
    /// Side beads kept at an overlapping position after the attempt limit.
    pub side_beads_overlapping: usize,
}

/// Events emitted by the workflows while a topology is being generated.
#[derive(Debug, Clone)]
pub enum Progress {
    PhaseStart { stage: Stage },
    PhaseFinish,

    TaskStart { total_steps: u64 },
    TaskIncrement,
    TaskFinish,

    Message(String),

    Summary(BuildSummary),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    /// Runs `task` between a `PhaseStart` and a `PhaseFinish` event.
    ///
    /// `PhaseFinish` is only emitted when the task succeeds.
    pub fn phase<T, E>(
        &self,
        stage: Stage,
        task: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        self.report(Progress::PhaseStart { stage });
        let result = task()?;
        self.report(Progress::PhaseFinish);
        Ok(result)
    }
}
