use gelbuild::engine::progress::{BuildSummary, Progress, ProgressCallback, Stage};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK: Duration = Duration::from_millis(100);

/// One-line description of a finished build, listing only the stages that ran.
pub fn describe_summary(summary: &BuildSummary) -> String {
    let mut parts = vec![format!(
        "{} atoms, {} bonds, {} angles",
        summary.atoms, summary.bonds, summary.angles
    )];
    if summary.cuts_requested > 0 {
        parts.push(format!(
            "{}/{} bonds cut",
            summary.cuts_removed, summary.cuts_requested
        ));
    }
    if summary.side_chains_placed + summary.side_chains_skipped > 0 {
        parts.push(format!(
            "{} side chains ({} skipped)",
            summary.side_chains_placed, summary.side_chains_skipped
        ));
    }
    if summary.side_beads_placed > 0 {
        parts.push(format!(
            "{} side beads ({} overlapping)",
            summary.side_beads_placed, summary.side_beads_overlapping
        ));
    }
    parts.join("; ")
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix:.bold.dim} {spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix:.bold.dim} {msg:<20} [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-")
}

/// Terminal state of one build: the bar of the running stage and the stages already done.
struct StageDisplay {
    bar: ProgressBar,
    current: Option<Stage>,
    completed: Vec<Stage>,
}

impl StageDisplay {
    fn new() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            current: None,
            completed: Vec::new(),
        }
    }

    fn handle(&mut self, event: Progress) {
        match event {
            Progress::PhaseStart { stage } => self.begin(stage),
            Progress::PhaseFinish => self.finish_stage(),
            Progress::TaskStart { total_steps } => {
                self.bar.disable_steady_tick();
                self.bar.set_style(bar_style());
                self.bar.set_length(total_steps);
                self.bar.set_position(0);
            }
            Progress::TaskIncrement => self.bar.inc(1),
            Progress::TaskFinish => {
                if let Some(total) = self.bar.length() {
                    self.bar.set_position(total);
                }
            }
            Progress::Message(msg) => self.bar.println(format!("  {}", msg)),
            Progress::Summary(summary) => {
                self.bar.finish();
                self.bar = ProgressBar::new_spinner()
                    .with_style(spinner_style())
                    .with_prefix("=>");
                self.bar.finish_with_message(describe_summary(&summary));
            }
        }
    }

    fn begin(&mut self, stage: Stage) {
        self.bar.finish();
        let step = self.completed.len() + 1;
        self.bar = ProgressBar::new_spinner()
            .with_style(spinner_style())
            .with_prefix(format!("[{}]", step))
            .with_message(stage.label());
        self.bar.enable_steady_tick(SPINNER_TICK);
        self.current = Some(stage);
    }

    fn finish_stage(&mut self) {
        let Some(stage) = self.current.take() else {
            return;
        };
        self.bar.disable_steady_tick();
        self.bar.set_style(spinner_style());
        self.bar.finish_with_message(format!("{} ✓", stage.label()));
        self.completed.push(stage);
    }
}

/// Renders hydrogel and polymer build progress on stderr, one numbered line per stage.
#[derive(Clone)]
pub struct CliProgressHandler {
    display: Arc<Mutex<StageDisplay>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self {
            display: Arc::new(Mutex::new(StageDisplay::new())),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let display = Arc::clone(&self.display);
        Box::new(move |event: Progress| match display.lock() {
            Ok(mut display) => display.handle(event),
            Err(_) => warn!("Progress display mutex was poisoned. Cannot update progress."),
        })
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}
