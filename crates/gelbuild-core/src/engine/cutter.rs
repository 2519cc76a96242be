use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use crate::core::models::ids::AtomId;
use crate::core::models::system::World;
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info, instrument};

/// Bonds removed by a cutting pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CutReport {
    /// Removed pairs in removal order.
    pub removed: Vec<(AtomId, AtomId)>,
    /// Trial removals that would have split the network and were reverted.
    pub rejected: usize,
}

fn sorted_bond_keys(world: &World) -> Vec<(AtomId, AtomId)> {
    let mut keys: Vec<_> = world.bonds_iter().map(|(_, bond)| bond.key()).collect();
    keys.sort_unstable();
    keys
}

/// Removes `count` random bonds while keeping the bond graph a single component.
///
/// Each trial removes a uniformly chosen candidate bond and checks, by breadth-first search
/// from one of its endpoints, that every atom is still reachable. Bonds whose removal splits
/// the network are reinstated and never tried again, so the loop is bounded by the number of
/// bonds.
///
/// # Errors
///
/// * [`EngineError::DisconnectedNetwork`] if the network is already split before cutting.
/// * [`EngineError::Connectivity`] if fewer than `count` bonds can be removed.
#[instrument(skip_all, fields(count = count))]
pub fn cut_preserving_connectivity<R: Rng + ?Sized>(
    world: &mut World,
    count: usize,
    rng: &mut R,
    reporter: &ProgressReporter,
) -> Result<CutReport, EngineError> {
    let total = world.atom_count();
    let mut report = CutReport::default();
    if count == 0 {
        return Ok(report);
    }

    if let Some(first) = world.atoms().first().map(|atom| atom.id()) {
        let reached = world.closure_size(first);
        if reached < total {
            return Err(EngineError::DisconnectedNetwork { reached, total });
        }
    }

    let mut candidates = sorted_bond_keys(world);
    let bonds = candidates.len();
    reporter.report(Progress::TaskStart {
        total_steps: count as u64,
    });
    while report.removed.len() < count {
        if candidates.is_empty() {
            return Err(EngineError::Connectivity {
                requested: count,
                removed: report.removed.len(),
                bonds,
            });
        }
        let (a, b) = candidates.swap_remove(rng.gen_range(0..candidates.len()));
        let Some(bond) = world.remove_bond(a, b) else {
            return Err(EngineError::Internal(format!(
                "bond {}-{} vanished from the registry during cutting",
                a, b
            )));
        };

        if world.closure_size(a) == total {
            report.removed.push((a, b));
            reporter.report(Progress::TaskIncrement);
        } else {
            world.add_bond(a, b, bond.params);
            report.rejected += 1;
        }
    }
    reporter.report(Progress::TaskFinish);

    info!(
        removed = report.removed.len(),
        rejected = report.rejected,
        "Cut bonds without disconnecting the network."
    );
    Ok(report)
}

/// Removes up to `count` distinct random bonds without any connectivity check.
pub fn cut_unchecked<R: Rng + ?Sized>(
    world: &mut World,
    count: usize,
    rng: &mut R,
) -> Vec<(AtomId, AtomId)> {
    let keys = sorted_bond_keys(world);
    let chosen: Vec<_> = keys.choose_multiple(rng, count).copied().collect();
    for &(a, b) in &chosen {
        world.remove_bond(a, b);
    }
    debug!(removed = chosen.len(), "Cut bonds without connectivity check.");
    chosen
}
