use crate::core::models::atom::{Atom, EndTag};
use crate::core::models::system::World;
use crate::core::utils::geometry::interpolate;
use crate::engine::angles::{build_angles, classify_polymer};
use crate::engine::config::PolymerConfig;
use crate::engine::error::EngineError;
use crate::engine::placement::{SideBeadReport, place_side_beads};
use crate::engine::progress::{BuildSummary, Progress, ProgressReporter, Stage};
use nalgebra::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, instrument};

/// A finished linear-polymer build.
#[derive(Debug, Clone)]
pub struct PolymerBuild {
    pub world: World,
    pub side_beads: Option<SideBeadReport>,
    pub angles: usize,
    pub summary: BuildSummary,
}

/// Random chain axis: squared components are a random partition of one, each with a random
/// sign.
fn random_axis<R: Rng + ?Sized>(rng: &mut R) -> Vector3<f64> {
    let x: f64 = rng.r#gen();
    let y = (1.0 - x) * rng.r#gen::<f64>();
    let z = (1.0 - x - y).max(0.0);
    let mut sign = || if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    Vector3::new(sign() * x.sqrt(), sign() * y.sqrt(), sign() * z.sqrt())
}

/// Backbone positions of an `n`-bead straight chain spaced `mean_sep` apart.
///
/// The chain spans `(n - 1) * mean_sep` and is centered on a point drawn uniformly from the
/// middle half-to-one-and-a-half chain lengths of each axis.
pub fn chain_positions<R: Rng + ?Sized>(n: usize, mean_sep: f64, rng: &mut R) -> Vec<Point3<f64>> {
    let chain_length = n.saturating_sub(1) as f64 * mean_sep;
    let middle = Point3::from(Vector3::from_fn(|_, _| {
        0.5 * chain_length + rng.r#gen::<f64>() * chain_length
    }));
    let axis = random_axis(rng);
    let half_span = axis * (n as f64 + 1.0) * mean_sep / 2.0;
    interpolate(n, &(middle - half_span), &(middle + half_span))
}

/// Builds the first chain of `config`, seeded with `config.seed`.
///
/// # Errors
///
/// Returns [`EngineError::DegenerateGeometry`] if a side bead cannot be oriented.
pub fn run(config: &PolymerConfig, reporter: &ProgressReporter) -> Result<PolymerBuild, EngineError> {
    run_chain(config, 0, reporter)
}

/// Builds every chain of `config` in index order.
///
/// # Errors
///
/// Stops at the first chain that fails, see [`run_chain`].
pub fn run_all(
    config: &PolymerConfig,
    reporter: &ProgressReporter,
) -> Result<Vec<PolymerBuild>, EngineError> {
    (0..config.chains)
        .map(|index| run_chain(config, index, reporter))
        .collect()
}

/// Builds chain `index` of `config`: one straight polymer with optional side beads, drawn
/// from a generator seeded with `config.seed + index`.
///
/// # Errors
///
/// Returns [`EngineError::DegenerateGeometry`] if a side bead cannot be oriented.
#[instrument(skip_all, name = "polymer_workflow", fields(chain = index))]
pub fn run_chain(
    config: &PolymerConfig,
    index: usize,
    reporter: &ProgressReporter,
) -> Result<PolymerBuild, EngineError> {
    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(index as u64));
    let mut world = World::new(config.mean_sep);
    world.box_length = 2.0 * config.monomers.saturating_sub(1) as f64 * config.mean_sep;

    // === Phase 1: Backbone ===
    reporter.phase(Stage::Backbone, || {
        let positions = chain_positions(config.monomers, config.mean_sep, &mut rng);
        let last = positions.len().saturating_sub(1);
        let mut previous = None;
        for (i, position) in positions.into_iter().enumerate() {
            let tag = if i == 0 || i == last {
                EndTag::ChainEnd
            } else {
                EndTag::Interior
            };
            let id = world.add_atom(Atom::from_template(&config.backbone.atom, position).with_end_tag(tag));
            if let Some(prev) = previous {
                world.add_bond(prev, id, config.backbone.bond);
            }
            previous = Some(id);
        }
        Ok::<_, EngineError>(())
    })?;
    debug!(
        atoms = world.atom_count(),
        box_length = world.box_length,
        "Backbone placed."
    );

    // === Phase 2: Side beads (optional) ===
    let side_beads = match &config.side_bead {
        Some(role) => Some(reporter.phase(Stage::SideBeads, || {
            place_side_beads(&mut world, role, config.overlap_check_limit, &mut rng, reporter)
        })?),
        None => None,
    };

    // === Phase 3: Angles ===
    let angles = if config.build_angles {
        reporter.phase(Stage::Angles, || {
            Ok::<_, EngineError>(build_angles(&mut world, |a, c, b| {
                classify_polymer(&config.angle_rules, config.default_angle, a, c, b)
            }))
        })?
    } else {
        0
    };

    let summary = BuildSummary {
        atoms: world.atom_count(),
        bonds: world.bond_count(),
        angles,
        side_beads_placed: side_beads.map_or(0, |report| report.placed),
        side_beads_overlapping: side_beads.map_or(0, |report| report.overlapping),
        ..BuildSummary::default()
    };
    reporter.report(Progress::Summary(summary));
    info!(
        atoms = world.atom_count(),
        bonds = world.bond_count(),
        angles,
        "Polymer build complete."
    );

    Ok(PolymerBuild {
        world,
        side_beads,
        angles,
        summary,
    })
}
