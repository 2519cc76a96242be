use crate::core::models::system::World;
use crate::engine::angles::{build_angles, classify_hydrogel};
use crate::engine::config::HydrogelConfig;
use crate::engine::cutter::{CutReport, cut_preserving_connectivity};
use crate::engine::error::EngineError;
use crate::engine::lattice::UnitCell;
use crate::engine::network::{StitchReport, geometry_box, populate, stitch};
use crate::engine::placement::{SideChainReport, place_side_chains};
use crate::engine::progress::{BuildSummary, Progress, ProgressReporter, Stage};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, instrument};

/// A finished hydrogel build.
#[derive(Debug, Clone)]
pub struct HydrogelBuild {
    pub world: World,
    pub stitch: StitchReport,
    pub cuts: CutReport,
    pub side_chains: Option<SideChainReport>,
    pub angles: usize,
    pub summary: BuildSummary,
}

/// Builds a diamond-lattice hydrogel network.
///
/// All random decisions come from one generator seeded with `config.seed`.
///
/// # Errors
///
/// Returns [`EngineError`] if the unit cell cannot be sized, the stitched network is not
/// connected when cuts are requested, the cut count exceeds what the network can lose, or the
/// side-chain sequence cannot be built.
#[instrument(skip_all, name = "hydrogel_workflow")]
pub fn run(config: &HydrogelConfig, reporter: &ProgressReporter) -> Result<HydrogelBuild, EngineError> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut world = World::new(config.mean_sep);

    // === Phase 1: Lattice ===
    let in_link = reporter.phase(Stage::Lattice, || {
        let unit = UnitCell::solve(config.mean_sep, config.segment_length)?;
        info!(
            edge = unit.edge,
            beads_per_strand = unit.beads_per_strand(),
            "Solved diamond unit cell."
        );
        Ok::<_, EngineError>(populate(&mut world, &unit, config))
    })?;

    // === Phase 2: Stitching ===
    let stitch_report = reporter.phase(Stage::Stitch, || {
        Ok::<_, EngineError>(stitch(&mut world, config, in_link))
    })?;
    info!(
        atoms = world.atom_count(),
        bonds = world.bond_count(),
        "Network assembled."
    );

    // === Phase 3: Connectivity-preserving cuts ===
    let cuts = if config.cuts > 0 {
        reporter.phase(Stage::Cut, || {
            cut_preserving_connectivity(&mut world, config.cuts, &mut rng, reporter)
        })?
    } else {
        CutReport::default()
    };

    // === Phase 4: Side chains (optional) ===
    let side_chains = match &config.side_chains {
        Some(side_config) => {
            let box_length = geometry_box(&world, config.pbc);
            let report = reporter.phase(Stage::Decorate, || {
                place_side_chains(&mut world, side_config, box_length, &mut rng, reporter)
            })?;
            info!(
                placed = report.total_placed(),
                skipped = report.skipped,
                "Side chains placed."
            );
            Some(report)
        }
        None => None,
    };

    // === Phase 5: Angles ===
    let angles = if config.build_angles {
        reporter.phase(Stage::Angles, || {
            Ok::<_, EngineError>(build_angles(&mut world, |a, c, b| {
                classify_hydrogel(&config.angles, a, c, b)
            }))
        })?
    } else {
        0
    };

    let summary = BuildSummary {
        atoms: world.atom_count(),
        bonds: world.bond_count(),
        angles,
        cuts_requested: config.cuts,
        cuts_removed: cuts.removed.len(),
        side_chains_placed: side_chains.as_ref().map_or(0, SideChainReport::total_placed),
        side_chains_skipped: side_chains.as_ref().map_or(0, |report| report.skipped),
        ..BuildSummary::default()
    };
    reporter.report(Progress::Summary(summary));
    info!(
        atoms = world.atom_count(),
        bonds = world.bond_count(),
        angles,
        "Hydrogel build complete."
    );

    Ok(HydrogelBuild {
        world,
        stitch: stitch_report,
        cuts,
        side_chains,
        angles,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::{AtomRole, EndTag};
    use crate::core::models::topology::BondParams;
    use crate::core::monomers::definition::{
        BeadDefinition, BondAnchor, MonomerBond, MonomerDefinition, MonomerEntry,
    };
    use crate::core::monomers::sequence::SequenceStrategy;
    use crate::engine::config::{HydrogelConfigBuilder, SideChainConfig};
    use std::sync::{Arc, Mutex};

    fn base() -> HydrogelConfigBuilder {
        HydrogelConfigBuilder::new()
            .seed(2024)
            .segment_length(10)
            .cells([2, 2, 2])
    }

    fn one_bead_palette() -> Vec<MonomerEntry> {
        vec![MonomerEntry {
            definition: MonomerDefinition {
                id: "PEG".to_string(),
                residue_name: "PEG".to_string(),
                beads: vec![BeadDefinition {
                    bead_type: "SN4a".to_string(),
                    name: "S1".to_string(),
                    mass: 72.0,
                    charge: 0.0,
                }],
                bonds: vec![MonomerBond {
                    from: BondAnchor::Backbone,
                    to: 0,
                    params: BondParams::default(),
                }],
            },
            ratio: 1.0,
        }]
    }

    mod network_only {
        use super::*;

        #[test]
        fn two_cubed_network_has_deterministic_counts() {
            let config = base().build_angles(false).build().unwrap();
            let first = run(&config, &ProgressReporter::new()).unwrap();
            let second = run(&config, &ProgressReporter::new()).unwrap();

            assert_eq!(first.world.atom_count(), 208);
            assert_eq!(first.world.bond_count(), 216);
            assert_eq!(first.world.atoms(), second.world.atoms());
            assert!(first.world.is_connected());
        }

        #[test]
        fn every_atom_is_bonded() {
            let config = base().build_angles(false).build().unwrap();
            let build = run(&config, &ProgressReporter::new()).unwrap();
            for atom in build.world.atoms() {
                assert!(atom.number_of_bonds() >= 1, "atom {} is isolated", atom.id());
            }
        }

        #[test]
        fn zero_segment_length_fails_to_size_the_cell() {
            let config = base().segment_length(0).build().unwrap();
            assert!(matches!(
                run(&config, &ProgressReporter::new()),
                Err(EngineError::UnitCell { .. })
            ));
        }
    }

    mod cutting {
        use super::*;

        #[test]
        fn cuts_within_cycle_rank_keep_the_network_whole() {
            let config = base().cuts(9).build_angles(false).build().unwrap();
            let build = run(&config, &ProgressReporter::new()).unwrap();

            assert_eq!(build.cuts.removed.len(), 9);
            assert_eq!(build.world.bond_count(), 216 - 9);
            assert_eq!(build.summary.cuts_requested, 9);
            assert_eq!(build.summary.cuts_removed, 9);
            assert_eq!(build.summary.bonds, 216 - 9);
            assert!(build.world.is_connected());
        }

        #[test]
        fn cuts_beyond_cycle_rank_are_rejected() {
            let config = base().cuts(10).build_angles(false).build().unwrap();
            assert!(matches!(
                run(&config, &ProgressReporter::new()),
                Err(EngineError::Connectivity {
                    requested: 10,
                    removed: 9,
                    bonds: 216
                })
            ));
        }

        #[test]
        fn same_seed_cuts_same_bonds() {
            let config = base().cuts(5).build_angles(false).build().unwrap();
            let a = run(&config, &ProgressReporter::new()).unwrap();
            let b = run(&config, &ProgressReporter::new()).unwrap();
            assert_eq!(a.cuts.removed, b.cuts.removed);
        }
    }

    mod decoration {
        use super::*;

        #[test]
        fn side_chains_decorate_backbone_beads() {
            let config = base()
                .segment_length(4)
                .side_chains(SideChainConfig::new(
                    one_bead_palette(),
                    SequenceStrategy::Random,
                ))
                .build()
                .unwrap();
            let build = run(&config, &ProgressReporter::new()).unwrap();
            let report = build.side_chains.as_ref().unwrap();

            let backbone = build.world.atoms_by_role(AtomRole::Backbone).count();
            let side = build.world.atoms_by_role(AtomRole::Sidechain).count();
            assert_eq!(side, report.total_placed());
            assert_eq!(build.summary.side_chains_placed, side);
            assert_eq!(build.summary.side_chains_skipped, report.skipped);
            assert_eq!(report.total_placed() + report.skipped, backbone);
            assert!(side > 0);
            assert!(build.world.is_connected());
        }

        #[test]
        fn angles_cover_every_neighbor_pair() {
            let config = base().segment_length(4).build().unwrap();
            let build = run(&config, &ProgressReporter::new()).unwrap();

            let expected: usize = build
                .world
                .atoms()
                .iter()
                .map(|atom| {
                    let n = atom.number_of_bonds();
                    n * n.saturating_sub(1) / 2
                })
                .sum();
            assert_eq!(build.angles, expected);
            assert_eq!(build.world.angles().len(), expected);
        }

        #[test]
        fn chain_end_tags_survive_the_build() {
            let config = base().segment_length(4).build_angles(false).build().unwrap();
            let build = run(&config, &ProgressReporter::new()).unwrap();
            assert_eq!(build.world.atoms_by_end_tag(EndTag::ChainEnd).count(), 32);
            assert_eq!(build.world.atoms_by_end_tag(EndTag::PeriodicLink).count(), 8);
        }
    }

    #[test]
    fn reporter_sees_phases_and_summary() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let reporter = ProgressReporter::with_callback(Box::new(move |event| match event {
            Progress::PhaseStart { stage } => sink.lock().unwrap().push(stage.label().to_string()),
            Progress::Summary(summary) => {
                sink.lock().unwrap().push(format!("atoms={}", summary.atoms))
            }
            _ => {}
        }));

        let config = base().segment_length(4).build().unwrap();
        run(&config, &reporter).unwrap();

        assert_eq!(
            *events.lock().unwrap(),
            vec![
                "Building Lattice",
                "Stitching Network",
                "Building Angles",
                "atoms=112"
            ]
        );
    }
}
