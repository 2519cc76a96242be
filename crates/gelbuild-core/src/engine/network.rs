use super::config::{HydrogelConfig, RoleSpec};
use super::lattice::{CellBlueprint, UnitCell, populated_cells};
use crate::core::io::report::PbcBondReport;
use crate::core::models::atom::{Atom, AtomRole, EndTag};
use crate::core::models::ids::AtomId;
use crate::core::models::system::World;
use crate::core::utils::geometry::minimum_image_sq_distance;
use nalgebra::Point3;
use tracing::{debug, instrument};

/// Link beads closer than this many mean separations are the same lattice vertex.
const DEDUPE_FACTOR: f64 = 0.1;
/// Squared cutoff, in units of `mean_sep^2`, for periodic-link closure bonds.
const PERIODIC_CUTOFF_SQ: f64 = 1.2;
/// Squared cutoff, in units of `mean_sep^2`, for chain-end to crosslink-end bonds.
const ATTACHMENT_CUTOFF_SQ: f64 = 1.5;

/// Bond statistics of one network build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StitchReport {
    /// Bonds between two periodic-link beads.
    pub periodic: usize,
    /// Bonds between a backbone chain end and a crosslink end.
    pub attachments: usize,
    /// Bonds between a periodic-link bead and its link end, made while populating cells.
    pub in_link: usize,
    /// Periodic-link bonds that wrap across the box boundary.
    pub pbc_bonds: PbcBondReport,
}

/// Box edge used for distance tests: the periodic box, or zero for open boundaries.
pub fn geometry_box(world: &World, pbc: bool) -> f64 {
    if pbc { world.box_length } else { 0.0 }
}

struct CellPopulator<'a> {
    world: &'a mut World,
    config: &'a HydrogelConfig,
    geometry_box: f64,
    link_beads: Vec<(AtomId, Point3<f64>)>,
    in_link: usize,
}

impl CellPopulator<'_> {
    fn place(&mut self, role: &RoleSpec, tag: EndTag, position: Point3<f64>) -> AtomId {
        self.world
            .add_atom(Atom::from_template(&role.atom, position).with_end_tag(tag))
    }

    fn place_strand_beads(&mut self, beads: &[Point3<f64>]) {
        let config = self.config;
        let last = beads.len().saturating_sub(1);
        let mut previous = None;
        for (k, &position) in beads.iter().enumerate() {
            let tag = if k == 0 || k == last {
                EndTag::ChainEnd
            } else {
                EndTag::Interior
            };
            let id = self.place(&config.backbone, tag, position);
            if let Some(prev) = previous {
                self.world.add_bond(prev, id, config.backbone.bond);
            }
            previous = Some(id);
        }
    }

    fn place_bridge(&mut self, bridge: &[Point3<f64>; 4]) {
        let config = self.config;
        let linkers = &config.linkers;
        let mut previous = None;
        for (k, &position) in bridge.iter().enumerate() {
            let (role, tag) = if k == 0 || k == bridge.len() - 1 {
                (&linkers.bridge_end, EndTag::CrosslinkEnd)
            } else {
                (&linkers.bridge_midpoint, EndTag::CrosslinkMidpoint)
            };
            let id = self.place(role, tag, position);
            if let Some(prev) = previous {
                self.world.add_bond(prev, id, role.bond);
            }
            previous = Some(id);
        }
    }

    fn existing_link_bead(&self, position: &Point3<f64>) -> Option<AtomId> {
        let threshold_sq = (DEDUPE_FACTOR * self.world.mean_sep).powi(2);
        self.link_beads
            .iter()
            .find(|(_, p)| minimum_image_sq_distance(position, p, self.geometry_box) < threshold_sq)
            .map(|(id, _)| *id)
    }

    fn place_link(&mut self, link: &[Point3<f64>; 2]) {
        let config = self.config;
        let linkers = &config.linkers;
        let mut previous = None;
        for (k, &position) in link.iter().enumerate() {
            if let Some(shared) = self.existing_link_bead(&position) {
                previous = Some(shared);
                continue;
            }
            let (role, tag) = if k == 0 {
                (&linkers.periodic_link, EndTag::PeriodicLink)
            } else {
                (&linkers.link_end, EndTag::CrosslinkEnd)
            };
            let id = self.place(role, tag, position);
            self.link_beads.push((id, position));
            if let Some(prev) = previous {
                if !self.world.has_bond(prev, id) {
                    self.world.add_bond(prev, id, role.bond);
                    self.in_link += 1;
                }
            }
            previous = Some(id);
        }
    }

    fn populate_cell(&mut self, blueprint: &CellBlueprint) {
        for strand in &blueprint.strands {
            self.place_strand_beads(&strand.beads);
        }
        self.place_bridge(&blueprint.bridge);
        for link in &blueprint.links {
            self.place_link(link);
        }
    }
}

/// Materializes backbone, bridge and link beads for every even cell of the lattice.
///
/// Sets the registry's `ubox_length` and `box_length` and returns the number of in-link
/// bonds created. Link beads that coincide with an already placed link bead are shared.
#[instrument(skip_all, fields(cells = ?config.cells))]
pub fn populate(world: &mut World, unit: &UnitCell, config: &HydrogelConfig) -> usize {
    world.ubox_length = unit.edge;
    world.box_length = config.cells.iter().copied().max().unwrap_or(1) as f64 * unit.edge;

    let box_length = geometry_box(world, config.pbc);
    let mut populator = CellPopulator {
        world,
        geometry_box: box_length,
        config,
        link_beads: Vec::new(),
        in_link: 0,
    };
    for cell in populated_cells(config.cells) {
        let blueprint = unit.blueprint(cell);
        populator.populate_cell(&blueprint);
    }

    debug!(
        atoms = populator.world.atom_count(),
        bonds = populator.world.bond_count(),
        shared_link_beads = populator.link_beads.len(),
        "Populated lattice cells."
    );
    populator.in_link
}

fn ids_with_tag(world: &World, tag: EndTag) -> Vec<AtomId> {
    world.atoms_by_end_tag(tag).map(|(id, _)| id).collect()
}

/// Closes the network: bonds periodic-link pairs to each other and every backbone chain end
/// to its nearest crosslink end.
#[instrument(skip_all)]
pub fn stitch(world: &mut World, config: &HydrogelConfig, in_link: usize) -> StitchReport {
    let mean_sep_sq = world.mean_sep.powi(2);
    let box_length = geometry_box(world, config.pbc);
    let bond = config.backbone.bond;
    let mut report = StitchReport {
        in_link,
        ..StitchReport::default()
    };

    let periodic_links = ids_with_tag(world, EndTag::PeriodicLink);
    if config.pbc || config.cells != [1, 1, 1] {
        for (i, &a) in periodic_links.iter().enumerate() {
            for &b in &periodic_links[i + 1..] {
                if world.has_bond(a, b) {
                    continue;
                }
                let (pa, pb) = (world.atoms()[a.index()].position, world.atoms()[b.index()].position);
                let d2 = minimum_image_sq_distance(&pa, &pb, box_length);
                if d2 >= PERIODIC_CUTOFF_SQ * mean_sep_sq {
                    continue;
                }
                if config.pbc && 2.0 * d2 < (pa - pb).norm() {
                    report.pbc_bonds.record(a, b);
                }
                world.add_bond(a, b, bond);
                report.periodic += 1;
            }
        }
    }

    let chain_ends: Vec<AtomId> = world
        .atoms_by_end_tag(EndTag::ChainEnd)
        .filter(|(_, atom)| atom.role == AtomRole::Backbone)
        .map(|(id, _)| id)
        .collect();
    let crosslink_ends = ids_with_tag(world, EndTag::CrosslinkEnd);
    for &chain_end in &chain_ends {
        let position = world.atoms()[chain_end.index()].position;
        let partner = crosslink_ends.iter().copied().find(|&candidate| {
            !world.has_bond(chain_end, candidate)
                && minimum_image_sq_distance(
                    &position,
                    &world.atoms()[candidate.index()].position,
                    box_length,
                ) < ATTACHMENT_CUTOFF_SQ * mean_sep_sq
        });
        if let Some(partner) = partner {
            world.add_bond(chain_end, partner, bond);
            report.attachments += 1;
        }
    }

    debug!(
        n44 = report.periodic,
        n12 = report.attachments,
        n24 = report.in_link,
        wrapped = report.pbc_bonds.len(),
        "Stitched network."
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::HydrogelConfigBuilder;
    use std::collections::BTreeMap;

    fn build(segment_length: usize, cells: [usize; 3], pbc: bool) -> (World, StitchReport) {
        let config = HydrogelConfigBuilder::new()
            .segment_length(segment_length)
            .cells(cells)
            .pbc(pbc)
            .build()
            .unwrap();
        let unit = UnitCell::solve(config.mean_sep, config.segment_length).unwrap();
        let mut world = World::new(config.mean_sep);
        let in_link = populate(&mut world, &unit, &config);
        let report = stitch(&mut world, &config, in_link);
        (world, report)
    }

    fn degree_histogram(world: &World) -> BTreeMap<usize, usize> {
        let mut histogram = BTreeMap::new();
        for atom in world.atoms() {
            *histogram.entry(atom.number_of_bonds()).or_default() += 1;
        }
        histogram
    }

    mod periodic_lattice {
        use super::*;

        #[test]
        fn two_cubed_lattice_has_reference_counts() {
            let (world, report) = build(10, [2, 2, 2], true);

            assert_eq!(world.atom_count(), 208);
            assert_eq!(world.bond_count(), 216);
            assert_eq!(world.atoms_by_role(AtomRole::Backbone).count(), 176);
            assert_eq!(report.periodic, 4);
            assert_eq!(report.attachments, 32);
            assert_eq!(report.in_link, 8);
        }

        #[test]
        fn stitched_lattice_is_connected_with_expected_degrees() {
            let (world, _) = build(10, [2, 2, 2], true);

            assert!(world.is_connected());
            let histogram = degree_histogram(&world);
            assert_eq!(histogram.get(&2), Some(&192));
            assert_eq!(histogram.get(&3), Some(&16));
            assert_eq!(histogram.len(), 2);
        }

        #[test]
        fn shorter_segments_shrink_backbone_only() {
            let (world, _) = build(4, [2, 2, 2], true);
            assert_eq!(world.atom_count(), 112);
            assert_eq!(world.bond_count(), 120);
            assert!(world.is_connected());
        }

        #[test]
        fn box_lengths_are_recorded() {
            let (world, _) = build(10, [2, 2, 2], true);
            assert!((world.box_length - 2.0 * world.ubox_length).abs() < 1e-12);
            assert!((world.ubox_length - 3.7355).abs() < 1e-3);
        }

        #[test]
        fn wrapped_bonds_are_reported_between_periodic_links() {
            let (world, report) = build(10, [2, 2, 2], true);
            for &(a, b) in &report.pbc_bonds.pairs {
                assert!(world.has_bond(a, b));
                assert_eq!(world.atoms()[a.index()].end_tag, EndTag::PeriodicLink);
                assert_eq!(world.atoms()[b.index()].end_tag, EndTag::PeriodicLink);
            }
        }
    }

    mod open_lattice {
        use super::*;

        #[test]
        fn open_single_cell_skips_periodic_closure() {
            let (world, report) = build(6, [1, 1, 1], false);
            assert_eq!(report.periodic, 0);
            assert!(report.pbc_bonds.is_empty());
            assert_eq!(world.atoms_by_end_tag(EndTag::PeriodicLink).count(), 4);
        }

        #[test]
        fn every_strand_end_attaches_in_open_cell() {
            let (_, report) = build(6, [1, 1, 1], false);
            assert_eq!(report.attachments, 8);
        }
    }
}
