use super::config::{RoleSpec, SideChainConfig};
use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use super::utils::neighbors::NeighborGrid;
use crate::core::models::atom::{Atom, AtomRole, AtomTemplate, EndTag};
use crate::core::models::ids::AtomId;
use crate::core::models::system::World;
use crate::core::monomers::definition::{BondAnchor, MonomerDefinition};
use crate::core::monomers::sequence::SequenceGenerator;
use crate::core::utils::geometry::{
    is_within_distance, minimum_image_sq_distance, minimum_image_vector,
    random_perpendicular_vector, random_unit_vector, tetrahedral_complement,
};
use nalgebra::{Point3, Vector3};
use rand::Rng;
use std::collections::{BTreeMap, HashSet, VecDeque};
use tracing::{debug, instrument, warn};

/// Graph radius, in bonds, of the atoms tested for overlap around a polymer side bead.
const POLYMER_TESTER_DEPTH: usize = 3;

/// Outcome of decorating a hydrogel backbone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideChainReport {
    /// Side chains materialized per monomer id.
    pub placed: BTreeMap<String, usize>,
    /// Backbone beads left bare because no candidate direction was free.
    pub skipped: usize,
}

impl SideChainReport {
    pub fn total_placed(&self) -> usize {
        self.placed.values().sum()
    }
}

/// A scored candidate placement of one side chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub positions: Vec<Point3<f64>>,
    pub penalty: f64,
}

/// Bead positions of `monomer` grown from `anchor` along `direction`.
fn grow(
    anchor: &Point3<f64>,
    direction: &Vector3<f64>,
    monomer: &MonomerDefinition,
    mean_sep: f64,
) -> Vec<Point3<f64>> {
    let mut last = *anchor;
    (0..monomer.beads.len())
        .map(|k| {
            last += direction * monomer.step_length(k, mean_sep);
            last
        })
        .collect()
}

/// Scores one candidate direction against the atoms around the anchor.
///
/// Returns `None` if any bead comes closer than `overlap` to a nearby atom. Otherwise the
/// penalty is the sum of inverse squared distances over every bead and nearby atom.
pub fn score_candidate(
    anchor: &Point3<f64>,
    direction: &Vector3<f64>,
    monomer: &MonomerDefinition,
    mean_sep: f64,
    nearby: &[Point3<f64>],
    overlap: f64,
    box_length: f64,
) -> Option<Candidate> {
    let positions = grow(anchor, direction, monomer, mean_sep);
    let overlap_sq = overlap * overlap;
    let mut penalty = 0.0;
    for bead in &positions {
        for other in nearby {
            let d2 = minimum_image_sq_distance(bead, other, box_length);
            if d2 < overlap_sq {
                return None;
            }
            penalty += 1.0 / d2;
        }
    }
    Some(Candidate { positions, penalty })
}

/// Reference triple `(p1, p2, p3)` spanning the local backbone direction at `id`.
fn backbone_frame(world: &World, id: AtomId, box_length: f64) -> Option<[Point3<f64>; 3]> {
    let atoms = world.atoms();
    let atom = &atoms[id.index()];
    match atom.bonded_atoms() {
        [] => None,
        [single] => {
            let b1 = atoms[single.index()].position;
            let continuation = atom.position - minimum_image_vector(&atom.position, &b1, box_length);
            Some([b1, atom.position, continuation])
        }
        [first, second, ..] => Some([
            atoms[first.index()].position,
            atom.position,
            atoms[second.index()].position,
        ]),
    }
}

fn bead_template(monomer: &MonomerDefinition, index: usize) -> AtomTemplate {
    let bead = &monomer.beads[index];
    AtomTemplate {
        bead_type: bead.bead_type.clone(),
        residue_name: monomer.residue_name.clone(),
        atom_name: bead.name.clone(),
        mass: bead.mass,
        charge: bead.charge,
        role: AtomRole::Sidechain,
        ..AtomTemplate::default()
    }
}

/// Adds the beads and bonds of `monomer` to the registry, anchored on `anchor`.
pub fn materialize_side_chain(
    world: &mut World,
    anchor: AtomId,
    monomer: &MonomerDefinition,
    positions: &[Point3<f64>],
) -> Vec<AtomId> {
    let ids: Vec<AtomId> = positions
        .iter()
        .enumerate()
        .map(|(k, &position)| world.add_atom(Atom::from_template(&bead_template(monomer, k), position)))
        .collect();
    for bond in &monomer.bonds {
        let from = match bond.from {
            BondAnchor::Backbone => anchor,
            BondAnchor::Bead(index) => ids[index],
        };
        world.add_bond(from, ids[bond.to], bond.params);
    }
    ids
}

/// Decorates every eligible backbone bead of a hydrogel with one side-chain monomer.
///
/// Eligible beads are backbone interior beads and chain ends that carry at least one bond.
/// For each, `config.candidates` random directions perpendicular to the local backbone are
/// scored and the lowest-penalty valid one is materialized. Beads without any valid
/// direction are skipped with a warning.
#[instrument(skip_all, name = "side_chain_placement")]
pub fn place_side_chains<R: Rng + ?Sized>(
    world: &mut World,
    config: &SideChainConfig,
    box_length: f64,
    rng: &mut R,
    reporter: &ProgressReporter,
) -> Result<SideChainReport, EngineError> {
    let mut sequence = SequenceGenerator::new(&config.strategy, &config.palette)?;
    let mean_sep = world.mean_sep;
    let search_radius = config.search_radius_factor * mean_sep;
    let overlap = config.overlap_factor * mean_sep;
    let mut grid = NeighborGrid::from_world(world, search_radius, box_length);

    let eligible: Vec<AtomId> = world
        .atoms_by_role(AtomRole::Backbone)
        .filter(|(_, atom)| atom.end_tag <= EndTag::ChainEnd)
        .map(|(id, _)| id)
        .collect();

    let mut report = SideChainReport::default();
    for entry in &config.palette {
        report.placed.entry(entry.definition.id.clone()).or_insert(0);
    }

    reporter.report(Progress::TaskStart {
        total_steps: eligible.len() as u64,
    });
    for id in eligible {
        reporter.report(Progress::TaskIncrement);
        let Some([p1, p2, p3]) = backbone_frame(world, id, box_length) else {
            continue;
        };
        let monomer = &config.palette[sequence.next_index(rng)].definition;

        let excluded: HashSet<AtomId> = world.atoms()[id.index()]
            .bonded_atoms()
            .iter()
            .copied()
            .chain(std::iter::once(id))
            .collect();
        let nearby: Vec<Point3<f64>> = grid
            .within(&p2, search_radius)
            .into_iter()
            .filter(|(other, _)| !excluded.contains(other))
            .map(|(other, _)| world.atoms()[other.index()].position)
            .collect();

        let mut best: Option<Candidate> = None;
        for _ in 0..config.candidates {
            let direction = random_perpendicular_vector(&p1, &p2, &p3, 1.0, box_length, rng);
            let Some(candidate) =
                score_candidate(&p2, &direction, monomer, mean_sep, &nearby, overlap, box_length)
            else {
                continue;
            };
            if best.as_ref().is_none_or(|b| candidate.penalty < b.penalty) {
                best = Some(candidate);
            }
        }

        match best {
            Some(candidate) => {
                let ids = materialize_side_chain(world, id, monomer, &candidate.positions);
                for (bead, position) in ids.into_iter().zip(candidate.positions) {
                    grid.insert(bead, position);
                }
                *report.placed.entry(monomer.id.clone()).or_insert(0) += 1;
            }
            None => {
                warn!(
                    "No free direction for side chain '{}' on atom {}, skipping.",
                    monomer.id, id
                );
                report.skipped += 1;
            }
        }
    }
    reporter.report(Progress::TaskFinish);

    for (monomer, count) in &report.placed {
        debug!(monomer = %monomer, count, "Side chains placed.");
    }
    Ok(report)
}

/// Outcome of decorating a linear polymer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SideBeadReport {
    pub placed: usize,
    /// Beads kept at an overlapping position after the attempt limit ran out.
    pub overlapping: usize,
}

/// Atoms within `depth` bonds of `start`, excluding `start` itself.
fn graph_neighborhood(world: &World, start: AtomId, depth: usize) -> Vec<AtomId> {
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([(start, 0)]);
    let mut found = Vec::new();
    while let Some((current, level)) = queue.pop_front() {
        if level == depth {
            continue;
        }
        for &next in world.atoms()[current.index()].bonded_atoms() {
            if seen.insert(next) {
                found.push(next);
                queue.push_back((next, level + 1));
            }
        }
    }
    found
}

/// Attaches one side bead to every backbone bead of a linear polymer.
///
/// The direction depends on the bead's valence once the side bead is attached: a tetrahedral
/// complement for valence 4, a perpendicular search for valence 2 and 3, and a random
/// direction for an isolated bead. Positions closer than `mean_sep` to atoms within three
/// bonds are retried up to `attempt_limit` times.
///
/// # Errors
///
/// Returns [`EngineError::DegenerateGeometry`] if the neighbors of a valence-4 bead cancel
/// out along a line.
#[instrument(skip_all, name = "side_bead_placement")]
pub fn place_side_beads<R: Rng + ?Sized>(
    world: &mut World,
    role: &RoleSpec,
    attempt_limit: usize,
    rng: &mut R,
    reporter: &ProgressReporter,
) -> Result<SideBeadReport, EngineError> {
    let mean_sep = world.mean_sep;
    let box_length = world.box_length;
    let backbone: Vec<AtomId> = world
        .atoms_by_role(AtomRole::Backbone)
        .map(|(id, _)| id)
        .collect();

    let mut report = SideBeadReport::default();
    reporter.report(Progress::TaskStart {
        total_steps: backbone.len() as u64,
    });
    for id in backbone {
        reporter.report(Progress::TaskIncrement);
        let atom = &world.atoms()[id.index()];
        let center = atom.position;
        let neighbors: Vec<Point3<f64>> = atom
            .bonded_atoms()
            .iter()
            .map(|n| world.atoms()[n.index()].position)
            .collect();
        let testers: Vec<Point3<f64>> = graph_neighborhood(world, id, POLYMER_TESTER_DEPTH)
            .into_iter()
            .map(|n| world.atoms()[n.index()].position)
            .collect();
        let overlaps = |p: &Point3<f64>| is_within_distance(p, &testers, mean_sep, box_length);

        let draw = |rng: &mut R| -> Vector3<f64> {
            match neighbors.as_slice() {
                [] => random_unit_vector(rng) * mean_sep,
                [b1] => {
                    let continuation = center + (center - b1);
                    random_perpendicular_vector(b1, &center, &continuation, mean_sep, box_length, rng)
                }
                [b1, b2, ..] => random_perpendicular_vector(b1, &center, b2, mean_sep, box_length, rng),
            }
        };

        let mut position = None;
        if let [b1, b2, b3] = neighbors.as_slice() {
            let direction = tetrahedral_complement(&center, b1, b2, b3, box_length)
                .map_err(|source| EngineError::DegenerateGeometry { atom: id, source })?;
            let first = center + direction * mean_sep;
            if !overlaps(&first) {
                position = Some(first);
            }
        }

        let position = match position {
            Some(p) => p,
            None => {
                let mut attempt = center + draw(&mut *rng);
                let mut attempts = 1;
                while overlaps(&attempt) && attempts < attempt_limit {
                    attempt = center + draw(&mut *rng);
                    attempts += 1;
                }
                if overlaps(&attempt) {
                    warn!(
                        "Side bead on atom {} still overlaps after {} attempts.",
                        id, attempt_limit
                    );
                    report.overlapping += 1;
                }
                attempt
            }
        };

        let side = world.add_atom(Atom::from_template(&role.atom, position));
        world.add_bond(id, side, role.bond);
        report.placed += 1;
    }
    reporter.report(Progress::TaskFinish);

    debug!(
        placed = report.placed,
        overlapping = report.overlapping,
        "Side beads placed."
    );
    Ok(report)
}
