//! Diamond unit-cell geometry.
//!
//! A unit cell holds two "bis" points joined by a short crosslinker bridge. Each bis point
//! sprouts two backbone strands towards tetrahedral lattice vertices, and every vertex carries
//! a two-bead link that is closed across cell boundaries during stitching.

use super::error::EngineError;
use crate::core::utils::geometry::interpolate;
use nalgebra::{Point3, Vector3};

const FLOOR_EPSILON: f64 = 1e-6;

/// Vertex orientation of cells with an even coordinate sum.
const EVEN_CORNERS: [[f64; 3]; 4] = [
    [0.0, 0.0, 0.0],
    [0.0, 1.0, 1.0],
    [1.0, 1.0, 0.0],
    [1.0, 0.0, 1.0],
];

/// Vertex orientation of cells with an odd coordinate sum.
const ODD_CORNERS: [[f64; 3]; 4] = [
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 1.0],
];

/// Which bis point a strand starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BisPoint {
    Head,
    Tail,
}

/// Bead positions of one backbone strand, from the bis end towards the vertex end.
#[derive(Debug, Clone, PartialEq)]
pub struct Strand {
    pub origin: BisPoint,
    pub beads: Vec<Point3<f64>>,
}

/// Bead positions of one populated cell, already shifted to the cell's offset.
#[derive(Debug, Clone, PartialEq)]
pub struct CellBlueprint {
    pub cell: [usize; 3],
    pub strands: Vec<Strand>,
    /// Head end, two midpoints, tail end.
    pub bridge: [Point3<f64>; 4],
    /// Per vertex: the periodic-link bead, then the link-end bead that meets the strand.
    pub links: [[Point3<f64>; 2]; 4],
}

/// A solved diamond unit cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitCell {
    pub edge: f64,
    pub mean_sep: f64,
    beads_per_strand: usize,
}

impl UnitCell {
    /// Sizes the cell so that every strand carries `segment_length + 1` beads spaced exactly
    /// `mean_sep` apart.
    ///
    /// The edge is the smallest positive root of
    /// `0.75 x^2 - 3 m x + 9 m^2 - m^2 (2 + segment_length)^2 = 0`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnitCell`] when the quadratic has no positive real root.
    pub fn solve(mean_sep: f64, segment_length: usize) -> Result<Self, EngineError> {
        let edge = smallest_positive_root(
            0.75,
            -3.0 * mean_sep,
            9.0 * mean_sep.powi(2) - mean_sep.powi(2) * (2.0 + segment_length as f64).powi(2),
        )
        .ok_or(EngineError::UnitCell {
            mean_sep,
            segment_length,
        })?;

        let half = edge / 2.0;
        let strand_length = ((half - 3.0 * mean_sep).powi(2) + 2.0 * half.powi(2)).sqrt();
        let beads_per_strand = ((strand_length / mean_sep + FLOOR_EPSILON).floor() as usize)
            .saturating_sub(1);

        Ok(Self {
            edge,
            mean_sep,
            beads_per_strand,
        })
    }

    pub fn beads_per_strand(&self) -> usize {
        self.beads_per_strand
    }

    pub fn bis_head(&self) -> Point3<f64> {
        let half = self.edge / 2.0;
        Point3::new(half + 1.5 * self.mean_sep, half, half)
    }

    pub fn bis_tail(&self) -> Point3<f64> {
        let half = self.edge / 2.0;
        Point3::new(half - 1.5 * self.mean_sep, half, half)
    }

    /// Point on the lattice-vertex axis `corner`, pulled `factor * mean_sep` towards the
    /// cell interior along x.
    fn vertex(&self, corner: &[f64; 3], factor: f64) -> Point3<f64> {
        let shift = if corner[0] > 0.5 {
            -factor * self.mean_sep
        } else {
            factor * self.mean_sep
        };
        Point3::new(
            self.edge * corner[0] + shift,
            self.edge * corner[1],
            self.edge * corner[2],
        )
    }

    /// Lays out the beads of cell `cell`.
    pub fn blueprint(&self, cell: [usize; 3]) -> CellBlueprint {
        let corners = if cell.iter().sum::<usize>() % 2 == 0 {
            &EVEN_CORNERS
        } else {
            &ODD_CORNERS
        };
        let offset = Vector3::new(cell[0] as f64, cell[1] as f64, cell[2] as f64) * self.edge;
        let head = self.bis_head();
        let tail = self.bis_tail();

        let origins = [BisPoint::Tail, BisPoint::Tail, BisPoint::Head, BisPoint::Head];
        let strands = corners
            .iter()
            .zip(origins)
            .map(|(corner, origin)| {
                let start = match origin {
                    BisPoint::Head => head,
                    BisPoint::Tail => tail,
                };
                let end = self.vertex(corner, 1.5);
                Strand {
                    origin,
                    beads: interpolate(self.beads_per_strand, &start, &end)
                        .into_iter()
                        .map(|p| p + offset)
                        .collect(),
                }
            })
            .collect();

        let bridge = [
            head,
            Point3::from(head.coords * (2.0 / 3.0) + tail.coords / 3.0),
            Point3::from(head.coords / 3.0 + tail.coords * (2.0 / 3.0)),
            tail,
        ]
        .map(|p| p + offset);

        let links = [0, 1, 2, 3].map(|i| {
            [
                self.vertex(&corners[i], 0.5) + offset,
                self.vertex(&corners[i], 1.5) + offset,
            ]
        });

        CellBlueprint {
            cell,
            strands,
            bridge,
            links,
        }
    }
}

fn smallest_positive_root(a: f64, b: f64, c: f64) -> Option<f64> {
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt = discriminant.sqrt();
    [(-b - sqrt) / (2.0 * a), (-b + sqrt) / (2.0 * a)]
        .into_iter()
        .filter(|&x| x > 0.0)
        .reduce(f64::min)
}

/// Cells populated explicitly: those whose coordinate sum is even.
pub fn populated_cells(cells: [usize; 3]) -> impl Iterator<Item = [usize; 3]> {
    let [nx, ny, nz] = cells;
    (0..nx)
        .flat_map(move |x| (0..ny).flat_map(move |y| (0..nz).map(move |z| [x, y, z])))
        .filter(|cell| cell.iter().sum::<usize>() % 2 == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: f64 = 0.24;

    #[test]
    fn solve_matches_reference_edge_and_strand_size() {
        let cell = UnitCell::solve(MS, 10).unwrap();
        assert!((cell.edge - 3.7355).abs() < 1e-3);
        assert_eq!(cell.beads_per_strand(), 11);

        let short = UnitCell::solve(MS, 4).unwrap();
        assert_eq!(short.beads_per_strand(), 5);
    }

    #[test]
    fn solve_without_positive_root_is_an_error() {
        assert!(matches!(
            UnitCell::solve(MS, 0),
            Err(EngineError::UnitCell {
                segment_length: 0,
                ..
            })
        ));
    }

    #[test]
    fn strand_beads_are_one_mean_sep_apart() {
        let cell = UnitCell::solve(MS, 6).unwrap();
        let blueprint = cell.blueprint([0, 0, 0]);
        assert_eq!(blueprint.strands.len(), 4);
        for strand in &blueprint.strands {
            for pair in strand.beads.windows(2) {
                assert!(((pair[1] - pair[0]).norm() - MS).abs() < 1e-9);
            }
            let start = match strand.origin {
                BisPoint::Head => blueprint.bridge[0],
                BisPoint::Tail => blueprint.bridge[3],
            };
            assert!(((strand.beads[0] - start).norm() - MS).abs() < 1e-9);
        }
    }

    #[test]
    fn last_strand_bead_sits_next_to_its_link_end() {
        let cell = UnitCell::solve(MS, 6).unwrap();
        let blueprint = cell.blueprint([0, 0, 0]);
        for (strand, link) in blueprint.strands.iter().zip(&blueprint.links) {
            let last = strand.beads.last().unwrap();
            assert!(((last - link[1]).norm() - MS).abs() < 1e-9);
            assert!(((link[1] - link[0]).norm() - MS).abs() < 1e-9);
        }
    }

    #[test]
    fn bridge_spans_three_mean_seps() {
        let cell = UnitCell::solve(MS, 6).unwrap();
        let bridge = cell.blueprint([0, 0, 0]).bridge;
        for pair in bridge.windows(2) {
            assert!(((pair[1] - pair[0]).norm() - MS).abs() < 1e-9);
        }
    }

    #[test]
    fn blueprint_is_shifted_by_cell_offset() {
        let cell = UnitCell::solve(MS, 6).unwrap();
        let origin = cell.blueprint([0, 0, 0]);
        let shifted = cell.blueprint([2, 0, 0]);
        let delta = shifted.bridge[0] - origin.bridge[0];
        assert!((delta - Vector3::new(2.0 * cell.edge, 0.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn populated_cells_keeps_even_parity_only() {
        let cells: Vec<_> = populated_cells([2, 2, 2]).collect();
        assert_eq!(cells.len(), 4);
        assert!(cells.contains(&[0, 0, 0]));
        assert!(cells.contains(&[1, 1, 0]));
        assert!(!cells.contains(&[1, 0, 0]));
    }
}
