use crate::core::models::ids::AtomId;
use crate::core::models::system::World;
use crate::core::utils::geometry::minimum_image_sq_distance;
use nalgebra::Point3;
use std::collections::HashMap;

type CellKey = (i64, i64, i64);

/// Cell-list index over bead positions, optionally wrapped into a cubic periodic box.
///
/// Cells are cubes of edge `cell_size`. With a positive `box_length` the grid wraps every
/// axis and distances follow the minimum-image convention; otherwise the grid is unbounded
/// and distances are plain Euclidean.
#[derive(Debug, Clone)]
pub struct NeighborGrid {
    cell_size: f64,
    box_length: f64,
    cells_per_axis: i64,
    cells: HashMap<CellKey, Vec<(AtomId, Point3<f64>)>>,
}

impl NeighborGrid {
    /// Creates an empty grid.
    ///
    /// A non-positive `cell_size` falls back to a single periodic cell (or unit cells for
    /// open boundaries), which degrades every query into a linear scan.
    pub fn new(cell_size: f64, box_length: f64) -> Self {
        let periodic = box_length > 0.0;
        let cells_per_axis = if periodic && cell_size > 0.0 {
            ((box_length / cell_size).floor() as i64).max(1)
        } else {
            1
        };
        let cell_size = if periodic {
            box_length / cells_per_axis as f64
        } else if cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        Self {
            cell_size,
            box_length,
            cells_per_axis,
            cells: HashMap::new(),
        }
    }

    /// Builds a grid holding every atom currently registered in `world`.
    pub fn from_world(world: &World, cell_size: f64, box_length: f64) -> Self {
        let mut grid = Self::new(cell_size, box_length);
        for (id, atom) in world.atoms_iter() {
            grid.insert(id, atom.position);
        }
        grid
    }

    fn is_periodic(&self) -> bool {
        self.box_length > 0.0
    }

    fn wrap(&self, index: i64) -> i64 {
        if self.is_periodic() {
            index.rem_euclid(self.cells_per_axis)
        } else {
            index
        }
    }

    fn cell_of(&self, position: &Point3<f64>) -> CellKey {
        let index = |x: f64| self.wrap((x / self.cell_size).floor() as i64);
        (index(position.x), index(position.y), index(position.z))
    }

    pub fn insert(&mut self, id: AtomId, position: Point3<f64>) {
        let key = self.cell_of(&position);
        self.cells.entry(key).or_default().push((id, position));
    }

    pub fn len(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.values().all(Vec::is_empty)
    }

    /// Returns every indexed atom strictly closer than `radius` to `point` with its squared
    /// distance, ordered by atom id.
    pub fn within(&self, point: &Point3<f64>, radius: f64) -> Vec<(AtomId, f64)> {
        let radius_sq = radius * radius;
        let mut found: Vec<(AtomId, f64)> = self
            .candidate_cells(point, radius)
            .into_iter()
            .filter_map(|key| self.cells.get(&key))
            .flatten()
            .filter_map(|(id, position)| {
                let d2 = minimum_image_sq_distance(point, position, self.box_length);
                (d2 < radius_sq).then_some((*id, d2))
            })
            .collect();
        found.sort_unstable_by_key(|(id, _)| *id);
        found
    }

    fn candidate_cells(&self, point: &Point3<f64>, radius: f64) -> Vec<CellKey> {
        let reach = (radius / self.cell_size).ceil().max(0.0) as i64;
        if self.is_periodic() && 2 * reach + 1 >= self.cells_per_axis {
            return self.cells.keys().copied().collect();
        }
        let (cx, cy, cz) = self.cell_of(point);
        let mut keys = Vec::with_capacity(((2 * reach + 1).pow(3)) as usize);
        for dx in -reach..=reach {
            for dy in -reach..=reach {
                for dz in -reach..=reach {
                    keys.push((self.wrap(cx + dx), self.wrap(cy + dy), self.wrap(cz + dz)));
                }
            }
        }
        keys
    }
}
