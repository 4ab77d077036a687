//! Randomized-Prim spanning tree over the coarse lattice
//!
//! The coarse lattice holds `rows×cols×height` maze cells, each with six wall
//! flags. Growing a random spanning tree over it and rasterizing the result
//! gives a perfect maze: exactly one path between any two cell centres.

use rand::Rng;
use rand::seq::SliceRandom;

use super::grid::{AXIS_DIRECTIONS, Grid3, OccupancyGrid};
use crate::core::types::{IVec3, Result, UVec3};
use crate::core::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum VisitState {
    #[default]
    Unvisited,
    Frontier,
    Visited,
}

/// One coarse maze cell during spanning-tree construction
#[derive(Clone, Copy, Debug, Default)]
struct LatticeCell {
    /// Open wall flags indexed like `AXIS_DIRECTIONS`
    open: [bool; 6],
    state: VisitState,
}

/// Index of the opposite direction in `AXIS_DIRECTIONS`
fn opposite(dir_index: usize) -> usize {
    dir_index ^ 1
}

/// Coarse lattice with all walls initially closed
struct Lattice {
    cells: Grid3<LatticeCell>,
}

impl Lattice {
    fn closed(dims: UVec3) -> Self {
        Self {
            cells: Grid3::filled(dims, LatticeCell::default()),
        }
    }

    fn update(&mut self, coord: IVec3, f: impl FnOnce(&mut LatticeCell)) {
        if let Some(mut cell) = self.cells.get(coord) {
            f(&mut cell);
            self.cells.set(coord, cell);
        }
    }

    fn open_wall(&mut self, coord: IVec3, dir_index: usize) {
        self.update(coord, |c| c.open[dir_index] = true);
        self.update(coord + AXIS_DIRECTIONS[dir_index], |c| {
            c.open[opposite(dir_index)] = true
        });
    }

    /// Grow the tree from the lattice origin. Each cell taken from the
    /// frontier joins the tree through one uniformly chosen visited neighbour.
    fn grow_spanning_tree<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut frontier = vec![IVec3::ZERO];
        self.update(IVec3::ZERO, |c| c.state = VisitState::Frontier);

        while !frontier.is_empty() {
            let cell = frontier.swap_remove(rng.gen_range(0..frontier.len()));
            self.update(cell, |c| c.state = VisitState::Visited);

            let mut back_edges = Vec::with_capacity(6);
            for (dir_index, dir) in AXIS_DIRECTIONS.into_iter().enumerate() {
                let next = cell + dir;
                let Some(neighbor) = self.cells.get(next) else { continue };
                match neighbor.state {
                    VisitState::Visited => back_edges.push(dir_index),
                    VisitState::Unvisited => {
                        frontier.push(next);
                        self.update(next, |c| c.state = VisitState::Frontier);
                    }
                    VisitState::Frontier => {}
                }
            }

            if let Some(&dir_index) = back_edges.choose(rng) {
                self.open_wall(cell, dir_index);
            }
        }
    }

    /// Cell centres land on odd fine coordinates; every open wall flag opens
    /// the connector between a centre and its neighbour.
    fn rasterize(&self) -> OccupancyGrid {
        let dims = self.cells.dims();
        let mut grid = OccupancyGrid::for_lattice(dims.x, dims.y, dims.z);
        for (coord, cell) in self.cells.iter() {
            let center = coord * 2 + IVec3::ONE;
            grid.set_open(center, true);
            for (dir_index, dir) in AXIS_DIRECTIONS.into_iter().enumerate() {
                if cell.open[dir_index] {
                    grid.set_open(center + dir, true);
                }
            }
        }
        grid
    }
}

/// Generate a perfect maze over a `rows×cols×height` lattice and rasterize it
/// into a `(2·rows+1, 2·cols+1, 2·height+1)` occupancy grid.
pub fn generate<R: Rng + ?Sized>(rows: u32, cols: u32, height: u32, rng: &mut R) -> Result<OccupancyGrid> {
    if rows == 0 || cols == 0 || height == 0 {
        return Err(Error::Configuration(format!(
            "lattice dimensions must be positive, got {}x{}x{}",
            rows, cols, height
        )));
    }

    let mut lattice = Lattice::closed(UVec3::new(rows, cols, height));
    lattice.grow_spanning_tree(rng);
    Ok(lattice.rasterize())
}
