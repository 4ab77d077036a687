//! Dense 3D grids addressed by integer fine-grid coordinates

use std::collections::{HashSet, VecDeque};

use crate::core::types::{IVec3, UVec3};

/// The six axis directions in fixed query order: x+, x-, y+, y-, z+, z-.
pub const AXIS_DIRECTIONS: [IVec3; 6] = [
    IVec3::X,
    IVec3::NEG_X,
    IVec3::Y,
    IVec3::NEG_Y,
    IVec3::Z,
    IVec3::NEG_Z,
];

/// Occupancy value of a traversable cell
pub const PATH: u8 = 1;
/// Occupancy value of a wall cell
pub const WALL: u8 = 0;

/// Dense row-major 3D array (x outermost, z innermost)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid3<T> {
    dims: UVec3,
    data: Vec<T>,
}

impl<T: Copy> Grid3<T> {
    /// Create a grid of the given extents with every cell set to `value`
    pub fn filled(dims: UVec3, value: T) -> Self {
        let len = dims.x as usize * dims.y as usize * dims.z as usize;
        Self {
            dims,
            data: vec![value; len],
        }
    }

    /// Grid extents
    pub fn dims(&self) -> UVec3 {
        self.dims
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Check whether `coord` addresses a cell of this grid
    pub fn contains(&self, coord: IVec3) -> bool {
        coord.cmpge(IVec3::ZERO).all() && coord.as_uvec3().cmplt(self.dims).all()
    }

    fn index(&self, coord: IVec3) -> Option<usize> {
        if !self.contains(coord) {
            return None;
        }
        let c = coord.as_uvec3();
        Some(((c.x * self.dims.y + c.y) * self.dims.z + c.z) as usize)
    }

    /// Read a cell, `None` when out of bounds
    pub fn get(&self, coord: IVec3) -> Option<T> {
        self.index(coord).map(|i| self.data[i])
    }

    /// Write a cell. Returns false (and writes nothing) when out of bounds.
    pub fn set(&mut self, coord: IVec3, value: T) -> bool {
        match self.index(coord) {
            Some(i) => {
                self.data[i] = value;
                true
            }
            None => false,
        }
    }

    /// Iterate all coordinates in storage order
    pub fn coords(&self) -> impl Iterator<Item = IVec3> + use<T> {
        let d = self.dims.as_ivec3();
        (0..d.x).flat_map(move |x| {
            (0..d.y).flat_map(move |y| (0..d.z).map(move |z| IVec3::new(x, y, z)))
        })
    }

    /// Iterate `(coord, value)` pairs in storage order
    pub fn iter(&self) -> impl Iterator<Item = (IVec3, T)> + '_ {
        self.coords().zip(self.data.iter().copied())
    }

    /// Build a grid of the same extents by mapping every cell
    pub fn map<U: Copy>(&self, f: impl Fn(T) -> U) -> Grid3<U> {
        Grid3 {
            dims: self.dims,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// In-bounds axis neighbours of `coord`, in `AXIS_DIRECTIONS` order
    pub fn neighbors(&self, coord: IVec3) -> impl Iterator<Item = (IVec3, T)> + '_ {
        AXIS_DIRECTIONS
            .into_iter()
            .filter_map(move |dir| self.get(coord + dir).map(|v| (coord + dir, v)))
    }

    /// Breadth-first 6-connected flood fill starting at `start`.
    ///
    /// `start` is always part of the fill when in bounds. Every other
    /// in-bounds cell adjacent to the fill is offered to `enter` (possibly
    /// more than once if it is refused) and joins the fill when accepted.
    /// Returns the filled cells in visit order.
    pub fn flood_from<F>(&self, start: IVec3, mut enter: F) -> Vec<IVec3>
    where
        F: FnMut(IVec3, T) -> bool,
    {
        let mut filled = Vec::new();
        if !self.contains(start) {
            return filled;
        }

        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        seen.insert(start);
        queue.push_back(start);

        while let Some(coord) = queue.pop_front() {
            filled.push(coord);
            for dir in AXIS_DIRECTIONS {
                let next = coord + dir;
                if seen.contains(&next) {
                    continue;
                }
                let Some(value) = self.get(next) else { continue };
                if enter(next, value) {
                    seen.insert(next);
                    queue.push_back(next);
                }
            }
        }

        filled
    }
}

/// Fine-grid occupancy: `PATH` (1) is traversable, `WALL` (0) is solid.
///
/// For a `rows×cols×height` lattice the grid spans
/// `(2·rows+1, 2·cols+1, 2·height+1)`; all-odd coordinates are cell centres
/// and coordinates with an even component are connectors or solid wall.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OccupancyGrid {
    cells: Grid3<u8>,
}

impl OccupancyGrid {
    /// Solid grid sized for a `rows×cols×height` lattice
    pub fn for_lattice(rows: u32, cols: u32, height: u32) -> Self {
        Self::solid(UVec3::new(2 * rows + 1, 2 * cols + 1, 2 * height + 1))
    }

    /// Solid grid with explicit extents
    pub fn solid(dims: UVec3) -> Self {
        Self {
            cells: Grid3::filled(dims, WALL),
        }
    }

    pub fn dims(&self) -> UVec3 {
        self.cells.dims()
    }

    pub fn contains(&self, coord: IVec3) -> bool {
        self.cells.contains(coord)
    }

    /// Traversable check; out-of-bounds cells read as walls
    pub fn is_open(&self, coord: IVec3) -> bool {
        self.cells.get(coord) == Some(PATH)
    }

    /// Open or close a cell. Returns false when out of bounds.
    pub fn set_open(&mut self, coord: IVec3, open: bool) -> bool {
        self.cells.set(coord, if open { PATH } else { WALL })
    }

    /// Open every cell of the `size³` cube whose minimum corner is `min`.
    /// Cells falling outside the grid are ignored.
    pub fn carve_cube(&mut self, min: IVec3, size: u32) {
        let size = size as i32;
        for x in 0..size {
            for y in 0..size {
                for z in 0..size {
                    self.set_open(min + IVec3::new(x, y, z), true);
                }
            }
        }
    }

    /// Number of traversable cells
    pub fn open_count(&self) -> usize {
        self.cells.iter().filter(|&(_, v)| v == PATH).count()
    }

    /// Raw byte storage view for renderers
    pub fn cells(&self) -> &Grid3<u8> {
        &self.cells
    }
}
