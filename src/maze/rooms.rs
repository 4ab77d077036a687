//! Room placement: widened open cubes carved over the maze topology

use rand::Rng;

use super::grid::OccupancyGrid;
use crate::core::types::{IVec3, UVec3};
use crate::math::Aabb;

/// Edge length of a room cube in fine-grid cells
pub const ROOM_SIZE: u32 = 3;

/// Rooms must be strictly farther apart than this (Manhattan, lattice units)
pub const ROOM_MIN_SPACING: i32 = 6;

/// Random anchors sampled per room before placement gives up
pub const ROOM_PLACEMENT_ATTEMPTS: usize = 100;

/// A carved room, anchored in coarse-lattice coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Room {
    pub anchor: IVec3,
    pub size: u32,
}

impl Room {
    pub fn new(anchor: IVec3, size: u32) -> Self {
        Self { anchor, size }
    }

    /// Minimum fine-grid corner of the room cube (the anchor's cell centre)
    pub fn min_cell(&self) -> IVec3 {
        self.anchor * 2 + IVec3::ONE
    }

    /// Continuous bounds of the room in fine-grid space
    pub fn bounds(&self) -> Aabb {
        Aabb::from_cells(self.min_cell(), self.size)
    }

    /// Whether the fine-grid cell belongs to the room interior
    pub fn contains_cell(&self, cell: IVec3) -> bool {
        self.bounds().contains_cell(cell)
    }

    /// All fine-grid cells of the room
    pub fn cells(&self) -> impl Iterator<Item = IVec3> + use<> {
        let min = self.min_cell();
        let size = self.size as i32;
        (0..size).flat_map(move |x| {
            (0..size).flat_map(move |y| (0..size).map(move |z| min + IVec3::new(x, y, z)))
        })
    }
}

fn manhattan(a: IVec3, b: IVec3) -> i32 {
    (a - b).abs().element_sum()
}

/// Places rooms one at a time, keeping every new anchor farther than
/// `min_spacing` from the anchors already placed or reserved.
#[derive(Debug)]
pub struct RoomCarver {
    lattice: UVec3,
    min_spacing: i32,
    size: u32,
    /// Anchors that new rooms keep their distance from, placed or not
    occupied: Vec<IVec3>,
    rooms: Vec<Room>,
}

impl RoomCarver {
    /// Carver for a `rows×cols×height` lattice with the default spacing and size
    pub fn new(lattice: UVec3) -> Self {
        Self {
            lattice,
            min_spacing: ROOM_MIN_SPACING,
            size: ROOM_SIZE,
            occupied: Vec::new(),
            rooms: Vec::new(),
        }
    }

    pub fn with_spacing(mut self, min_spacing: i32) -> Self {
        self.min_spacing = min_spacing;
        self
    }

    /// Keep rooms away from `anchor` without carving anything there.
    pub fn reserve(&mut self, anchor: IVec3) {
        self.occupied.push(anchor);
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn into_rooms(self) -> Vec<Room> {
        self.rooms
    }

    fn is_spaced(&self, anchor: IVec3) -> bool {
        self.occupied
            .iter()
            .all(|&other| manhattan(other, anchor) > self.min_spacing)
    }

    /// Place a room at an explicit anchor.
    ///
    /// Returns `None` when the anchor is too close to an existing room or
    /// the cube would leave the grid.
    pub fn try_place(&mut self, grid: &mut OccupancyGrid, anchor: IVec3) -> Option<Room> {
        if !self.is_spaced(anchor) {
            return None;
        }
        let room = Room::new(anchor, self.size);
        let max = room.min_cell() + IVec3::splat(self.size as i32 - 1);
        if !grid.contains(room.min_cell()) || !grid.contains(max) {
            return None;
        }

        grid.carve_cube(room.min_cell(), self.size);
        self.occupied.push(anchor);
        self.rooms.push(room);
        Some(room)
    }

    /// Randomly place up to `count` rooms, returning how many were placed.
    ///
    /// Anchors are drawn from `0..=dim-3` on every lattice axis. When no
    /// spaced anchor turns up within `ROOM_PLACEMENT_ATTEMPTS` draws, the
    /// remaining rooms are skipped.
    pub fn carve_rooms<R: Rng + ?Sized>(&mut self, grid: &mut OccupancyGrid, count: usize, rng: &mut R) -> usize {
        if count == 0 {
            return 0;
        }
        if self.lattice.min_element() < 3 {
            log::debug!("Lattice {:?} too small for rooms, skipping {} requested", self.lattice, count);
            return 0;
        }

        let upper = self.lattice.as_ivec3() - IVec3::splat(3);
        let mut placed = 0;
        'rooms: for _ in 0..count {
            for _ in 0..ROOM_PLACEMENT_ATTEMPTS {
                let anchor = IVec3::new(
                    rng.gen_range(0..=upper.x),
                    rng.gen_range(0..=upper.y),
                    rng.gen_range(0..=upper.z),
                );
                if self.try_place(grid, anchor).is_some() {
                    placed += 1;
                    continue 'rooms;
                }
            }
            log::debug!(
                "No spaced anchor after {} attempts, placed {}/{} rooms",
                ROOM_PLACEMENT_ATTEMPTS, placed, count
            );
            break;
        }
        placed
    }
}
