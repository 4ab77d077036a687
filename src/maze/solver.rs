//! Single-source distance field towards the goal cell

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use super::grid::{AXIS_DIRECTIONS, Grid3, OccupancyGrid, PATH};
use crate::core::types::{IVec3, Result};
use crate::core::Error;

/// Distance value of a wall cell
pub const WALL_DISTANCE: i32 = -1;
/// Distance value of a traversable cell the fill never reached
pub const UNREACHED: i32 = 0;

/// Steps-to-goal for every fine-grid cell, offset by one so that `0` can
/// mean "not reached". The goal itself holds `1`.
#[derive(Clone, Debug)]
pub struct DistanceField {
    goal: IVec3,
    distances: Grid3<i32>,
}

impl DistanceField {
    /// Breadth-first fill from `goal`.
    ///
    /// The fill moves between cell centres two units apart, labelling the
    /// connector in between on the way; a centre is only entered through a
    /// connector that is still unreached. Open cells off that lattice, such
    /// as the edges and corners inside carved rooms, are then labelled one
    /// more than their closest labelled neighbour.
    pub fn solve(grid: &OccupancyGrid, goal: IVec3) -> Result<Self> {
        if !grid.contains(goal) {
            return Err(Error::OutOfBounds(goal));
        }
        if !grid.is_open(goal) {
            return Err(Error::Wall(goal));
        }

        let mut distances = grid
            .cells()
            .map(|v| if v == PATH { UNREACHED } else { WALL_DISTANCE });

        let mut queue = VecDeque::new();
        queue.push_back((goal, 1));
        while let Some((cell, d)) = queue.pop_front() {
            if distances.get(cell) != Some(UNREACHED) {
                continue;
            }
            distances.set(cell, d);

            for dir in AXIS_DIRECTIONS {
                let connector = cell + dir;
                if distances.get(connector) == Some(UNREACHED) {
                    distances.set(connector, d + 1);
                    queue.push_back((connector + dir, d + 2));
                }
            }
        }

        fill_off_lattice(&mut distances);
        Ok(Self { goal, distances })
    }

    pub fn goal(&self) -> IVec3 {
        self.goal
    }

    /// Raw distance value, `None` outside the grid
    pub fn distance(&self, coord: IVec3) -> Option<i32> {
        self.distances.get(coord)
    }

    /// Largest recorded distance
    pub fn max_distance(&self) -> i32 {
        self.distances.iter().map(|(_, d)| d).max().unwrap_or(UNREACHED)
    }

    /// The underlying grid of distances for renderers
    pub fn distances(&self) -> &Grid3<i32> {
        &self.distances
    }

    /// Neighbour one unit away that is closest to the goal.
    ///
    /// Walls and unreached neighbours never win; ties go to the first of
    /// x+, x-, y+, y-, z+, z-. At the goal the goal itself is returned.
    pub fn next_step(&self, position: IVec3) -> Result<IVec3> {
        match self.distance(position) {
            None => Err(Error::OutOfBounds(position)),
            Some(WALL_DISTANCE) => Err(Error::Wall(position)),
            Some(UNREACHED) => Err(Error::Unreachable(position)),
            Some(1) => Ok(position),
            Some(_) => {
                let mut best: Option<(IVec3, i32)> = None;
                for (neighbor, d) in self.distances.neighbors(position) {
                    if d <= UNREACHED {
                        continue;
                    }
                    if best.is_none_or(|(_, best_d)| d < best_d) {
                        best = Some((neighbor, d));
                    }
                }
                best.map(|(neighbor, _)| neighbor)
                    .ok_or(Error::Unreachable(position))
            }
        }
    }

    /// Follow `next_step` from `position` to the goal.
    ///
    /// The returned path starts at `position` and ends at the goal. Distances
    /// strictly decrease along it; in a maze without rooms it holds exactly as
    /// many cells as the starting distance.
    pub fn path_to_goal(&self, position: IVec3) -> Result<Vec<IVec3>> {
        let mut path = vec![position];
        let mut current = position;
        while current != self.goal {
            let next = self.next_step(current)?;
            path.push(next);
            current = next;
        }
        Ok(path)
    }
}

/// Unit-step pass over open cells the two-step fill left unreached.
///
/// Cells are expanded in increasing distance order, so each newly labelled
/// cell gets one more than the smallest labelled neighbour it can reach.
fn fill_off_lattice(distances: &mut Grid3<i32>) {
    let mut heap = BinaryHeap::new();
    for (cell, d) in distances.iter() {
        if d > UNREACHED && distances.neighbors(cell).any(|(_, n)| n == UNREACHED) {
            heap.push(Reverse((d, cell.to_array())));
        }
    }

    let mut labelled = 0usize;
    while let Some(Reverse((d, cell))) = heap.pop() {
        let cell = IVec3::from_array(cell);
        for dir in AXIS_DIRECTIONS {
            let next = cell + dir;
            if distances.get(next) == Some(UNREACHED) {
                distances.set(next, d + 1);
                heap.push(Reverse((d + 1, next.to_array())));
                labelled += 1;
            }
        }
    }
    if labelled > 0 {
        log::trace!("Labelled {} off-lattice cells", labelled);
    }
}
