//! Procedural 3D maze
//!
//! A `Maze` is built in one pass: a spanning tree is grown over a coarse
//! lattice and rasterized into a fine occupancy grid, rooms are carved into
//! it, the remaining open space is partitioned into regions and floating
//! blocks are picked from those regions. After construction only the
//! floating-block cells may change.

pub mod config;
pub mod floating;
pub mod generator;
pub mod grid;
pub mod refine;
pub mod regions;
pub mod rooms;
pub mod solver;

pub use config::{MazeConfig, RoomDensity};
pub use floating::{FloatingBlockSelector, FloatingBlocks, FillOutcome};
pub use grid::{Grid3, OccupancyGrid};
pub use regions::{RegionLabel, RegionMap};
pub use rooms::{Room, RoomCarver};
pub use solver::DistanceField;

use std::borrow::Cow;
use std::sync::OnceLock;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::types::{IVec3, Result, Vec3};
use crate::core::Error;

/// Fine-grid cell the player starts in
pub const START_CELL: IVec3 = IVec3::ONE;

/// A generated maze and everything derived from it
#[derive(Debug)]
pub struct Maze {
    config: MazeConfig,
    grid: OccupancyGrid,
    rooms: Vec<Room>,
    regions: RegionMap,
    floating: FloatingBlocks,
    distances: OnceLock<DistanceField>,
}

impl Maze {
    /// Build a maze, seeding from `config.seed` or from entropy
    pub fn build(config: MazeConfig) -> Result<Self> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::build_with_rng(config, &mut rng)
    }

    /// Positional constructor with default obstruction classes and seed
    pub fn new(rows: u32, cols: u32, height: u32, wall_margin: f32, room_density: RoomDensity) -> Result<Self> {
        Self::build(MazeConfig {
            rows,
            cols,
            height,
            wall_margin,
            rooms: room_density,
            ..Default::default()
        })
    }

    /// Build a maze drawing all randomness from `rng`
    pub fn build_with_rng<R: Rng + ?Sized>(config: MazeConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;
        let start_time = Instant::now();
        let lattice = config.lattice();

        let mut grid = generator::generate(lattice.x, lattice.y, lattice.z, rng)?;

        // The virtual anchor keeps every room clear of the start cell
        let mut carver = RoomCarver::new(lattice);
        carver.reserve(IVec3::splat(-1));
        let requested = config.room_count();
        let placed = carver.carve_rooms(&mut grid, requested, rng);
        if placed < requested {
            log::warn!("Placed {} of {} requested rooms", placed, requested);
        }
        let rooms = carver.into_rooms();

        if !grid.is_open(START_CELL) || rooms.iter().any(|r| r.contains_cell(START_CELL)) {
            return Err(Error::Configuration(format!(
                "start cell {} must be open and outside every room",
                START_CELL
            )));
        }

        let mut regions = RegionMap::partition(&grid, &rooms);
        let floating = FloatingBlockSelector::new(config.obstruction_classes)
            .with_origin(START_CELL)
            .select(&mut regions, rng);

        log::info!(
            "Built {}x{}x{} maze in {:.1}ms: {} open cells, {} rooms, {} regions, {} floating blocks",
            lattice.x,
            lattice.y,
            lattice.z,
            start_time.elapsed().as_secs_f64() * 1000.0,
            grid.open_count(),
            rooms.len(),
            regions.region_count(),
            floating.len()
        );

        Ok(Self {
            config,
            grid,
            rooms,
            regions,
            floating,
            distances: OnceLock::new(),
        })
    }

    pub fn config(&self) -> &MazeConfig {
        &self.config
    }

    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn regions(&self) -> &RegionMap {
        &self.regions
    }

    pub fn region_count(&self) -> u32 {
        self.regions.region_count()
    }

    pub fn start(&self) -> IVec3 {
        START_CELL
    }

    /// Centre of the far corner lattice cell
    pub fn goal(&self) -> IVec3 {
        self.grid.dims().as_ivec3() - IVec3::splat(2)
    }

    /// Refine with an explicit wall margin
    pub fn refine_position(&self, position: Vec3, margin: f32) -> (Vec3, bool) {
        refine::refine_position(&self.grid, position, margin)
    }

    /// Refine with the configured wall margin
    pub fn refine(&self, position: Vec3) -> (Vec3, bool) {
        self.refine_position(position, self.config.wall_margin)
    }

    /// Compute the distance field once and return it.
    ///
    /// The field describes the maze as constructed: floating blocks count as
    /// open whatever state they have been toggled to.
    pub fn solve(&self) -> Result<&DistanceField> {
        if let Some(field) = self.distances.get() {
            return Ok(field);
        }
        let field = DistanceField::solve(&self.constructed_grid(), self.goal())?;
        log::debug!("Solved maze, longest distance {}", field.max_distance());
        Ok(self.distances.get_or_init(|| field))
    }

    /// Distance field, if `solve` has run
    pub fn distances(&self) -> Result<&DistanceField> {
        self.distances.get().ok_or(Error::NotSolved)
    }

    pub fn is_solved(&self) -> bool {
        self.distances.get().is_some()
    }

    /// Neighbouring cell one step closer to the goal
    pub fn next_step(&self, coord: IVec3) -> Result<IVec3> {
        self.solve()?.next_step(coord)
    }

    pub fn path_to_goal(&self, coord: IVec3) -> Result<Vec<IVec3>> {
        self.solve()?.path_to_goal(coord)
    }

    pub fn is_open(&self, coord: IVec3) -> Result<bool> {
        if !self.grid.contains(coord) {
            return Err(Error::OutOfBounds(coord));
        }
        Ok(self.grid.is_open(coord))
    }

    /// Open or close a floating-block cell. Any other cell is rejected.
    pub fn set_open(&mut self, coord: IVec3, open: bool) -> Result<()> {
        if !self.grid.contains(coord) {
            return Err(Error::OutOfBounds(coord));
        }
        if !self.floating.contains(coord) {
            return Err(Error::NotFloatingBlock(coord));
        }
        self.grid.set_open(coord, open);
        log::trace!("Floating block {} set open={}", coord, open);
        Ok(())
    }

    /// Open or close every block of one obstruction class
    pub fn set_class_open(&mut self, class: usize, open: bool) -> Result<()> {
        let cells = self
            .floating
            .classes()
            .get(class)
            .ok_or(Error::UnknownClass(class))?;
        for &cell in cells {
            self.grid.set_open(cell, open);
        }
        log::debug!("Obstruction class {} ({} blocks) set open={}", class, cells.len(), open);
        Ok(())
    }

    /// Floating blocks grouped by obstruction class
    pub fn floating_blocks(&self) -> &[Vec<IVec3>] {
        self.floating.classes()
    }

    pub fn floating_block_count(&self) -> usize {
        self.floating.len()
    }

    pub fn obstruction_class_of(&self, coord: IVec3) -> Option<usize> {
        self.floating.class_of(coord)
    }

    /// Whether a continuous position lies inside any room's bounds
    pub fn in_room(&self, position: Vec3) -> bool {
        self.rooms.iter().any(|room| room.bounds().contains_point(position))
    }

    fn constructed_grid(&self) -> Cow<'_, OccupancyGrid> {
        let closed = self
            .floating
            .classes()
            .iter()
            .flatten()
            .any(|&cell| !self.grid.is_open(cell));
        if !closed {
            return Cow::Borrowed(&self.grid);
        }
        let mut grid = self.grid.clone();
        for &cell in self.floating.classes().iter().flatten() {
            grid.set_open(cell, true);
        }
        Cow::Owned(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_maze() -> Maze {
        Maze::build(MazeConfig::cube(3).with_rooms(RoomDensity::Count(0)).with_seed(1)).expect("build failed")
    }

    /// First seeded 9³ maze that ends up with floating blocks
    fn maze_with_blocks() -> Maze {
        for seed in 0..20 {
            let config = MazeConfig::cube(9).with_rooms(RoomDensity::Count(5)).with_seed(seed);
            let maze = Maze::build(config).expect("build failed");
            if maze.floating_block_count() > 0 {
                return maze;
            }
        }
        panic!("no seed produced floating blocks");
    }

    #[test]
    fn test_three_cube_scenario() {
        let maze = small_maze();
        assert_eq!(maze.goal(), IVec3::splat(5));
        assert_eq!(maze.start(), IVec3::ONE);
        assert_eq!(maze.region_count(), 1);
        assert_eq!(maze.floating_block_count(), 0);
        assert!(maze.rooms().is_empty());

        for x in [1, 3, 5] {
            for y in [1, 3, 5] {
                for z in [1, 3, 5] {
                    let c = IVec3::new(x, y, z);
                    assert_eq!(maze.regions().label(c), Some(RegionLabel::Region(1)));
                }
            }
        }

        let field = maze.solve().expect("solve failed");
        assert_eq!(field.distance(maze.goal()), Some(1));
        let path = maze.path_to_goal(maze.start()).expect("no path");
        for pair in path.windows(2) {
            assert!(field.distance(pair[0]) > field.distance(pair[1]));
        }
    }

    #[test]
    fn test_distances_require_solve() {
        let maze = small_maze();
        assert!(!maze.is_solved());
        assert!(matches!(maze.distances(), Err(Error::NotSolved)));

        // next_step solves on demand
        let step = maze.next_step(maze.start()).expect("reachable");
        assert_eq!((step - maze.start()).abs().element_sum(), 1);
        assert!(maze.is_solved());
        assert!(maze.distances().is_ok());
        assert_eq!(maze.next_step(maze.goal()).ok(), Some(maze.goal()));
    }

    #[test]
    fn test_open_queries() {
        let maze = small_maze();
        assert_eq!(maze.is_open(IVec3::ONE).ok(), Some(true));
        assert_eq!(maze.is_open(IVec3::ZERO).ok(), Some(false));
        assert!(matches!(maze.is_open(IVec3::new(7, 0, 0)), Err(Error::OutOfBounds(_))));
        assert!(matches!(maze.is_open(IVec3::new(0, -1, 0)), Err(Error::OutOfBounds(_))));
    }

    #[test]
    fn test_set_open_only_on_floating_blocks() {
        let mut maze = small_maze();
        assert!(matches!(maze.set_open(IVec3::ONE, false), Err(Error::NotFloatingBlock(_))));
        assert!(matches!(maze.set_open(IVec3::splat(9), false), Err(Error::OutOfBounds(_))));
        assert_eq!(maze.is_open(IVec3::ONE).ok(), Some(true));
    }

    #[test]
    fn test_toggle_floating_blocks() {
        let mut maze = maze_with_blocks();
        let block = maze
            .floating_blocks()
            .iter()
            .flatten()
            .copied()
            .next()
            .expect("has blocks");
        assert_eq!(maze.is_open(block).ok(), Some(true));

        maze.set_open(block, false).expect("toggle failed");
        assert_eq!(maze.is_open(block).ok(), Some(false));

        // Solving still sees the maze as constructed
        let field = maze.solve().expect("solve failed");
        assert!(field.distance(block).is_some_and(|d| d > 0));

        maze.set_open(block, true).expect("toggle failed");
        assert_eq!(maze.is_open(block).ok(), Some(true));

        let class = maze.obstruction_class_of(block).expect("block has a class");
        maze.set_class_open(class, false).expect("unknown class");
        for &cell in &maze.floating_blocks()[class] {
            assert_eq!(maze.is_open(cell).ok(), Some(false));
        }
        assert!(matches!(maze.set_class_open(99, true), Err(Error::UnknownClass(99))));
    }

    #[test]
    fn test_rooms_keep_clear_of_start() {
        for seed in 0..10 {
            let config = MazeConfig::cube(8).with_rooms(RoomDensity::Count(8)).with_seed(seed);
            let maze = Maze::build(config).expect("build failed");
            assert!(!maze.rooms().is_empty());
            assert!(!maze.in_room(Vec3::splat(1.5)));
            assert_eq!(maze.is_open(START_CELL).ok(), Some(true));
        }
    }

    #[test]
    fn test_in_room() {
        let maze = maze_with_blocks();
        let room = maze.rooms()[0];
        assert!(maze.in_room(room.bounds().center()));
        assert!(!maze.in_room(Vec3::splat(-1.0)));
    }

    #[test]
    fn test_refine_uses_configured_margin() {
        let maze = small_maze();
        let p = Vec3::new(1.5, 1.5, 1.05);
        let (refined, collided) = maze.refine(p);
        assert!(collided);
        assert_eq!(maze.refine_position(p, 0.2), (refined, collided));
        assert!((refined.z - (1.0 + 0.2 * 1.01)).abs() < 1e-5);
    }

    #[test]
    fn test_seeded_builds_match() {
        let config = MazeConfig::cube(7).with_rooms(RoomDensity::Count(3)).with_seed(99);
        let a = Maze::build(config.clone()).expect("build failed");
        let b = Maze::build(config).expect("build failed");
        assert_eq!(a.grid(), b.grid());
        assert_eq!(a.rooms(), b.rooms());
        assert_eq!(a.regions(), b.regions());
        assert_eq!(a.floating_blocks(), b.floating_blocks());
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(matches!(
            Maze::new(0, 3, 3, 0.2, RoomDensity::Count(0)),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            Maze::new(3, 3, 3, 0.7, RoomDensity::Count(0)),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_maze_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Maze>();
    }
}
