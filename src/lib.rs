//! Maze3d - procedural 3D mazes with rooms, regions and floating blocks

pub mod core;
pub mod math;
pub mod maze;

pub use maze::{Maze, MazeConfig, RoomDensity};
