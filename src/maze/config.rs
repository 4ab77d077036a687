//! Maze construction parameters

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::floating::DEFAULT_OBSTRUCTION_CLASSES;
use crate::core::types::{Result, UVec3};
use crate::core::Error;

/// How many rooms to carve.
///
/// In JSON an integer is an absolute count and a float is a density per
/// lattice cell, e.g. `0.01` asks for one room per hundred cells.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoomDensity {
    Count(usize),
    Density(f32),
}

impl RoomDensity {
    /// Rooms requested for a lattice with `lattice_cells` cells
    pub fn room_count(&self, lattice_cells: usize) -> usize {
        match *self {
            Self::Count(n) => n,
            Self::Density(d) => (lattice_cells as f32 * d).floor() as usize,
        }
    }
}

impl Default for RoomDensity {
    fn default() -> Self {
        Self::Density(0.01)
    }
}

/// Configuration for building a maze
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    /// Lattice cells along x
    pub rows: u32,
    /// Lattice cells along y
    pub cols: u32,
    /// Lattice cells along z
    pub height: u32,
    /// Clearance kept between positions and walls by `Maze::refine`
    pub wall_margin: f32,
    pub rooms: RoomDensity,
    /// Obstruction classes floating blocks are dealt into
    pub obstruction_classes: usize,
    /// Fixed seed for reproducible mazes; entropy-seeded when absent
    pub seed: Option<u64>,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            rows: 10,
            cols: 10,
            height: 10,
            wall_margin: 0.2,
            rooms: RoomDensity::default(),
            obstruction_classes: DEFAULT_OBSTRUCTION_CLASSES,
            seed: None,
        }
    }
}

impl MazeConfig {
    /// Cubic lattice of `size` cells per side with default settings
    pub fn cube(size: u32) -> Self {
        Self {
            rows: size,
            cols: size,
            height: size,
            ..Default::default()
        }
    }

    pub fn with_rooms(mut self, rooms: RoomDensity) -> Self {
        self.rooms = rooms;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Lattice extents as `(rows, cols, height)`
    pub fn lattice(&self) -> UVec3 {
        UVec3::new(self.rows, self.cols, self.height)
    }

    /// Rooms requested for this lattice
    pub fn room_count(&self) -> usize {
        let cells = self.rows as usize * self.cols as usize * self.height as usize;
        self.rooms.room_count(cells)
    }

    /// Reject configurations no maze can be built from.
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 || self.height == 0 {
            return Err(Error::Configuration(format!(
                "lattice dimensions must be positive, got {}x{}x{}",
                self.rows, self.cols, self.height
            )));
        }
        if !(self.wall_margin > 0.0 && self.wall_margin < 0.5) {
            return Err(Error::Configuration(format!(
                "wall margin must lie in (0, 0.5), got {}",
                self.wall_margin
            )));
        }
        if let RoomDensity::Density(d) = self.rooms {
            if !(d >= 0.0 && d.is_finite()) {
                return Err(Error::Configuration(format!("room density must be non-negative, got {}", d)));
            }
        }
        if self.obstruction_classes == 0 {
            return Err(Error::Configuration("at least one obstruction class is required".into()));
        }
        Ok(())
    }

    /// Parse a JSON config; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from file (sync)
    pub fn load_sync(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Save to file (sync)
    pub fn save_sync(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_room_density_counts() {
        assert_eq!(RoomDensity::Count(3).room_count(1000), 3);
        assert_eq!(RoomDensity::Density(0.01).room_count(1000), 10);
        assert_eq!(RoomDensity::Density(0.19).room_count(27), 5);
        assert_eq!(RoomDensity::Density(0.01).room_count(27), 0);
    }

    #[test]
    fn test_untagged_density_parsing() {
        let config = MazeConfig::from_json_str(r#"{"rows": 4, "rooms": 3}"#).expect("parse failed");
        assert_eq!(config.rooms, RoomDensity::Count(3));
        assert_eq!(config.rows, 4);
        assert_eq!(config.cols, 10);

        let config = MazeConfig::from_json_str(r#"{"rooms": 0.19, "seed": 42}"#).expect("parse failed");
        assert_eq!(config.rooms, RoomDensity::Density(0.19));
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(MazeConfig::default().validate().is_ok());

        let bad = [
            MazeConfig { rows: 0, ..Default::default() },
            MazeConfig { wall_margin: 0.5, ..Default::default() },
            MazeConfig { wall_margin: 0.0, ..Default::default() },
            MazeConfig { rooms: RoomDensity::Density(-0.1), ..Default::default() },
            MazeConfig { rooms: RoomDensity::Density(f32::NAN), ..Default::default() },
            MazeConfig { obstruction_classes: 0, ..Default::default() },
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(Error::Configuration(_))), "{:?}", config);
        }
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let path = temp_dir.path().join("configs").join("maze.json");

        let config = MazeConfig::cube(6).with_rooms(RoomDensity::Count(2)).with_seed(7);
        config.save_sync(&path).expect("save failed");
        let loaded = MazeConfig::load_sync(&path).expect("load failed");
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let path = temp_dir.path().join("broken.json");
        std::fs::write(&path, "{ rows: ").expect("write failed");
        assert!(matches!(MazeConfig::load_sync(&path), Err(Error::Json(_))));
        assert!(matches!(MazeConfig::load_sync(&temp_dir.path().join("missing.json")), Err(Error::Io(_))));
    }
}
