//! Partition of open non-room space into connected regions

use std::collections::HashMap;

use super::grid::{Grid3, OccupancyGrid, PATH};
use super::rooms::Room;
use crate::core::types::IVec3;

/// Classification of one fine-grid cell in the region map
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegionLabel {
    Wall,
    /// Open cell not yet assigned to a region
    Unvisited,
    /// Interior of a carved room
    Room,
    /// Selected floating-block cell
    Floating,
    /// Member of the connected region with this id (ids start at 1)
    Region(u32),
}

impl RegionLabel {
    /// Integer encoding shared with renderers:
    /// `0` wall, `-1` unvisited, `-2` room, `-3` floating, `>0` region id.
    pub fn code(self) -> i64 {
        match self {
            Self::Wall => 0,
            Self::Unvisited => -1,
            Self::Room => -2,
            Self::Floating => -3,
            Self::Region(id) => id as i64,
        }
    }
}

/// Region label for every fine-grid cell
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionMap {
    labels: Grid3<RegionLabel>,
    region_count: u32,
}

impl RegionMap {
    /// Label walls and room interiors, then flood-fill the remaining open
    /// cells into 6-connected regions numbered 1, 2, … in scan order.
    pub fn partition(grid: &OccupancyGrid, rooms: &[Room]) -> Self {
        let mut labels = grid.cells().map(|v| {
            if v == PATH { RegionLabel::Unvisited } else { RegionLabel::Wall }
        });
        for room in rooms {
            for cell in room.cells() {
                labels.set(cell, RegionLabel::Room);
            }
        }

        let mut region_count = 0;
        for coord in labels.coords() {
            if labels.get(coord) != Some(RegionLabel::Unvisited) {
                continue;
            }
            region_count += 1;
            let fill = labels.flood_from(coord, |_, label| label == RegionLabel::Unvisited);
            for cell in fill {
                labels.set(cell, RegionLabel::Region(region_count));
            }
        }

        log::debug!("Partitioned open space into {} regions", region_count);
        Self { labels, region_count }
    }

    /// Wrap prepared labels; the region count is the largest region id.
    #[cfg(test)]
    pub(crate) fn from_labels(labels: Grid3<RegionLabel>) -> Self {
        let region_count = labels
            .iter()
            .filter_map(|(_, l)| match l {
                RegionLabel::Region(id) => Some(id),
                _ => None,
            })
            .max()
            .unwrap_or(0);
        Self { labels, region_count }
    }

    /// Number of regions found by the partition
    pub fn region_count(&self) -> u32 {
        self.region_count
    }

    pub fn label(&self, coord: IVec3) -> Option<RegionLabel> {
        self.labels.get(coord)
    }

    pub(crate) fn set_label(&mut self, coord: IVec3, label: RegionLabel) {
        self.labels.set(coord, label);
    }

    pub fn labels(&self) -> &Grid3<RegionLabel> {
        &self.labels
    }

    /// Cells currently labelled with region `id`
    pub fn cells_of(&self, id: u32) -> Vec<IVec3> {
        self.labels
            .iter()
            .filter(|&(_, l)| l == RegionLabel::Region(id))
            .map(|(c, _)| c)
            .collect()
    }

    /// Members of every region, keyed by region id
    pub fn members(&self) -> HashMap<u32, Vec<IVec3>> {
        let mut members: HashMap<u32, Vec<IVec3>> = HashMap::new();
        for (coord, label) in self.labels.iter() {
            if let RegionLabel::Region(id) = label {
                members.entry(id).or_default().push(coord);
            }
        }
        members
    }
}
