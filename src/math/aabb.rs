//! Axis-aligned bounding box in fine-grid space

use crate::core::types::{IVec3, Vec3};

/// Axis-aligned bounding box defined by min and max corners
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create AABB from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create the AABB covering a block of whole grid cells.
    ///
    /// Cell `c` occupies `[c, c + 1)` on every axis, so a block of `size`
    /// cells starting at `min_cell` spans `[min_cell, min_cell + size]`.
    pub fn from_cells(min_cell: IVec3, size: u32) -> Self {
        let min = min_cell.as_vec3();
        Self::new(min, min + Vec3::splat(size as f32))
    }

    /// Get center point
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Check if point is inside AABB (boundaries included)
    pub fn contains_point(&self, p: Vec3) -> bool {
        p.x >= self.min.x && p.x <= self.max.x &&
        p.y >= self.min.y && p.y <= self.max.y &&
        p.z >= self.min.z && p.z <= self.max.z
    }

    /// Check if the whole unit cell at `cell` lies inside the AABB
    pub fn contains_cell(&self, cell: IVec3) -> bool {
        let lo = cell.as_vec3();
        let hi = lo + Vec3::ONE;
        lo.cmpge(self.min).all() && hi.cmple(self.max).all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cells_and_accessors() {
        let aabb = Aabb::from_cells(IVec3::new(1, 1, 1), 3);
        assert_eq!(aabb.min, Vec3::ONE);
        assert_eq!(aabb.max, Vec3::splat(4.0));
        assert_eq!(aabb.center(), Vec3::splat(2.5));
        assert_eq!(aabb, Aabb::new(Vec3::ONE, Vec3::splat(4.0)));
    }

    #[test]
    fn test_contains_point() {
        let aabb = Aabb::from_cells(IVec3::new(3, 5, 1), 3);
        assert!(aabb.contains_point(Vec3::new(4.5, 6.5, 2.5)));
        // Faces count as inside
        assert!(aabb.contains_point(Vec3::new(3.0, 8.0, 1.0)));
        assert!(!aabb.contains_point(Vec3::new(2.9, 6.0, 2.0)));
    }

    #[test]
    fn test_contains_cell() {
        let aabb = Aabb::from_cells(IVec3::new(1, 1, 1), 3);
        assert!(aabb.contains_cell(IVec3::new(1, 1, 1)));
        assert!(aabb.contains_cell(IVec3::new(3, 3, 3)));
        assert!(!aabb.contains_cell(IVec3::new(4, 3, 3)));
        assert!(!aabb.contains_cell(IVec3::new(0, 1, 1)));
    }
}
