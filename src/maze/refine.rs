//! Wall-margin collision refinement for continuous positions

use super::grid::{AXIS_DIRECTIONS, OccupancyGrid};
use crate::core::types::Vec3;

/// Corrections applied before refinement settles for a best-effort position.
///
/// Each correction fixes one violated direction, so a well-formed maze needs
/// at most six.
pub const MAX_REFINE_ITERATIONS: usize = 12;

/// Corrected positions sit this factor of the margin away from the wall face
const CLEARANCE_FACTOR: f32 = 1.01;

fn cell_of(position: Vec3) -> glam::IVec3 {
    position.floor().as_ivec3()
}

/// Push `position` out of every wall it is within `margin` of.
///
/// Directions are checked in order x+, x-, y+, y-, z+, z-. When the cell
/// `margin` away in a direction is a wall (cells outside the grid count as
/// walls), the position is snapped back along that axis to `1.01·margin`
/// from the wall face and checking restarts from x+.
///
/// Returns the refined position and whether any correction happened. If the
/// position is still in contact after `MAX_REFINE_ITERATIONS` corrections
/// the last position is returned with `collided = true`.
pub fn refine_position(grid: &OccupancyGrid, position: Vec3, margin: f32) -> (Vec3, bool) {
    let mut position = position;
    let mut collided = false;

    for _ in 0..MAX_REFINE_ITERATIONS {
        match correction(grid, position, margin) {
            Some(corrected) => {
                position = corrected;
                collided = true;
            }
            None => return (position, collided),
        }
    }

    if correction(grid, position, margin).is_some() {
        log::warn!(
            "Position refinement did not settle after {} corrections at {:?}",
            MAX_REFINE_ITERATIONS, position
        );
    }
    (position, collided)
}

/// First violated direction's corrected position, if any
fn correction(grid: &OccupancyGrid, position: Vec3, margin: f32) -> Option<Vec3> {
    for dir in AXIS_DIRECTIONS {
        let axis = if dir.x != 0 { 0 } else if dir.y != 0 { 1 } else { 2 };
        let probe = position + dir.as_vec3() * margin;
        if grid.is_open(cell_of(probe)) {
            continue;
        }

        let mut corrected = position;
        corrected[axis] = if dir[axis] > 0 {
            probe[axis].floor() - margin * CLEARANCE_FACTOR
        } else {
            position[axis].floor() + margin * CLEARANCE_FACTOR
        };
        return Some(corrected);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::generator::generate;
    use glam::IVec3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Straight corridor along x through y = 1, z = 1
    fn corridor() -> OccupancyGrid {
        let mut grid = OccupancyGrid::for_lattice(3, 1, 1);
        for x in 1..6 {
            grid.set_open(IVec3::new(x, 1, 1), true);
        }
        grid
    }

    #[test]
    fn test_clear_position_unchanged() {
        let grid = corridor();
        let p = Vec3::new(2.5, 1.5, 1.5);
        assert_eq!(refine_position(&grid, p, 0.2), (p, false));
    }

    #[test]
    fn test_pushed_off_side_wall() {
        let grid = corridor();
        let (p, collided) = refine_position(&grid, Vec3::new(2.5, 1.9, 1.5), 0.2);
        assert!(collided);
        assert!((p.y - (2.0 - 0.2 * 1.01)).abs() < 1e-5);
        assert_eq!(p.x, 2.5);
        assert_eq!(p.z, 1.5);
    }

    #[test]
    fn test_pushed_off_lower_wall() {
        let grid = corridor();
        let (p, collided) = refine_position(&grid, Vec3::new(3.5, 1.5, 1.1), 0.2);
        assert!(collided);
        assert!((p.z - (1.0 + 0.2 * 1.01)).abs() < 1e-5);
    }

    #[test]
    fn test_corner_corrects_every_axis() {
        let grid = corridor();
        let (p, collided) = refine_position(&grid, Vec3::new(5.95, 1.05, 1.95), 0.2);
        assert!(collided);
        assert_eq!(refine_position(&grid, p, 0.2), (p, false));
        assert!(p.x < 5.8 && p.y > 1.2 && p.z < 1.8);
    }

    #[test]
    fn test_refinement_is_idempotent() {
        let mut rng = StdRng::seed_from_u64(21);
        let grid = generate(4, 4, 4, &mut rng).expect("generation failed");
        let open: Vec<IVec3> = grid.cells().iter().filter(|&(_, v)| v == 1).map(|(c, _)| c).collect();

        for _ in 0..500 {
            let cell = open[rng.gen_range(0..open.len())];
            let jitter = Vec3::new(rng.r#gen(), rng.r#gen(), rng.r#gen()) * 0.9 + Vec3::splat(0.05);
            let margin = rng.gen_range(0.05..0.45);
            let (once, _) = refine_position(&grid, cell.as_vec3() + jitter, margin);
            let (twice, collided) = refine_position(&grid, once, margin);
            assert_eq!(once, twice);
            assert!(!collided);
        }
    }

    #[test]
    fn test_enclosed_position_gives_up_with_collision() {
        let grid = OccupancyGrid::for_lattice(1, 1, 1);
        let (_, collided) = refine_position(&grid, Vec3::splat(1.5), 0.2);
        assert!(collided);
    }
}
