/// Enemy AI: one-step greedy decisions over a read-only grid.
///
/// Two modes, matching `EnemyState`:
///   1. **Chase**: step along the axis with the larger distance to the
///      character; if blocked, try the other axis; otherwise stay.
///   2. **Patrol**: step in a uniformly random enterable direction.
///
/// Both return the destination, or None to stay in place. The grid is a
/// snapshot and may be stale; the Coordinator re-validates every move.

use rand::seq::SliceRandom;
use rand::Rng;

use super::cell::Cell;
use super::entity::{Direction, Position};
use super::grid::Grid;

/// Can an enemy enter `pos`? Out of bounds, walls and other enemies block;
/// the character's cell does not (that is a catch).
pub fn enemy_can_enter(grid: &Grid, pos: Position) -> bool {
    grid.get(pos).map_or(false, Cell::admits_enemy)
}

// ── Chase mode ──

pub fn chase_step(grid: &Grid, from: Position, target: Position) -> Option<Position> {
    let ddx = target.x as i64 - from.x as i64;
    let ddy = target.y as i64 - from.y as i64;
    if ddx == 0 && ddy == 0 {
        return None;
    }

    let step_x = (ddx.signum() as i32, 0);
    let step_y = (0, ddy.signum() as i32);
    // Ties go vertical.
    let (primary, secondary) = if ddx.abs() > ddy.abs() {
        (step_x, step_y)
    } else {
        (step_y, step_x)
    };

    [primary, secondary]
        .into_iter()
        .filter(|&(dx, dy)| dx != 0 || dy != 0)
        .filter_map(|(dx, dy)| from.offset(dx, dy))
        .find(|&to| enemy_can_enter(grid, to))
}

// ── Patrol mode ──

/// Tries the four directions in a shuffled order and takes the first
/// enterable one. An enclosed enemy stays put.
pub fn patrol_step<R: Rng + ?Sized>(grid: &Grid, from: Position, rng: &mut R) -> Option<Position> {
    let mut dirs = Direction::ALL;
    dirs.shuffle(rng);
    dirs.into_iter()
        .filter_map(|d| {
            let (dx, dy) = d.delta();
            from.offset(dx, dy)
        })
        .find(|&to| enemy_can_enter(grid, to))
}
