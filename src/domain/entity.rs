/// Entities: positions, directions, enemy behavior state, buttons.
/// Agents own their runtime state; the World keeps only what the
/// Coordinator needs to apply mutations.

/// Grid coordinate. `y` is the row, `x` the column within that row.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Position { x, y }
    }

    /// Shift by a signed delta. None if either coordinate would go negative.
    pub fn offset(self, dx: i32, dy: i32) -> Option<Position> {
        let nx = self.x as i64 + dx as i64;
        let ny = self.y as i64 + dy as i64;
        if nx < 0 || ny < 0 {
            return None;
        }
        Some(Position::new(nx as usize, ny as usize))
    }

    pub fn manhattan(self, other: Position) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// One of the four unit moves.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Enemy behavior state machine.
///
///   Patrol ──coin collected──▶ Chase
///   Chase  ──button engaged──▶ Patrol
///
/// Both signals are idempotent in either state.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum EnemyState {
    #[default]
    Patrol,
    Chase,
}

impl EnemyState {
    /// A button was stepped on while engaged.
    pub fn on_button(self) -> EnemyState {
        EnemyState::Patrol
    }

    /// Any coin was collected.
    pub fn on_coin(self) -> EnemyState {
        EnemyState::Chase
    }
}

pub type EnemyId = usize;
pub type CoinId = usize;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Button {
    pub pos: Position,
    pub engaged: bool,
}

impl Button {
    pub fn new(pos: Position) -> Self {
        Button { pos, engaged: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_rejects_negative() {
        let p = Position::new(0, 3);
        assert_eq!(p.offset(-1, 0), None);
        assert_eq!(p.offset(0, -4), None);
        assert_eq!(p.offset(2, -1), Some(Position::new(2, 2)));
    }

    #[test]
    fn direction_deltas_are_unit() {
        for d in Direction::ALL {
            let (dx, dy) = d.delta();
            assert_eq!(dx.abs() + dy.abs(), 1);
        }
    }

    #[test]
    fn signals_drive_state() {
        let s = EnemyState::default();
        assert_eq!(s, EnemyState::Patrol);
        assert_eq!(s.on_button(), EnemyState::Patrol);
        assert_eq!(s.on_coin(), EnemyState::Chase);
        assert_eq!(s.on_coin().on_coin(), EnemyState::Chase);
        assert_eq!(s.on_coin().on_button(), EnemyState::Patrol);
    }

    #[test]
    fn manhattan_distance() {
        assert_eq!(Position::new(1, 1).manhattan(Position::new(4, 3)), 5);
        assert_eq!(Position::new(4, 3).manhattan(Position::new(1, 1)), 5);
    }
}
