/// Grid: ordered rows of cells. Rows may differ in length (ragged maps);
/// a column past the end of its row is out of bounds, not Empty.
///
/// The shape is fixed at load. Only the Coordinator holds a mutable Grid;
/// everyone else reads a copy from a published snapshot.

use super::cell::Cell;
use super::entity::Position;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Grid { rows }
    }

    /// Build from text rows using map glyphs.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Self {
        Grid::new(
            rows.iter()
                .map(|r| r.as_ref().chars().map(Cell::from_glyph).collect())
                .collect(),
        )
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn row_len(&self, y: usize) -> usize {
        self.rows.get(y).map_or(0, Vec::len)
    }

    /// Widest row; used for layout only.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    #[inline]
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x < self.row_len(pos.y)
    }

    /// Cell at `pos`, or None when out of bounds.
    #[inline]
    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.rows.get(pos.y).and_then(|r| r.get(pos.x)).copied()
    }

    /// Overwrite an in-bounds cell. Out-of-bounds writes are ignored.
    #[inline]
    pub fn set(&mut self, pos: Position, cell: Cell) {
        if let Some(slot) = self.rows.get_mut(pos.y).and_then(|r| r.get_mut(pos.x)) {
            *slot = cell;
        }
    }

    /// All positions holding `kind`, row-major.
    pub fn positions_of(&self, kind: Cell) -> Vec<Position> {
        let mut found = vec![];
        for (y, row) in self.rows.iter().enumerate() {
            for (x, &cell) in row.iter().enumerate() {
                if cell == kind {
                    found.push(Position::new(x, y));
                }
            }
        }
        found
    }

    pub fn count(&self, kind: Cell) -> usize {
        self.rows.iter().flatten().filter(|&&c| c == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ragged_rows_bound_per_row() {
        let g = Grid::from_rows(&["▤▤▤▤", "▤", ""]);
        assert_eq!(g.height(), 3);
        assert_eq!(g.width(), 4);
        assert!(g.in_bounds(Position::new(3, 0)));
        assert!(!g.in_bounds(Position::new(1, 1)));
        assert!(!g.in_bounds(Position::new(0, 2)));
        assert!(!g.in_bounds(Position::new(0, 3)));
        assert_eq!(g.get(Position::new(1, 1)), None);
    }

    #[test]
    fn set_ignores_out_of_bounds() {
        let mut g = Grid::from_rows(&["  "]);
        g.set(Position::new(5, 0), Cell::Wall);
        g.set(Position::new(0, 9), Cell::Wall);
        assert_eq!(g.count(Cell::Wall), 0);
        g.set(Position::new(1, 0), Cell::Wall);
        assert_eq!(g.get(Position::new(1, 0)), Some(Cell::Wall));
    }

    #[test]
    fn positions_are_row_major() {
        let g = Grid::from_rows(&[" $ $", "$"]);
        assert_eq!(
            g.positions_of(Cell::Coin),
            vec![Position::new(1, 0), Position::new(3, 0), Position::new(0, 1)]
        );
        assert_eq!(g.count(Cell::Coin), 3);
    }
}
