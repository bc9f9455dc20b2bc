/// Cell kinds and their properties.
/// Glyph and passability are computed from the kind, never stored,
/// so cell semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Cell {
    Character,
    Wall,       // Solid
    Vegetation, // Decoration, walkable
    Empty,
    Enemy,
    Coin,             // Pickup target, relocates on its own
    ButtonEngaged,    // Stepping on it calls off the chase
    ButtonDisengaged,
}

impl Cell {
    pub const ALL: [Cell; 8] = [
        Cell::Character,
        Cell::Wall,
        Cell::Vegetation,
        Cell::Empty,
        Cell::Enemy,
        Cell::Coin,
        Cell::ButtonEngaged,
        Cell::ButtonDisengaged,
    ];

    /// Map-file and on-screen symbol.
    pub fn glyph(self) -> char {
        match self {
            Cell::Character => '☺',
            Cell::Wall => '▤',
            Cell::Vegetation => '♣',
            Cell::Empty => ' ',
            Cell::Enemy => '☠',
            Cell::Coin => '$',
            Cell::ButtonEngaged => '●',
            Cell::ButtonDisengaged => '○',
        }
    }

    /// Decode a map glyph. Anything unrecognized is Empty.
    /// An engaged button never appears in a map file: buttons spawn disengaged.
    pub fn from_glyph(ch: char) -> Cell {
        match ch {
            '☺' => Cell::Character,
            '▤' => Cell::Wall,
            '♣' => Cell::Vegetation,
            '☠' => Cell::Enemy,
            '$' => Cell::Coin,
            '○' => Cell::ButtonDisengaged,
            _ => Cell::Empty,
        }
    }

    /// Does this cell block passage?
    pub fn is_blocking(self) -> bool {
        matches!(self, Cell::Wall | Cell::Character | Cell::Enemy)
    }

    pub fn is_button(self) -> bool {
        matches!(self, Cell::ButtonEngaged | Cell::ButtonDisengaged)
    }

    /// Can the character step here? Enemies are enterable (and fatal).
    pub fn admits_character(self) -> bool {
        !self.is_blocking() || self == Cell::Enemy
    }

    /// Can an enemy step here? The character's cell is enterable (a catch).
    pub fn admits_enemy(self) -> bool {
        !self.is_blocking() || self == Cell::Character
    }

    pub fn button(engaged: bool) -> Cell {
        if engaged { Cell::ButtonEngaged } else { Cell::ButtonDisengaged }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Empty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyphs_round_trip_except_engaged_button() {
        for cell in Cell::ALL {
            let decoded = Cell::from_glyph(cell.glyph());
            if cell == Cell::ButtonEngaged {
                assert_eq!(decoded, Cell::Empty);
            } else {
                assert_eq!(decoded, cell, "{cell:?}");
            }
        }
    }

    #[test]
    fn unknown_glyph_is_empty() {
        assert_eq!(Cell::from_glyph('x'), Cell::Empty);
        assert_eq!(Cell::from_glyph('#'), Cell::Empty);
    }

    #[test]
    fn only_wall_and_actors_block() {
        let blocking: Vec<Cell> = Cell::ALL.into_iter().filter(|c| c.is_blocking()).collect();
        assert_eq!(blocking, vec![Cell::Character, Cell::Wall, Cell::Enemy]);
    }

    #[test]
    fn actors_may_enter_each_other() {
        assert!(Cell::Enemy.admits_character());
        assert!(Cell::Character.admits_enemy());
        assert!(!Cell::Enemy.admits_enemy());
        assert!(!Cell::Wall.admits_character());
        assert!(!Cell::Wall.admits_enemy());
        assert!(Cell::ButtonEngaged.admits_enemy());
        assert!(Cell::Vegetation.admits_character());
    }
}
