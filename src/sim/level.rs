/// Map loader.
///
/// ## Format
///   Plain text, one grid row per line. Rows may differ in length.
///
/// ## Legend:
///   '☺' = Character spawn (first one wins)   '▤' = Wall
///   '♣' = Vegetation (walkable)               '☠' = Enemy spawn
///   '$' = Coin spawn                          '○' = Button (starts disengaged)
///   ' ' = Empty                               anything else = Empty
///
/// Loading also fills the World's button and coin registries. Coin stop
/// signals and enemy mailboxes are attached later, when agents spawn.

use std::path::Path;

use tracing::warn;

use crate::domain::cell::Cell;
use crate::domain::entity::{Button, Position};
use crate::domain::grid::Grid;
use crate::error::GameError;
use super::world::{CoinSlot, World};

/// Read and parse a map file. Missing/unreadable files are fatal.
pub fn load_map(path: &Path) -> Result<World, GameError> {
    let text = std::fs::read_to_string(path).map_err(|source| GameError::MapRead {
        path: path.to_path_buf(),
        source,
    })?;
    let lines: Vec<&str> = text.lines().collect();
    parse_map(&lines).ok_or_else(|| GameError::NoCharacter { path: path.to_path_buf() })
}

/// Build a World from text rows. None when there is no character spawn.
pub fn parse_map<S: AsRef<str>>(lines: &[S]) -> Option<World> {
    let mut grid = Grid::from_rows(lines);

    let spawns = grid.positions_of(Cell::Character);
    let (&spawn, extra) = spawns.split_first()?;
    for &pos in extra {
        warn!(x = pos.x, y = pos.y, "ignoring extra character spawn");
        grid.set(pos, Cell::Empty);
    }

    let mut world = World::new(grid, spawn);
    world.buttons = world
        .grid
        .positions_of(Cell::ButtonDisengaged)
        .into_iter()
        .map(Button::new)
        .collect();
    world.coins = world
        .grid
        .positions_of(Cell::Coin)
        .into_iter()
        .enumerate()
        .map(|(id, pos)| CoinSlot { id, pos, stop: None })
        .collect();

    Some(world)
}

/// Enemy spawn positions, row-major.
pub fn enemy_spawns(world: &World) -> Vec<Position> {
    world.grid.positions_of(Cell::Enemy)
}
