/// World: the complete state of a running game.
///
/// ## Ownership
///
/// The Coordinator task owns the only `World` and is the only writer.
/// Agents never see it: after each applied proposal the Coordinator
/// publishes an immutable `Snapshot` (grid copy + character position +
/// phase) that agents read for their decisions.
///
/// ## Last-displaced memory
///
/// A moving entity temporarily covers the cell it stands on. When it leaves,
/// the covered cell is restored from memory. Two kinds can change underneath
/// a mover while it is covered, so memory is re-resolved before restore:
///   - a Button may have toggled since it was captured
///   - a Coin may have relocated away (only the registry moved)

use tokio::sync::{mpsc, oneshot};

use crate::domain::cell::Cell;
use crate::domain::entity::{Button, CoinId, Position};
use crate::domain::grid::Grid;
use super::event::GameEvent;

/// Coins needed to win.
pub const COINS_TO_WIN: u32 = 5;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    Won,
    Lost,
}

impl Phase {
    pub fn is_over(self) -> bool {
        self != Phase::Playing
    }
}

/// A live coin as the Coordinator knows it.
#[derive(Debug)]
pub struct CoinSlot {
    pub id: CoinId,
    pub pos: Position,
    /// Fires once on pickup to end the coin's task.
    pub stop: Option<oneshot::Sender<()>>,
}

/// One enemy's pair of single-slot notification channels.
#[derive(Clone, Debug)]
pub struct Mailbox {
    pub button: mpsc::Sender<()>,
    pub coin: mpsc::Sender<()>,
}

/// Which of an enemy's two mailboxes to signal.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Signal {
    StopChasing,
    StartChasing,
}

/// Immutable view handed to agents and the input layer.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub grid: Grid,
    pub character: Position,
    pub phase: Phase,
}

pub struct World {
    // ── Terrain ──
    pub grid: Grid,

    // ── Character ──
    pub character: Position,
    /// What the character is standing on.
    pub covered: Cell,

    // ── Game tracking ──
    pub coins_collected: u32,
    pub status: String,
    pub phase: Phase,

    // ── Registries (filled by the agent scan) ──
    pub buttons: Vec<Button>,
    pub coins: Vec<CoinSlot>,
    pub mailboxes: Vec<Mailbox>,
}

// ── Construction ──

impl World {
    pub fn new(grid: Grid, character: Position) -> Self {
        World {
            grid,
            character,
            covered: Cell::Empty,
            coins_collected: 0,
            status: String::new(),
            phase: Phase::Playing,
            buttons: vec![],
            coins: vec![],
            mailboxes: vec![],
        }
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = msg.into();
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            grid: self.grid.clone(),
            character: self.character,
            phase: self.phase,
        }
    }
}

// ── Registry queries ──

impl World {
    pub fn button_at(&self, pos: Position) -> Option<&Button> {
        self.buttons.iter().find(|b| b.pos == pos)
    }

    pub fn coin_index_at(&self, pos: Position) -> Option<usize> {
        self.coins.iter().position(|c| c.pos == pos)
    }

    /// Best-effort broadcast: a full or closed mailbox drops the signal.
    pub fn broadcast(&self, signal: Signal) {
        for mailbox in &self.mailboxes {
            let slot = match signal {
                Signal::StopChasing => &mailbox.button,
                Signal::StartChasing => &mailbox.coin,
            };
            let _ = slot.try_send(());
        }
    }
}

// ── Movement ──

impl World {
    /// Bring a stale last-displaced memory for `pos` up to date.
    pub fn resolve_covered(&self, pos: Position, remembered: Cell) -> Cell {
        match remembered {
            Cell::ButtonEngaged | Cell::ButtonDisengaged => match self.button_at(pos) {
                Some(b) => Cell::button(b.engaged),
                None => remembered,
            },
            Cell::Coin if self.coin_index_at(pos).is_none() => Cell::Empty,
            other => other,
        }
    }

    /// Three-cell rotation: `from` gets the (re-resolved) memory back,
    /// `to` gets `mover`. Returns the pre-move content of `to`, which is
    /// the mover's new memory.
    pub fn rotate(&mut self, mover: Cell, from: Position, to: Position, remembered: Cell) -> Cell {
        let restored = self.resolve_covered(from, remembered);
        let displaced = self.grid.get(to).unwrap_or(Cell::Empty);
        self.grid.set(from, restored);
        self.grid.set(to, mover);
        displaced
    }
}

// ── Terminal transitions ──
//
// Won and Lost are absorbing; each fires at most once per game.

impl World {
    pub fn win(&mut self, events: &mut Vec<GameEvent>) {
        if self.phase.is_over() { return; }
        self.phase = Phase::Won;
        self.set_status(format!("All {COINS_TO_WIN} coins collected. You win!"));
        events.push(GameEvent::Won);
    }

    pub fn lose(&mut self, events: &mut Vec<GameEvent>) {
        if self.phase.is_over() { return; }
        self.phase = Phase::Lost;
        self.set_status("Caught by an enemy. Game over!");
        events.push(GameEvent::Lost);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_from(rows: &[&str]) -> World {
        let grid = Grid::from_rows(rows);
        let character = grid.positions_of(Cell::Character)[0];
        World::new(grid, character)
    }

    #[test]
    fn rotate_restores_memory_and_returns_displaced() {
        let mut w = world_from(&["☺♣ "]);
        let displaced = w.rotate(Cell::Character, Position::new(0, 0), Position::new(1, 0), Cell::Empty);
        assert_eq!(displaced, Cell::Vegetation);
        assert_eq!(w.grid.get(Position::new(0, 0)), Some(Cell::Empty));
        assert_eq!(w.grid.get(Position::new(1, 0)), Some(Cell::Character));

        let displaced = w.rotate(Cell::Character, Position::new(1, 0), Position::new(2, 0), displaced);
        assert_eq!(displaced, Cell::Empty);
        assert_eq!(w.grid.get(Position::new(1, 0)), Some(Cell::Vegetation));
    }

    #[test]
    fn stale_button_memory_takes_current_state() {
        let mut w = world_from(&["☺○"]);
        let pos = Position::new(1, 0);
        w.buttons.push(Button { pos, engaged: true });
        assert_eq!(w.resolve_covered(pos, Cell::ButtonDisengaged), Cell::ButtonEngaged);
        w.buttons[0].engaged = false;
        assert_eq!(w.resolve_covered(pos, Cell::ButtonEngaged), Cell::ButtonDisengaged);
    }

    #[test]
    fn coin_memory_without_live_coin_is_empty() {
        let mut w = world_from(&["☺$"]);
        let pos = Position::new(1, 0);
        assert_eq!(w.resolve_covered(pos, Cell::Coin), Cell::Empty);
        w.coins.push(CoinSlot { id: 0, pos, stop: None });
        assert_eq!(w.resolve_covered(pos, Cell::Coin), Cell::Coin);
    }

    #[test]
    fn other_memories_pass_through() {
        let w = world_from(&["☺"]);
        for cell in [Cell::Empty, Cell::Vegetation, Cell::Wall] {
            assert_eq!(w.resolve_covered(Position::new(0, 0), cell), cell);
        }
    }

    #[test]
    fn broadcast_drops_when_mailbox_full() {
        let mut w = world_from(&["☺"]);
        let (button_tx, mut button_rx) = mpsc::channel(1);
        let (coin_tx, mut coin_rx) = mpsc::channel(1);
        w.mailboxes.push(Mailbox { button: button_tx, coin: coin_tx });

        w.broadcast(Signal::StartChasing);
        w.broadcast(Signal::StartChasing);
        assert!(coin_rx.try_recv().is_ok());
        assert!(coin_rx.try_recv().is_err());
        assert!(button_rx.try_recv().is_err());

        w.broadcast(Signal::StopChasing);
        assert!(button_rx.try_recv().is_ok());
    }

    #[test]
    fn terminal_transition_fires_once() {
        let mut w = world_from(&["☺"]);
        let mut events = vec![];
        w.lose(&mut events);
        w.lose(&mut events);
        w.win(&mut events);
        assert_eq!(events, vec![GameEvent::Lost]);
        assert_eq!(w.phase, Phase::Lost);
    }

    #[test]
    fn broadcast_ignores_closed_mailbox() {
        let mut w = world_from(&["☺"]);
        let (button_tx, button_rx) = mpsc::channel(1);
        let (coin_tx, coin_rx) = mpsc::channel(1);
        drop(button_rx);
        drop(coin_rx);
        w.mailboxes.push(Mailbox { button: button_tx, coin: coin_tx });
        w.broadcast(Signal::StopChasing);
        w.broadcast(Signal::StartChasing);
    }
}
