/// The Coordinator: the single writer of the World.
///
/// Processing model:
///   1. Receive one proposal from the shared queue
///   2. Apply it completely (or reject it)
///   3. Publish a fresh snapshot for agents
///   4. Render synchronously
///   5. Stop once the game is won or lost
///
/// No proposal is ever interleaved with another, so a rendered frame always
/// shows exactly one fully applied mutation. Agents decide on snapshots that
/// may be stale, so every agent proposal is re-validated here.

use std::io;
use std::sync::Arc;

use tokio::sync::{oneshot, watch};
use tracing::{debug, info, trace};

use crate::domain::cell::Cell;
use crate::domain::entity::{CoinId, EnemyId, Position};
use crate::error::GameError;
use super::event::GameEvent;
use super::mover::move_character;
use super::proposal::{Proposal, ProposalReceiver};
use super::world::{Phase, Snapshot, World};

/// Render callback: invoked once at start and once after every proposal.
pub trait View: Send {
    fn draw(&mut self, world: &World) -> io::Result<()>;
}

pub type SnapshotReceiver = watch::Receiver<Arc<Snapshot>>;

pub struct Coordinator<V: View> {
    world: World,
    proposals: ProposalReceiver,
    snapshots: watch::Sender<Arc<Snapshot>>,
    view: V,
}

impl<V: View> Coordinator<V> {
    pub fn new(world: World, proposals: ProposalReceiver, view: V) -> (Self, SnapshotReceiver) {
        let (snapshots, rx) = watch::channel(Arc::new(world.snapshot()));
        (Coordinator { world, proposals, snapshots, view }, rx)
    }

    #[cfg(test)]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Service the queue until the game ends or every producer is gone.
    /// Returns the final phase.
    pub async fn run(mut self) -> Result<Phase, GameError> {
        self.view.draw(&self.world)?;

        while let Some(proposal) = self.proposals.recv().await {
            self.apply(proposal);
            self.publish();
            self.view.draw(&self.world)?;

            if self.world.phase.is_over() {
                info!(phase = ?self.world.phase, coins = self.world.coins_collected, "game over");
                break;
            }
        }

        Ok(self.world.phase)
    }

    /// Apply one proposal. Nothing is applied once the game is over.
    pub fn apply(&mut self, proposal: Proposal) -> Vec<GameEvent> {
        let mut events = vec![];
        if self.world.phase.is_over() {
            trace!(?proposal, "dropped after game over");
            return events;
        }

        match proposal {
            Proposal::MoveCharacter { dx, dy } => {
                move_character(&mut self.world, dx, dy, &mut events);
            }
            Proposal::MoveEnemy { id, from, to, covered, reply } => {
                self.move_enemy(id, from, to, covered, reply, &mut events);
            }
            Proposal::RelocateCoin { id, from, to, reply } => {
                self.relocate_coin(id, from, to, reply, &mut events);
            }
            Proposal::ToggleButtons => self.toggle_buttons(&mut events),
            Proposal::PlayerCaught { at } => self.player_caught(at, &mut events),
        }

        for event in &events {
            match event {
                GameEvent::Won | GameEvent::Lost => info!(?event, status = %self.world.status, "terminal transition"),
                GameEvent::MoveRejected { .. } | GameEvent::EnemyBlocked { .. } => debug!(?event, "rejected"),
                _ => trace!(?event, "applied"),
            }
        }
        events
    }

    fn publish(&self) {
        self.snapshots.send_replace(Arc::new(self.world.snapshot()));
    }

    // ══════════════════════════════════════════════════════════════
    // Apply: one function per proposal kind
    // ══════════════════════════════════════════════════════════════

    /// Same rotation as the character, with the enemy's own memory.
    /// Dropping `reply` tells the enemy it did not move.
    fn move_enemy(
        &mut self,
        id: EnemyId,
        from: Position,
        to: Position,
        covered: Cell,
        reply: oneshot::Sender<Cell>,
        events: &mut Vec<GameEvent>,
    ) {
        if self.world.grid.get(from) != Some(Cell::Enemy) || from.manhattan(to) != 1 {
            events.push(GameEvent::EnemyBlocked { id, to });
            return;
        }

        match self.world.grid.get(to) {
            Some(Cell::Character) => self.world.lose(events),
            Some(cell) if cell.admits_enemy() => {
                let displaced = self.world.rotate(Cell::Enemy, from, to, covered);
                let _ = reply.send(displaced);
                events.push(GameEvent::EnemyMoved { id, to });
            }
            _ => events.push(GameEvent::EnemyBlocked { id, to }),
        }
    }

    /// Move a live coin to a cell that is still Empty. If something covers
    /// the coin right now, only the registry moves; the cover's memory is
    /// re-resolved when it leaves.
    fn relocate_coin(
        &mut self,
        id: CoinId,
        from: Position,
        to: Position,
        reply: oneshot::Sender<bool>,
        events: &mut Vec<GameEvent>,
    ) {
        let Some(slot) = self.world.coins.iter_mut().find(|c| c.id == id && c.pos == from) else {
            let _ = reply.send(false);
            return;
        };
        if self.world.grid.get(to) != Some(Cell::Empty) {
            let _ = reply.send(false);
            return;
        }

        slot.pos = to;
        if self.world.grid.get(from) == Some(Cell::Coin) {
            self.world.grid.set(from, Cell::Empty);
        }
        self.world.grid.set(to, Cell::Coin);
        let _ = reply.send(true);
        events.push(GameEvent::CoinRelocated { id, to });
    }

    /// Flip every button. Only cells currently showing a button are redrawn;
    /// a covered button is re-resolved when its cover moves away.
    fn toggle_buttons(&mut self, events: &mut Vec<GameEvent>) {
        let grid = &mut self.world.grid;
        for button in &mut self.world.buttons {
            button.engaged = !button.engaged;
            if grid.get(button.pos).map_or(false, Cell::is_button) {
                grid.set(button.pos, Cell::button(button.engaged));
            }
        }
        if let Some(first) = self.world.buttons.first() {
            events.push(GameEvent::ButtonsToggled { engaged: first.engaged });
        }
    }

    /// Confirmed against the live character position.
    fn player_caught(&mut self, at: Position, events: &mut Vec<GameEvent>) {
        if self.world.character == at {
            self.world.lose(events);
        } else {
            debug!(x = at.x, y = at.y, "stale catch ignored");
        }
    }
}
