/// Mutation proposals: the only way anything outside the Coordinator can
/// change the World.
///
/// Every producer (enemy, coin, button supervisor, input) holds a clone of
/// one unbounded sender, so enqueueing never blocks. Proposals that need an
/// answer carry a oneshot; the Coordinator drops it to mean "rejected".

use tokio::sync::{mpsc, oneshot};

use crate::domain::cell::Cell;
use crate::domain::entity::{CoinId, EnemyId, Position};

#[derive(Debug)]
pub enum Proposal {
    /// Move the character by a unit delta from wherever it is now.
    MoveCharacter { dx: i32, dy: i32 },
    /// Move an enemy one cell. `covered` is the enemy's last-displaced memory
    /// for `from`; the reply carries its new memory (the pre-move content of
    /// `to`) when the move is applied.
    MoveEnemy {
        id: EnemyId,
        from: Position,
        to: Position,
        covered: Cell,
        reply: oneshot::Sender<Cell>,
    },
    /// Move a live coin to an Empty cell. Replies `true` once applied.
    RelocateCoin {
        id: CoinId,
        from: Position,
        to: Position,
        reply: oneshot::Sender<bool>,
    },
    /// Flip every button in lockstep.
    ToggleButtons,
    /// An enemy decided to step onto the character at `at`.
    PlayerCaught { at: Position },
}

pub type ProposalSender = mpsc::UnboundedSender<Proposal>;
pub type ProposalReceiver = mpsc::UnboundedReceiver<Proposal>;

pub fn queue() -> (ProposalSender, ProposalReceiver) {
    mpsc::unbounded_channel()
}
