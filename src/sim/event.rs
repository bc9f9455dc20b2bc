/// Events emitted while applying one proposal.
/// The Coordinator logs these; tests assert on them.

use crate::domain::entity::{CoinId, EnemyId, Position};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    CharacterMoved { to: Position },
    MoveRejected { to: Option<Position> },
    CoinCollected { id: CoinId, total: u32 },
    ChaseStarted,
    ChaseStopped,
    EnemyMoved { id: EnemyId, to: Position },
    EnemyBlocked { id: EnemyId, to: Position },
    CoinRelocated { id: CoinId, to: Position },
    ButtonsToggled { engaged: bool },
    Won,
    Lost,
}
