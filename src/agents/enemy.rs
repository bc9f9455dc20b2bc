/// EnemyAgent: one task per enemy.
///
/// Each tick the agent reads the latest snapshot, picks a step with the
/// chase or patrol rule, and proposes it. Between ticks it drains its two
/// single-slot mailboxes (button → Patrol, coin → Chase). Its position and
/// covered-cell memory only change when the Coordinator confirms a move.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, trace};

use crate::domain::ai::{chase_step, patrol_step};
use crate::domain::cell::Cell;
use crate::domain::entity::{EnemyId, EnemyState, Position};
use crate::sim::coordinator::SnapshotReceiver;
use crate::sim::proposal::{Proposal, ProposalSender};
use crate::sim::world::{Mailbox, Snapshot};

pub struct EnemyAgent {
    pub id: EnemyId,
    pub pos: Position,
    pub state: EnemyState,
    pub covered: Cell,
    button_rx: mpsc::Receiver<()>,
    coin_rx: mpsc::Receiver<()>,
    rng: StdRng,
}

impl EnemyAgent {
    /// New patrolling enemy plus the mailbox the World uses to reach it.
    pub fn new(id: EnemyId, pos: Position, rng: StdRng) -> (Self, Mailbox) {
        let (button, button_rx) = mpsc::channel(1);
        let (coin, coin_rx) = mpsc::channel(1);
        let agent = EnemyAgent {
            id,
            pos,
            state: EnemyState::default(),
            covered: Cell::Empty,
            button_rx,
            coin_rx,
            rng,
        };
        (agent, Mailbox { button, coin })
    }

    /// Next cell to try from the agent's own position, or None to stay.
    pub fn decide(&mut self, snapshot: &Snapshot) -> Option<Position> {
        match self.state {
            EnemyState::Chase => chase_step(&snapshot.grid, self.pos, snapshot.character),
            EnemyState::Patrol => patrol_step(&snapshot.grid, self.pos, &mut self.rng),
        }
    }

    pub async fn run(mut self, proposals: ProposalSender, snapshots: SnapshotReceiver, tick: Duration) {
        let mut ticker = time::interval_at(Instant::now() + tick, tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                Some(()) = self.button_rx.recv() => {
                    self.state = self.state.on_button();
                    trace!(id = self.id, "patrolling");
                }
                Some(()) = self.coin_rx.recv() => {
                    self.state = self.state.on_coin();
                    trace!(id = self.id, "chasing");
                }
                _ = ticker.tick() => {
                    if !self.step(&proposals, &snapshots).await {
                        debug!(id = self.id, "queue closed, enemy stops");
                        return;
                    }
                }
            }
        }
    }

    /// One tick. Returns false once the queue is closed.
    async fn step(&mut self, proposals: &ProposalSender, snapshots: &SnapshotReceiver) -> bool {
        if proposals.is_closed() {
            return false;
        }
        let snapshot: Arc<Snapshot> = snapshots.borrow().clone();
        if snapshot.phase.is_over() {
            return true;
        }
        let Some(to) = self.decide(&snapshot) else {
            return true;
        };

        if to == snapshot.character && proposals.send(Proposal::PlayerCaught { at: to }).is_err() {
            return false;
        }

        let (reply, answer) = oneshot::channel();
        let proposal = Proposal::MoveEnemy {
            id: self.id,
            from: self.pos,
            to,
            covered: self.covered,
            reply,
        };
        if proposals.send(proposal).is_err() {
            return false;
        }
        if let Ok(memory) = answer.await {
            self.pos = to;
            self.covered = memory;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::parse_map;
    use crate::sim::proposal;
    use rand::SeedableRng;
    use tokio::sync::watch;

    fn at(x: usize, y: usize) -> Position {
        Position::new(x, y)
    }

    fn snapshots(rows: &[&str]) -> (watch::Sender<Arc<Snapshot>>, SnapshotReceiver) {
        let world = parse_map(rows).expect("map has a character");
        watch::channel(Arc::new(world.snapshot()))
    }

    #[test]
    fn decide_follows_state() {
        let (_tx, rx) = snapshots(&["☠  ☺"]);
        let snap = rx.borrow().clone();
        let (mut agent, _mailbox) = EnemyAgent::new(0, at(0, 0), StdRng::seed_from_u64(3));
        // Only one open neighbour, so patrol and chase agree here.
        assert_eq!(agent.decide(&snap), Some(at(1, 0)));
        agent.state = EnemyState::Chase;
        agent.pos = at(2, 0);
        assert_eq!(agent.decide(&snap), Some(at(3, 0)));
    }

    #[tokio::test(start_paused = true)]
    async fn chasing_enemy_proposes_one_step_per_tick() {
        let (_snap_tx, snap_rx) = snapshots(&["☠    ☺"]);
        let (tx, mut rx) = proposal::queue();
        let (agent, mailbox) = EnemyAgent::new(0, at(0, 0), StdRng::seed_from_u64(1));
        mailbox.coin.try_send(()).expect("empty mailbox");
        let task = tokio::spawn(agent.run(tx, snap_rx, Duration::from_millis(500)));

        let start = Instant::now();
        for x in 1..=4 {
            match rx.recv().await {
                Some(Proposal::MoveEnemy { from, to, reply, .. }) => {
                    assert_eq!(from, at(x - 1, 0));
                    assert_eq!(to, at(x, 0));
                    reply.send(Cell::Empty).expect("agent waits for the reply");
                }
                other => panic!("unexpected {other:?}"),
            }
        }
        assert!(start.elapsed() >= Duration::from_millis(2000));

        // Next step lands on the character: catch first, then the move.
        assert!(matches!(rx.recv().await, Some(Proposal::PlayerCaught { at: p }) if p == at(5, 0)));
        assert!(matches!(rx.recv().await, Some(Proposal::MoveEnemy { to, .. }) if to == at(5, 0)));

        drop(rx);
        task.await.expect("enemy task ends once the queue closes");
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_move_keeps_position_and_memory() {
        let (_snap_tx, snap_rx) = snapshots(&["☠ ♣☺"]);
        let (tx, mut rx) = proposal::queue();
        let (mut agent, mailbox) = EnemyAgent::new(0, at(0, 0), StdRng::seed_from_u64(1));
        agent.state = EnemyState::Chase;
        drop(mailbox);
        let task = tokio::spawn(agent.run(tx, snap_rx, Duration::from_millis(500)));

        // First proposal is dropped unanswered, so the agent retries from (0, 0).
        match rx.recv().await {
            Some(Proposal::MoveEnemy { from, .. }) => assert_eq!(from, at(0, 0)),
            other => panic!("unexpected {other:?}"),
        }
        match rx.recv().await {
            Some(Proposal::MoveEnemy { from, covered, .. }) => {
                assert_eq!(from, at(0, 0));
                assert_eq!(covered, Cell::Empty);
            }
            other => panic!("unexpected {other:?}"),
        }
        drop(rx);
        task.await.expect("enemy task ends");
    }

    #[tokio::test(start_paused = true)]
    async fn button_signal_returns_to_patrol() {
        // Patrol from the corner can only go right or down; chase would go right.
        let (_snap_tx, snap_rx) = snapshots(&["☠ ", "  ", "  ", "☺ "]);
        let (tx, mut rx) = proposal::queue();
        let (mut agent, mailbox) = EnemyAgent::new(0, at(0, 0), StdRng::seed_from_u64(5));
        agent.state = EnemyState::Chase;
        let task = tokio::spawn(agent.run(tx, snap_rx, Duration::from_millis(500)));

        // Chase straight down toward the character.
        match rx.recv().await {
            Some(Proposal::MoveEnemy { to, reply, .. }) => {
                assert_eq!(to, at(0, 1));
                drop(reply);
            }
            other => panic!("unexpected {other:?}"),
        }

        mailbox.button.try_send(()).expect("empty mailbox");
        let mut saw_right = false;
        for _ in 0..32 {
            match rx.recv().await {
                Some(Proposal::MoveEnemy { to, reply, .. }) => {
                    saw_right |= to == at(1, 0);
                    drop(reply);
                }
                other => panic!("unexpected {other:?}"),
            }
        }
        assert!(saw_right, "patrol never tried the other neighbour");

        drop(rx);
        task.await.expect("enemy task ends");
    }
}
