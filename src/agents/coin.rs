/// CoinAgent: sleeps a random interval, then proposes a jump to a random
/// Empty cell. Ends when the coin is collected (stop signal) or the queue
/// closes.

use std::ops::Range;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;
use tokio::sync::oneshot;
use tokio::time;
use tracing::debug;

use crate::domain::cell::Cell;
use crate::domain::entity::{CoinId, Position};
use crate::domain::grid::Grid;
use crate::sim::coordinator::SnapshotReceiver;
use crate::sim::proposal::{Proposal, ProposalSender};

pub struct CoinAgent {
    pub id: CoinId,
    pub pos: Position,
    stop: oneshot::Receiver<()>,
    delay_secs: Range<u64>,
    rng: StdRng,
}

impl CoinAgent {
    pub fn new(id: CoinId, pos: Position, stop: oneshot::Receiver<()>, delay_secs: Range<u64>, rng: StdRng) -> Self {
        CoinAgent { id, pos, stop, delay_secs, rng }
    }

    /// Random row, then a random column within that row. None unless the
    /// chosen cell is Empty in this snapshot.
    pub fn pick_target(&mut self, grid: &Grid) -> Option<Position> {
        if grid.height() == 0 {
            return None;
        }
        let y = self.rng.gen_range(0..grid.height());
        let len = grid.row_len(y);
        if len == 0 {
            return None;
        }
        let pos = Position::new(self.rng.gen_range(0..len), y);
        (grid.get(pos) == Some(Cell::Empty)).then_some(pos)
    }

    pub async fn run(mut self, proposals: ProposalSender, snapshots: SnapshotReceiver) {
        loop {
            let wait = Duration::from_secs(self.rng.gen_range(self.delay_secs.clone()));
            tokio::select! {
                _ = &mut self.stop => {
                    debug!(id = self.id, "coin stopped");
                    return;
                }
                _ = time::sleep(wait) => {
                    let grid = snapshots.borrow().grid.clone();
                    let Some(to) = self.pick_target(&grid) else { continue };

                    let (reply, answer) = oneshot::channel();
                    let proposal = Proposal::RelocateCoin { id: self.id, from: self.pos, to, reply };
                    if proposals.send(proposal).is_err() {
                        return;
                    }
                    if answer.await.unwrap_or(false) {
                        self.pos = to;
                    }
                }
            }
        }
    }
}
