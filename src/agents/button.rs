/// ButtonSupervisor: asks the Coordinator to flip every button once per
/// period. The first toggle comes one full period after start.

use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

use crate::sim::proposal::{Proposal, ProposalSender};

pub async fn supervise(proposals: ProposalSender, period: Duration) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        if proposals.send(Proposal::ToggleButtons).is_err() {
            debug!("queue closed, button supervisor stops");
            return;
        }
    }
}
