/// Concurrent agents: enemies, coins and the button supervisor.
///
/// Agents are built in two steps. `Roster::prepare` wires each agent's
/// receiving end into the World (enemy mailboxes, coin stop signals) before
/// the World moves into the Coordinator; `Roster::spawn` then starts them
/// with the proposal queue and the Coordinator's snapshot feed.

pub mod button;
pub mod coin;
pub mod enemy;

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::oneshot;
use tokio::task::JoinSet;
use tracing::info;

use crate::config::TimingConfig;
use crate::sim::coordinator::SnapshotReceiver;
use crate::sim::level::enemy_spawns;
use crate::sim::proposal::ProposalSender;
use crate::sim::world::World;
use coin::CoinAgent;
use enemy::EnemyAgent;

pub struct Roster {
    enemies: Vec<EnemyAgent>,
    coins: Vec<CoinAgent>,
    button_period: Option<Duration>,
    enemy_tick: Duration,
}

impl Roster {
    pub fn prepare(world: &mut World, timing: &TimingConfig, seed: Option<u64>) -> Self {
        let mut enemies = vec![];
        for (id, pos) in enemy_spawns(world).into_iter().enumerate() {
            let (agent, mailbox) = EnemyAgent::new(id, pos, agent_rng(seed, id as u64));
            world.mailboxes.push(mailbox);
            enemies.push(agent);
        }

        let mut coins = vec![];
        let delay = timing.coin_min_secs..timing.coin_max_secs;
        for slot in &mut world.coins {
            let (stop_tx, stop_rx) = oneshot::channel();
            slot.stop = Some(stop_tx);
            // Offset so coin streams never mirror enemy streams.
            let rng = agent_rng(seed, 1_000 + slot.id as u64);
            coins.push(CoinAgent::new(slot.id, slot.pos, stop_rx, delay.clone(), rng));
        }

        let button_period = (!world.buttons.is_empty()).then(|| timing.button_period());

        Roster { enemies, coins, button_period, enemy_tick: timing.enemy_tick() }
    }

    pub fn spawn(self, proposals: &ProposalSender, snapshots: &SnapshotReceiver) -> JoinSet<()> {
        info!(
            enemies = self.enemies.len(),
            coins = self.coins.len(),
            buttons = self.button_period.is_some(),
            "spawning agents"
        );

        let mut tasks = JoinSet::new();
        for agent in self.enemies {
            tasks.spawn(agent.run(proposals.clone(), snapshots.clone(), self.enemy_tick));
        }
        for agent in self.coins {
            tasks.spawn(agent.run(proposals.clone(), snapshots.clone()));
        }
        if let Some(period) = self.button_period {
            tasks.spawn(button::supervise(proposals.clone(), period));
        }
        tasks
    }
}

/// Reproducible per-agent stream when seeded, entropy otherwise.
fn agent_rng(seed: Option<u64>, salt: u64) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15)),
        None => StdRng::from_entropy(),
    }
}
