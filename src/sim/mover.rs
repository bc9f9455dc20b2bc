/// CharacterMover: applies one `MoveCharacter` proposal.
///
/// Resolution order for the destination cell:
///   1. Out of bounds / Wall     → no-op
///   2. Enemy                    → loss, nothing moves
///   3. Engaged button           → enemies stop chasing, then move
///   4. Coin                     → pickup (stop task, count, enemies chase), then move
///   5. Move: three-cell rotation with the character's memory
///   6. Fifth coin               → win

use tracing::{debug, info, warn};

use crate::domain::cell::Cell;
use crate::domain::entity::Position;
use super::event::GameEvent;
use super::world::{Signal, World, COINS_TO_WIN};

pub fn move_character(world: &mut World, dx: i32, dy: i32, events: &mut Vec<GameEvent>) {
    let from = world.character;
    let target = from.offset(dx, dy);
    let (to, dest) = match target.and_then(|to| world.grid.get(to).map(|cell| (to, cell))) {
        Some((to, cell)) if cell.admits_character() => (to, cell),
        _ => {
            debug!(?target, "character move rejected");
            events.push(GameEvent::MoveRejected { to: target });
            return;
        }
    };

    if dest == Cell::Enemy {
        world.lose(events);
        return;
    }

    if dest.is_button() && world.button_at(to).map_or(false, |b| b.engaged) {
        world.broadcast(Signal::StopChasing);
        world.set_status("Button pressed - enemies stopped chasing.");
        events.push(GameEvent::ChaseStopped);
        info!(x = to.x, y = to.y, "engaged button stepped on");
    }

    let mut reached_goal = false;
    if dest == Cell::Coin {
        reached_goal = collect_coin(world, to, events);
    }

    let remembered = world.covered;
    world.covered = world.rotate(Cell::Character, from, to, remembered);
    world.character = to;
    events.push(GameEvent::CharacterMoved { to });

    if reached_goal {
        world.win(events);
    }
}

/// Pick up the coin at `pos`. Returns true when this was the winning coin.
fn collect_coin(world: &mut World, pos: Position, events: &mut Vec<GameEvent>) -> bool {
    let Some(idx) = world.coin_index_at(pos) else {
        warn!(x = pos.x, y = pos.y, "coin cell without a registered coin");
        world.grid.set(pos, Cell::Empty);
        return false;
    };

    let mut slot = world.coins.remove(idx);
    if let Some(stop) = slot.stop.take() {
        let _ = stop.send(());
    }
    world.grid.set(pos, Cell::Empty);
    world.coins_collected = (world.coins_collected + 1).min(COINS_TO_WIN);
    world.set_status(format!(
        "Coins collected: {}/{COINS_TO_WIN} - enemies are chasing you!",
        world.coins_collected
    ));
    world.broadcast(Signal::StartChasing);
    events.push(GameEvent::CoinCollected { id: slot.id, total: world.coins_collected });
    events.push(GameEvent::ChaseStarted);
    info!(coin = slot.id, total = world.coins_collected, "coin collected");

    world.coins_collected == COINS_TO_WIN
}
