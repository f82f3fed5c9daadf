//! Knockback displacement.

use crate::agent::{AgentFlags, CombatAgent};
use crate::env::Env;
use crate::outbox::{Outbox, Presentation};
use crate::state::Direction;

/// Tiles an agent with total resistance `resist` is pushed by a knockback of `power`.
pub fn knockback_distance(power: u32, resist: f32) -> u32 {
    let resist = if resist.is_finite() { resist.clamp(0.0, 1.0) } else { 0.0 };
    (power as f32 * (1.0 - resist)).floor() as u32
}

/// Pushes `agent` along `direction`, tile by tile, stopping before the first
/// tile it may not enter. Returns the tiles actually moved.
///
/// Any in-progress cast is cancelled and movement is locked for the
/// configured frames. A push that cannot move anywhere still plays a hop.
pub(super) fn knock_back(
    agent: &mut CombatAgent,
    direction: Direction,
    power: u32,
    env: &Env<'_>,
    outbox: &mut Outbox,
) -> u32 {
    if agent.has(AgentFlags::NO_KNOCKBACK) {
        return 0;
    }

    let status_resist: f32 = agent
        .statuses
        .iter()
        .filter_map(|id| env.status(id).ok())
        .map(|def| def.knockback_resist)
        .sum();
    // Fully resisted pushes fall through as a zero-tile hop.
    let tiles = knockback_distance(power, agent.stats.rates.knockback_resist + status_resist);

    let (dx, dy) = direction.offset();
    let from = agent.position;
    let mut moved = 0;
    let (mut x, mut y) = from.tile();
    while moved < tiles {
        let (nx, ny) = (x + dx, y + dy);
        if !env.map().can_occupy(nx, ny, direction) {
            break;
        }
        (x, y) = (nx, ny);
        moved += 1;
    }

    agent.cancel_cast();
    agent.lock_movement(env.config().knockback_lock_frames);

    if moved == 0 {
        outbox.present(Presentation::Hop { agent: agent.id });
    } else {
        let to = from.offset(dx * moved as i32, dy * moved as i32);
        agent.position = to;
        outbox.present(Presentation::Jump {
            agent: agent.id,
            from,
            to,
        });
    }
    tracing::trace!(agent = %agent.id, tiles, moved, "knocked back");
    moved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resistance_reduces_and_floors() {
        assert_eq!(knockback_distance(3, 0.0), 3);
        assert_eq!(knockback_distance(3, 0.5), 1);
        assert_eq!(knockback_distance(4, 0.25), 3);
        assert_eq!(knockback_distance(3, 1.0), 0);
    }

    #[test]
    fn out_of_range_resistance_is_clamped() {
        assert_eq!(knockback_distance(3, 2.5), 0);
        assert_eq!(knockback_distance(3, -1.0), 3);
        assert_eq!(knockback_distance(3, f32::NAN), 3);
    }
}
