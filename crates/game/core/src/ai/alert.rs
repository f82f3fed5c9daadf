use crate::config::CombatConfig;
use crate::outbox::{CombatEvent, Outbox};
use crate::state::{AgentArena, AgentId};

/// Alerts idle AI allies of `origin` within the configured radius.
///
/// Returns how many allies were alerted. Agents that cannot be alerted
/// (players, engaged, inanimate, dying) are skipped.
pub fn propagate_alert(
    agents: &mut AgentArena,
    origin: AgentId,
    source: AgentId,
    config: &CombatConfig,
    outbox: &mut Outbox,
) -> usize {
    let Some((team, center)) = agents.get(origin).map(|agent| (agent.team, agent.position)) else {
        return 0;
    };

    let mut alerted = 0;
    for (id, ally) in agents.iter_mut() {
        if id == origin || ally.team != team || ally.is_engaged() {
            continue;
        }
        if ally.engagement.is_alerted() || ally.position.distance(center) > config.ally_alert_radius {
            continue;
        }
        if ally.alert(source, config.alert_frames) {
            outbox.emit(CombatEvent::Alerted { agent: id, source });
            alerted += 1;
        }
    }
    if alerted > 0 {
        tracing::debug!(agent = %origin, source = %source, alerted, "alert spread");
    }
    alerted
}
