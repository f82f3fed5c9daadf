use crate::action::Action;
use crate::action::execute::ActionResolver;
use crate::agent::AgentFlags;
use crate::state::AgentId;

impl ActionResolver<'_, '_> {
    /// Agents affected by `action`, in arena order.
    ///
    /// User scope resolves to the caster without geometry. Otherwise every
    /// live, visible agent that matches the scope and lies inside the shape
    /// is collected; invincible agents are skipped by hostile actions.
    pub(super) fn collect_targets(&self, action: &Action) -> Vec<AgentId> {
        let agents = &self.field.agents;

        if action.scope.targets_user() {
            return agents
                .get(action.caster)
                .filter(|caster| caster.is_alive())
                .map(|caster| vec![caster.id])
                .unwrap_or_default();
        }

        agents
            .iter()
            .filter(|(_, agent)| agent.is_alive() && !agent.has(AgentFlags::HIDDEN))
            .filter(|(_, agent)| action.scope.accepts(action.team, agent.team))
            .filter(|(_, agent)| {
                !(action.team.is_opponent_of(agent.team) && agent.has(AgentFlags::INVINCIBLE))
            })
            .filter(|(_, agent)| action.covers(agent.position))
            .map(|(id, _)| id)
            .collect()
    }
}
