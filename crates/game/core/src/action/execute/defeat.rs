//! Defeat handling: on-defeat skills, rewards, loot and group cleanup.

use crate::action::execute::ActionResolver;
use crate::env::RollContext;
use crate::outbox::{CombatEvent, Presentation, SpawnRequest};
use crate::state::AgentId;

impl ActionResolver<'_, '_> {
    /// Defeats `victim`, crediting `victor` if known.
    ///
    /// Only live agents can be defeated; returns `false` otherwise. Actors go
    /// straight to the dying state and wait for world events to finish.
    /// Everyone else pays out its bounty to the victor's team, drops loot at
    /// its tile and is removed after the configured delay.
    pub fn defeat(&mut self, victim: AgentId, victor: Option<AgentId>) -> bool {
        let env = self.env;
        let config = env.config();
        let Some(agent) = self.field.agents.get_mut(victim) else {
            return false;
        };
        if !agent.is_alive() {
            return false;
        }

        // 1. Pre-defeat: disengage, queue on-defeat skills, animation
        let leader = agent.leader;
        let followers = agent.followers.clone();
        agent.disengage();
        let requests: Vec<_> = agent
            .defeat_skills
            .iter()
            .map(|&skill| {
                let mut request = agent.request(skill, None);
                request.retaliation = true;
                request
            })
            .collect();
        let animation = agent.defeat_animation;
        let is_actor = agent.is_actor();
        let level = agent.stats.level;
        let tile = agent.position.tile();
        let bounty = agent.bounty.clone();

        tracing::debug!(agent = %victim, by = ?victor, "defeated");
        for request in requests {
            self.field.queue(request, env);
        }
        if let Some(animation) = animation {
            self.field.outbox.present(Presentation::Animation {
                target: victim,
                animation,
            });
        }
        self.field.outbox.emit(CombatEvent::Defeated {
            agent: victim,
            by: victor,
        });

        if is_actor {
            if let Some(agent) = self.field.agents.get_mut(victim) {
                agent.begin_dying(0);
            }
            return true;
        }

        // 2. Rewards
        if let Some((team, victor_level)) = victor
            .and_then(|id| self.field.agents.get(id))
            .map(|agent| (agent.team, agent.stats.level))
        {
            let multiplier = config.reward_multiplier(victor_level, level);
            let exp = (bounty.exp as f32 * multiplier).round() as u32;
            let gold = (bounty.gold as f32 * multiplier).round() as u32;
            self.field.rewards.grant(team, exp, gold);
            self.field
                .outbox
                .emit(CombatEvent::Rewarded { team, exp, gold });
        }

        // 3. Loot
        for drop in &bounty.loot {
            let dropped =
                drop.chance >= 1.0 || self.field.roll(env, victim, RollContext::Loot) < drop.chance as f64;
            if dropped {
                self.field.outbox.spawn(SpawnRequest {
                    kind: drop.kind,
                    x: tile.0,
                    y: tile.1,
                    payload: drop.id,
                });
            }
        }

        // 4. Post-defeat: unlink the group and start the removal timer
        if let Some(leader) = leader.and_then(|id| self.field.agents.get_mut(id)) {
            leader.followers.retain(|follower| *follower != victim);
        }
        for follower in followers {
            if let Some(follower) = self.field.agents.get_mut(follower) {
                follower.leader = None;
            }
        }
        if let Some(agent) = self.field.agents.get_mut(victim) {
            agent.clear_group();
            agent.begin_dying(config.defeat_removal_frames);
        }
        true
    }
}
