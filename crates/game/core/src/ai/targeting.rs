//! Engage/disengage decisions.

use crate::agent::{AgentFlags, AgentView, CombatAgent, Engagement, FieldSnapshot};
use crate::error::log_recovered;
use crate::outbox::{CombatEvent, Outbox};
use crate::state::{AgentArena, AgentId};

/// How an agent's engagement changed during a targeting pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetChange {
    Engaged(AgentId),
    Retargeted(AgentId),
    Disengaged,
}

impl TargetChange {
    pub fn target(self) -> Option<AgentId> {
        match self {
            TargetChange::Engaged(id) | TargetChange::Retargeted(id) => Some(id),
            TargetChange::Disengaged => None,
        }
    }
}

/// Targeting for AI agents against the start-of-tick snapshot.
#[derive(Clone, Copy, Debug)]
pub struct TargetingManager<'a> {
    snapshot: &'a FieldSnapshot,
}

impl<'a> TargetingManager<'a> {
    pub fn new(snapshot: &'a FieldSnapshot) -> Self {
        Self { snapshot }
    }

    /// Whether targeting runs for `agent` this tick.
    pub fn is_eligible(agent: &CombatAgent) -> bool {
        agent.is_alive()
            && !agent.is_player()
            && !agent.has(AgentFlags::HIDDEN)
            && !agent.has(AgentFlags::INANIMATE)
            && !agent.is_paused()
    }

    /// Nearest present, animate opponent of `agent` within `radius`.
    ///
    /// Ties keep the earliest agent in arena order.
    pub fn nearest_opponent(&self, agent: &CombatAgent, radius: f32) -> Option<(AgentId, f32)> {
        self.snapshot
            .iter()
            .filter(|view| self.is_valid_target(agent, view))
            .map(|view| (view.id, agent.position.distance(view.position)))
            .filter(|(_, distance)| *distance <= radius)
            .fold(None, |best: Option<(AgentId, f32)>, candidate| match best {
                Some(best) if best.1 <= candidate.1 => Some(best),
                _ => Some(candidate),
            })
    }

    fn is_valid_target(&self, agent: &CombatAgent, view: &AgentView) -> bool {
        view.id != agent.id
            && view.is_present()
            && agent.team.is_opponent_of(view.team)
            && !view.has(AgentFlags::INANIMATE)
    }

    /// Runs one targeting pass for `agent`.
    ///
    /// 1. Drop aggro entries for opponents that are gone
    /// 2. Engaged: disengage past pursuit range, otherwise follow the top
    ///    aggro entry; a vanished target with an empty table disengages
    /// 3. Idle or alerted: engage the nearest opponent in sight
    pub fn update(&self, agent: &mut CombatAgent, outbox: &mut Outbox) -> Option<TargetChange> {
        if !Self::is_eligible(agent) {
            return None;
        }

        // 1. Prune stale aggro
        let snapshot = self.snapshot;
        let team = agent.team;
        let pruned = agent.aggro.prune(|id| {
            snapshot
                .get(id)
                .is_some_and(|view| view.is_present() && team.is_opponent_of(view.team))
        });
        if pruned > 0 {
            tracing::trace!(agent = %agent.id, pruned, "aggro pruned");
        }

        let change = match agent.target() {
            Some(target) => self.update_engaged(agent, target),
            None => self.update_idle(agent),
        };
        if let Some(change) = change {
            outbox.emit(CombatEvent::EngagementChanged {
                agent: agent.id,
                target: change.target(),
            });
        }
        change
    }

    fn update_engaged(&self, agent: &mut CombatAgent, target: AgentId) -> Option<TargetChange> {
        let boosted = matches!(
            agent.engagement,
            Engagement::Engaged { boosted: true, .. }
        );
        let view = self
            .snapshot
            .get(target)
            .filter(|view| view.is_present());

        let Some(view) = view else {
            // 2a. Target gone
            return match agent.aggro.top() {
                Some(next) => self.engage(agent, next, boosted, TargetChange::Retargeted),
                None => {
                    agent.disengage();
                    Some(TargetChange::Disengaged)
                }
            };
        };

        // 2b. Out of pursuit range
        if agent.position.distance(view.position) > agent.effective_pursuit() {
            agent.disengage();
            return Some(TargetChange::Disengaged);
        }

        // 2c. Follow aggro
        match agent.aggro.top() {
            Some(top) if top != target => self.engage(agent, top, boosted, TargetChange::Retargeted),
            _ => None,
        }
    }

    fn update_idle(&self, agent: &mut CombatAgent) -> Option<TargetChange> {
        let (nearest, _) = self.nearest_opponent(agent, agent.effective_sight())?;
        let boosted = agent.engagement.is_alerted();
        self.engage(agent, nearest, boosted, TargetChange::Engaged)
    }

    fn engage(
        &self,
        agent: &mut CombatAgent,
        target: AgentId,
        boosted: bool,
        change: fn(AgentId) -> TargetChange,
    ) -> Option<TargetChange> {
        match agent.engage(target, boosted) {
            Ok(true) => Some(change(target)),
            Ok(false) => None,
            Err(error) => {
                log_recovered("engage", &error);
                None
            }
        }
    }
}

/// Engages the idle followers of `leader` with `target`.
///
/// Returns how many followers joined.
pub fn engage_followers(
    agents: &mut AgentArena,
    leader: AgentId,
    target: AgentId,
    outbox: &mut Outbox,
) -> usize {
    let Some(followers) = agents.get(leader).map(|agent| agent.followers.clone()) else {
        return 0;
    };

    let mut joined = 0;
    for follower in followers {
        let Some(agent) = agents.get_mut(follower) else {
            continue;
        };
        if agent.is_player() || !agent.is_alive() || agent.is_engaged() {
            continue;
        }
        match agent.engage(target, false) {
            Ok(true) => {
                outbox.emit(CombatEvent::EngagementChanged {
                    agent: follower,
                    target: Some(target),
                });
                joined += 1;
            }
            Ok(false) => {}
            Err(error) => log_recovered("engage_followers", &error),
        }
    }
    joined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Engagement;
    use crate::state::{Position, TeamId};
    use crate::stats::BattlerStats;

    fn field(enemy_x: f32, hero_x: f32) -> (AgentArena, AgentId, AgentId) {
        let mut agents = AgentArena::new();
        let enemy = agents.insert_with(|id| {
            let mut agent = CombatAgent::new(id, TeamId::HOSTILE, Position::new(enemy_x, 0.0), BattlerStats::default());
            agent.ai.sight = 5.0;
            agent.ai.pursuit = 8.0;
            agent.ai.alert_sight_boost = 0.0;
            agent.ai.alert_pursuit_boost = 0.0;
            agent
        });
        let hero = agents.insert_with(|id| {
            CombatAgent::new(id, TeamId::PARTY, Position::new(hero_x, 0.0), BattlerStats::default())
        });
        (agents, enemy, hero)
    }

    fn pass(agents: &mut AgentArena, id: AgentId, outbox: &mut Outbox) -> Option<TargetChange> {
        let snapshot = FieldSnapshot::capture(agents);
        let manager = TargetingManager::new(&snapshot);
        agents.get_mut(id).and_then(|agent| manager.update(agent, outbox))
    }

    #[test]
    fn engages_in_sight_and_disengages_past_pursuit() {
        let (mut agents, enemy, hero) = field(0.0, 4.0);
        let mut outbox = Outbox::new();

        assert_eq!(pass(&mut agents, enemy, &mut outbox), Some(TargetChange::Engaged(hero)));
        assert_eq!(agents.get(enemy).and_then(|a| a.target()), Some(hero));

        if let Some(agent) = agents.get_mut(hero) {
            agent.position = Position::new(7.5, 0.0);
        }
        assert_eq!(pass(&mut agents, enemy, &mut outbox), None);

        if let Some(agent) = agents.get_mut(hero) {
            agent.position = Position::new(9.0, 0.0);
        }
        assert_eq!(pass(&mut agents, enemy, &mut outbox), Some(TargetChange::Disengaged));
        assert!(agents.get(enemy).is_some_and(|a| a.engagement == Engagement::Idle));
        assert_eq!(outbox.events().len(), 2);
    }

    #[test]
    fn out_of_sight_stays_idle() {
        let (mut agents, enemy, _) = field(0.0, 5.5);
        let mut outbox = Outbox::new();
        assert_eq!(pass(&mut agents, enemy, &mut outbox), None);
        assert!(outbox.is_empty());
    }

    #[test]
    fn follows_highest_aggro() {
        let (mut agents, enemy, hero) = field(0.0, 2.0);
        let rogue = agents.insert_with(|id| {
            CombatAgent::new(id, TeamId::PARTY, Position::new(3.0, 0.0), BattlerStats::default())
        });
        let mut outbox = Outbox::new();
        pass(&mut agents, enemy, &mut outbox);

        if let Some(agent) = agents.get_mut(enemy) {
            agent.aggro.add(rogue, 40.0, false);
        }
        assert_eq!(pass(&mut agents, enemy, &mut outbox), Some(TargetChange::Retargeted(rogue)));
        assert_eq!(agents.get(enemy).and_then(|a| a.target()), Some(rogue));
        let _ = hero;
    }

    #[test]
    fn vanished_target_with_empty_table_disengages() {
        let (mut agents, enemy, hero) = field(0.0, 2.0);
        let mut outbox = Outbox::new();
        pass(&mut agents, enemy, &mut outbox);

        agents.remove(hero);
        assert_eq!(pass(&mut agents, enemy, &mut outbox), Some(TargetChange::Disengaged));
        assert!(agents.get(enemy).is_some_and(|a| a.aggro.is_empty()));
    }

    #[test]
    fn followers_join_the_leader() {
        let (mut agents, enemy, hero) = field(0.0, 2.0);
        let minion = agents.insert_with(|id| {
            CombatAgent::new(id, TeamId::HOSTILE, Position::new(-1.0, 0.0), BattlerStats::default())
        });
        if let Some(leader) = agents.get_mut(enemy) {
            assert!(leader.add_follower(minion));
        }
        let mut outbox = Outbox::new();
        assert_eq!(engage_followers(&mut agents, enemy, hero, &mut outbox), 1);
        assert_eq!(agents.get(minion).and_then(|a| a.target()), Some(hero));
    }
}
