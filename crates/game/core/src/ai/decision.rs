//! Slot selection for engaged AI agents.

use crate::agent::{AgentView, CombatAgent, DecidedAction, FieldSnapshot};
use crate::env::{Env, SkillDef};
use crate::error::log_recovered;
use crate::state::{AgentId, Direction, Position};

/// Allies above this hp rate are not worth healing.
const HEAL_THRESHOLD: f32 = 0.5;

/// Picks the action an engaged agent will use next.
///
/// Walks the slots in equip order and takes the first whose skill is ready,
/// known, affordable and would reach its target when cast from the agent's
/// position facing that target. Ally-scoped skills look for the most injured
/// ally in reach instead. Returns the decision already stored on the agent
/// when there is one.
pub fn decide_action(agent: &mut CombatAgent, snapshot: &FieldSnapshot, env: &Env<'_>) -> Option<DecidedAction> {
    if agent.decided.is_some() {
        return agent.decided;
    }
    let target = snapshot
        .get(agent.target()?)
        .filter(|view| view.is_present())?;

    let mut choice = None;
    for cooldown in agent.cooldowns.iter() {
        let Some(skill_id) = cooldown.usable_skill() else {
            continue;
        };
        if !agent.knows(skill_id) {
            continue;
        }
        let skill = match env.skill(skill_id) {
            Ok(skill) => skill,
            Err(error) => {
                log_recovered("decide_action", &error);
                continue;
            }
        };
        if skill.is_guard() || !can_afford(agent, skill) {
            continue;
        }

        let picked = if skill.scope.is_for_allies() {
            most_injured_ally(agent, snapshot, skill).map(Some)
        } else if skill.scope.targets_user() {
            (agent.stats.hp_rate() < HEAL_THRESHOLD).then_some(None)
        } else {
            reaches(skill, agent.position, target.position).then_some(None)
        };
        if let Some(ally) = picked {
            choice = Some((
                DecidedAction {
                    slot: cooldown.slot(),
                    skill: skill_id,
                },
                ally,
            ));
            break;
        }
    }

    let (decided, ally) = choice?;
    agent.decided = Some(decided);
    agent.ally_target = ally;
    tracing::trace!(agent = %agent.id, slot = %decided.slot, skill = %decided.skill, "action decided");
    Some(decided)
}

fn can_afford(agent: &CombatAgent, skill: &SkillDef) -> bool {
    let resources = &agent.stats.resources;
    resources.mp.current >= skill.mp_cost && resources.tp.current >= skill.tp_cost
}

fn reaches(skill: &SkillDef, from: Position, to: Position) -> bool {
    skill
        .shape
        .contains(to, from, skill.range, Direction::toward(from, to))
}

fn most_injured_ally(agent: &CombatAgent, snapshot: &FieldSnapshot, skill: &SkillDef) -> Option<AgentId> {
    snapshot
        .iter()
        .filter(|view| view.is_present() && !agent.team.is_opponent_of(view.team))
        .filter(|view| view.stats.hp_rate() < HEAL_THRESHOLD)
        .filter(|view| view.id == agent.id || reaches(skill, agent.position, view.position))
        .fold(None, |best: Option<&AgentView>, view| match best {
            Some(best) if best.stats.hp_rate() <= view.stats.hp_rate() => Some(best),
            _ => Some(view),
        })
        .map(|view| view.id)
}
