//! Counter attacks queued by a defender.

use crate::action::ActionError;
use crate::action::execute::ActionResolver;
use crate::action::execute::pipeline::CasterSnapshot;
use crate::env::{EffectResult, RollContext};
use crate::state::{AgentId, Direction, SkillId};

/// Queues the defender's retaliation skills against the attacker.
///
/// Sources, in order:
/// - the guard skill's counter list (parry list when parried, guard list when guarded)
/// - passive retaliation skills, when the hit landed
/// - the auto-counter skill, when the counter roll succeeds
///
/// Defenders at 0 hp never retaliate. Retaliations face the attacker, skip
/// cooldowns and resolve on the next pass.
pub(super) fn retaliate(
    resolver: &mut ActionResolver<'_, '_>,
    attacker: &CasterSnapshot,
    defender: AgentId,
    result: &EffectResult,
) -> Result<usize, ActionError> {
    let agent = resolver
        .field
        .agents
        .get(defender)
        .ok_or(ActionError::TargetMissing(defender))?;
    if !agent.is_alive() || agent.stats.is_dead() {
        return Ok(0);
    }

    let mut skills: Vec<SkillId> = Vec::new();
    if let Some(profile) = agent.guard_profile() {
        if result.parried {
            skills.extend(&profile.counter_parry);
        } else if result.guarded {
            skills.extend(&profile.counter_guard);
        }
    }
    let counter = agent
        .counter_skill
        .filter(|_| agent.stats.rates.cnt > 0.0)
        .map(|skill| (skill, agent.stats.rates.cnt));
    if result.landed() {
        skills.extend(&agent.retaliation_skills);
    }

    if let Some((skill, chance)) = counter {
        let roll = resolver.field.roll(resolver.env, defender, RollContext::Counter);
        if roll < chance as f64 {
            skills.push(skill);
        }
    }
    if skills.is_empty() {
        return Ok(0);
    }

    let agent = resolver
        .field
        .agents
        .get_mut(defender)
        .ok_or(ActionError::TargetMissing(defender))?;
    agent.facing = Direction::toward(agent.position, attacker.position);
    let requests: Vec<_> = skills
        .into_iter()
        .map(|skill| {
            let mut request = agent.request(skill, None);
            request.retaliation = true;
            request
        })
        .collect();

    let mut queued = 0;
    for request in requests {
        tracing::debug!(agent = %defender, target = %attacker.id, skill = %request.skill, "retaliating");
        if resolver.field.queue(request, resolver.env).is_some() {
            queued += 1;
        }
    }
    Ok(queued)
}
