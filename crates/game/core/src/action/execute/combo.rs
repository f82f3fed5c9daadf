//! Combo continuation after a successful hit.

use crate::agent::CombatAgent;
use crate::combat::SlotKey;
use crate::config::CombatConfig;
use crate::env::SkillDef;
use crate::outbox::{CombatEvent, Outbox};

/// Arms the follow-up of `skill` on the slot it was used from.
///
/// Requires a known follow-up skill. Re-arming the same follow-up is a
/// no-op, so multi-target hits advance the chain once. Returns `true` when a
/// new step was armed.
pub(super) fn continue_combo(
    caster: &mut CombatAgent,
    slot: SlotKey,
    skill: &SkillDef,
    config: &CombatConfig,
    outbox: &mut Outbox,
) -> bool {
    let Some(combo) = skill.combo else {
        return false;
    };
    if !caster.is_alive() || !caster.knows(combo.skill) {
        return false;
    }
    let Some(cooldown) = caster.cooldowns.get_mut(slot) else {
        return false;
    };
    if !cooldown.queue_combo(combo.skill, combo.delay_frames, config.combo_window_frames) {
        return false;
    }

    caster.enter_combo_phase();
    tracing::trace!(agent = %caster.id, %slot, next = %combo.skill, "combo armed");
    outbox.emit(CombatEvent::ComboQueued {
        agent: caster.id,
        slot,
        skill: combo.skill,
    });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::fixtures;
    use crate::env::ComboSpec;
    use crate::state::{SkillId, TeamId};

    fn chained() -> SkillDef {
        let mut skill = SkillDef::new(SkillId(1), "jab");
        skill.combo = Some(ComboSpec {
            skill: SkillId(2),
            delay_frames: 0,
        });
        skill
    }

    #[test]
    fn arms_once_per_step() {
        let mut agent = fixtures::agent(0, TeamId::PARTY, 0.0, 0.0);
        agent.cooldowns.equip(SlotKey::Attack, Some(SkillId(1)));
        agent.known_skills = vec![SkillId(1), SkillId(2)];
        let config = CombatConfig::default();
        let mut outbox = Outbox::new();

        assert!(continue_combo(&mut agent, SlotKey::Attack, &chained(), &config, &mut outbox));
        assert!(!continue_combo(&mut agent, SlotKey::Attack, &chained(), &config, &mut outbox));
        assert_eq!(outbox.events().len(), 1);
        assert_eq!(
            agent.cooldowns.get(SlotKey::Attack).and_then(|c| c.next_combo()),
            Some(SkillId(2))
        );
    }

    #[test]
    fn unknown_follow_up_is_ignored() {
        let mut agent = fixtures::agent(0, TeamId::PARTY, 0.0, 0.0);
        agent.cooldowns.equip(SlotKey::Attack, Some(SkillId(1)));
        agent.known_skills = vec![SkillId(1)];
        let mut outbox = Outbox::new();

        assert!(!continue_combo(
            &mut agent,
            SlotKey::Attack,
            &chained(),
            &CombatConfig::default(),
            &mut outbox
        ));
        assert!(outbox.is_empty());
    }
}
