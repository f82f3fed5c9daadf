//! Acting: readiness cadence, slot use, guard and dodge.

use crate::action::ActionRequest;
use crate::agent::{
    ActionPhase, Activity, AgentError, AgentFlags, CombatAgent, Pose, PoseKind,
};
use crate::combat::{GuardProfile, SlotKey};
use crate::env::{Env, SkillDef};
use crate::state::{Direction, FrameTimer, SkillId};

/// What a successful [`CombatAgent::use_slot`] produced.
#[derive(Clone, Debug, PartialEq)]
pub enum SlotUse {
    /// The action is ready to be queued.
    Emitted(ActionRequest),
    /// A cast started; the action is emitted by `update` when it completes.
    Casting { skill: SkillId, frames: u32 },
}

impl CombatAgent {
    // ========================================================================
    // Cadence
    // ========================================================================

    /// Frames the current phase requires before the next action.
    pub fn readiness_threshold(&self) -> u32 {
        match self.phase {
            ActionPhase::Prepare => self.ai.action_interval,
            ActionPhase::Combo => self.ai.combo_interval,
        }
    }

    pub fn is_action_ready(&self) -> bool {
        self.prepare >= self.readiness_threshold()
    }

    /// Resets the cadence after acting.
    pub fn consume_readiness(&mut self) {
        self.prepare = 0;
        self.phase = ActionPhase::Prepare;
    }

    /// Switches to the shorter combo cadence.
    pub fn enter_combo_phase(&mut self) {
        self.phase = ActionPhase::Combo;
        self.prepare = 0;
    }

    pub(crate) fn advance_readiness(&mut self) {
        self.prepare = self.prepare.saturating_add(1);
    }

    // ========================================================================
    // Slots
    // ========================================================================

    /// Uses the skill currently available in `slot`.
    ///
    /// An armed combo takes precedence over the equipped skill. The slot's
    /// cooldown (and the cooldown of slots sharing the skill) starts
    /// immediately, costs are paid, and the decided action is cleared.
    pub fn use_slot(&mut self, slot: SlotKey, env: &Env<'_>) -> Result<SlotUse, AgentError> {
        if !self.is_alive() {
            return Err(AgentError::NotAlive(self.id));
        }
        if !matches!(self.activity, Activity::Ready | Activity::Guarding { .. }) {
            return Err(AgentError::Busy(self.id));
        }
        let cooldown = self.cooldowns.get(slot).ok_or(AgentError::UnknownSlot {
            agent: self.id,
            slot,
        })?;
        let skill_id = cooldown.usable_skill().ok_or(AgentError::OnCooldown {
            agent: self.id,
            slot,
        })?;
        let skill = env.skill(skill_id)?;
        if skill.is_guard() {
            return Err(AgentError::GuardStance(skill_id));
        }
        self.pay(skill)?;

        self.cooldowns
            .consume(slot, skill_id, skill.cooldown_frames, skill.unique_cooldown);
        self.decided = None;
        // Acting drops the guard stance.
        if self.is_guarding() {
            self.activity = Activity::Ready;
        }

        if skill.cast_frames > 0 {
            self.activity = Activity::Casting {
                slot,
                skill: skill_id,
                timer: FrameTimer::new(skill.cast_frames),
            };
            self.pose = Pose {
                kind: PoseKind::Casting,
                timer: FrameTimer::IDLE,
            };
            tracing::trace!(agent = %self.id, skill = %skill_id, frames = skill.cast_frames, "cast started");
            return Ok(SlotUse::Casting {
                skill: skill_id,
                frames: skill.cast_frames,
            });
        }
        Ok(SlotUse::Emitted(self.request(skill_id, Some(slot))))
    }

    fn pay(&mut self, skill: &SkillDef) -> Result<(), AgentError> {
        let resources = &mut self.stats.resources;
        if resources.mp.current < skill.mp_cost || resources.tp.current < skill.tp_cost {
            return Err(AgentError::InsufficientResources {
                agent: self.id,
                skill: skill.id,
            });
        }
        resources.mp.spend(skill.mp_cost);
        resources.tp.spend(skill.tp_cost);
        Ok(())
    }

    /// Builds an action request from the agent's current position and facing.
    pub fn request(&self, skill: SkillId, slot: Option<SlotKey>) -> ActionRequest {
        ActionRequest {
            caster: self.id,
            skill,
            slot,
            team: self.team,
            direction: self.facing,
            anchor: self.position,
            retaliation: false,
        }
    }

    // ========================================================================
    // Guard
    // ========================================================================

    /// Raises or lowers the guard stance of `slot`.
    ///
    /// Raising (or re-raising) rebuilds the guard profile from the equipped
    /// skill and opens a fresh parry window. Returns whether the agent is
    /// guarding afterwards.
    pub fn execute_guard(&mut self, active: bool, slot: SlotKey, env: &Env<'_>) -> Result<bool, AgentError> {
        if !active {
            if self.is_guarding() {
                self.activity = Activity::Ready;
                self.pose = Pose::default();
            }
            return Ok(false);
        }

        if !self.is_alive() {
            return Err(AgentError::NotAlive(self.id));
        }
        if !matches!(self.activity, Activity::Ready | Activity::Guarding { .. }) {
            return Err(AgentError::Busy(self.id));
        }
        let skill_id = self
            .cooldowns
            .get(slot)
            .and_then(|c| c.skill())
            .ok_or(AgentError::UnknownSlot {
                agent: self.id,
                slot,
            })?;
        let skill = env.skill(skill_id)?;
        let profile = GuardProfile::from_skill(
            slot,
            skill,
            env.config().base_parry_frames,
            self.stats.rates.eva,
        )
        .ok_or(AgentError::NotAGuardSkill(skill_id))?;

        let parry = FrameTimer::new(profile.parry_frames);
        self.activity = Activity::Guarding { profile, parry };
        self.pose = Pose {
            kind: PoseKind::Guarding,
            timer: FrameTimer::IDLE,
        };
        tracing::trace!(agent = %self.id, skill = %skill_id, "guard raised");
        Ok(true)
    }

    // ========================================================================
    // Dodge
    // ========================================================================

    /// Starts a dodge of `steps` frames. The agent is invincible and cannot
    /// parry until it ends.
    pub fn dodge(&mut self, direction: Direction, steps: u32) -> Result<(), AgentError> {
        if !self.is_alive() {
            return Err(AgentError::NotAlive(self.id));
        }
        if !matches!(self.activity, Activity::Ready | Activity::Guarding { .. })
            || self.movement_lock.is_running()
        {
            return Err(AgentError::Busy(self.id));
        }
        if steps == 0 {
            return Ok(());
        }

        self.activity = Activity::Dodging {
            direction,
            steps,
            was_invincible: self.has(AgentFlags::INVINCIBLE),
        };
        self.facing = direction;
        self.flags.insert(AgentFlags::INVINCIBLE | AgentFlags::DASHING);
        self.pose = Pose {
            kind: PoseKind::Dodging,
            timer: FrameTimer::IDLE,
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::agent::fixtures::agent;
    use crate::config::CombatConfig;
    use crate::env::{
        EffectResult, FormulaInput, FormulaOracle, GuardSpec, OpenMap, PcgRng, QuietWorld,
        StatusDef,
    };
    use crate::state::{StatusId, TeamId};

    struct NoDamage;

    impl FormulaOracle for NoDamage {
        fn apply(&self, _input: &FormulaInput<'_>) -> EffectResult {
            EffectResult::default()
        }
    }

    struct Oracles {
        config: CombatConfig,
        skills: BTreeMap<SkillId, SkillDef>,
        statuses: BTreeMap<StatusId, StatusDef>,
    }

    impl Oracles {
        fn new() -> Self {
            let mut skills = BTreeMap::new();
            skills.insert(
                SkillId(1),
                SkillDef {
                    cooldown_frames: 60,
                    ..SkillDef::new(SkillId(1), "Slash")
                },
            );
            skills.insert(
                SkillId(2),
                SkillDef {
                    cast_frames: 20,
                    mp_cost: 30,
                    ..SkillDef::new(SkillId(2), "Fire")
                },
            );
            skills.insert(
                SkillId(3),
                SkillDef {
                    guard: Some(GuardSpec {
                        flat_reduction: 10,
                        percent_reduction: 0.2,
                        ..GuardSpec::default()
                    }),
                    ..SkillDef::new(SkillId(3), "Block")
                },
            );
            Self {
                config: CombatConfig::default(),
                skills,
                statuses: BTreeMap::new(),
            }
        }

        fn env(&self) -> Env<'_> {
            Env::new(
                &self.config,
                &self.skills,
                &self.statuses,
                &OpenMap,
                &NoDamage,
                &QuietWorld,
                &PcgRng,
            )
        }
    }

    fn armed() -> CombatAgent {
        let mut a = agent(0, TeamId::PARTY, 0.0, 0.0);
        a.cooldowns.equip(SlotKey::Attack, Some(SkillId(1)));
        a.cooldowns.equip(SlotKey::Skill(0), Some(SkillId(2)));
        a.cooldowns.equip(SlotKey::Guard, Some(SkillId(3)));
        a
    }

    #[test]
    fn instant_skill_emits_and_starts_cooldown() {
        let oracles = Oracles::new();
        let env = oracles.env();
        let mut a = armed();

        let used = a.use_slot(SlotKey::Attack, &env).unwrap();
        assert!(matches!(used, SlotUse::Emitted(ref r) if r.skill == SkillId(1)));
        assert!(matches!(
            a.use_slot(SlotKey::Attack, &env),
            Err(AgentError::OnCooldown { .. })
        ));
    }

    #[test]
    fn cast_skill_pays_and_blocks_until_done() {
        let oracles = Oracles::new();
        let env = oracles.env();
        let mut a = armed();

        let used = a.use_slot(SlotKey::Skill(0), &env).unwrap();
        assert_eq!(
            used,
            SlotUse::Casting {
                skill: SkillId(2),
                frames: 20
            }
        );
        assert_eq!(a.stats.resources.mp.current, 20);
        assert!(matches!(a.use_slot(SlotKey::Attack, &env), Err(AgentError::Busy(_))));
    }

    #[test]
    fn insufficient_mp_rejects_without_cooldown() {
        let oracles = Oracles::new();
        let env = oracles.env();
        let mut a = armed();
        a.stats.resources.mp.current = 10;

        assert!(matches!(
            a.use_slot(SlotKey::Skill(0), &env),
            Err(AgentError::InsufficientResources { .. })
        ));
        assert!(a.cooldowns.get(SlotKey::Skill(0)).is_some_and(|c| c.is_ready()));
    }

    #[test]
    fn guard_opens_parry_window_then_lowers() {
        let oracles = Oracles::new();
        let env = oracles.env();
        let mut a = armed();

        assert_eq!(a.execute_guard(true, SlotKey::Guard, &env), Ok(true));
        assert!(a.in_parry_window());
        assert_eq!(a.guard_profile().map(|p| p.flat_reduction), Some(10));

        assert_eq!(a.execute_guard(false, SlotKey::Guard, &env), Ok(false));
        assert!(!a.is_guarding());
        assert!(matches!(
            a.execute_guard(true, SlotKey::Attack, &env),
            Err(AgentError::NotAGuardSkill(SkillId(1)))
        ));
    }

    #[test]
    fn guard_skill_is_not_an_action() {
        let oracles = Oracles::new();
        let env = oracles.env();
        let mut a = armed();
        assert_eq!(
            a.use_slot(SlotKey::Guard, &env),
            Err(AgentError::GuardStance(SkillId(3)))
        );
    }

    #[test]
    fn readiness_follows_phase_threshold() {
        let mut a = armed();
        a.ai.action_interval = 3;
        a.ai.combo_interval = 1;
        for _ in 0..2 {
            a.advance_readiness();
        }
        assert!(!a.is_action_ready());
        a.advance_readiness();
        assert!(a.is_action_ready());

        a.enter_combo_phase();
        assert!(!a.is_action_ready());
        a.advance_readiness();
        assert!(a.is_action_ready());
        a.consume_readiness();
        assert_eq!(a.phase, ActionPhase::Prepare);
    }

    #[test]
    fn dodge_grants_invincibility() {
        let mut a = armed();
        a.dodge(Direction::Left, 4).unwrap();
        assert!(a.has(AgentFlags::INVINCIBLE | AgentFlags::DASHING));
        assert_eq!(a.facing, Direction::Left);
        assert!(!a.can_move());
    }
}
