//! Per-target effect pipeline.
//!
//! ## Pipeline Steps
//!
//! 1. Parry / guard check (hostile actions only)
//! 2. Effect application through the formula service
//! 3. Aggro update
//! 4. On-hit effects: animation, combo continuation, knockback, engagement
//! 5. Retaliation
//! 6. Post effects: popups, log, defeat check
//!
//! A parried action skips step 2 entirely; the formula service is never
//! consulted for it.

use crate::action::execute::{ActionResolver, combo, knockback, retaliation};
use crate::action::{Action, ActionError};
use crate::agent::{AgentFlags, CombatAgent};
use crate::combat::parry_succeeds;
use crate::env::{EffectResult, FormulaInput, RollContext, SkillDef, StatusDef};
use crate::error::log_recovered;
use crate::outbox::{CombatEvent, HitOutcome, LogEntry, PopupKind, Presentation};
use crate::state::{AgentId, Position, TeamId};
use crate::stats::BattlerStats;

/// What happened to one target.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetReport {
    pub target: AgentId,
    pub result: EffectResult,
    /// Tiles the target was pushed, if a knockback applied.
    pub knockback: Option<u32>,
    pub defeated: bool,
}

/// The caster as it was when the action started resolving.
pub(super) struct CasterSnapshot {
    pub id: AgentId,
    pub team: TeamId,
    pub position: Position,
    pub stats: BattlerStats,
    pub dealt_rate: f32,
    pub from_player: bool,
    pub inanimate: bool,
}

impl ActionResolver<'_, '_> {
    pub(super) fn capture_caster(&self, action: &Action) -> Result<CasterSnapshot, ActionError> {
        let caster = self
            .field
            .agents
            .get(action.caster)
            .ok_or(ActionError::CasterMissing {
                action: action.id,
                caster: action.caster,
            })?;
        Ok(CasterSnapshot {
            id: caster.id,
            team: action.team,
            position: caster.position,
            stats: caster.stats.clone(),
            dealt_rate: self.status_product(caster, |def| def.aggro_dealt_rate),
            from_player: caster.is_player(),
            inanimate: caster.has(AgentFlags::INANIMATE),
        })
    }

    // ========================================================================
    // Pipeline Orchestration
    // ========================================================================

    /// Runs every pipeline step for one target.
    pub(super) fn apply_primary_effects(
        &mut self,
        action: &Action,
        skill: &SkillDef,
        caster: &CasterSnapshot,
        target: AgentId,
    ) -> Result<TargetReport, ActionError> {
        let target_team = self
            .field
            .agents
            .get(target)
            .ok_or(ActionError::TargetMissing(target))?
            .team;
        let hostile = caster.team.is_opponent_of(target_team);

        // 1. Parry / guard check
        let (parried, guarded) = if hostile {
            self.check_guard(skill, caster, target)?
        } else {
            (false, false)
        };

        // 2. Effect application
        let result = if parried {
            EffectResult::parried()
        } else {
            self.apply_effect(skill, caster, target, guarded)?
        };

        // 3. Aggro
        if hostile {
            self.update_aggro(skill, caster, target, &result)?;
        }

        // 4. On-hit effects
        let mut knockback = None;
        if result.landed() || result.parried {
            knockback = self.on_hit(action, skill, caster, target, &result, hostile)?;
        }

        // 5. Retaliation
        if hostile && !action.retaliation {
            retaliation::retaliate(self, caster, target, &result)?;
        }

        // 6. Post effects
        let defeated = self.post_effects(action, caster, target, &result)?;

        Ok(TargetReport {
            target,
            result,
            knockback,
            defeated,
        })
    }

    // ========================================================================
    // Step 1: Parry / Guard
    // ========================================================================

    /// Returns `(parried, guarded)`.
    ///
    /// A parry needs an open parry window, no dash in progress and no
    /// unparryable status. A guarding target that fails to parry still guards.
    fn check_guard(
        &mut self,
        skill: &SkillDef,
        caster: &CasterSnapshot,
        target: AgentId,
    ) -> Result<(bool, bool), ActionError> {
        let defender = self
            .field
            .agents
            .get(target)
            .ok_or(ActionError::TargetMissing(target))?;
        let guarding = defender.is_guarding();
        let can_parry = defender.in_parry_window()
            && !defender.has(AgentFlags::DASHING)
            && !self.is_unparryable(defender);
        let guard_rate = defender.stats.rates.grd;

        let parried = can_parry && {
            let roll = self.field.roll(self.env, target, RollContext::Parry);
            parry_succeeds(
                roll,
                skill.hit_bonus + caster.stats.rates.hit,
                guard_rate,
                skill.ignore_parry,
            )
        };
        if parried {
            tracing::debug!(defender = %target, attacker = %caster.id, skill = %skill.id, "parried");
        }
        Ok((parried, guarding && !parried))
    }

    fn is_unparryable(&self, agent: &CombatAgent) -> bool {
        agent
            .statuses
            .iter()
            .filter_map(|id| self.env.status(id).ok())
            .any(|def| def.unparryable)
    }

    // ========================================================================
    // Step 2: Effect Application
    // ========================================================================

    fn apply_effect(
        &mut self,
        skill: &SkillDef,
        caster: &CasterSnapshot,
        target: AgentId,
        guarded: bool,
    ) -> Result<EffectResult, ActionError> {
        let env = self.env;
        let config = env.config();
        let defender = self
            .field
            .agents
            .get_mut(target)
            .ok_or(ActionError::TargetMissing(target))?;

        let mut result = env.formula().apply(&FormulaInput {
            skill,
            caster: caster.id,
            target,
            caster_stats: &caster.stats,
            target_stats: &defender.stats,
            guarded,
        });
        result.parried = false;
        result.guarded = guarded;
        if result.missed {
            return Ok(result);
        }

        if guarded && let Some(profile) = defender.guard_profile() {
            result.hp_damage = profile.reduce(result.hp_damage);
        }

        let resources = &mut defender.stats.resources;
        let hp_lost = resources.hp.apply_damage(result.hp_damage);
        let mp_lost = resources.mp.apply_damage(result.mp_damage);
        let tp_lost = resources.tp.apply_damage(result.tp_damage);

        for &status in &result.added_statuses {
            match env.status(status) {
                Ok(def) => {
                    if !defender.statuses.add(status, def.duration_frames, Some(caster.id)) {
                        tracing::warn!(agent = %target, %status, "status list full");
                    }
                }
                Err(error) => log_recovered("apply_status", &ActionError::from(error)),
            }
        }
        for &status in &result.removed_statuses {
            defender.statuses.remove(status);
        }

        if hp_lost > 0 && !defender.stats.is_dead() {
            defender.flinch(config.hurt_pose_frames);
        }

        if result.drain
            && let Some(drainer) = self.field.agents.get_mut(caster.id)
        {
            let resources = &mut drainer.stats.resources;
            resources.hp.restore(hp_lost.max(0) as u32);
            resources.mp.restore(mp_lost.max(0) as u32);
            resources.tp.restore(tp_lost.max(0) as u32);
        }
        Ok(result)
    }

    // ========================================================================
    // Step 3: Aggro
    // ========================================================================

    /// A parry moves threat the other way: the defender's grudge against the
    /// attacker shrinks and the attacker's against the defender grows.
    fn update_aggro(
        &mut self,
        skill: &SkillDef,
        caster: &CasterSnapshot,
        target: AgentId,
        result: &EffectResult,
    ) -> Result<(), ActionError> {
        let config = self.env.config();
        let defender = self
            .field
            .agents
            .get(target)
            .ok_or(ActionError::TargetMissing(target))?;
        let received_rate = self.status_product(defender, |def| def.aggro_received_rate);
        let amount = super::threat(
            config,
            skill,
            result,
            caster.dealt_rate,
            received_rate,
            caster.from_player,
        );

        if result.parried {
            if let Some(defender) = self.field.agents.get_mut(target) {
                defender
                    .aggro
                    .add(caster.id, -amount * config.aggro_parry_factor, false);
            }
            if let Some(attacker) = self.field.agents.get_mut(caster.id) {
                attacker.aggro.add(target, amount, false);
            }
        } else if let Some(defender) = self.field.agents.get_mut(target) {
            defender.aggro.add(caster.id, amount, false);
        }
        Ok(())
    }

    pub(super) fn status_product(&self, agent: &CombatAgent, rate: impl Fn(&StatusDef) -> f32) -> f32 {
        agent
            .statuses
            .iter()
            .filter_map(|id| self.env.status(id).ok())
            .map(rate)
            .product()
    }

    // ========================================================================
    // Step 4: On-Hit
    // ========================================================================

    fn on_hit(
        &mut self,
        action: &Action,
        skill: &SkillDef,
        caster: &CasterSnapshot,
        target: AgentId,
        result: &EffectResult,
        hostile: bool,
    ) -> Result<Option<u32>, ActionError> {
        let env = self.env;
        let config = env.config();

        let animation = if result.parried {
            skill.animations.parry
        } else {
            skill.animations.hit
        };
        if let Some(animation) = animation {
            self.field
                .outbox
                .present(Presentation::Animation { target, animation });
        }

        if let Some(slot) = action.slot
            && let Some(agent) = self.field.agents.get_mut(caster.id)
        {
            combo::continue_combo(agent, slot, skill, config, &mut self.field.outbox);
        }

        if !hostile {
            return Ok(None);
        }

        let defender = self
            .field
            .agents
            .get_mut(target)
            .ok_or(ActionError::TargetMissing(target))?;
        defender.mark_struck_by(caster.id, config.last_hit_frames);

        let mut pushed = None;
        if result.landed() && skill.knocks_back() && !defender.stats.is_dead() {
            pushed = Some(knockback::knock_back(
                defender,
                action.direction,
                skill.knockback,
                env,
                &mut self.field.outbox,
            ));
        }

        if !caster.inanimate {
            self.provoke(target, caster);
        }
        Ok(pushed)
    }

    /// Engages an AI defender with its attacker, or alerts it when the
    /// attacker is out of sight.
    fn provoke(&mut self, target: AgentId, caster: &CasterSnapshot) {
        let config = self.env.config();
        let Some(defender) = self.field.agents.get_mut(target) else {
            return;
        };
        if defender.is_player() || !defender.is_alive() || defender.is_engaged() {
            return;
        }

        if defender.position.distance(caster.position) <= defender.effective_sight() {
            let boosted = defender.engagement.is_alerted();
            match defender.engage(caster.id, boosted) {
                Ok(true) => self.field.outbox.emit(CombatEvent::EngagementChanged {
                    agent: target,
                    target: Some(caster.id),
                }),
                Ok(false) => {}
                Err(error) => log_recovered("provoke", &error),
            }
        } else if defender.alert(caster.id, config.alert_frames) {
            self.field.outbox.emit(CombatEvent::Alerted {
                agent: target,
                source: caster.id,
            });
            crate::ai::propagate_alert(
                &mut self.field.agents,
                target,
                caster.id,
                config,
                &mut self.field.outbox,
            );
        }
    }

    // ========================================================================
    // Step 6: Post Effects
    // ========================================================================

    /// Emits popups and the log line, then defeats a target left at 0 hp.
    fn post_effects(
        &mut self,
        action: &Action,
        caster: &CasterSnapshot,
        target: AgentId,
        result: &EffectResult,
    ) -> Result<bool, ActionError> {
        let outbox = &mut self.field.outbox;
        let popup = |kind, value| Presentation::Popup {
            target,
            kind,
            value,
            critical: result.critical,
        };

        let outcome = if result.missed {
            outbox.present(popup(PopupKind::Miss, 0));
            HitOutcome::Missed
        } else if result.parried {
            outbox.present(popup(PopupKind::Parry, 0));
            HitOutcome::Parried
        } else {
            if result.hp_damage != 0 {
                outbox.present(popup(PopupKind::for_hp(result.hp_damage), result.hp_damage.abs()));
            }
            if result.mp_damage != 0 {
                outbox.present(popup(PopupKind::for_mp(result.mp_damage), result.mp_damage.abs()));
            }
            if result.tp_damage != 0 {
                outbox.present(popup(PopupKind::for_tp(result.tp_damage), result.tp_damage.abs()));
            }
            if result.guarded {
                HitOutcome::Guarded
            } else if result.critical {
                HitOutcome::Critical
            } else {
                HitOutcome::Hit
            }
        };
        outbox.present(Presentation::Log(LogEntry {
            caster: caster.id,
            target,
            skill: action.skill,
            outcome,
            hp_damage: result.hp_damage,
            mp_damage: result.mp_damage,
            tp_damage: result.tp_damage,
        }));

        let defender = self
            .field
            .agents
            .get(target)
            .ok_or(ActionError::TargetMissing(target))?;
        if defender.is_alive() && defender.stats.is_dead() {
            return Ok(self.defeat(target, Some(caster.id)));
        }
        Ok(false)
    }
}
