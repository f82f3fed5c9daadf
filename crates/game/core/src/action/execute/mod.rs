//! Action resolution.
//!
//! ## Resolution Flow
//!
//! 1. Resolve the skill and capture the caster
//! 2. Collect targets (scope + collision shape)
//! 3. Run [`ActionResolver::apply_primary_effects`] for each target
//!
//! ## Error Handling
//!
//! Internal steps return `Result<_, ActionError>`. [`ActionResolver::resolve`]
//! is the boundary: a failing target or action is logged and skipped, and
//! the remaining targets still resolve.

mod aggro;
mod combo;
mod defeat;
mod knockback;
mod pipeline;
mod retaliation;
mod targets;

pub use aggro::threat;
pub use knockback::knockback_distance;
pub use pipeline::TargetReport;

use crate::action::{Action, ActionError};
use crate::env::{Env, SkillDef};
use crate::error::log_recovered;
use crate::outbox::Presentation;
use crate::state::CombatField;

/// Applies actions to the field.
pub struct ActionResolver<'f, 'e> {
    field: &'f mut CombatField,
    env: &'f Env<'e>,
}

impl<'f, 'e> ActionResolver<'f, 'e> {
    pub fn new(field: &'f mut CombatField, env: &'f Env<'e>) -> Self {
        Self { field, env }
    }

    /// Resolves every pending action whose delay has elapsed.
    ///
    /// Actions queued while resolving (retaliations, defeat skills) are kept
    /// for the next pass. Returns how many actions resolved.
    pub fn resolve_pending(&mut self) -> usize {
        let mut waiting = Vec::new();
        let mut resolved = 0;

        for mut action in std::mem::take(&mut self.field.pending) {
            if action.advance() {
                self.resolve(&action);
                resolved += 1;
            } else {
                waiting.push(action);
            }
        }

        // Waiting actions keep their place ahead of the newly queued ones.
        waiting.append(&mut self.field.pending);
        self.field.pending = waiting;
        resolved
    }

    /// Resolves one action against every target it covers.
    ///
    /// Never fails; problems are logged and the affected target skipped.
    pub fn resolve(&mut self, action: &Action) -> Vec<TargetReport> {
        let skill = match self.env.skill(action.skill) {
            Ok(skill) => skill,
            Err(error) => {
                log_recovered("resolve_action", &ActionError::from(error));
                return Vec::new();
            }
        };
        let caster = match self.capture_caster(action) {
            Ok(caster) => caster,
            Err(error) => {
                log_recovered("resolve_action", &error);
                return Vec::new();
            }
        };
        self.play_cast_animation(action, skill);

        let targets = self.collect_targets(action);
        tracing::trace!(action = %action.id, skill = %action.skill, targets = targets.len(), "resolving");

        let mut reports = Vec::with_capacity(targets.len());
        for target in targets {
            match self.apply_primary_effects(action, skill, &caster, target) {
                Ok(report) => reports.push(report),
                Err(error) => log_recovered("apply_primary_effects", &error),
            }
        }
        reports
    }

    fn play_cast_animation(&mut self, action: &Action, skill: &SkillDef) {
        if let Some(animation) = skill.animations.cast {
            self.field.outbox.present(Presentation::Animation {
                target: action.caster,
                animation,
            });
        }
    }
}
