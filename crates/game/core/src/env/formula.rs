//! The damage-formula service.
//!
//! The core never computes damage itself. It flags the context (guarded) and
//! hands caster, target and skill to the host's formula service, then applies
//! the deltas it returns.

use crate::env::SkillDef;
use crate::state::{AgentId, StatusId};
use crate::stats::BattlerStats;

/// Everything the formula service sees for one caster/target pair.
#[derive(Clone, Copy, Debug)]
pub struct FormulaInput<'a> {
    pub skill: &'a SkillDef,
    pub caster: AgentId,
    pub target: AgentId,
    pub caster_stats: &'a BattlerStats,
    pub target_stats: &'a BattlerStats,
    /// The target is guarding. Guard reduction is applied by the core afterwards.
    pub guarded: bool,
}

/// Outcome of one formula evaluation.
///
/// Deltas follow the damage convention: positive drains the target,
/// negative restores it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectResult {
    pub hp_damage: i32,
    pub mp_damage: i32,
    pub tp_damage: i32,
    /// Resource damage dealt is restored to the caster.
    pub drain: bool,
    pub critical: bool,
    /// The formula decided the action missed or was evaded.
    pub missed: bool,
    pub parried: bool,
    pub guarded: bool,
    pub added_statuses: Vec<StatusId>,
    pub removed_statuses: Vec<StatusId>,
}

impl EffectResult {
    /// Result of a parried action: nothing applied.
    pub fn parried() -> Self {
        Self {
            parried: true,
            ..Self::default()
        }
    }

    /// The action connected (not missed, not parried).
    pub fn landed(&self) -> bool {
        !self.missed && !self.parried
    }

    /// Positive hp/mp/tp damage, used for aggro weighting.
    pub fn damage_dealt(&self) -> (u32, u32, u32) {
        (
            self.hp_damage.max(0) as u32,
            self.mp_damage.max(0) as u32,
            self.tp_damage.max(0) as u32,
        )
    }
}

/// Host-provided damage formula service.
pub trait FormulaOracle: Send + Sync {
    fn apply(&self, input: &FormulaInput<'_>) -> EffectResult;
}
