//! Threat produced by one hostile interaction.

use crate::config::CombatConfig;
use crate::env::{EffectResult, SkillDef};

/// Aggro generated by `result`.
///
/// The base amount applies to every hostile interaction, hit or miss. Only
/// positive damage is weighted; healing never adds threat here. The sum is
/// scaled by the skill multiplier, the caster's dealt rate, the target's
/// received rate and, for player-controlled casters, the player factor.
pub fn threat(
    config: &CombatConfig,
    skill: &SkillDef,
    result: &EffectResult,
    dealt_rate: f32,
    received_rate: f32,
    from_player: bool,
) -> f32 {
    let (hp, mp, tp) = result.damage_dealt();
    let mut amount = config.aggro_base
        + hp as f32 * config.aggro_hp_weight
        + mp as f32 * config.aggro_mp_weight
        + tp as f32 * config.aggro_tp_weight
        + skill.aggro_bonus;
    if result.drain && hp + mp + tp > 0 {
        amount += config.aggro_drain_bonus;
    }

    amount *= skill.aggro_multiplier * dealt_rate * received_rate;
    if from_player {
        amount *= config.player_aggro_factor;
    }
    amount
}
