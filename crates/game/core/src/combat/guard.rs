//! Guard stance and parry resolution.

use crate::combat::SlotKey;
use crate::env::SkillDef;
use crate::state::SkillId;

/// Active guard parameters, derived from the skill in the guard slot each
/// time guarding starts.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GuardProfile {
    pub slot: SlotKey,
    pub skill: SkillId,
    pub flat_reduction: i32,
    pub percent_reduction: f32,
    /// Length of the parry window opened when guarding starts.
    pub parry_frames: u32,
    pub counter_guard: Vec<SkillId>,
    pub counter_parry: Vec<SkillId>,
}

impl GuardProfile {
    /// Builds the profile for `skill`, or `None` if it is not a guard skill.
    ///
    /// The parry window is the configured base, plus the skill's bonus, plus
    /// the base scaled by the guard's evasion rate.
    pub fn from_skill(slot: SlotKey, skill: &SkillDef, base_parry_frames: u32, evasion: f32) -> Option<Self> {
        let spec = skill.guard.as_ref()?;
        let boost = (base_parry_frames as f32 * evasion.max(0.0)).round() as u32;
        Some(Self {
            slot,
            skill: skill.id,
            flat_reduction: spec.flat_reduction,
            percent_reduction: spec.percent_reduction.clamp(0.0, 1.0),
            parry_frames: base_parry_frames + spec.parry_bonus_frames + boost,
            counter_guard: spec.counter_guard.clone(),
            counter_parry: spec.counter_parry.clone(),
        })
    }

    /// Reduces guarded hp damage: flat first, then percent. Healing passes through.
    pub fn reduce(&self, damage: i32) -> i32 {
        if damage <= 0 {
            return damage;
        }
        let after_flat = (damage - self.flat_reduction).max(0);
        (after_flat as f32 * (1.0 - self.percent_reduction)).round() as i32
    }
}

/// Parry roll.
///
/// Succeeds when `roll + hit_bonus < guard_rate - 1 - ignore_parry`, with a
/// negative hit bonus treated as zero. A guard rate of 1.0 or below can never
/// parry.
pub fn parry_succeeds(roll: f64, hit_bonus: f32, guard_rate: f32, ignore_parry: f32) -> bool {
    let threshold = guard_rate as f64 - 1.0 - ignore_parry as f64;
    roll + (hit_bonus.max(0.0) as f64) < threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::GuardSpec;

    fn shield(flat: i32, percent: f32) -> SkillDef {
        SkillDef {
            guard: Some(GuardSpec {
                flat_reduction: flat,
                percent_reduction: percent,
                parry_bonus_frames: 3,
                counter_guard: vec![SkillId(8)],
                counter_parry: vec![SkillId(9)],
            }),
            ..SkillDef::new(SkillId(7), "Shield")
        }
    }

    #[test]
    fn flat_then_percent() {
        let profile = GuardProfile::from_skill(SlotKey::Guard, &shield(10, 0.2), 12, 0.0).unwrap();
        assert_eq!(profile.reduce(100), 72);
        assert_eq!(profile.reduce(5), 0);
        assert_eq!(profile.reduce(-30), -30);
    }

    #[test]
    fn parry_window_includes_evasion_boost() {
        let profile = GuardProfile::from_skill(SlotKey::Guard, &shield(0, 0.0), 12, 0.5).unwrap();
        assert_eq!(profile.parry_frames, 12 + 3 + 6);
        assert_eq!(profile.counter_parry, vec![SkillId(9)]);
    }

    #[test]
    fn non_guard_skill_has_no_profile() {
        let slash = SkillDef::new(SkillId(1), "Slash");
        assert!(GuardProfile::from_skill(SlotKey::Guard, &slash, 12, 0.0).is_none());
    }

    #[test]
    fn zero_guard_rate_never_parries() {
        for roll in [0.0, 0.25, 0.5, 0.999] {
            assert!(!parry_succeeds(roll, 0.0, 0.0, 0.0));
        }
    }

    #[test]
    fn ignore_parry_at_threshold_never_parries() {
        let guard_rate = 1.6;
        let ignore = 0.6;
        assert!(!parry_succeeds(0.0, 0.0, guard_rate, ignore));
        assert!(parry_succeeds(0.1, 0.0, guard_rate, 0.0));
        assert!(!parry_succeeds(0.1, 0.55, guard_rate, 0.0));
    }
}
