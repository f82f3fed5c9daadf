//! Skill definitions and the skill oracle.

use std::collections::BTreeMap;

use crate::collision::Shape;
use crate::env::error::{ValidationIssue, check_non_negative, check_unit};
use crate::state::{AnimationId, SkillId, TeamId};

/// Which agents an action may affect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Scope {
    /// Only the caster. Bypasses geometry.
    User,
    /// Agents on other teams.
    #[default]
    Opponents,
    /// Agents on the caster's team, the caster included.
    Allies,
    /// Every agent inside the area.
    Everyone,
}

impl Scope {
    pub fn targets_user(self) -> bool {
        matches!(self, Scope::User)
    }

    pub fn is_for_allies(self) -> bool {
        matches!(self, Scope::Allies)
    }

    /// Whether an agent of `target` team matches this scope for an action of `action` team.
    pub fn accepts(self, action: TeamId, target: TeamId) -> bool {
        match self {
            Scope::User => false,
            Scope::Opponents => action.is_opponent_of(target),
            Scope::Allies => !action.is_opponent_of(target),
            Scope::Everyone => true,
        }
    }
}

/// Follow-up skill queued after a skill lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComboSpec {
    pub skill: SkillId,
    /// Frames before the follow-up becomes usable.
    #[cfg_attr(feature = "serde", serde(default))]
    pub delay_frames: u32,
}

/// Guard behaviour of a skill equipped in a guard slot.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GuardSpec {
    /// Subtracted from guarded hp damage before the percentage applies.
    pub flat_reduction: i32,
    /// Fraction of the remaining damage removed, in `[0, 1]`.
    pub percent_reduction: f32,
    /// Extra parry-window frames on top of the configured base.
    pub parry_bonus_frames: u32,
    /// Skills fired back at an attacker whose hit was guarded.
    pub counter_guard: Vec<SkillId>,
    /// Skills fired back at an attacker whose hit was parried.
    pub counter_parry: Vec<SkillId>,
}

/// Animations played for a skill. `None` plays nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SkillAnimations {
    pub cast: Option<AnimationId>,
    pub hit: Option<AnimationId>,
    pub parry: Option<AnimationId>,
}

/// Static definition of a skill.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SkillDef {
    pub id: SkillId,
    pub name: String,
    pub scope: Scope,
    pub shape: Shape,
    /// Reach of the effect area in tiles.
    pub range: f32,

    pub cooldown_frames: u32,
    /// Wind-up before the action is emitted. Zero emits immediately.
    pub cast_frames: u32,
    /// Frames an emitted action waits before it resolves.
    pub delay_frames: u32,
    /// Cool down only the slot that used the skill.
    pub unique_cooldown: bool,

    pub mp_cost: u32,
    pub tp_cost: u32,

    pub combo: Option<ComboSpec>,
    /// Knockback distance in tiles.
    pub knockback: u32,
    /// Direct skills never knock back.
    pub direct: bool,

    pub aggro_bonus: f32,
    pub aggro_multiplier: f32,

    /// Subtracted from the defender's parry chance.
    pub ignore_parry: f32,
    /// Added to the parry roll; higher makes parrying harder.
    pub hit_bonus: f32,

    pub guard: Option<GuardSpec>,
    pub animations: SkillAnimations,
}

impl SkillDef {
    pub fn new(id: SkillId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn is_guard(&self) -> bool {
        self.guard.is_some()
    }

    /// Whether a landed hit of this skill knocks the target back.
    pub fn knocks_back(&self) -> bool {
        !self.direct && self.knockback > 0
    }

    /// Every other skill this definition refers to, with the referring field.
    pub fn skill_references(&self) -> Vec<(&'static str, SkillId)> {
        let mut refs = Vec::new();
        if let Some(combo) = self.combo {
            refs.push(("combo.skill", combo.skill));
        }
        if let Some(guard) = &self.guard {
            refs.extend(guard.counter_guard.iter().map(|&id| ("guard.counter_guard", id)));
            refs.extend(guard.counter_parry.iter().map(|&id| ("guard.counter_parry", id)));
        }
        refs
    }

    /// Collects every problem with this definition.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let owner = format!("{} ({})", self.id, self.name);
        let mut issues = Vec::new();

        if !self.shape.is_known() {
            issues.push(ValidationIssue::UnknownShape {
                owner: owner.clone(),
                shape: self.shape.name().to_string(),
            });
        }
        check_non_negative(&mut issues, &owner, "range", self.range);
        check_non_negative(&mut issues, &owner, "aggro_multiplier", self.aggro_multiplier);
        check_unit(&mut issues, &owner, "ignore_parry", self.ignore_parry);
        if !self.aggro_bonus.is_finite() {
            issues.push(ValidationIssue::NegativeOrNonFinite {
                owner: owner.clone(),
                field: "aggro_bonus",
                value: self.aggro_bonus,
            });
        }
        if let Some(combo) = self.combo
            && combo.skill == self.id
        {
            issues.push(ValidationIssue::SelfCombo {
                owner: owner.clone(),
            });
        }
        if let Some(guard) = &self.guard {
            check_unit(&mut issues, &owner, "guard.percent_reduction", guard.percent_reduction);
            check_non_negative(
                &mut issues,
                &owner,
                "guard.flat_reduction",
                guard.flat_reduction as f32,
            );
        }
        issues
    }
}

impl Default for SkillDef {
    fn default() -> Self {
        Self {
            id: SkillId(0),
            name: String::new(),
            scope: Scope::Opponents,
            shape: Shape::Circle,
            range: 1.0,
            cooldown_frames: 0,
            cast_frames: 0,
            delay_frames: 0,
            unique_cooldown: false,
            mp_cost: 0,
            tp_cost: 0,
            combo: None,
            knockback: 0,
            direct: false,
            aggro_bonus: 0.0,
            aggro_multiplier: 1.0,
            ignore_parry: 0.0,
            hit_bonus: 0.0,
            guard: None,
            animations: SkillAnimations::default(),
        }
    }
}

/// Read access to skill definitions.
pub trait SkillOracle: Send + Sync {
    fn skill(&self, id: SkillId) -> Option<&SkillDef>;
}

impl SkillOracle for BTreeMap<SkillId, SkillDef> {
    fn skill(&self, id: SkillId) -> Option<&SkillDef> {
        self.get(&id)
    }
}
