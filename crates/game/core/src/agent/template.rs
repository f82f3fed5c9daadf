//! Typed battler templates.
//!
//! Templates are validated once when content is loaded; agents are then
//! built from them without further checks.

use crate::agent::{AgentFlags, AgentKind, Bounty, CombatAgent, Controller};
use crate::combat::SlotKey;
use crate::env::{ValidationIssue, check_non_negative, check_unit};
use crate::state::{AgentId, AnimationId, Position, SkillId, TeamId};
use crate::stats::{BattlerStats, Params, Rates, ResourceMeter, Resources};

/// Perception and cadence of an AI-driven agent.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AiProfile {
    /// Opponents within this distance are engaged.
    pub sight: f32,
    /// An engaged target farther than this is dropped.
    pub pursuit: f32,
    /// Added to sight while alerted.
    pub alert_sight_boost: f32,
    /// Added to pursuit for engagements that started from an alert.
    pub alert_pursuit_boost: f32,
    /// Frames between two decided actions.
    pub action_interval: u32,
    /// Frames between two combo steps.
    pub combo_interval: u32,
}

impl Default for AiProfile {
    fn default() -> Self {
        Self {
            sight: 5.0,
            pursuit: 8.0,
            alert_sight_boost: 3.0,
            alert_pursuit_boost: 3.0,
            action_interval: 30,
            combo_interval: 10,
        }
    }
}

/// Category of a loot drop, forwarded to the host's spawner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LootKind {
    #[default]
    Item,
    Weapon,
    Armor,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LootDrop {
    pub kind: LootKind,
    pub id: u32,
    /// Drop probability in `[0, 1]`.
    #[cfg_attr(feature = "serde", serde(default = "LootDrop::always"))]
    pub chance: f32,
}

impl LootDrop {
    pub const fn always() -> f32 {
        1.0
    }

    pub const fn new(kind: LootKind, id: u32) -> Self {
        Self {
            kind,
            id,
            chance: 1.0,
        }
    }
}

/// Base stats of a template. Resources start full.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StatBlock {
    pub level: u32,
    pub max_hp: u32,
    pub max_mp: u32,
    pub max_tp: u32,
    pub params: Params,
    pub rates: Rates,
}

impl Default for StatBlock {
    fn default() -> Self {
        Self {
            level: 1,
            max_hp: 100,
            max_mp: 0,
            max_tp: 100,
            params: Params::default(),
            rates: Rates::default(),
        }
    }
}

impl StatBlock {
    pub fn to_stats(&self) -> BattlerStats {
        BattlerStats {
            level: self.level,
            resources: Resources {
                hp: ResourceMeter::full(self.max_hp),
                mp: ResourceMeter::full(self.max_mp),
                tp: ResourceMeter::new(0, self.max_tp),
            },
            params: self.params,
            rates: self.rates,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotBinding {
    pub slot: SlotKey,
    pub skill: SkillId,
}

/// Everything needed to put a battler on the field.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattlerTemplate {
    pub name: String,
    pub kind: AgentKind,
    pub team: TeamId,
    pub stats: StatBlock,
    pub slots: Vec<SlotBinding>,
    pub known_skills: Vec<SkillId>,
    pub ai: AiProfile,
    /// Fired back on a successful auto-counter roll.
    pub counter_skill: Option<SkillId>,
    /// Fired back whenever a hit lands on this battler.
    pub retaliation_skills: Vec<SkillId>,
    /// Used when this battler is defeated.
    pub defeat_skills: Vec<SkillId>,
    pub defeat_animation: Option<AnimationId>,
    pub exp: u32,
    pub gold: u32,
    pub loot: Vec<LootDrop>,
    pub flags: AgentFlags,
}

impl BattlerTemplate {
    /// Collects every problem with this template.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let owner = format!("battler {}", self.name);
        let mut issues = Vec::new();
        let ai = &self.ai;

        check_non_negative(&mut issues, &owner, "ai.sight", ai.sight);
        check_non_negative(&mut issues, &owner, "ai.pursuit", ai.pursuit);
        check_non_negative(&mut issues, &owner, "ai.alert_sight_boost", ai.alert_sight_boost);
        check_non_negative(&mut issues, &owner, "ai.alert_pursuit_boost", ai.alert_pursuit_boost);
        if ai.pursuit < ai.sight {
            issues.push(ValidationIssue::PursuitBelowSight {
                owner: owner.clone(),
                sight: ai.sight,
                pursuit: ai.pursuit,
            });
        }
        if self.stats.max_hp == 0 {
            issues.push(ValidationIssue::Zero {
                owner: owner.clone(),
                field: "stats.max_hp",
            });
        }
        check_unit(
            &mut issues,
            &owner,
            "stats.rates.knockback_resist",
            self.stats.rates.knockback_resist,
        );
        check_non_negative(&mut issues, &owner, "stats.rates.grd", self.stats.rates.grd);
        for drop in &self.loot {
            check_unit(&mut issues, &owner, "loot.chance", drop.chance);
        }
        issues
    }

    /// Every skill this template refers to, with the referring field.
    pub fn skill_references(&self) -> Vec<(&'static str, SkillId)> {
        let mut refs: Vec<_> = self.slots.iter().map(|b| ("slots", b.skill)).collect();
        refs.extend(self.known_skills.iter().map(|&id| ("known_skills", id)));
        refs.extend(self.counter_skill.map(|id| ("counter_skill", id)));
        refs.extend(self.retaliation_skills.iter().map(|&id| ("retaliation_skills", id)));
        refs.extend(self.defeat_skills.iter().map(|&id| ("defeat_skills", id)));
        refs
    }

    /// Builds an agent from this template.
    pub fn spawn(&self, id: AgentId, position: Position, controller: Controller) -> CombatAgent {
        let mut agent = CombatAgent::new(id, self.team, position, self.stats.to_stats());
        agent.name = self.name.clone();
        agent.kind = self.kind;
        agent.controller = controller;
        agent.flags = self.flags;
        agent.ai = self.ai;
        for binding in &self.slots {
            if !agent.cooldowns.equip(binding.slot, Some(binding.skill)) {
                tracing::warn!(battler = %self.name, slot = %binding.slot, "slot table full; binding dropped");
            }
        }
        agent.known_skills = self.known_skills.clone();
        agent.counter_skill = self.counter_skill;
        agent.retaliation_skills = self.retaliation_skills.clone();
        agent.defeat_skills = self.defeat_skills.clone();
        agent.defeat_animation = self.defeat_animation;
        agent.bounty = Bounty {
            exp: self.exp,
            gold: self.gold,
            loot: self.loot.clone(),
        };
        agent
    }
}
