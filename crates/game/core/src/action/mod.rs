//! Actions and their resolution.
//!
//! An [`ActionRequest`] is what an agent emits when it uses a slot, finishes
//! a cast or retaliates. The field turns it into an [`Action`] by resolving
//! the skill's geometry and delay, and the [`ActionResolver`] applies it once
//! the delay has elapsed.
//!
//! # Module Structure
//!
//! - `error`: Action error types
//! - `execute`: Target collection and the per-target effect pipeline

pub mod error;
pub mod execute;

pub use error::ActionError;
pub use execute::{ActionResolver, TargetReport};

use crate::collision::Shape;
use crate::combat::SlotKey;
use crate::env::{Scope, SkillDef};
use crate::state::{ActionId, AgentId, Direction, FrameTimer, Position, SkillId, TeamId};

/// An agent's request to perform a skill.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionRequest {
    pub caster: AgentId,
    pub skill: SkillId,
    /// Slot the skill was used from. `None` for retaliation and defeat skills.
    pub slot: Option<SlotKey>,
    pub team: TeamId,
    pub direction: Direction,
    pub anchor: Position,
    /// Retaliations never trigger further retaliation.
    pub retaliation: bool,
}

/// A queued action. Only the delay changes after creation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Action {
    pub id: ActionId,
    pub skill: SkillId,
    pub caster: AgentId,
    pub team: TeamId,
    pub direction: Direction,
    pub anchor: Position,
    pub shape: Shape,
    pub range: f32,
    pub scope: Scope,
    pub retaliation: bool,
    pub slot: Option<SlotKey>,
    pub delay: FrameTimer,
}

impl Action {
    pub fn new(id: ActionId, request: ActionRequest, skill: &SkillDef) -> Self {
        Self {
            id,
            skill: request.skill,
            caster: request.caster,
            team: request.team,
            direction: request.direction,
            anchor: request.anchor,
            shape: skill.shape.clone(),
            range: skill.range,
            scope: skill.scope,
            retaliation: request.retaliation,
            slot: request.slot,
            delay: FrameTimer::new(skill.delay_frames),
        }
    }

    /// Advances the delay. Returns `true` once the action should resolve.
    pub fn advance(&mut self) -> bool {
        self.delay.is_expired() || self.delay.tick()
    }

    /// Whether `position` lies in this action's area.
    pub fn covers(&self, position: Position) -> bool {
        self.shape
            .contains(position, self.anchor, self.range, self.direction)
    }
}
