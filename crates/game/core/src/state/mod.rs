//! Field state.
//!
//! Handles, timers, status containers and the [`CombatField`] that owns every
//! agent. The engine mutates the field; hosts read it between ticks.
mod arena;
mod common;
mod field;
mod status;
mod timer;

pub use arena::Arena;
pub use common::{
    ActionId, AgentId, AnimationId, Direction, Position, SkillId, StatusId, TeamId,
};
pub use field::{AgentArena, CombatField, Reward, RewardLedger};
pub use status::{ActiveStatus, ActiveStatuses};
pub use timer::FrameTimer;
