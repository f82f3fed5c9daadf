//! Real-time action combat on top of a turn-based stat model.
//!
//! `combat-core` simulates battlers that move continuously on a field,
//! engage hostile battlers in sight and exchange skills resolved by
//! collision shapes instead of turn order. It is an in-process library: the
//! host supplies definitions and services through the oracles in [`env`],
//! drives [`engine::CombatEngine::tick`] once per frame, and drains the
//! [`outbox::Outbox`] afterwards.
pub mod action;
pub mod agent;
pub mod ai;
pub mod collision;
pub mod combat;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod formula;
pub mod outbox;
pub mod state;
pub mod stats;

pub use action::{Action, ActionError, ActionRequest, ActionResolver, TargetReport};
pub use agent::{
    Activity, AgentError, AgentFlags, AgentKind, AiProfile, BattlerTemplate, CombatAgent,
    Controller, Engagement, FieldSnapshot, Life, LootDrop, LootKind, SlotBinding, SlotUse,
    StatBlock,
};
pub use ai::{TargetChange, TargetingManager};
pub use collision::Shape;
pub use combat::{AggroTable, Cooldown, CooldownTable, GuardProfile, SlotKey};
pub use config::{CombatConfig, LevelScaling};
pub use engine::{CombatEngine, PlayerCommand, PlayerInput, TickReport};
pub use env::{
    EffectResult, Env, FormulaInput, FormulaOracle, MapOracle, OracleError, RngOracle, Scope,
    SkillDef, SkillOracle, StatusDef, StatusOracle, ValidationIssue, WorldOracle,
};
pub use error::{ErrorSeverity, GameError};
pub use outbox::{CombatEvent, Outbox, Presentation, SpawnRequest};
pub use state::{
    ActionId, AgentId, AnimationId, CombatField, Direction, FrameTimer, Position, SkillId,
    StatusId, TeamId,
};
pub use stats::BattlerStats;
