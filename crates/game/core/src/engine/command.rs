//! Polled player input.

use crate::combat::SlotKey;
use crate::state::{AgentId, Direction};

/// One input for a player-controlled agent, applied at the end of a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerCommand {
    pub agent: AgentId,
    pub input: PlayerInput,
}

impl PlayerCommand {
    pub fn new(agent: AgentId, input: PlayerInput) -> Self {
        Self { agent, input }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlayerInput {
    UseSlot(SlotKey),
    /// Raise (`active`) or lower the guard skill equipped in `slot`.
    Guard { active: bool, slot: SlotKey },
    Dodge { direction: Direction, steps: u32 },
}
