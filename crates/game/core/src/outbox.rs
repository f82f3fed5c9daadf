//! Outputs drained by the host after each tick.
//!
//! The core never renders, plays sounds or spawns map objects itself. It
//! records what happened here and the host drains the three queues.

use crate::agent::LootKind;
use crate::combat::SlotKey;
use crate::state::{AgentId, AnimationId, Position, SkillId, TeamId};

/// Kind of floating popup shown over an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PopupKind {
    HpDamage,
    HpRecovery,
    MpDamage,
    MpRecovery,
    TpDamage,
    TpRecovery,
    Miss,
    Parry,
}

impl PopupKind {
    /// Popup kind for a signed resource change (positive = damage).
    pub fn for_hp(amount: i32) -> Self {
        if amount >= 0 { Self::HpDamage } else { Self::HpRecovery }
    }

    pub fn for_mp(amount: i32) -> Self {
        if amount >= 0 { Self::MpDamage } else { Self::MpRecovery }
    }

    pub fn for_tp(amount: i32) -> Self {
        if amount >= 0 { Self::TpDamage } else { Self::TpRecovery }
    }
}

/// How an action ended for one target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HitOutcome {
    Hit,
    Critical,
    Guarded,
    Parried,
    Missed,
}

/// One line of the combat log.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogEntry {
    pub caster: AgentId,
    pub target: AgentId,
    pub skill: SkillId,
    pub outcome: HitOutcome,
    pub hp_damage: i32,
    pub mp_damage: i32,
    pub tp_damage: i32,
}

/// Fire-and-forget commands for the presentation layer.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Presentation {
    Animation {
        target: AgentId,
        animation: AnimationId,
    },
    Popup {
        target: AgentId,
        kind: PopupKind,
        value: i32,
        critical: bool,
    },
    Log(LogEntry),
    /// Stationary knockback.
    Hop { agent: AgentId },
    /// Knockback displacement.
    Jump {
        agent: AgentId,
        from: Position,
        to: Position,
    },
}

/// Notifications for gameplay systems outside the core.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatEvent {
    EngagementChanged {
        agent: AgentId,
        target: Option<AgentId>,
    },
    Alerted {
        agent: AgentId,
        source: AgentId,
    },
    ComboQueued {
        agent: AgentId,
        slot: SlotKey,
        skill: SkillId,
    },
    Defeated {
        agent: AgentId,
        by: Option<AgentId>,
    },
    Rewarded {
        team: TeamId,
        exp: u32,
        gold: u32,
    },
    Removed {
        agent: AgentId,
    },
}

/// Request to place something on the map.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpawnRequest {
    pub kind: LootKind,
    pub x: i32,
    pub y: i32,
    pub payload: u32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Outbox {
    presentation: Vec<Presentation>,
    events: Vec<CombatEvent>,
    spawns: Vec<SpawnRequest>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn present(&mut self, command: Presentation) {
        self.presentation.push(command);
    }

    pub fn emit(&mut self, event: CombatEvent) {
        self.events.push(event);
    }

    pub fn spawn(&mut self, request: SpawnRequest) {
        self.spawns.push(request);
    }

    pub fn presentation(&self) -> &[Presentation] {
        &self.presentation
    }

    pub fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    pub fn spawns(&self) -> &[SpawnRequest] {
        &self.spawns
    }

    pub fn drain_presentation(&mut self) -> Vec<Presentation> {
        std::mem::take(&mut self.presentation)
    }

    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn drain_spawns(&mut self) -> Vec<SpawnRequest> {
        std::mem::take(&mut self.spawns)
    }

    pub fn is_empty(&self) -> bool {
        self.presentation.is_empty() && self.events.is_empty() && self.spawns.is_empty()
    }
}
