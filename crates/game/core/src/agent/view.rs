//! Start-of-tick snapshot.
//!
//! AI decisions and regen formulas read other agents through this snapshot,
//! so everything decided in a tick sees the field as it was when the tick
//! began, regardless of update order.

use crate::agent::{AgentFlags, AgentKind, CombatAgent, Controller, Engagement};
use crate::state::{AgentId, Arena, Direction, Position, TeamId};
use crate::stats::BattlerStats;

/// Read-only copy of the parts of an agent other agents may look at.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentView {
    pub id: AgentId,
    pub team: TeamId,
    pub kind: AgentKind,
    pub controller: Controller,
    pub position: Position,
    pub facing: Direction,
    pub flags: AgentFlags,
    pub alive: bool,
    pub engagement: Engagement,
    pub stats: BattlerStats,
}

impl AgentView {
    pub fn of(agent: &CombatAgent) -> Self {
        Self {
            id: agent.id,
            team: agent.team,
            kind: agent.kind,
            controller: agent.controller,
            position: agent.position,
            facing: agent.facing,
            flags: agent.flags,
            alive: agent.is_alive() && !agent.stats.is_dead(),
            engagement: agent.engagement,
            stats: agent.stats.clone(),
        }
    }

    pub fn has(&self, flag: AgentFlags) -> bool {
        self.flags.contains(flag)
    }

    pub fn is_player(&self) -> bool {
        self.controller == Controller::Player
    }

    /// Alive and visible; the only agents AI may consider.
    pub fn is_present(&self) -> bool {
        self.alive && !self.has(AgentFlags::HIDDEN)
    }
}

/// Views of every agent on the field, in arena order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldSnapshot {
    views: Vec<AgentView>,
}

impl FieldSnapshot {
    pub fn capture(agents: &Arena<CombatAgent>) -> Self {
        Self {
            views: agents.iter().map(|(_, agent)| AgentView::of(agent)).collect(),
        }
    }

    pub fn get(&self, id: AgentId) -> Option<&AgentView> {
        self.views.iter().find(|view| view.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AgentView> {
        self.views.iter()
    }

    /// Player-controlled agents.
    pub fn players(&self) -> impl Iterator<Item = &AgentView> {
        self.views.iter().filter(|view| view.is_player())
    }
}
