//! Engagement transitions.
//!
//! ```text
//! Idle ──engage──► Engaged ──disengage──► Idle
//!  │                  ▲
//!  └──alert──► Alerted ┘ (engage, boosted pursuit)
//!                │
//!                └── timer expires ──► Idle
//! ```

use crate::agent::{AgentError, AgentFlags, CombatAgent, Engagement};
use crate::state::{AgentId, FrameTimer};

impl CombatAgent {
    /// Locks onto `target` and seeds a zero aggro entry for it.
    ///
    /// `boosted` extends pursuit by the alert boost; it is set when the
    /// engagement follows an alert. Returns `Ok(false)` if already engaged
    /// with the same target.
    pub fn engage(&mut self, target: AgentId, boosted: bool) -> Result<bool, AgentError> {
        if self.has(AgentFlags::ENGAGEMENT_LOCKED) {
            return Err(AgentError::EngagementLocked(self.id));
        }
        if self.engagement.target() == Some(target) {
            return Ok(false);
        }

        self.engagement = Engagement::Engaged { target, boosted };
        self.aggro.seed(target);
        tracing::debug!(agent = %self.id, target = %target, boosted, "engaged");
        Ok(true)
    }

    /// Drops the target and every link the engagement created.
    ///
    /// Returns `true` if the agent was engaged.
    pub fn disengage(&mut self) -> bool {
        let was_engaged = self.engagement.is_engaged();
        self.engagement = Engagement::Idle;
        self.ally_target = None;
        self.decided = None;
        self.clear_group();
        if was_engaged {
            tracing::debug!(agent = %self.id, "disengaged");
        }
        was_engaged
    }

    /// Whether an opponent hit may put this agent on alert.
    pub fn can_be_alerted(&self) -> bool {
        self.is_alive()
            && !self.is_player()
            && !self.engagement.is_engaged()
            && !self.has(AgentFlags::INANIMATE)
    }

    /// Enters (or refreshes) the alerted state. Returns `false` if rejected.
    pub fn alert(&mut self, source: AgentId, frames: u32) -> bool {
        if !self.can_be_alerted() {
            return false;
        }
        self.engagement = Engagement::Alerted {
            source,
            timer: FrameTimer::new(frames),
        };
        tracing::debug!(agent = %self.id, source = %source, frames, "alerted");
        true
    }

    /// Sight radius including the alert boost.
    pub fn effective_sight(&self) -> f32 {
        if self.engagement.is_alerted() {
            self.ai.sight + self.ai.alert_sight_boost
        } else {
            self.ai.sight
        }
    }

    /// Pursuit radius including the alert boost of boosted engagements.
    pub fn effective_pursuit(&self) -> f32 {
        match self.engagement {
            Engagement::Engaged { boosted: true, .. } => self.ai.pursuit + self.ai.alert_pursuit_boost,
            _ => self.ai.pursuit,
        }
    }

    /// Advances the alert countdown. Returns `true` when the alert lapses.
    pub(crate) fn tick_alert(&mut self) -> bool {
        if let Engagement::Alerted { timer, .. } = &mut self.engagement
            && timer.tick()
        {
            self.engagement = Engagement::Idle;
            tracing::trace!(agent = %self.id, "alert lapsed");
            return true;
        }
        false
    }
}
