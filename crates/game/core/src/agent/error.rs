use crate::combat::SlotKey;
use crate::env::OracleError;
use crate::error::{ErrorSeverity, GameError};
use crate::state::{AgentId, SkillId};

/// Errors raised by agent operations (slot use, guard, dodge, engagement).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    #[error("agent {0} is not alive")]
    NotAlive(AgentId),

    #[error("agent {agent} has no {slot} slot")]
    UnknownSlot { agent: AgentId, slot: SlotKey },

    #[error("{slot} slot of agent {agent} is cooling down")]
    OnCooldown { agent: AgentId, slot: SlotKey },

    #[error("agent {0} is busy")]
    Busy(AgentId),

    #[error("agent {agent} cannot pay for {skill}")]
    InsufficientResources { agent: AgentId, skill: SkillId },

    #[error("{0} is not a guard skill")]
    NotAGuardSkill(SkillId),

    #[error("{0} is a guard stance and cannot be used as an action")]
    GuardStance(SkillId),

    #[error("agent {0} is engagement-locked")]
    EngagementLocked(AgentId),

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

impl GameError for AgentError {
    fn severity(&self) -> ErrorSeverity {
        use AgentError::*;
        match self {
            OnCooldown { .. } | Busy(_) | InsufficientResources { .. } | EngagementLocked(_) => {
                ErrorSeverity::Recoverable
            }
            NotAlive(_) | UnknownSlot { .. } | NotAGuardSkill(_) | GuardStance(_) => {
                ErrorSeverity::Validation
            }
            Oracle(inner) => inner.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        use AgentError::*;
        match self {
            NotAlive(_) => "AGENT_NOT_ALIVE",
            UnknownSlot { .. } => "AGENT_UNKNOWN_SLOT",
            OnCooldown { .. } => "AGENT_ON_COOLDOWN",
            Busy(_) => "AGENT_BUSY",
            InsufficientResources { .. } => "AGENT_INSUFFICIENT_RESOURCES",
            NotAGuardSkill(_) => "AGENT_NOT_A_GUARD_SKILL",
            GuardStance(_) => "AGENT_GUARD_STANCE",
            EngagementLocked(_) => "AGENT_ENGAGEMENT_LOCKED",
            Oracle(inner) => inner.error_code(),
        }
    }
}
