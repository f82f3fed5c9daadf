//! Action resolution errors.

use crate::env::OracleError;
use crate::error::{ErrorSeverity, GameError};
use crate::state::{ActionId, AgentId};

/// Errors that can occur while resolving an action.
///
/// None of these leave the resolver: the failed action or target is skipped
/// and the error logged.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// The caster was removed before its action resolved.
    #[error("caster {caster} of {action} is gone")]
    CasterMissing { action: ActionId, caster: AgentId },

    /// A collected target disappeared mid-resolution.
    #[error("target {0} is gone")]
    TargetMissing(AgentId),

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

impl GameError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            ActionError::CasterMissing { .. } | ActionError::TargetMissing(_) => {
                ErrorSeverity::Recoverable
            }
            ActionError::Oracle(inner) => inner.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ActionError::CasterMissing { .. } => "ACTION_CASTER_MISSING",
            ActionError::TargetMissing(_) => "ACTION_TARGET_MISSING",
            ActionError::Oracle(inner) => inner.error_code(),
        }
    }
}
