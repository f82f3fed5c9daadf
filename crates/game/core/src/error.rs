//! Common error infrastructure for combat-core.
//!
//! Domain-specific errors (`ActionError`, `AgentError`, `FormulaError`) are
//! defined next to the code that produces them. None of them escape a tick:
//! the engine recovers at the operation boundary and logs them through
//! [`log_recovered`].
//!
//! # Design Principles
//!
//! - **Type Safety**: Each subsystem has its own error enum with specific variants
//! - **Severity Classification**: Errors are categorized for logging priority
//! - **Local Recovery**: The worst effect of bad input is a skipped operation

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Temporary condition; the same request may succeed on a later tick.
    ///
    /// Examples: slot on cooldown, agent busy casting
    Recoverable,

    /// Invalid input that should not be retried unchanged.
    ///
    /// Examples: unknown skill id, stale agent handle
    Validation,

    /// Unexpected inconsistency between oracles and field state.
    ///
    /// Examples: non-finite formula output
    Internal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Common trait for all combat-core errors.
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Static identifier for this error variant, stable across releases.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Logs an error that was recovered locally.
///
/// Recoverable errors are routine (a key pressed during cooldown) and only
/// reach `debug`; everything else is a `warn`.
pub fn log_recovered<E: GameError>(operation: &'static str, error: &E) {
    if error.severity().is_recoverable() {
        tracing::debug!(
            operation,
            code = error.error_code(),
            "{error}"
        );
    } else {
        tracing::warn!(
            operation,
            code = error.error_code(),
            severity = error.severity().as_str(),
            "{error}"
        );
    }
}
