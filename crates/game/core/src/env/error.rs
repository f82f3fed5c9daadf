//! Oracle lookup and content validation errors.

use crate::error::{ErrorSeverity, GameError};
use crate::state::{SkillId, StatusId};

/// A reference that the oracles could not resolve.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    #[error("skill {0} is not defined")]
    UnknownSkill(SkillId),

    #[error("status {0} is not defined")]
    UnknownStatus(StatusId),
}

impl GameError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            OracleError::UnknownSkill(_) => "ORACLE_UNKNOWN_SKILL",
            OracleError::UnknownStatus(_) => "ORACLE_UNKNOWN_STATUS",
        }
    }
}

/// A problem found while validating a content definition.
///
/// Loaders collect every issue of a catalog before rejecting it, so a single
/// pass reports all mistakes.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ValidationIssue {
    #[error("{owner}: {field} must be finite and non-negative (got {value})")]
    NegativeOrNonFinite {
        owner: String,
        field: &'static str,
        value: f32,
    },

    #[error("{owner}: {field} must lie in [0, 1] (got {value})")]
    OutOfUnitRange {
        owner: String,
        field: &'static str,
        value: f32,
    },

    #[error("{owner}: {field} must be greater than zero")]
    Zero { owner: String, field: &'static str },

    #[error("{owner}: unknown shape `{shape}`")]
    UnknownShape { owner: String, shape: String },

    #[error("{owner}: pursuit radius {pursuit} is smaller than sight radius {sight}")]
    PursuitBelowSight {
        owner: String,
        sight: f32,
        pursuit: f32,
    },

    #[error("{owner}: combo skill refers back to itself")]
    SelfCombo { owner: String },

    #[error("{owner}: {field} refers to undefined {skill}")]
    UnknownSkill {
        owner: String,
        field: &'static str,
        skill: SkillId,
    },

    #[error("{owner}: formula for {field} is invalid ({reason})")]
    Formula {
        owner: String,
        field: &'static str,
        reason: String,
    },
}

impl GameError for ValidationIssue {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            ValidationIssue::NegativeOrNonFinite { .. } => "CONTENT_NEGATIVE_VALUE",
            ValidationIssue::OutOfUnitRange { .. } => "CONTENT_OUT_OF_RANGE",
            ValidationIssue::Zero { .. } => "CONTENT_ZERO_VALUE",
            ValidationIssue::UnknownShape { .. } => "CONTENT_UNKNOWN_SHAPE",
            ValidationIssue::PursuitBelowSight { .. } => "CONTENT_PURSUIT_BELOW_SIGHT",
            ValidationIssue::SelfCombo { .. } => "CONTENT_SELF_COMBO",
            ValidationIssue::UnknownSkill { .. } => "CONTENT_UNKNOWN_SKILL",
            ValidationIssue::Formula { .. } => "CONTENT_INVALID_FORMULA",
        }
    }
}

/// Pushes a [`ValidationIssue::NegativeOrNonFinite`] when `value` is negative or not finite.
pub(crate) fn check_non_negative(
    issues: &mut Vec<ValidationIssue>,
    owner: &str,
    field: &'static str,
    value: f32,
) {
    if !value.is_finite() || value < 0.0 {
        issues.push(ValidationIssue::NegativeOrNonFinite {
            owner: owner.to_string(),
            field,
            value,
        });
    }
}

/// Pushes a [`ValidationIssue::OutOfUnitRange`] when `value` is outside `[0, 1]`.
pub(crate) fn check_unit(
    issues: &mut Vec<ValidationIssue>,
    owner: &str,
    field: &'static str,
    value: f32,
) {
    if !(0.0..=1.0).contains(&value) {
        issues.push(ValidationIssue::OutOfUnitRange {
            owner: owner.to_string(),
            field,
            value,
        });
    }
}
