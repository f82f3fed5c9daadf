//! Status definitions and the status oracle.

use std::collections::BTreeMap;

use crate::env::error::{ValidationIssue, check_non_negative, check_unit};
use crate::formula::{Expr, MAX_DEPTH};
use crate::state::StatusId;
use crate::stats::ResourceKind;

/// Per-application contribution of a status to one resource.
///
/// Positive values restore, negative values drain (slip damage). Each
/// application sums `flat`, `percent` of the maximum and the optional
/// formula, then rounds to an integer.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RegenTerm {
    pub flat: i32,
    pub percent: f32,
    pub formula: Option<Expr>,
}

impl RegenTerm {
    pub fn is_zero(&self) -> bool {
        self.flat == 0 && self.percent == 0.0 && self.formula.is_none()
    }
}

/// Static definition of a status effect.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StatusDef {
    pub id: StatusId,
    pub name: String,
    /// `None` lasts until removed.
    pub duration_frames: Option<u32>,

    pub hp_regen: RegenTerm,
    pub mp_regen: RegenTerm,
    pub tp_regen: RegenTerm,

    /// Multiplies aggro caused by the holder.
    pub aggro_dealt_rate: f32,
    /// Multiplies aggro the holder receives.
    pub aggro_received_rate: f32,
    /// Added to the holder's knockback resistance.
    pub knockback_resist: f32,
    /// The holder cannot parry while this is active.
    pub unparryable: bool,
}

impl StatusDef {
    pub fn new(id: StatusId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn regen(&self, kind: ResourceKind) -> &RegenTerm {
        match kind {
            ResourceKind::Hp => &self.hp_regen,
            ResourceKind::Mp => &self.mp_regen,
            ResourceKind::Tp => &self.tp_regen,
        }
    }

    /// Collects every problem with this definition.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let owner = format!("{} ({})", self.id, self.name);
        let mut issues = Vec::new();

        if self.duration_frames == Some(0) {
            issues.push(ValidationIssue::Zero {
                owner: owner.clone(),
                field: "duration_frames",
            });
        }
        check_non_negative(&mut issues, &owner, "aggro_dealt_rate", self.aggro_dealt_rate);
        check_non_negative(&mut issues, &owner, "aggro_received_rate", self.aggro_received_rate);
        check_unit(&mut issues, &owner, "knockback_resist", self.knockback_resist);

        for (field, term) in [
            ("hp_regen", &self.hp_regen),
            ("mp_regen", &self.mp_regen),
            ("tp_regen", &self.tp_regen),
        ] {
            if !term.percent.is_finite() {
                issues.push(ValidationIssue::NegativeOrNonFinite {
                    owner: owner.clone(),
                    field,
                    value: term.percent,
                });
            }
            let Some(formula) = &term.formula else {
                continue;
            };
            if formula.depth() > MAX_DEPTH {
                issues.push(ValidationIssue::Formula {
                    owner: owner.clone(),
                    field,
                    reason: format!("nesting exceeds {MAX_DEPTH} levels"),
                });
            }
            if !formula.has_finite_bounds() {
                issues.push(ValidationIssue::Formula {
                    owner: owner.clone(),
                    field,
                    reason: "clamp bounds must be finite".to_string(),
                });
            }
        }
        issues
    }
}

impl Default for StatusDef {
    fn default() -> Self {
        Self {
            id: StatusId(0),
            name: String::new(),
            duration_frames: None,
            hp_regen: RegenTerm::default(),
            mp_regen: RegenTerm::default(),
            tp_regen: RegenTerm::default(),
            aggro_dealt_rate: 1.0,
            aggro_received_rate: 1.0,
            knockback_resist: 0.0,
            unparryable: false,
        }
    }
}

/// Read access to status definitions.
pub trait StatusOracle: Send + Sync {
    fn status(&self, id: StatusId) -> Option<&StatusDef>;
}

impl StatusOracle for BTreeMap<StatusId, StatusDef> {
    fn status(&self, id: StatusId) -> Option<&StatusDef> {
        self.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_duration_is_rejected() {
        let status = StatusDef {
            duration_frames: Some(0),
            knockback_resist: 1.5,
            ..StatusDef::new(StatusId(2), "Stun")
        };
        assert_eq!(status.validate().len(), 2);
    }

    #[test]
    fn non_finite_clamp_bounds_are_rejected() {
        let status = StatusDef {
            mp_regen: RegenTerm {
                formula: Some(Expr::Neg(Box::new(Expr::Clamp {
                    value: Box::new(Expr::Var(1)),
                    low: f64::NAN,
                    high: 10.0,
                }))),
                ..RegenTerm::default()
            },
            ..StatusDef::new(StatusId(3), "Drain")
        };
        let issues = status.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].to_string().contains("clamp bounds"));
    }

    #[test]
    fn defaults_are_neutral() {
        let status = StatusDef::new(StatusId(1), "Blessing");
        assert!(status.validate().is_empty());
        assert!(status.regen(ResourceKind::Hp).is_zero());
        assert_eq!(status.aggro_dealt_rate, 1.0);
    }
}
