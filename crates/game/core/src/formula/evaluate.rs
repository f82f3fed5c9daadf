//! Formula evaluation logic.

use std::collections::BTreeMap;

use crate::error::{ErrorSeverity, GameError};
use crate::formula::{Expr, MAX_DEPTH};
use crate::stats::BattlerStats;

/// Errors produced while evaluating a formula.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum FormulaError {
    #[error("formula produced a non-finite value ({0})")]
    NonFinite(f64),

    #[error("formula nesting exceeds {MAX_DEPTH} levels")]
    TooDeep,

    #[error("formula has an empty {0} list")]
    EmptyList(&'static str),

    #[error("clamp bounds [{low}, {high}] are not finite")]
    NonFiniteBounds { low: f64, high: f64 },
}

impl GameError for FormulaError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        match self {
            FormulaError::NonFinite(_) => "FORMULA_NON_FINITE",
            FormulaError::TooDeep => "FORMULA_TOO_DEEP",
            FormulaError::EmptyList(_) => "FORMULA_EMPTY_LIST",
            FormulaError::NonFiniteBounds { .. } => "FORMULA_NON_FINITE_BOUNDS",
        }
    }
}

/// Host-owned numeric variables readable by formulas.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SharedVars {
    values: BTreeMap<u16, f64>,
}

impl SharedVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: u16) -> f64 {
        self.values.get(&id).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, id: u16, value: f64) {
        self.values.insert(id, value);
    }
}

/// The complete set of bindings a formula can see.
#[derive(Clone, Copy, Debug)]
pub struct FormulaScope<'a> {
    pub caster: &'a BattlerStats,
    pub target: &'a BattlerStats,
    pub vars: &'a SharedVars,
}

/// Evaluates `expr` within `scope`.
///
/// ## Error Handling
/// - `TooDeep` if the expression nests deeper than [`MAX_DEPTH`]
/// - `EmptyList` for `Min`/`Max` with no operands
/// - `NonFiniteBounds` for a `Clamp` whose bounds are NaN or infinite
/// - `NonFinite` if the result is NaN or infinite (e.g. division by zero)
pub fn evaluate(expr: &Expr, scope: &FormulaScope<'_>) -> Result<f64, FormulaError> {
    if expr.depth() > MAX_DEPTH {
        return Err(FormulaError::TooDeep);
    }
    let value = eval(expr, scope)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FormulaError::NonFinite(value))
    }
}

fn eval(expr: &Expr, scope: &FormulaScope<'_>) -> Result<f64, FormulaError> {
    match expr {
        Expr::Constant(value) => Ok(*value),
        Expr::Caster(key) => Ok(scope.caster.value(*key)),
        Expr::Target(key) => Ok(scope.target.value(*key)),
        Expr::Var(id) => Ok(scope.vars.get(*id)),

        Expr::Sum(items) => items.iter().try_fold(0.0, |acc, e| Ok(acc + eval(e, scope)?)),

        Expr::Product(items) => items.iter().try_fold(1.0, |acc, e| Ok(acc * eval(e, scope)?)),

        Expr::Sub(a, b) => Ok(eval(a, scope)? - eval(b, scope)?),

        Expr::Div(a, b) => Ok(eval(a, scope)? / eval(b, scope)?),

        Expr::Neg(inner) => Ok(-eval(inner, scope)?),

        Expr::Min(items) => {
            if items.is_empty() {
                return Err(FormulaError::EmptyList("min"));
            }
            items
                .iter()
                .try_fold(f64::INFINITY, |acc, e| Ok(acc.min(eval(e, scope)?)))
        }

        Expr::Max(items) => {
            if items.is_empty() {
                return Err(FormulaError::EmptyList("max"));
            }
            items
                .iter()
                .try_fold(f64::NEG_INFINITY, |acc, e| Ok(acc.max(eval(e, scope)?)))
        }

        Expr::Clamp { value, low, high } => {
            if !low.is_finite() || !high.is_finite() {
                return Err(FormulaError::NonFiniteBounds {
                    low: *low,
                    high: *high,
                });
            }
            Ok(eval(value, scope)?.clamp(*low, high.max(*low)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatKey;

    fn scope<'a>(caster: &'a BattlerStats, target: &'a BattlerStats, vars: &'a SharedVars) -> FormulaScope<'a> {
        FormulaScope {
            caster,
            target,
            vars,
        }
    }

    #[test]
    fn percent_of_target_max_hp_plus_variable() {
        let caster = BattlerStats::default();
        let target = BattlerStats::new(1, 200, 0);
        let mut vars = SharedVars::new();
        vars.set(3, 4.0);

        let expr = Expr::Sum(vec![
            Expr::Product(vec![Expr::Target(StatKey::MaxHp), Expr::Constant(0.05)]),
            Expr::Var(3),
        ]);
        assert_eq!(evaluate(&expr, &scope(&caster, &target, &vars)), Ok(14.0));
    }

    #[test]
    fn division_by_zero_is_rejected() {
        let stats = BattlerStats::default();
        let vars = SharedVars::new();
        let expr = Expr::Div(Box::new(Expr::Constant(1.0)), Box::new(Expr::Var(9)));
        assert!(matches!(
            evaluate(&expr, &scope(&stats, &stats, &vars)),
            Err(FormulaError::NonFinite(_))
        ));
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let stats = BattlerStats::default();
        let vars = SharedVars::new();
        let mut expr = Expr::Constant(1.0);
        for _ in 0..MAX_DEPTH {
            expr = Expr::Neg(Box::new(expr));
        }
        assert_eq!(
            evaluate(&expr, &scope(&stats, &stats, &vars)),
            Err(FormulaError::TooDeep)
        );
    }

    #[test]
    fn clamp_and_min_max() {
        let stats = BattlerStats::default();
        let vars = SharedVars::new();
        let expr = Expr::Clamp {
            value: Box::new(Expr::Max(vec![Expr::Constant(3.0), Expr::Constant(12.0)])),
            low: 0.0,
            high: 10.0,
        };
        assert_eq!(evaluate(&expr, &scope(&stats, &stats, &vars)), Ok(10.0));
        assert!(evaluate(&Expr::Min(vec![]), &scope(&stats, &stats, &vars)).is_err());
    }

    #[test]
    fn inverted_clamp_collapses_to_low() {
        let stats = BattlerStats::default();
        let vars = SharedVars::new();
        let expr = Expr::Clamp {
            value: Box::new(Expr::Constant(7.0)),
            low: 5.0,
            high: 2.0,
        };
        assert_eq!(evaluate(&expr, &scope(&stats, &stats, &vars)), Ok(5.0));
    }

    #[test]
    fn nan_clamp_bound_is_an_error() {
        let stats = BattlerStats::default();
        let vars = SharedVars::new();
        let expr = Expr::Clamp {
            value: Box::new(Expr::Constant(3.0)),
            low: f64::NAN,
            high: 10.0,
        };
        assert!(matches!(
            evaluate(&expr, &scope(&stats, &stats, &vars)),
            Err(FormulaError::NonFiniteBounds { .. })
        ));
    }
}
