//! Sandboxed numeric formulas for custom status contributions.
//!
//! Content authors can attach a formula to a status regen term (for example
//! "5% of the caster's MAT plus shared variable 3"). Formulas are a closed AST
//! bound to a fixed variable set: the caster's stats, the target's stats and
//! the host's shared variables. There is no way to reach anything else, and
//! evaluation is bounded by [`MAX_DEPTH`].
//!
//! ## Examples
//!
//! ```
//! use combat_core::formula::Expr;
//! use combat_core::stats::StatKey;
//!
//! // -(target max hp * 0.05 + variable 3)
//! let poison = Expr::Neg(Box::new(Expr::Sum(vec![
//!     Expr::Product(vec![Expr::Target(StatKey::MaxHp), Expr::Constant(0.05)]),
//!     Expr::Var(3),
//! ])));
//! # let _ = poison;
//! ```

pub mod evaluate;

pub use evaluate::{FormulaError, FormulaScope, SharedVars, evaluate};

use crate::stats::StatKey;

/// Deepest nesting accepted by the evaluator.
pub const MAX_DEPTH: usize = 32;

// ============================================================================
// Formula Definition
// ============================================================================

/// Formula for calculating a numeric value.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Expr {
    /// Fixed constant value.
    Constant(f64),

    /// A stat of the battler that applied the effect.
    Caster(StatKey),

    /// A stat of the battler the effect applies to.
    Target(StatKey),

    /// Host-owned shared variable. Unset variables read as 0.
    Var(u16),

    Sum(Vec<Expr>),
    Product(Vec<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
    Min(Vec<Expr>),
    Max(Vec<Expr>),

    /// Clamps `value` into `[low, high]`.
    Clamp {
        value: Box<Expr>,
        low: f64,
        high: f64,
    },
}

impl Expr {
    /// Nesting depth of this expression (a leaf has depth 1).
    pub fn depth(&self) -> usize {
        match self {
            Expr::Constant(_) | Expr::Caster(_) | Expr::Target(_) | Expr::Var(_) => 1,
            Expr::Sum(items) | Expr::Product(items) | Expr::Min(items) | Expr::Max(items) => {
                1 + items.iter().map(Expr::depth).max().unwrap_or(0)
            }
            Expr::Sub(a, b) | Expr::Div(a, b) => 1 + a.depth().max(b.depth()),
            Expr::Neg(inner) => 1 + inner.depth(),
            Expr::Clamp { value, .. } => 1 + value.depth(),
        }
    }

    /// Whether every `Clamp` in this expression has finite bounds.
    pub fn has_finite_bounds(&self) -> bool {
        match self {
            Expr::Constant(_) | Expr::Caster(_) | Expr::Target(_) | Expr::Var(_) => true,
            Expr::Sum(items) | Expr::Product(items) | Expr::Min(items) | Expr::Max(items) => {
                items.iter().all(Expr::has_finite_bounds)
            }
            Expr::Sub(a, b) | Expr::Div(a, b) => a.has_finite_bounds() && b.has_finite_bounds(),
            Expr::Neg(inner) => inner.has_finite_bounds(),
            Expr::Clamp { value, low, high } => {
                low.is_finite() && high.is_finite() && value.has_finite_bounds()
            }
        }
    }
}
