//! Traits describing the host world.
//!
//! Oracles expose skill and status definitions, map passability, the damage
//! formula service, world event state and deterministic randomness. The
//! [`Env`] aggregate bundles them with the [`CombatConfig`] so the engine and
//! agents reach everything through one explicitly passed context.
mod error;
mod formula;
mod map;
mod rng;
mod skills;
mod statuses;
mod world;

pub use error::{OracleError, ValidationIssue};
pub(crate) use error::{check_non_negative, check_unit};
pub use formula::{EffectResult, FormulaInput, FormulaOracle};
pub use map::{MapOracle, OpenMap};
pub use rng::{PcgRng, RngOracle, RollContext, compute_seed};
pub use skills::{ComboSpec, GuardSpec, Scope, SkillAnimations, SkillDef, SkillOracle};
pub use statuses::{RegenTerm, StatusDef, StatusOracle};
pub use world::{QuietWorld, WorldOracle};

use crate::config::CombatConfig;
use crate::state::{SkillId, StatusId};

/// World context handed to the engine, agents and resolver.
#[derive(Clone, Copy)]
pub struct Env<'a> {
    config: &'a CombatConfig,
    skills: &'a dyn SkillOracle,
    statuses: &'a dyn StatusOracle,
    map: &'a dyn MapOracle,
    formula: &'a dyn FormulaOracle,
    world: &'a dyn WorldOracle,
    rng: &'a dyn RngOracle,
}

impl<'a> Env<'a> {
    pub fn new(
        config: &'a CombatConfig,
        skills: &'a dyn SkillOracle,
        statuses: &'a dyn StatusOracle,
        map: &'a dyn MapOracle,
        formula: &'a dyn FormulaOracle,
        world: &'a dyn WorldOracle,
        rng: &'a dyn RngOracle,
    ) -> Self {
        Self {
            config,
            skills,
            statuses,
            map,
            formula,
            world,
            rng,
        }
    }

    pub fn config(&self) -> &'a CombatConfig {
        self.config
    }

    pub fn map(&self) -> &'a dyn MapOracle {
        self.map
    }

    pub fn formula(&self) -> &'a dyn FormulaOracle {
        self.formula
    }

    pub fn world(&self) -> &'a dyn WorldOracle {
        self.world
    }

    pub fn rng(&self) -> &'a dyn RngOracle {
        self.rng
    }

    /// Resolves a skill definition.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::UnknownSkill` if the id is not defined.
    pub fn skill(&self, id: SkillId) -> Result<&'a SkillDef, OracleError> {
        self.skills.skill(id).ok_or(OracleError::UnknownSkill(id))
    }

    /// Resolves a status definition.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::UnknownStatus` if the id is not defined.
    pub fn status(&self, id: StatusId) -> Result<&'a StatusDef, OracleError> {
        self.statuses.status(id).ok_or(OracleError::UnknownStatus(id))
    }
}

impl core::fmt::Debug for Env<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Env").field("config", self.config).finish_non_exhaustive()
    }
}
