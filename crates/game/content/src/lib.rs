//! Data-driven content definitions and loaders.
//!
//! This crate turns RON/TOML data files into the typed definitions consumed by
//! `combat-core`:
//! - Skill catalogs (data-driven via RON)
//! - Status catalogs (data-driven via RON)
//! - Battler templates (data-driven via RON)
//! - Combat configuration (data-driven via TOML)
//!
//! Every definition is validated once at load time. A catalog with any invalid
//! entry is rejected as a whole, so the engine never sees broken content.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    BattlerCatalog, BattlerLoader, ConfigLoader, ContentBundle, ContentFactory, SkillCatalog,
    SkillLoader, StatusCatalog, StatusLoader,
};
