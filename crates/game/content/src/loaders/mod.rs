//! Content loaders for reading game data from files.
//!
//! Each loader reads one file, deserializes it into `combat-core` types and
//! runs their `validate()` checks before handing the result back.

pub mod battlers;
pub mod config;
pub mod factory;
pub mod skills;
pub mod statuses;

pub use battlers::{BattlerCatalog, BattlerLoader};
pub use config::ConfigLoader;
pub use factory::{ContentBundle, ContentFactory};
pub use skills::{SkillCatalog, SkillLoader};
pub use statuses::{StatusCatalog, StatusLoader};

use std::path::Path;

use combat_core::{GameError, ValidationIssue};

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}

/// Fails with every collected issue when `issues` is not empty.
pub(crate) fn reject_invalid(catalog: &'static str, issues: &[ValidationIssue]) -> LoadResult<()> {
    if issues.is_empty() {
        return Ok(());
    }
    for issue in issues {
        tracing::warn!(catalog, code = issue.error_code(), "{issue}");
    }
    let details: Vec<String> = issues.iter().map(ToString::to_string).collect();
    Err(anyhow::anyhow!(
        "Invalid {} ({} issues): {}",
        catalog,
        issues.len(),
        details.join("; ")
    ))
}
