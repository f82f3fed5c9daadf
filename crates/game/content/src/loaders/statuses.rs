//! Status catalog loader.

use std::collections::BTreeMap;
use std::path::Path;

use combat_core::{StatusDef, StatusId};
use serde::Deserialize;

use crate::loaders::{LoadResult, read_file, reject_invalid};

/// Statuses keyed by id. Implements `StatusOracle` directly.
pub type StatusCatalog = BTreeMap<StatusId, StatusDef>;

#[derive(Debug, Deserialize)]
struct StatusFile {
    statuses: Vec<StatusDef>,
}

/// Loader for status definitions from RON files.
pub struct StatusLoader;

impl StatusLoader {
    /// Load a status catalog from a RON file.
    pub fn load(path: &Path) -> LoadResult<StatusCatalog> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse and validate a status catalog from RON text.
    pub fn parse(content: &str) -> LoadResult<StatusCatalog> {
        let file: StatusFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse statuses RON: {}", e))?;

        let mut catalog = StatusCatalog::new();
        for status in file.statuses {
            let id = status.id;
            if catalog.insert(id, status).is_some() {
                anyhow::bail!("Duplicate status id {}", id);
            }
        }

        let issues: Vec<_> = catalog.values().flat_map(StatusDef::validate).collect();
        reject_invalid("status catalog", &issues)?;

        tracing::debug!(count = catalog.len(), "loaded statuses");
        Ok(catalog)
    }
}
