//! Skill catalog loader.

use std::collections::BTreeMap;
use std::path::Path;

use combat_core::{SkillDef, SkillId, ValidationIssue};
use serde::Deserialize;

use crate::loaders::{LoadResult, read_file, reject_invalid};

/// Skills keyed by id. Implements `SkillOracle` directly.
pub type SkillCatalog = BTreeMap<SkillId, SkillDef>;

/// Skill file structure for RON files.
#[derive(Debug, Deserialize)]
struct SkillFile {
    skills: Vec<SkillDef>,
}

/// Loader for skill definitions from RON files.
pub struct SkillLoader;

impl SkillLoader {
    /// Load a skill catalog from a RON file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the RON file containing the skill list
    pub fn load(path: &Path) -> LoadResult<SkillCatalog> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse and validate a skill catalog from RON text.
    pub fn parse(content: &str) -> LoadResult<SkillCatalog> {
        let file: SkillFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse skills RON: {}", e))?;

        let mut catalog = SkillCatalog::new();
        for skill in file.skills {
            let id = skill.id;
            if catalog.insert(id, skill).is_some() {
                anyhow::bail!("Duplicate skill id {}", id);
            }
        }

        let mut issues: Vec<ValidationIssue> = Vec::new();
        for skill in catalog.values() {
            issues.extend(skill.validate());
            let owner = format!("{} ({})", skill.id, skill.name);
            for (field, referenced) in skill.skill_references() {
                if !catalog.contains_key(&referenced) {
                    issues.push(ValidationIssue::UnknownSkill {
                        owner: owner.clone(),
                        field,
                        skill: referenced,
                    });
                }
            }
        }
        reject_invalid("skill catalog", &issues)?;

        tracing::debug!(count = catalog.len(), "loaded skills");
        Ok(catalog)
    }
}
