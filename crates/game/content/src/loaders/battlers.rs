//! Battler template loader.

use std::collections::BTreeMap;
use std::path::Path;

use combat_core::{BattlerTemplate, SkillOracle, ValidationIssue};

use crate::loaders::{LoadResult, read_file, reject_invalid};

/// Templates keyed by their content key (e.g. `"slime"`).
pub type BattlerCatalog = BTreeMap<String, BattlerTemplate>;

/// Loader for battler templates from RON files.
///
/// The file holds a list of `(key, template)` pairs. Every skill a template
/// refers to must exist in the skill oracle passed to [`BattlerLoader::load`].
pub struct BattlerLoader;

impl BattlerLoader {
    /// Load battler templates from a RON file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the RON file containing the template list
    /// * `skills` - Skills the templates may refer to
    pub fn load(path: &Path, skills: &dyn SkillOracle) -> LoadResult<BattlerCatalog> {
        let content = read_file(path)?;
        Self::parse(&content, skills)
    }

    /// Parse and validate battler templates from RON text.
    pub fn parse(content: &str, skills: &dyn SkillOracle) -> LoadResult<BattlerCatalog> {
        let entries: Vec<(String, BattlerTemplate)> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse battlers RON: {}", e))?;

        let mut catalog = BattlerCatalog::new();
        let mut issues = Vec::new();
        for (key, template) in entries {
            issues.extend(template.validate());
            for (field, skill) in template.skill_references() {
                if skills.skill(skill).is_none() {
                    issues.push(ValidationIssue::UnknownSkill {
                        owner: format!("battler {key}"),
                        field,
                        skill,
                    });
                }
            }
            if catalog.insert(key.clone(), template).is_some() {
                anyhow::bail!("Duplicate battler key {}", key);
            }
        }
        reject_invalid("battler catalog", &issues)?;

        tracing::debug!(count = catalog.len(), "loaded battlers");
        Ok(catalog)
    }
}
