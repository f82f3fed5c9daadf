//! Content factory for building oracles from data files.

use std::path::{Path, PathBuf};

use combat_core::{BattlerTemplate, CombatConfig, SkillOracle};

use crate::loaders::{
    BattlerCatalog, BattlerLoader, ConfigLoader, LoadResult, SkillCatalog, SkillLoader,
    StatusCatalog, StatusLoader,
};

/// Everything loaded from one data directory.
///
/// `skills` and `statuses` serve as the skill and status oracles of an
/// `Env`; `battlers` feeds `CombatField::spawn`.
#[derive(Debug, Clone)]
pub struct ContentBundle {
    pub config: CombatConfig,
    pub skills: SkillCatalog,
    pub statuses: StatusCatalog,
    pub battlers: BattlerCatalog,
}

impl ContentBundle {
    pub fn battler(&self, key: &str) -> Option<&BattlerTemplate> {
        self.battlers.get(key)
    }
}

/// Content factory that loads all combat content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── skills.ron
/// ├── statuses.ron
/// └── battlers.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    ///
    /// # Arguments
    ///
    /// * `data_dir` - Path to the directory containing data files
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load combat configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<CombatConfig> {
        let path = self.data_dir.join("config.toml");
        ConfigLoader::load(&path)
    }

    /// Load the skill catalog from `skills.ron`.
    pub fn load_skills(&self) -> LoadResult<SkillCatalog> {
        let path = self.data_dir.join("skills.ron");
        SkillLoader::load(&path)
    }

    /// Load the status catalog from `statuses.ron`.
    pub fn load_statuses(&self) -> LoadResult<StatusCatalog> {
        let path = self.data_dir.join("statuses.ron");
        StatusLoader::load(&path)
    }

    /// Load battler templates from `battlers.ron`.
    ///
    /// # Arguments
    ///
    /// * `skills` - Skill oracle used to check the templates' skill references
    pub fn load_battlers(&self, skills: &dyn SkillOracle) -> LoadResult<BattlerCatalog> {
        let path = self.data_dir.join("battlers.ron");
        BattlerLoader::load(&path, skills)
    }

    /// Load every catalog, in dependency order.
    pub fn load_all(&self) -> LoadResult<ContentBundle> {
        let config = self.load_config()?;
        let skills = self.load_skills()?;
        let statuses = self.load_statuses()?;
        let battlers = self.load_battlers(&skills)?;

        tracing::info!(
            data_dir = %self.data_dir.display(),
            skills = skills.len(),
            statuses = statuses.len(),
            battlers = battlers.len(),
            "combat content loaded"
        );

        Ok(ContentBundle {
            config,
            skills,
            statuses,
            battlers,
        })
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{AgentKind, Scope, SkillId, StatusId};

    fn bundled() -> ContentFactory {
        ContentFactory::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("data"))
    }

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn missing_directory_fails_to_load() {
        let factory = ContentFactory::new("/nonexistent/combat-data");
        assert!(factory.load_all().is_err());
    }

    #[test]
    fn bundled_content_loads() {
        let content = bundled().load_all().expect("bundled data is valid");

        assert_eq!(content.config.frames_per_second, 60);
        assert!(content.config.level_scaling.is_some());

        let guard = &content.skills[&SkillId(3)];
        assert!(guard.is_guard());
        assert_eq!(guard.scope, Scope::User);
        assert_eq!(content.skills[&SkillId(6)].scope, Scope::Allies);

        assert!(content.statuses[&StatusId(4)].unparryable);

        let hero = content.battler("hero").expect("hero template");
        assert_eq!(hero.kind, AgentKind::Actor);
        let slime = content.battler("slime").expect("slime template");
        assert_eq!((slime.exp, slime.gold), (30, 10));
        assert!(content.battler("dragon").is_none());
    }

    #[test]
    fn bundled_templates_spawn() {
        use combat_core::{AgentId, Controller, Position, SlotKey};

        let content = bundled().load_all().expect("bundled data is valid");
        let hero = content.battler("hero").expect("hero template");
        let agent = hero.spawn(AgentId::new(0, 0), Position::new(1.0, 1.0), Controller::Player);
        assert_eq!(agent.cooldowns.get(SlotKey::Guard).and_then(|c| c.skill()), Some(SkillId(3)));
    }
}
