//! Shared in-memory oracles for the integration tests.
#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};

use combat_core::env::{
    EffectResult, Env, FormulaInput, FormulaOracle, MapOracle, QuietWorld, RngOracle, SkillDef,
    StatusDef, WorldOracle,
};
use combat_core::{
    BattlerTemplate, CombatConfig, Direction, SkillId, SlotBinding, SlotKey, StatusId, TeamId,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Routes engine logs to the test harness. Filter with `RUST_LOG`.
pub fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env();
    let fmt_layer = tracing_subscriber::fmt::layer().with_test_writer();
    // Another test in the same binary may have installed it already.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}

/// Formula service returning a fixed result per skill.
#[derive(Default)]
pub struct ScriptedFormula {
    pub default: EffectResult,
    pub per_skill: BTreeMap<SkillId, EffectResult>,
}

impl ScriptedFormula {
    pub fn damage(hp: i32) -> Self {
        Self {
            default: EffectResult {
                hp_damage: hp,
                ..EffectResult::default()
            },
            per_skill: BTreeMap::new(),
        }
    }
}

impl FormulaOracle for ScriptedFormula {
    fn apply(&self, input: &FormulaInput<'_>) -> EffectResult {
        self.per_skill
            .get(&input.skill.id)
            .unwrap_or(&self.default)
            .clone()
    }
}

/// Open floor except for the listed tiles.
#[derive(Default)]
pub struct WallMap {
    pub walls: BTreeSet<(i32, i32)>,
}

impl MapOracle for WallMap {
    fn can_occupy(&self, x: i32, y: i32, _direction: Direction) -> bool {
        !self.walls.contains(&(x, y))
    }
}

/// Rng that always returns the same value; `FixedRng(0)` rolls 0.0.
pub struct FixedRng(pub u32);

impl RngOracle for FixedRng {
    fn next_u32(&self, _seed: u64) -> u32 {
        self.0
    }
}

pub struct Cutscene;

impl WorldOracle for Cutscene {
    fn is_event_running(&self) -> bool {
        true
    }
}

/// Owns every oracle so tests can build an [`Env`] on demand.
pub struct World {
    pub config: CombatConfig,
    pub skills: BTreeMap<SkillId, SkillDef>,
    pub statuses: BTreeMap<StatusId, StatusDef>,
    pub map: WallMap,
    pub formula: ScriptedFormula,
    pub world: Box<dyn WorldOracle>,
    pub rng: FixedRng,
}

impl World {
    pub fn new(formula: ScriptedFormula) -> Self {
        init_tracing();
        Self {
            config: CombatConfig::default(),
            skills: BTreeMap::new(),
            statuses: BTreeMap::new(),
            map: WallMap::default(),
            formula,
            world: Box::new(QuietWorld),
            rng: FixedRng(0),
        }
    }

    pub fn with_skill(mut self, skill: SkillDef) -> Self {
        self.skills.insert(skill.id, skill);
        self
    }

    pub fn with_status(mut self, status: StatusDef) -> Self {
        self.statuses.insert(status.id, status);
        self
    }

    pub fn env(&self) -> Env<'_> {
        Env::new(
            &self.config,
            &self.skills,
            &self.statuses,
            &self.map,
            &self.formula,
            self.world.as_ref(),
            &self.rng,
        )
    }
}

/// A melee skill hitting everything within `range` tiles.
pub fn strike(id: u16, range: f32) -> SkillDef {
    SkillDef {
        range,
        ..SkillDef::new(SkillId(id), "Strike")
    }
}

pub fn battler(name: &str, team: TeamId, max_hp: u32) -> BattlerTemplate {
    let mut template = BattlerTemplate {
        name: name.into(),
        team,
        ..BattlerTemplate::default()
    };
    template.stats.max_hp = max_hp;
    template
}

pub fn with_slot(mut template: BattlerTemplate, slot: SlotKey, skill: u16) -> BattlerTemplate {
    template.slots.push(SlotBinding {
        slot,
        skill: SkillId(skill),
    });
    template.known_skills.push(SkillId(skill));
    template
}
