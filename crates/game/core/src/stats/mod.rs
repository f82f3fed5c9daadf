//! Stats component.
//!
//! The turn-based stat model underneath the action layer. Combat agents carry a
//! [`BattlerStats`] by composition; the opaque formula service reads it and the
//! resolution engine writes resource deltas back into it. Nothing in here knows
//! about positions, teams or timers.

mod resources;

pub use resources::{ResourceKind, ResourceMeter, Resources};

/// Base battle parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Params {
    pub atk: i32,
    pub def: i32,
    pub mat: i32,
    pub mdf: i32,
    pub agi: i32,
    pub luk: i32,
}

/// Rate-style stats, expressed as fractions (1.0 = 100%).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Rates {
    /// Hit bonus added to the parry roll of this battler's attacks.
    pub hit: f32,
    /// Evasion; also lengthens the parry window.
    pub eva: f32,
    /// Auto-counter chance.
    pub cnt: f32,
    /// Guard effect rate. Values above 1.0 open a parry chance.
    pub grd: f32,
    /// Knockback resistance in `[0, 1]`.
    pub knockback_resist: f32,
}

impl Default for Rates {
    fn default() -> Self {
        Self {
            hit: 0.0,
            eva: 0.0,
            cnt: 0.0,
            grd: 1.0,
            knockback_resist: 0.0,
        }
    }
}

/// Stat identifiers readable by custom formulas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumString, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatKey {
    Level,
    Hp,
    Mp,
    Tp,
    MaxHp,
    MaxMp,
    MaxTp,
    Atk,
    Def,
    Mat,
    Mdf,
    Agi,
    Luk,
}

/// The stats component attached to every combat agent.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattlerStats {
    pub level: u32,
    pub resources: Resources,
    pub params: Params,
    pub rates: Rates,
}

impl BattlerStats {
    pub fn new(level: u32, hp: u32, mp: u32) -> Self {
        Self {
            level,
            resources: Resources::full(hp, mp, 100),
            params: Params::default(),
            rates: Rates::default(),
        }
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    pub fn with_rates(mut self, rates: Rates) -> Self {
        self.rates = rates;
        self
    }

    pub fn hp(&self) -> u32 {
        self.resources.hp.current
    }

    pub fn is_dead(&self) -> bool {
        self.resources.hp.current == 0
    }

    /// Current hp as a fraction of maximum.
    pub fn hp_rate(&self) -> f32 {
        self.resources.hp.rate()
    }

    /// Numeric value of a stat, as seen by custom formulas.
    pub fn value(&self, key: StatKey) -> f64 {
        let r = &self.resources;
        let p = &self.params;
        match key {
            StatKey::Level => self.level as f64,
            StatKey::Hp => r.hp.current as f64,
            StatKey::Mp => r.mp.current as f64,
            StatKey::Tp => r.tp.current as f64,
            StatKey::MaxHp => r.hp.maximum as f64,
            StatKey::MaxMp => r.mp.maximum as f64,
            StatKey::MaxTp => r.tp.maximum as f64,
            StatKey::Atk => p.atk as f64,
            StatKey::Def => p.def as f64,
            StatKey::Mat => p.mat as f64,
            StatKey::Mdf => p.mdf as f64,
            StatKey::Agi => p.agi as f64,
            StatKey::Luk => p.luk as f64,
        }
    }
}

impl Default for BattlerStats {
    fn default() -> Self {
        Self::new(1, 100, 0)
    }
}
