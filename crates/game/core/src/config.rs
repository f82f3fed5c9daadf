/// Combat tuning constants and tunable parameters.
///
/// All durations are in frames. Hosts normally load this from TOML through
/// the content crate; [`CombatConfig::default`] carries the stock values.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CombatConfig {
    /// Frames in one notional second.
    pub frames_per_second: u32,
    /// How many regen/slip applications happen per notional second.
    pub regen_ticks_per_second: u32,

    /// How long an agent stays alerted after being hit from outside its sight.
    pub alert_frames: u32,
    /// Idle allies within this distance of a freshly alerted agent share the alert.
    pub ally_alert_radius: f32,
    /// How long an agent remembers who struck it last (kill credit).
    pub last_hit_frames: u32,
    /// AI agents farther than this from the player are not updated.
    pub update_radius: f32,

    /// Parry window opened when guarding starts, before the evasion boost.
    pub base_parry_frames: u32,

    /// Aggro granted by any hostile interaction, hit or miss.
    pub aggro_base: f32,
    pub aggro_hp_weight: f32,
    pub aggro_mp_weight: f32,
    pub aggro_tp_weight: f32,
    /// Extra aggro when the effect drained a resource.
    pub aggro_drain_bonus: f32,
    /// Fraction of the computed aggro removed from a defender that parried.
    pub aggro_parry_factor: f32,
    /// Multiplier applied to aggro caused by player-controlled agents.
    pub player_aggro_factor: f32,

    /// How long an armed combo stays available before lapsing.
    pub combo_window_frames: u32,
    /// Delay between a non-actor's defeat and its removal from the field.
    pub defeat_removal_frames: u32,
    /// Movement lock after a knockback or hop.
    pub knockback_lock_frames: u32,
    /// Tiles travelled per frame while dodging.
    pub dodge_step: f32,
    /// Frames of hit pose after taking damage.
    pub hurt_pose_frames: u32,

    /// Optional level-difference scaling for exp/gold rewards.
    pub level_scaling: Option<LevelScaling>,
}

impl CombatConfig {
    // ===== compile-time constants used as type parameters =====
    pub const MAX_STATES: usize = 16;
    pub const MAX_SLOTS: usize = 12;
    pub const MAX_FOLLOWERS: usize = 8;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_FRAMES_PER_SECOND: u32 = 60;
    pub const DEFAULT_ALERT_FRAMES: u32 = 300;

    pub fn new() -> Self {
        Self {
            frames_per_second: Self::DEFAULT_FRAMES_PER_SECOND,
            regen_ticks_per_second: 4,
            alert_frames: Self::DEFAULT_ALERT_FRAMES,
            ally_alert_radius: 5.0,
            last_hit_frames: 180,
            update_radius: 20.0,
            base_parry_frames: 12,
            aggro_base: 10.0,
            aggro_hp_weight: 1.0,
            aggro_mp_weight: 0.5,
            aggro_tp_weight: 0.25,
            aggro_drain_bonus: 10.0,
            aggro_parry_factor: 0.5,
            player_aggro_factor: 0.5,
            combo_window_frames: 60,
            defeat_removal_frames: 30,
            knockback_lock_frames: 10,
            dodge_step: 0.25,
            hurt_pose_frames: 12,
            level_scaling: None,
        }
    }

    /// Frames between two regen/slip applications.
    pub fn regen_interval(&self) -> u32 {
        (self.frames_per_second / self.regen_ticks_per_second.max(1)).max(1)
    }

    /// Reward multiplier for a victor of `victor_level` defeating `target_level`.
    pub fn reward_multiplier(&self, victor_level: u32, target_level: u32) -> f32 {
        self.level_scaling
            .map_or(1.0, |scaling| scaling.multiplier(victor_level, target_level))
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Linear level-difference reward scaling, clamped to `[min, max]`.
///
/// Equal levels always yield 1.0.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelScaling {
    pub per_level: f32,
    pub min: f32,
    pub max: f32,
}

impl LevelScaling {
    pub fn multiplier(&self, victor_level: u32, target_level: u32) -> f32 {
        let diff = target_level as f32 - victor_level as f32;
        (1.0 + diff * self.per_level).clamp(self.min, self.max)
    }
}
