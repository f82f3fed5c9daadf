//! Slot cooldowns and combo arming.

use std::fmt;

use arrayvec::ArrayVec;

use crate::config::CombatConfig;
use crate::state::{FrameTimer, SkillId};

/// Equip slot an action is used from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SlotKey {
    Attack,
    Guard,
    Skill(u8),
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotKey::Attack => f.write_str("attack"),
            SlotKey::Guard => f.write_str("guard"),
            SlotKey::Skill(n) => write!(f, "skill{n}"),
        }
    }
}

/// Timers of one equip slot.
///
/// The base timer gates the equipped skill. A queued combo skill waits on the
/// combo timer; once that expires the combo is *armed* and stays usable until
/// the combo window lapses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cooldown {
    slot: SlotKey,
    skill: Option<SkillId>,
    base: FrameTimer,
    combo: FrameTimer,
    window: FrameTimer,
    next_combo: Option<SkillId>,
}

impl Cooldown {
    pub fn new(slot: SlotKey, skill: Option<SkillId>) -> Self {
        Self {
            slot,
            skill,
            base: FrameTimer::IDLE,
            combo: FrameTimer::IDLE,
            window: FrameTimer::IDLE,
            next_combo: None,
        }
    }

    pub fn slot(&self) -> SlotKey {
        self.slot
    }

    /// Skill equipped in this slot.
    pub fn skill(&self) -> Option<SkillId> {
        self.skill
    }

    pub fn next_combo(&self) -> Option<SkillId> {
        self.next_combo
    }

    pub fn base_remaining(&self) -> u32 {
        self.base.remaining()
    }

    pub fn equip(&mut self, skill: Option<SkillId>) {
        self.skill = skill;
        self.clear_combo();
    }

    /// Advances every timer by one frame.
    pub fn tick(&mut self, window_frames: u32) {
        self.base.tick();
        if self.next_combo.is_none() {
            return;
        }
        if self.combo.is_running() {
            if self.combo.tick() {
                self.window.reset(window_frames);
            }
        } else if self.window.tick() {
            tracing::trace!(slot = %self.slot, "combo window lapsed");
            self.clear_combo();
        }
    }

    /// The queued combo has waited out its delay.
    pub fn is_combo_armed(&self) -> bool {
        self.next_combo.is_some() && self.combo.is_expired()
    }

    /// Skill this slot would use right now, if any.
    pub fn usable_skill(&self) -> Option<SkillId> {
        if self.is_combo_armed() {
            self.next_combo
        } else if self.base.is_expired() {
            self.skill
        } else {
            None
        }
    }

    pub fn is_ready(&self) -> bool {
        self.usable_skill().is_some()
    }

    /// Queues a follow-up skill.
    ///
    /// Returns `false` (and changes nothing) if `skill` is already queued.
    pub fn queue_combo(&mut self, skill: SkillId, delay_frames: u32, window_frames: u32) -> bool {
        if self.next_combo == Some(skill) {
            return false;
        }
        self.next_combo = Some(skill);
        self.combo.reset(delay_frames);
        if delay_frames == 0 {
            self.window.reset(window_frames);
        }
        true
    }

    /// Marks the slot as used: restarts the base timer and drops any combo.
    pub fn consume(&mut self, cooldown_frames: u32) {
        self.base.reset(cooldown_frames);
        self.clear_combo();
    }

    /// Restarts the base timer without touching the combo state.
    pub fn start_cooldown(&mut self, cooldown_frames: u32) {
        self.base.reset(cooldown_frames);
    }

    pub fn clear_combo(&mut self) {
        self.next_combo = None;
        self.combo.clear();
        self.window.clear();
    }
}

/// Every equip slot of an agent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CooldownTable {
    slots: ArrayVec<Cooldown, { CombatConfig::MAX_SLOTS }>,
}

impl CooldownTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Equips `skill` in `slot`, creating the slot on first use.
    ///
    /// Returns `false` when the table is full.
    pub fn equip(&mut self, slot: SlotKey, skill: Option<SkillId>) -> bool {
        if let Some(existing) = self.get_mut(slot) {
            existing.equip(skill);
            return true;
        }
        self.slots.try_push(Cooldown::new(slot, skill)).is_ok()
    }

    pub fn get(&self, slot: SlotKey) -> Option<&Cooldown> {
        self.slots.iter().find(|c| c.slot == slot)
    }

    pub fn get_mut(&mut self, slot: SlotKey) -> Option<&mut Cooldown> {
        self.slots.iter_mut().find(|c| c.slot == slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cooldown> {
        self.slots.iter()
    }

    pub fn tick(&mut self, window_frames: u32) {
        for cooldown in self.slots.iter_mut() {
            cooldown.tick(window_frames);
        }
    }

    pub fn any_ready(&self) -> bool {
        self.slots.iter().any(Cooldown::is_ready)
    }

    /// Applies the cooldown of `skill` after it was used from `slot`.
    ///
    /// Unique-cooldown skills and the attack slot cool down only their own
    /// slot; any other skill also cools down every slot equipping it.
    pub fn consume(&mut self, slot: SlotKey, skill: SkillId, cooldown_frames: u32, unique: bool) {
        if let Some(own) = self.get_mut(slot) {
            own.consume(cooldown_frames);
        }
        if unique || slot == SlotKey::Attack {
            return;
        }
        for other in self
            .slots
            .iter_mut()
            .filter(|c| c.slot != slot && c.slot != SlotKey::Attack && c.skill == Some(skill))
        {
            other.start_cooldown(cooldown_frames);
        }
    }

    /// Drops every queued combo.
    pub fn clear_combos(&mut self) {
        for cooldown in self.slots.iter_mut() {
            cooldown.clear_combo();
        }
    }
}
