//! Frame-counted countdowns.
//!
//! Every suspension in the simulation (cooldowns, casts, alert windows, parry
//! windows, removal delays) is a [`FrameTimer`] decremented once per tick.
//! Nothing waits on anything else; a timer reaching zero simply flips the
//! state the owner reads next.

/// Countdown measured in simulation frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameTimer {
    remaining: u32,
}

impl FrameTimer {
    /// An already expired timer.
    pub const IDLE: Self = Self { remaining: 0 };

    pub const fn new(frames: u32) -> Self {
        Self { remaining: frames }
    }

    /// Advances the timer by one frame.
    ///
    /// Returns `true` only on the frame the timer reaches zero, so callers
    /// can trigger a transition exactly once. An idle timer stays idle and
    /// returns `false`.
    pub fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.remaining == 0
    }

    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    pub const fn is_running(&self) -> bool {
        self.remaining > 0
    }

    pub const fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    pub fn reset(&mut self, frames: u32) {
        self.remaining = frames;
    }

    pub fn clear(&mut self) {
        self.remaining = 0;
    }
}
