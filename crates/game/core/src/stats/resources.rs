//! Resource pools (HP, MP, TP).
//!
//! Current values are clamped to `[0, maximum]` on every write. Signed deltas
//! follow the damage convention: positive drains the pool, negative restores it.

/// Enum representing individual resource types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResourceKind {
    Hp,
    Mp,
    Tp,
}

/// Integer resource meter tracked per battler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceMeter {
    pub current: u32,
    pub maximum: u32,
}

impl ResourceMeter {
    pub fn new(current: u32, maximum: u32) -> Self {
        Self {
            current: current.min(maximum),
            maximum,
        }
    }

    pub fn full(maximum: u32) -> Self {
        Self::new(maximum, maximum)
    }

    /// Applies a damage-convention delta and returns the change actually applied
    /// (positive = lost, negative = gained).
    pub fn apply_damage(&mut self, amount: i32) -> i32 {
        let before = self.current as i64;
        let after = (before - amount as i64).clamp(0, self.maximum as i64);
        self.current = after as u32;
        (before - after) as i32
    }

    /// Restores up to `amount` and returns how much was gained.
    pub fn restore(&mut self, amount: u32) -> u32 {
        let gained = amount.min(self.maximum - self.current);
        self.current += gained;
        gained
    }

    /// Removes `amount` if available; returns `false` and leaves the meter
    /// untouched otherwise.
    pub fn spend(&mut self, amount: u32) -> bool {
        if self.current < amount {
            return false;
        }
        self.current -= amount;
        true
    }

    pub fn rate(&self) -> f32 {
        if self.maximum == 0 {
            return 0.0;
        }
        self.current as f32 / self.maximum as f32
    }
}

/// The three pools a battler carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resources {
    pub hp: ResourceMeter,
    pub mp: ResourceMeter,
    pub tp: ResourceMeter,
}

impl Resources {
    pub fn full(hp: u32, mp: u32, tp_max: u32) -> Self {
        Self {
            hp: ResourceMeter::full(hp),
            mp: ResourceMeter::full(mp),
            tp: ResourceMeter::new(0, tp_max),
        }
    }

    pub fn get(&self, kind: ResourceKind) -> &ResourceMeter {
        match kind {
            ResourceKind::Hp => &self.hp,
            ResourceKind::Mp => &self.mp,
            ResourceKind::Tp => &self.tp,
        }
    }

    pub fn get_mut(&mut self, kind: ResourceKind) -> &mut ResourceMeter {
        match kind {
            ResourceKind::Hp => &mut self.hp,
            ResourceKind::Mp => &mut self.mp,
            ResourceKind::Tp => &mut self.tp,
        }
    }
}
