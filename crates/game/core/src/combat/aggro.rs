//! Threat table.

use crate::state::AgentId;

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AggroEntry {
    pub opponent: AgentId,
    pub value: f32,
    /// Locked entries are never decreased.
    pub locked: bool,
}

/// Per-opponent threat values, kept in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AggroTable {
    entries: Vec<AggroEntry>,
}

impl AggroTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry_mut(&mut self, opponent: AgentId) -> &mut AggroEntry {
        let index = match self.entries.iter().position(|e| e.opponent == opponent) {
            Some(index) => index,
            None => {
                self.entries.push(AggroEntry {
                    opponent,
                    value: 0.0,
                    locked: false,
                });
                self.entries.len() - 1
            }
        };
        &mut self.entries[index]
    }

    /// Ensures an entry exists for `opponent` without changing its value.
    pub fn seed(&mut self, opponent: AgentId) {
        self.entry_mut(opponent);
    }

    /// Adds `amount` to the entry for `opponent`, creating it if needed.
    ///
    /// Results are clamped at zero unless `allow_negative` is set. Decreases
    /// of a locked entry are ignored.
    pub fn add(&mut self, opponent: AgentId, amount: f32, allow_negative: bool) {
        if !amount.is_finite() {
            tracing::warn!(opponent = %opponent, amount, "ignoring non-finite aggro");
            return;
        }
        let entry = self.entry_mut(opponent);
        if amount < 0.0 && entry.locked {
            return;
        }
        let value = entry.value + amount;
        entry.value = if allow_negative { value } else { value.max(0.0) };
    }

    pub fn set_locked(&mut self, opponent: AgentId, locked: bool) {
        self.entry_mut(opponent).locked = locked;
    }

    pub fn get(&self, opponent: AgentId) -> Option<f32> {
        self.entries
            .iter()
            .find(|e| e.opponent == opponent)
            .map(|e| e.value)
    }

    /// Opponent with the strictly greatest value; ties go to the earliest entry.
    pub fn top(&self) -> Option<AgentId> {
        let mut best: Option<&AggroEntry> = None;
        for entry in &self.entries {
            if best.is_none_or(|b| entry.value > b.value) {
                best = Some(entry);
            }
        }
        best.map(|e| e.opponent)
    }

    pub fn remove(&mut self, opponent: AgentId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.opponent != opponent);
        before != self.entries.len()
    }

    /// Re-keys the entry for `from` to `to`, keeping its value, lock and
    /// position. An existing `to` entry absorbs it instead.
    pub fn transfer(&mut self, from: AgentId, to: AgentId) -> bool {
        let Some(index) = self.entries.iter().position(|e| e.opponent == from) else {
            return false;
        };
        match self.entries.iter().position(|e| e.opponent == to) {
            Some(existing) => {
                let moved = self.entries.remove(index);
                let existing = if existing > index { existing - 1 } else { existing };
                let target = &mut self.entries[existing];
                target.value += moved.value;
                target.locked |= moved.locked;
            }
            None => self.entries[index].opponent = to,
        }
        true
    }

    /// Drops entries whose opponent no longer qualifies. Returns how many were removed.
    pub fn prune(&mut self, mut keep: impl FnMut(AgentId) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| keep(e.opponent));
        before - self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AggroEntry> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
