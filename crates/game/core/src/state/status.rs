//! Status effects currently applied to an agent.
//!
//! Status definitions (regen terms, aggro modifiers, resistances) live in the
//! status oracle; this container only tracks which statuses are active and how
//! many frames each has left.

use arrayvec::ArrayVec;

use crate::config::CombatConfig;
use crate::state::{AgentId, FrameTimer, StatusId};

/// A single applied status. `remaining: None` lasts until removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveStatus {
    pub id: StatusId,
    pub remaining: Option<FrameTimer>,
    /// Agent that applied the status, read as the caster by custom formulas.
    pub source: Option<AgentId>,
}

/// Active status effects on an agent, in application order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveStatuses {
    effects: ArrayVec<ActiveStatus, { CombatConfig::MAX_STATES }>,
}

impl ActiveStatuses {
    pub fn empty() -> Self {
        Self {
            effects: ArrayVec::new(),
        }
    }

    pub fn has(&self, id: StatusId) -> bool {
        self.effects.iter().any(|e| e.id == id)
    }

    /// Adds a status. Re-applying refreshes to the longer remaining duration.
    ///
    /// Returns `false` when the container is full and the status was dropped.
    pub fn add(&mut self, id: StatusId, duration: Option<u32>, source: Option<AgentId>) -> bool {
        if let Some(existing) = self.effects.iter_mut().find(|e| e.id == id) {
            existing.source = source.or(existing.source);
            existing.remaining = match (existing.remaining, duration) {
                (None, _) | (_, None) => None,
                (Some(current), Some(frames)) => {
                    Some(FrameTimer::new(current.remaining().max(frames)))
                }
            };
            return true;
        }

        if self.effects.is_full() {
            return false;
        }
        self.effects.push(ActiveStatus {
            id,
            remaining: duration.map(FrameTimer::new),
            source,
        });
        true
    }

    pub fn remove(&mut self, id: StatusId) -> bool {
        let before = self.effects.len();
        self.effects.retain(|e| e.id != id);
        before != self.effects.len()
    }

    /// Advances every timed status by one frame and returns the ones that expired.
    pub fn tick(&mut self) -> ArrayVec<StatusId, { CombatConfig::MAX_STATES }> {
        let mut expired = ArrayVec::new();
        for effect in self.effects.iter_mut() {
            if let Some(timer) = effect.remaining.as_mut()
                && timer.tick()
            {
                expired.push(effect.id);
            }
        }
        self.effects
            .retain(|e| e.remaining.is_none_or(|timer| timer.is_running()));
        expired
    }

    pub fn iter(&self) -> impl Iterator<Item = StatusId> + '_ {
        self.effects.iter().map(|e| e.id)
    }

    pub fn entries(&self) -> &[ActiveStatus] {
        &self.effects
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timed_status_expires_after_duration() {
        let mut statuses = ActiveStatuses::empty();
        statuses.add(StatusId(3), Some(2), None);

        assert!(statuses.tick().is_empty());
        assert!(statuses.has(StatusId(3)));

        let expired = statuses.tick();
        assert_eq!(expired.as_slice(), &[StatusId(3)]);
        assert!(!statuses.has(StatusId(3)));
    }

    #[test]
    fn reapply_keeps_longer_duration() {
        let mut statuses = ActiveStatuses::empty();
        statuses.add(StatusId(1), Some(10), None);
        statuses.add(StatusId(1), Some(4), None);
        for _ in 0..9 {
            statuses.tick();
        }
        assert!(statuses.has(StatusId(1)));
        assert_eq!(statuses.len(), 1);
    }

    #[test]
    fn permanent_status_survives_ticks() {
        let mut statuses = ActiveStatuses::empty();
        statuses.add(StatusId(9), None, None);
        for _ in 0..100 {
            statuses.tick();
        }
        assert!(statuses.has(StatusId(9)));
        assert!(statuses.remove(StatusId(9)));
        assert!(statuses.is_empty());
    }
}
