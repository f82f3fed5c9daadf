//! Slot arena addressed by generation-checked [`AgentId`] handles.

use super::AgentId;

#[derive(Clone, Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Dense storage for agents with stable, reuse-safe handles.
///
/// Removing a value bumps the slot generation, so every outstanding handle to
/// it stops resolving. Freed slots are reused in LIFO order.
#[derive(Clone, Debug)]
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value built from its own handle and returns that handle.
    pub fn insert_with(&mut self, build: impl FnOnce(AgentId) -> T) -> AgentId {
        let id = match self.free.pop() {
            Some(index) => AgentId::new(index, self.slots[index as usize].generation),
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    value: None,
                });
                AgentId::new((self.slots.len() - 1) as u32, 0)
            }
        };
        self.slots[id.index() as usize].value = Some(build(id));
        self.len += 1;
        id
    }

    pub fn remove(&mut self, id: AgentId) -> Option<T> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index());
        self.len -= 1;
        Some(value)
    }

    pub fn get(&self, id: AgentId) -> Option<&T> {
        let slot = self.slots.get(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.value.as_ref()
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut T> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.value.as_mut()
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.get(id).is_some()
    }

    /// Borrows two distinct live values mutably at once.
    ///
    /// Returns `None` when either handle is stale or both name the same slot.
    pub fn pair_mut(&mut self, a: AgentId, b: AgentId) -> Option<(&mut T, &mut T)> {
        if a.index() == b.index() || !self.contains(a) || !self.contains(b) {
            return None;
        }
        let (low, high, swapped) = if a.index() < b.index() {
            (a.index() as usize, b.index() as usize, false)
        } else {
            (b.index() as usize, a.index() as usize, true)
        };
        let (head, tail) = self.slots.split_at_mut(high);
        let first = head[low].value.as_mut()?;
        let second = tail[0].value.as_mut()?;
        if swapped {
            Some((second, first))
        } else {
            Some((first, second))
        }
    }

    /// Handles of all live values in slot order.
    pub fn ids(&self) -> Vec<AgentId> {
        self.iter().map(|(id, _)| id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AgentId, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value
                .as_ref()
                .map(|value| (AgentId::new(index as u32, slot.generation), value))
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (AgentId, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let generation = slot.generation;
            slot.value
                .as_mut()
                .map(|value| (AgentId::new(index as u32, generation), value))
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_handle_resolves_to_none_after_reuse() {
        let mut arena = Arena::new();
        let first = arena.insert_with(|_| "goblin");
        assert_eq!(arena.remove(first), Some("goblin"));

        let second = arena.insert_with(|_| "bat");
        assert_eq!(first.index(), second.index());
        assert_ne!(first, second);
        assert!(arena.get(first).is_none());
        assert_eq!(arena.get(second), Some(&"bat"));
    }

    #[test]
    fn pair_mut_preserves_argument_order() {
        let mut arena = Arena::new();
        let a = arena.insert_with(|_| 1);
        let b = arena.insert_with(|_| 2);

        let (x, y) = arena.pair_mut(b, a).unwrap();
        assert_eq!((*x, *y), (2, 1));
        *x += 10;
        assert_eq!(arena.get(b), Some(&12));
        assert!(arena.pair_mut(a, a).is_none());
    }

    #[test]
    fn insert_with_passes_own_handle() {
        let mut arena = Arena::new();
        let id = arena.insert_with(|id| id);
        assert_eq!(arena.get(id), Some(&id));
        assert_eq!(arena.len(), 1);
    }
}
