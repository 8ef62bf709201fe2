use crate::entity::Entity;

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Owns values addressed by generational [`Entity`] handles.
///
/// Freed slots are recycled with a bumped generation, so a handle to a removed
/// value never resolves to whatever occupies the slot later.
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<u32>,
    len: usize,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Store a value, reusing a freed slot if available.
    pub fn insert(&mut self, value: T) -> Entity {
        self.len += 1;
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            Entity {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                value: Some(value),
            });
            Entity {
                index,
                generation: 0,
            }
        }
    }

    /// Remove and return the value. Stale or unknown handles return `None`.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let slot = self.slots.get_mut(entity.index as usize)?;
        if slot.generation != entity.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(entity.index);
        self.len -= 1;
        Some(value)
    }

    /// Whether the handle still names a live value.
    pub fn contains(&self, entity: Entity) -> bool {
        self.get(entity).is_some()
    }

    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.slots
            .get(entity.index as usize)
            .filter(|slot| slot.generation == entity.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.slots
            .get_mut(entity.index as usize)
            .filter(|slot| slot.generation == entity.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    /// Iterate over live `(handle, &value)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value.as_ref().map(|value| {
                (
                    Entity {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    value,
                )
            })
        })
    }

    /// Iterate over live `(handle, &mut value)` pairs in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let generation = slot.generation;
            slot.value.as_mut().map(|value| {
                (
                    Entity {
                        index: index as u32,
                        generation,
                    },
                    value,
                )
            })
        })
    }

    /// Handles of all live values.
    pub fn handles(&self) -> Vec<Entity> {
        self.iter().map(|(entity, _)| entity).collect()
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_sequential() {
        let mut arena = Arena::new();
        let a = arena.insert("a");
        let b = arena.insert("b");
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(a.generation(), 0);
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(b), Some(&"b"));
    }

    #[test]
    fn remove_and_reuse_bumps_generation() {
        let mut arena = Arena::new();
        let a = arena.insert(1);
        assert_eq!(arena.remove(a), Some(1));
        let reused = arena.insert(2);
        assert_eq!(reused.index(), 0);
        assert_eq!(reused.generation(), 1);
        assert_ne!(a, reused);
    }

    #[test]
    fn stale_handle_does_not_reach_new_occupant() {
        let mut arena = Arena::new();
        let old = arena.insert(10);
        arena.remove(old);
        let new = arena.insert(20);
        assert!(!arena.contains(old));
        assert_eq!(arena.get(old), None);
        assert_eq!(arena.get_mut(old), None);
        assert_eq!(arena.get(new), Some(&20));
    }

    #[test]
    fn double_remove_fails() {
        let mut arena = Arena::new();
        let e = arena.insert(());
        assert!(arena.remove(e).is_some());
        assert!(arena.remove(e).is_none());
        assert!(arena.is_empty());
    }

    #[test]
    fn iter_skips_freed_slots() {
        let mut arena = Arena::new();
        let a = arena.insert(1);
        let b = arena.insert(2);
        let c = arena.insert(3);
        arena.remove(b);

        let live: Vec<_> = arena.iter().map(|(e, v)| (e, *v)).collect();
        assert_eq!(live, vec![(a, 1), (c, 3)]);

        for (_, value) in arena.iter_mut() {
            *value *= 10;
        }
        assert_eq!(arena.get(c), Some(&30));
        assert_eq!(arena.handles(), vec![a, c]);
    }
}
