//! Append-only, ID-indexed storage for model objects.
//!
//! Entities own one [`Arena`] per object category so that expressions and
//! statements can refer to ports, nets and items by a `Copy` ID instead of
//! holding references into the owning entity.

use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// Trait for opaque ID types used as arena keys.
pub trait ArenaId: Copy {
    /// Creates an ID from a raw `u32` index.
    fn from_raw(index: u32) -> Self;

    /// Returns the raw `u32` index.
    fn as_raw(self) -> u32;
}

/// A dense container keyed by an [`ArenaId`].
///
/// Objects are never removed or reordered, so allocation order doubles as
/// declaration order when a writer walks the arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arena<I: ArenaId, T> {
    items: Vec<T>,
    #[serde(skip)]
    _marker: PhantomData<I>,
}

impl<I: ArenaId, T> Default for Arena<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ArenaId, T> Arena<I, T> {
    /// Creates a new, empty arena.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Returns the ID the next call to [`Arena::alloc`] will hand out.
    pub fn next_id(&self) -> I {
        I::from_raw(self.items.len() as u32)
    }

    /// Stores an object and returns its ID.
    pub fn alloc(&mut self, item: T) -> I {
        let id = self.next_id();
        self.items.push(item);
        id
    }

    /// Returns the object with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if the ID was not allocated by this arena.
    pub fn get(&self, id: I) -> &T {
        &self.items[id.as_raw() as usize]
    }

    /// Returns the object with the given ID mutably.
    ///
    /// # Panics
    ///
    /// Panics if the ID was not allocated by this arena.
    pub fn get_mut(&mut self, id: I) -> &mut T {
        &mut self.items[id.as_raw() as usize]
    }

    /// Returns the object with the given ID, or `None` for a foreign ID.
    pub fn try_get(&self, id: I) -> Option<&T> {
        self.items.get(id.as_raw() as usize)
    }

    /// Returns the number of stored objects.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing has been allocated.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over `(ID, &T)` pairs in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| (I::from_raw(i as u32), item))
    }

    /// Iterates over `(ID, &mut T)` pairs in allocation order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (I, &mut T)> {
        self.items
            .iter_mut()
            .enumerate()
            .map(|(i, item)| (I::from_raw(i as u32), item))
    }

    /// Iterates over stored objects in allocation order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<I: ArenaId, T> Index<I> for Arena<I, T> {
    type Output = T;

    fn index(&self, id: I) -> &T {
        self.get(id)
    }
}

impl<I: ArenaId, T> IndexMut<I> for Arena<I, T> {
    fn index_mut(&mut self, id: I) -> &mut T {
        self.get_mut(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::NetId;

    #[test]
    fn ids_follow_allocation_order() {
        let mut arena: Arena<NetId, &str> = Arena::new();
        assert_eq!(arena.next_id().as_raw(), 0);
        let a = arena.alloc("a");
        let b = arena.alloc("b");
        assert_eq!(a.as_raw(), 0);
        assert_eq!(b.as_raw(), 1);
        assert_eq!(arena[b], "b");
        assert_eq!(arena.next_id().as_raw(), 2);
    }

    #[test]
    fn try_get_rejects_foreign_id() {
        let mut arena: Arena<NetId, u32> = Arena::new();
        arena.alloc(7);
        assert_eq!(arena.try_get(NetId::from_raw(0)), Some(&7));
        assert_eq!(arena.try_get(NetId::from_raw(5)), None);
    }

    #[test]
    fn index_mut_modifies() {
        let mut arena: Arena<NetId, String> = Arena::new();
        let id = arena.alloc("old".to_string());
        arena[id].push_str("er");
        assert_eq!(arena[id], "older");
    }

    #[test]
    fn values_in_order() {
        let mut arena: Arena<NetId, u32> = Arena::default();
        assert!(arena.is_empty());
        for v in [3, 1, 2] {
            arena.alloc(v);
        }
        let collected: Vec<u32> = arena.values().copied().collect();
        assert_eq!(collected, vec![3, 1, 2]);
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn serde_roundtrip() {
        let mut arena: Arena<NetId, String> = Arena::new();
        arena.alloc("q".to_string());
        let json = serde_json::to_string(&arena).unwrap();
        let restored: Arena<NetId, String> = serde_json::from_str(&json).unwrap();
        assert_eq!(restored[NetId::from_raw(0)], "q");
    }
}
