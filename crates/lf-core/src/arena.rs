//! Slot storage addressed by stable handles.
//!
//! Entities are stored at `id.slot()`. Removing an entity leaves the slot
//! empty; the handle is never handed out again, so a removed entity can be
//! put back under its original handle.

use crate::error::{LfError, LfResult};
use crate::ids::{Id, IdAllocator};

#[derive(Debug, Clone)]
pub struct Arena<T> {
    what: &'static str,
    slots: Vec<Option<T>>,
    ids: IdAllocator,
    live: usize,
}

impl<T> Arena<T> {
    /// Create an empty arena. `what` names the entity kind in errors.
    pub fn new(what: &'static str) -> Self {
        Self {
            what,
            slots: Vec::new(),
            ids: IdAllocator::new(),
            live: 0,
        }
    }

    /// Reserve a handle without storing anything yet.
    pub fn reserve(&mut self) -> Id {
        self.ids.reserve()
    }

    /// Reserve a handle and store `value` under it.
    pub fn push(&mut self, value: T) -> Id {
        let id = self.reserve();
        self.slots.resize_with(id.slot() + 1, || None);
        self.slots[id.slot()] = Some(value);
        self.live += 1;
        id
    }

    /// Store `value` under a previously reserved handle.
    pub fn insert(&mut self, id: Id, value: T) -> LfResult<()> {
        if id.index() >= self.ids.issued() {
            return Err(LfError::UnknownId { what: self.what, id });
        }
        if self.slots.len() <= id.slot() {
            self.slots.resize_with(id.slot() + 1, || None);
        }
        let slot = &mut self.slots[id.slot()];
        if slot.is_some() {
            return Err(LfError::Invariant {
                what: "arena slot already occupied",
            });
        }
        *slot = Some(value);
        self.live += 1;
        Ok(())
    }

    /// Take the value out of its slot, leaving the handle retired.
    pub fn remove(&mut self, id: Id) -> LfResult<T> {
        let value = self
            .slots
            .get_mut(id.slot())
            .and_then(Option::take)
            .ok_or(LfError::UnknownId { what: self.what, id })?;
        self.live -= 1;
        Ok(value)
    }

    pub fn get(&self, id: Id) -> Option<&T> {
        self.slots.get(id.slot()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: Id) -> Option<&mut T> {
        self.slots.get_mut(id.slot()).and_then(Option::as_mut)
    }

    /// Like [`Arena::get`] but reports a missing handle as an error.
    pub fn try_get(&self, id: Id) -> LfResult<&T> {
        self.get(id).ok_or(LfError::UnknownId { what: self.what, id })
    }

    pub fn try_get_mut(&mut self, id: Id) -> LfResult<&mut T> {
        let what = self.what;
        self.get_mut(id).ok_or(LfError::UnknownId { what, id })
    }

    pub fn contains(&self, id: Id) -> bool {
        self.get(id).is_some()
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Live entities in handle (creation) order.
    pub fn iter(&self) -> impl Iterator<Item = (Id, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (Id::from_index(i as u32), v)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Id, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_mut().map(|v| (Id::from_index(i as u32), v)))
    }

    /// Live handles in creation order.
    pub fn ids(&self) -> Vec<Id> {
        self.iter().map(|(id, _)| id).collect()
    }
}

/// Two arenas are equal when they hold equal values under the same handles.
/// Retired slots and reservations do not take part.
impl<T: PartialEq> PartialEq for Arena<T> {
    fn eq(&self, other: &Self) -> bool {
        self.live == other.live && self.iter().eq(other.iter())
    }
}
