//! Ordered, duplicate-free storage keyed by an entity's identity.
//!
//! Two entries "collide" when their identity keys are equal even though the
//! rest of their fields differ. Every mutator that can introduce a new entry
//! checks for collisions first; positional mutators that could bypass the
//! check are not offered. Readers get a `&[T]` view and a revision counter
//! that changes after every successful mutation.

use std::fmt;
use std::ops::Deref;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Identity-key extraction for an entity family.
pub trait Identifiable {
    /// Borrowed view of the fields that make up the identity.
    type Key<'a>: PartialEq
    where
        Self: 'a;

    fn identity_key(&self) -> Self::Key<'_>;

    fn has_same_identity(&self, other: &Self) -> bool {
        self.identity_key() == other.identity_key()
    }
}

/// Failures raised by identity-aware mutators.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CollectionError {
    #[error("operation would result in duplicate items")]
    DuplicateItem,
    #[error("item not found")]
    ItemNotFound,
}

pub struct IdentityCollection<T> {
    items: Vec<T>,
    revision: u64,
}

impl<T> IdentityCollection<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            revision: 0,
        }
    }

    /// Read-only view of the current contents in insertion order.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Counter bumped by every successful mutation, for change detection.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Remove the element at `index`. Removal cannot create a collision.
    pub fn remove_at(&mut self, index: usize) -> Option<T> {
        if index >= self.items.len() {
            return None;
        }
        let removed = self.items.remove(index);
        self.touch();
        Some(removed)
    }

    pub fn clear(&mut self) {
        if !self.items.is_empty() {
            self.items.clear();
            self.touch();
        }
    }

    /// Keep only the elements matching `keep`.
    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) {
        let before = self.items.len();
        self.items.retain(keep);
        if self.items.len() != before {
            self.touch();
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

impl<T: Identifiable> IdentityCollection<T> {
    /// Build a collection from `items`, rejecting internal collisions.
    pub fn from_vec(items: Vec<T>) -> Result<Self, CollectionError> {
        if !are_unique(&items) {
            return Err(CollectionError::DuplicateItem);
        }
        Ok(Self { items, revision: 0 })
    }

    /// Append `item` unless an element with the same identity exists.
    pub fn add(&mut self, item: T) -> bool {
        if self.items.iter().any(|x| x.has_same_identity(&item)) {
            return false;
        }
        self.items.push(item);
        self.touch();
        true
    }

    /// Remove the element colliding with `item`, if any.
    pub fn remove(&mut self, item: &T) -> bool {
        match self.items.iter().position(|x| x.has_same_identity(item)) {
            Some(index) => {
                self.items.remove(index);
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Element whose identity matches `item`.
    pub fn find(&self, item: &T) -> Option<&T> {
        self.items.iter().find(|x| x.has_same_identity(item))
    }

    /// Replace every element at once. On failure nothing changes.
    pub fn set_all(&mut self, items: Vec<T>) -> Result<(), CollectionError> {
        if !are_unique(&items) {
            return Err(CollectionError::DuplicateItem);
        }
        self.items = items;
        self.touch();
        Ok(())
    }

    /// True when every pair of elements has distinct identities.
    pub fn is_consistent(&self) -> bool {
        are_unique(&self.items)
    }
}

impl<T: Identifiable + PartialEq> IdentityCollection<T> {
    /// True if some element other than `ignore` collides with `item`.
    pub fn contains_identity(&self, item: &T, ignore: Option<&T>) -> bool {
        self.items
            .iter()
            .filter(|x| ignore.is_none_or(|ignored| *x != ignored))
            .any(|x| x.has_same_identity(item))
    }

    /// Replace the element equal to `old` with `new`.
    ///
    /// The element being replaced is excluded from the collision check, so
    /// `new` may keep or change `old`'s identity.
    pub fn set(&mut self, old: &T, new: T) -> Result<(), CollectionError> {
        let index = self
            .items
            .iter()
            .position(|x| x == old)
            .ok_or(CollectionError::ItemNotFound)?;
        let collides = self
            .items
            .iter()
            .enumerate()
            .any(|(i, x)| i != index && x.has_same_identity(&new));
        if collides {
            return Err(CollectionError::DuplicateItem);
        }
        self.items[index] = new;
        self.touch();
        Ok(())
    }
}

fn are_unique<T: Identifiable>(items: &[T]) -> bool {
    items
        .iter()
        .enumerate()
        .all(|(i, a)| items[i + 1..].iter().all(|b| !a.has_same_identity(b)))
}

impl<T> Default for IdentityCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for IdentityCollection<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            revision: self.revision,
        }
    }
}

impl<T> Deref for IdentityCollection<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<'a, T> IntoIterator for &'a IdentityCollection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: PartialEq> PartialEq for IdentityCollection<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Eq> Eq for IdentityCollection<T> {}

impl<T: fmt::Debug> fmt::Debug for IdentityCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.items).finish()
    }
}

impl<T: Serialize> Serialize for IdentityCollection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for IdentityCollection<T>
where
    T: Identifiable + Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<T>::deserialize(deserializer)?;
        Self::from_vec(items).map_err(|_| D::Error::custom("list contains duplicate items"))
    }
}
