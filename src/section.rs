use alloc::vec::Vec;
use core::slice;

use crate::{Result, StorageError};

/// An ordered group of items.
///
/// Offsets are always dense: after any operation the items occupy `0..len()`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Section<T> {
    items: Vec<T>,
}

impl<T> Default for Section<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Section<T> {
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn from_items(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, offset: usize) -> Option<&T> {
        self.items.get(offset)
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Inserts `item` at `offset`, shifting the following items right.
    ///
    /// `offset == len()` appends.
    pub fn insert(&mut self, offset: usize, item: T) -> Result<()> {
        if offset > self.items.len() {
            return Err(self.out_of_bounds(offset));
        }
        self.items.insert(offset, item);
        Ok(())
    }

    pub fn remove_at(&mut self, offset: usize) -> Result<T> {
        if offset >= self.items.len() {
            return Err(self.out_of_bounds(offset));
        }
        Ok(self.items.remove(offset))
    }

    /// Replaces the item at `offset` and returns the previous one.
    pub fn replace(&mut self, offset: usize, item: T) -> Result<T> {
        match self.items.get_mut(offset) {
            Some(slot) => Ok(core::mem::replace(slot, item)),
            None => Err(self.out_of_bounds(offset)),
        }
    }

    /// Clears the section and returns how many items were removed.
    pub fn remove_all(&mut self) -> usize {
        let count = self.items.len();
        self.items.clear();
        count
    }

    pub(crate) fn extend(&mut self, items: impl IntoIterator<Item = T>) {
        self.items.extend(items);
    }

    fn out_of_bounds(&self, offset: usize) -> StorageError {
        StorageError::IndexOutOfBounds {
            offset,
            len: self.items.len(),
        }
    }
}

impl<T: PartialEq> Section<T> {
    /// Returns the offset of the first item equal to `item`.
    pub fn position_of(&self, item: &T) -> Option<usize> {
        self.items.iter().position(|it| it == item)
    }

    pub fn contains(&self, item: &T) -> bool {
        self.position_of(item).is_some()
    }
}

impl<T> From<Vec<T>> for Section<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_items(items)
    }
}

impl<T> FromIterator<T> for Section<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a, T> IntoIterator for &'a Section<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
