use alloc::vec;
use alloc::vec::Vec;
use core::slice;

use crate::Position;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChangeKind {
    Insert,
    Delete,
    Update,
    Move,
}

/// A structural delta reported to a [`crate::ChangeObserver`].
///
/// Item positions and section indexes name the state the UI last rendered for deletes, and the
/// resulting state for inserts. A move carries `[from, to]`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChangeEvent {
    Items {
        kind: ChangeKind,
        positions: Vec<Position>,
    },
    Sections {
        kind: ChangeKind,
        indices: Vec<usize>,
    },
}

impl ChangeEvent {
    pub fn item(kind: ChangeKind, position: Position) -> Self {
        Self::Items {
            kind,
            positions: vec![position],
        }
    }

    pub fn section(kind: ChangeKind, index: usize) -> Self {
        Self::Sections {
            kind,
            indices: vec![index],
        }
    }

    pub fn item_move(from: Position, to: Position) -> Self {
        Self::Items {
            kind: ChangeKind::Move,
            positions: vec![from, to],
        }
    }

    pub fn section_move(from: usize, to: usize) -> Self {
        Self::Sections {
            kind: ChangeKind::Move,
            indices: vec![from, to],
        }
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            Self::Items { kind, .. } | Self::Sections { kind, .. } => *kind,
        }
    }

    /// Item positions, or an empty slice for section-level events.
    pub fn positions(&self) -> &[Position] {
        match self {
            Self::Items { positions, .. } => positions,
            Self::Sections { .. } => &[],
        }
    }

    /// Section indexes, or an empty slice for item-level events.
    pub fn indices(&self) -> &[usize] {
        match self {
            Self::Items { .. } => &[],
            Self::Sections { indices, .. } => indices,
        }
    }

    pub fn is_section_change(&self) -> bool {
        matches!(self, Self::Sections { .. })
    }
}

/// An ordered batch of change events.
///
/// One update is produced per mutating call, or one per flush while updates are deferred.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StorageUpdate {
    changes: Vec<ChangeEvent>,
}

impl StorageUpdate {
    pub const fn new() -> Self {
        Self {
            changes: Vec::new(),
        }
    }

    pub fn changes(&self) -> &[ChangeEvent] {
        &self.changes
    }

    pub fn into_changes(self) -> Vec<ChangeEvent> {
        self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, ChangeEvent> {
        self.changes.iter()
    }

    /// Item-level changes as `(kind, positions)` pairs, in emission order.
    pub fn item_changes(&self) -> impl Iterator<Item = (ChangeKind, &[Position])> + '_ {
        self.changes.iter().filter_map(|c| match c {
            ChangeEvent::Items { kind, positions } => Some((*kind, positions.as_slice())),
            ChangeEvent::Sections { .. } => None,
        })
    }

    /// Section-level changes as `(kind, indices)` pairs, in emission order.
    pub fn section_changes(&self) -> impl Iterator<Item = (ChangeKind, &[usize])> + '_ {
        self.changes.iter().filter_map(|c| match c {
            ChangeEvent::Sections { kind, indices } => Some((*kind, indices.as_slice())),
            ChangeEvent::Items { .. } => None,
        })
    }

    pub fn push(&mut self, change: ChangeEvent) {
        self.changes.push(change);
    }

    /// Moves all changes of `other` to the end of `self`.
    pub fn append(&mut self, other: &mut StorageUpdate) {
        self.changes.append(&mut other.changes);
    }

    pub(crate) fn take(&mut self) -> StorageUpdate {
        core::mem::take(self)
    }
}

impl From<Vec<ChangeEvent>> for StorageUpdate {
    fn from(changes: Vec<ChangeEvent>) -> Self {
        Self { changes }
    }
}

impl From<ChangeEvent> for StorageUpdate {
    fn from(change: ChangeEvent) -> Self {
        Self {
            changes: vec![change],
        }
    }
}

impl Extend<ChangeEvent> for StorageUpdate {
    fn extend<I: IntoIterator<Item = ChangeEvent>>(&mut self, iter: I) {
        self.changes.extend(iter);
    }
}

impl<'a> IntoIterator for &'a StorageUpdate {
    type Item = &'a ChangeEvent;
    type IntoIter = slice::Iter<'a, ChangeEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
