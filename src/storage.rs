use alloc::boxed::Box;
use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use core::fmt;
use core::iter;

use crate::position::sort_descending;
use crate::{
    ChangeEvent, ChangeKind, ChangeObserver, Position, Result, Section, StorageError,
    StorageOptions, StorageUpdate, UpdateMode,
};

/// Section gaps above this size are logged when filled by sparse addressing.
const SPARSE_GAP_WARN: usize = 1024;

/// A sectioned, in-memory item storage.
///
/// The storage is the sole owner of section and item ordering. Every mutating call computes one
/// ordered [`StorageUpdate`] describing what changed and hands it to the installed
/// [`ChangeObserver`], either right away or, in [`UpdateMode::Deferred`], on the next
/// [`Storage::flush`].
///
/// Positional lookups never fail: stale positions read as `None`, and batch removals skip them.
/// Only operations that name one specific section or slot return a [`StorageError`].
pub struct Storage<T> {
    sections: Vec<Section<T>>,
    options: StorageOptions,
    observer: Option<Box<dyn ChangeObserver>>,
    pending: StorageUpdate,
    batch_depth: usize,
}

impl<T> Default for Storage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Storage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("sections", &self.sections)
            .field("options", &self.options)
            .field("observer", &self.observer.as_ref().map(|_| ".."))
            .field("pending", &self.pending)
            .field("batch_depth", &self.batch_depth)
            .finish()
    }
}

impl<T> Storage<T> {
    pub fn new() -> Self {
        Self::with_options(StorageOptions::default())
    }

    pub fn with_options(options: StorageOptions) -> Self {
        sdebug!(
            update_mode = ?options.update_mode,
            skip_empty_updates = options.skip_empty_updates,
            "Storage::with_options"
        );
        Self {
            sections: Vec::new(),
            options,
            observer: None,
            pending: StorageUpdate::new(),
            batch_depth: 0,
        }
    }

    /// Creates a storage that already holds `sections`. No changes are reported for them.
    pub fn from_sections(sections: Vec<Section<T>>) -> Self {
        let mut s = Self::new();
        s.sections = sections;
        s
    }

    pub fn options(&self) -> &StorageOptions {
        &self.options
    }

    /// Clones the current options, applies `f`, then applies the result.
    ///
    /// Leaving [`UpdateMode::Deferred`] this way flushes, exactly like
    /// [`Storage::set_update_mode`].
    pub fn update_options(&mut self, f: impl FnOnce(&mut StorageOptions)) {
        let mut next = self.options;
        f(&mut next);
        self.options.skip_empty_updates = next.skip_empty_updates;
        self.set_update_mode(next.update_mode);
    }

    pub fn set_observer(&mut self, observer: impl ChangeObserver + 'static) {
        self.observer = Some(Box::new(observer));
    }

    pub fn take_observer(&mut self) -> Option<Box<dyn ChangeObserver>> {
        self.observer.take()
    }

    pub fn has_observer(&self) -> bool {
        self.observer.is_some()
    }

    pub fn update_mode(&self) -> UpdateMode {
        self.options.update_mode
    }

    pub fn defers_updates(&self) -> bool {
        self.options.update_mode == UpdateMode::Deferred || self.batch_depth > 0
    }

    /// Switches the delivery mode.
    ///
    /// Going from `Deferred` to `Immediate` flushes everything pending first (unless a
    /// [`Storage::batch_update`] is still running, in which case the batch flushes on exit).
    pub fn set_update_mode(&mut self, mode: UpdateMode) {
        let prev = self.options.update_mode;
        if prev == mode {
            return;
        }
        sdebug!(from = ?prev, to = ?mode, "Storage::set_update_mode");
        if mode == UpdateMode::Immediate && self.batch_depth == 0 {
            self.flush();
        }
        self.options.update_mode = mode;
    }

    pub fn set_defers_updates(&mut self, defers: bool) {
        self.set_update_mode(if defers {
            UpdateMode::Deferred
        } else {
            UpdateMode::Immediate
        });
    }

    /// Changes computed but not yet delivered.
    pub fn pending_update(&self) -> &StorageUpdate {
        &self.pending
    }

    /// Delivers every pending change as one update, in call order, and clears pending state.
    ///
    /// Returns `true` when the observer was called.
    pub fn flush(&mut self) -> bool {
        let update = self.pending.take();
        if update.is_empty() {
            return false;
        }
        sdebug!(changes = update.len(), "Storage::flush");
        self.deliver(update)
    }

    /// Runs `f` with delivery deferred, then delivers everything `f` produced as one update.
    ///
    /// Nested batches deliver once, when the outermost batch returns. If the storage was already
    /// in [`UpdateMode::Deferred`], changes stay pending.
    pub fn batch_update(&mut self, f: impl FnOnce(&mut Self)) {
        self.batch_depth = self.batch_depth.saturating_add(1);

        f(self);

        debug_assert!(self.batch_depth > 0, "batch_depth underflow");
        self.batch_depth = self.batch_depth.saturating_sub(1);

        if self.batch_depth == 0 && self.options.update_mode == UpdateMode::Immediate {
            self.flush();
        }
    }

    fn finish(&mut self, mut update: StorageUpdate) {
        if self.defers_updates() {
            self.pending.append(&mut update);
            return;
        }
        self.deliver(update);
    }

    fn deliver(&mut self, update: StorageUpdate) -> bool {
        if update.is_empty() && self.options.skip_empty_updates {
            return false;
        }
        let Some(observer) = self.observer.as_mut() else {
            return false;
        };
        strace!(changes = update.len(), "Storage::deliver");
        observer.storage_did_update(&update);
        true
    }

    pub fn sections(&self) -> &[Section<T>] {
        &self.sections
    }

    pub fn section(&self, index: usize) -> Option<&Section<T>> {
        self.sections.get(index)
    }

    pub fn number_of_sections(&self) -> usize {
        self.sections.len()
    }

    /// Number of items in `section`, or `0` if the section does not exist.
    pub fn number_of_items(&self, section: usize) -> usize {
        self.sections.get(section).map_or(0, Section::len)
    }

    pub fn total_items(&self) -> usize {
        self.sections.iter().map(Section::len).sum()
    }

    /// `true` when no section holds any item (sections themselves may exist).
    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(Section::is_empty)
    }

    pub fn items(&self, section: usize) -> Option<&[T]> {
        self.sections.get(section).map(Section::items)
    }

    /// Returns the item at `at`, or `None` if either index is out of bounds.
    pub fn item(&self, at: Position) -> Option<&T> {
        self.sections.get(at.section)?.get(at.offset)
    }

    /// Iterates over every item with its position, in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &T)> + '_ {
        self.sections.iter().enumerate().flat_map(|(s, section)| {
            section
                .iter()
                .enumerate()
                .map(move |(o, item)| (Position::new(s, o), item))
        })
    }

    fn section_mut(&mut self, index: usize) -> Result<&mut Section<T>> {
        let count = self.sections.len();
        self.sections
            .get_mut(index)
            .ok_or(StorageError::SectionIndexOutOfBounds { index, count })
    }

    /// Creates `index` and every missing section before it, recording an insert per section.
    ///
    /// Cost is linear in the gap: every skipped index becomes an empty section and an event.
    fn ensure_section(&mut self, index: usize, update: &mut StorageUpdate) -> &mut Section<T> {
        let gap = index.saturating_sub(self.sections.len());
        if gap > SPARSE_GAP_WARN {
            swarn!(
                index,
                sections = self.sections.len(),
                gap,
                "Storage: sparse section index creates many empty sections"
            );
        }
        while self.sections.len() <= index {
            update.push(ChangeEvent::section(ChangeKind::Insert, self.sections.len()));
            self.sections.push(Section::new());
        }
        &mut self.sections[index]
    }

    pub fn add_item(&mut self, item: T, to_section: usize) {
        self.add_items(iter::once(item), to_section);
    }

    /// Appends `items` to `to_section`, creating it (and any empty sections before it) if needed.
    ///
    /// Every missing section before `to_section` is allocated, so a huge index costs memory
    /// proportional to it.
    pub fn add_items(&mut self, items: impl IntoIterator<Item = T>, to_section: usize) {
        let mut update = StorageUpdate::new();
        let section = self.ensure_section(to_section, &mut update);
        let start = section.len();
        section.extend(items);
        let end = section.len();
        strace!(section = to_section, added = end - start, "Storage::add_items");
        update.extend(
            (start..end).map(|o| ChangeEvent::item(ChangeKind::Insert, Position::new(to_section, o))),
        );
        self.finish(update);
    }

    /// Inserts `item` at `at`, creating the target section if needed.
    ///
    /// Fails with [`StorageError::IndexOutOfBounds`] if `at.offset` is past the end of the
    /// section; nothing changes in that case.
    pub fn insert_item(&mut self, item: T, at: Position) -> Result<()> {
        let len = self.number_of_items(at.section);
        if at.offset > len {
            return Err(StorageError::IndexOutOfBounds {
                offset: at.offset,
                len,
            });
        }
        let mut update = StorageUpdate::new();
        self.ensure_section(at.section, &mut update)
            .insert(at.offset, item)?;
        strace!(section = at.section, offset = at.offset, "Storage::insert_item");
        update.push(ChangeEvent::item(ChangeKind::Insert, at));
        self.finish(update);
        Ok(())
    }

    /// Inserts a whole section at `index`, shifting later sections up by one.
    pub fn insert_section(&mut self, section: Section<T>, index: usize) -> Result<()> {
        let count = self.sections.len();
        if index > count {
            return Err(StorageError::SectionIndexOutOfBounds { index, count });
        }
        self.sections.insert(index, section);
        strace!(index, "Storage::insert_section");
        self.finish(ChangeEvent::section(ChangeKind::Insert, index).into());
        Ok(())
    }

    /// Replaces the content of `for_section`, creating it if needed.
    ///
    /// An existing section is reported as reloaded (a section-level update).
    pub fn set_items(&mut self, items: impl IntoIterator<Item = T>, for_section: usize) {
        let existed = for_section < self.sections.len();
        let mut update = StorageUpdate::new();
        let section = self.ensure_section(for_section, &mut update);
        *section = items.into_iter().collect();
        if existed {
            update.push(ChangeEvent::section(ChangeKind::Update, for_section));
        }
        self.finish(update);
    }

    /// Replaces every section.
    ///
    /// Reports deletes for sections that no longer exist (deepest first), reloads for sections
    /// that exist on both sides, and inserts for new sections.
    pub fn set_sections(&mut self, sections: Vec<Section<T>>) {
        let old = self.sections.len();
        let new = sections.len();
        self.sections = sections;

        let mut update = StorageUpdate::new();
        update.extend((new..old).rev().map(|i| ChangeEvent::section(ChangeKind::Delete, i)));
        update.extend((0..old.min(new)).map(|i| ChangeEvent::section(ChangeKind::Update, i)));
        update.extend((old..new).map(|i| ChangeEvent::section(ChangeKind::Insert, i)));
        strace!(old, new, "Storage::set_sections");
        self.finish(update);
    }

    /// Replaces the item at `at` and returns the previous one.
    pub fn replace_item_at(&mut self, at: Position, item: T) -> Result<T> {
        let prev = self.section_mut(at.section)?.replace(at.offset, item)?;
        self.finish(ChangeEvent::item(ChangeKind::Update, at).into());
        Ok(prev)
    }

    /// Moves the item at `from` to `to`.
    ///
    /// `to` is interpreted after the item has been taken out of `from`. The destination section
    /// must exist. Everything is validated before anything is mutated.
    pub fn move_item(&mut self, from: Position, to: Position) -> Result<()> {
        let src_len = self.section_mut(from.section)?.len();
        if from.offset >= src_len {
            return Err(StorageError::IndexOutOfBounds {
                offset: from.offset,
                len: src_len,
            });
        }
        let dst_len = if to.section == from.section {
            src_len - 1
        } else {
            self.section_mut(to.section)?.len()
        };
        if to.offset > dst_len {
            return Err(StorageError::IndexOutOfBounds {
                offset: to.offset,
                len: dst_len,
            });
        }

        let item = self.section_mut(from.section)?.remove_at(from.offset)?;
        self.section_mut(to.section)?.insert(to.offset, item)?;
        strace!(%from, %to, "Storage::move_item");
        self.finish(ChangeEvent::item_move(from, to).into());
        Ok(())
    }

    /// Moves the section at `from` so that it ends up at index `to`.
    pub fn move_section(&mut self, from: usize, to: usize) -> Result<()> {
        let count = self.sections.len();
        for index in [from, to] {
            if index >= count {
                return Err(StorageError::SectionIndexOutOfBounds { index, count });
            }
        }
        let section = self.sections.remove(from);
        self.sections.insert(to, section);
        strace!(from, to, "Storage::move_section");
        self.finish(ChangeEvent::section_move(from, to).into());
        Ok(())
    }

    /// Removes the items at `positions` in one batch and returns how many were removed.
    ///
    /// Every position names the item as it was before the call. Duplicates are removed once and
    /// positions that are out of bounds are skipped. The reported deletes carry the original
    /// positions, deepest first, and are delivered once after all removals.
    pub fn remove_items_at(&mut self, positions: impl IntoIterator<Item = Position>) -> usize {
        let mut targets: Vec<Position> = positions.into_iter().collect();
        let requested = targets.len();
        sort_descending(&mut targets);
        targets.dedup();
        if targets.len() != requested {
            swarn!(
                duplicates = requested - targets.len(),
                "Storage::remove_items_at: duplicate positions coalesced"
            );
        }

        let removed = self.remove_sorted(&targets);
        strace!(requested, removed = removed.len(), "Storage::remove_items_at");

        let count = removed.len();
        let mut update = StorageUpdate::new();
        update.extend(
            removed
                .into_iter()
                .map(|p| ChangeEvent::item(ChangeKind::Delete, p)),
        );
        self.finish(update);
        count
    }

    /// Removes every item of section `index`, keeping the (now empty) section.
    ///
    /// Reports one delete per removed item in ascending offset order and returns the count.
    pub fn remove_items_from_section(&mut self, index: usize) -> Result<usize> {
        let count = self.section_mut(index)?.remove_all();
        strace!(index, removed = count, "Storage::remove_items_from_section");
        let mut update = StorageUpdate::new();
        update.extend(
            (0..count).map(|o| ChangeEvent::item(ChangeKind::Delete, Position::new(index, o))),
        );
        self.finish(update);
        Ok(count)
    }

    /// Removes whole sections and returns how many were removed.
    ///
    /// Indexes refer to the state before the call; duplicates and out-of-bounds indexes are
    /// ignored. One section-level delete is reported per removed section, deepest first.
    pub fn remove_sections(&mut self, indices: impl IntoIterator<Item = usize>) -> usize {
        let mut targets: Vec<usize> = indices.into_iter().collect();
        targets.sort_by(|a, b| b.cmp(a));
        targets.dedup();

        let mut update = StorageUpdate::new();
        for index in targets {
            if index >= self.sections.len() {
                strace!(index, "Storage::remove_sections: stale index ignored");
                continue;
            }
            self.sections.remove(index);
            update.push(ChangeEvent::section(ChangeKind::Delete, index));
        }
        let count = update.len();
        strace!(removed = count, "Storage::remove_sections");
        self.finish(update);
        count
    }

    /// Empties every section. Sections are kept and reported as reloaded.
    pub fn remove_all_items(&mut self) {
        let mut update = StorageUpdate::new();
        for (index, section) in self.sections.iter_mut().enumerate() {
            if section.remove_all() > 0 {
                update.push(ChangeEvent::section(ChangeKind::Update, index));
            }
        }
        self.finish(update);
    }

    /// Removes each target in order and returns the ones that existed.
    ///
    /// `targets` must be sorted deepest-first without duplicates, so that a removal never shifts
    /// a target that is still waiting.
    fn remove_sorted(&mut self, targets: &[Position]) -> Vec<Position> {
        debug_assert!(targets.windows(2).all(|w| w[0] > w[1]));
        let mut removed = Vec::with_capacity(targets.len());
        for &p in targets {
            let Some(section) = self.sections.get_mut(p.section) else {
                strace!(position = %p, "Storage::remove_sorted: stale section ignored");
                continue;
            };
            if section.remove_at(p.offset).is_ok() {
                removed.push(p);
            } else {
                strace!(position = %p, "Storage::remove_sorted: stale offset ignored");
            }
        }
        removed
    }
}

impl<T: PartialEq> Storage<T> {
    /// Position of the first item equal to `item`, searching sections in order.
    pub fn position_of(&self, item: &T) -> Option<Position> {
        self.sections.iter().enumerate().find_map(|(s, section)| {
            section.position_of(item).map(|o| Position::new(s, o))
        })
    }

    /// Positions of the first occurrence of each item, in the order given.
    ///
    /// Items that are not found are skipped; items resolving to the same position are reported
    /// once.
    pub fn positions_of(&self, items: &[T]) -> Vec<Position> {
        let mut seen = BTreeSet::new();
        items
            .iter()
            .filter_map(|item| self.position_of(item))
            .filter(|p| seen.insert(*p))
            .collect()
    }

    /// Removes the first occurrence of each item and returns how many were removed.
    ///
    /// All occurrences are located before anything is removed, so the reported deletes carry the
    /// original positions, listed in the order the items were given. Missing items are skipped.
    pub fn remove_items(&mut self, items: &[T]) -> usize {
        let targets = self.positions_of(items);
        let mut order = targets.clone();
        sort_descending(&mut order);
        let removed = self.remove_sorted(&order);
        debug_assert_eq!(removed.len(), targets.len());
        strace!(
            requested = items.len(),
            removed = removed.len(),
            "Storage::remove_items"
        );

        let count = targets.len();
        let mut update = StorageUpdate::new();
        update.extend(
            targets
                .into_iter()
                .map(|p| ChangeEvent::item(ChangeKind::Delete, p)),
        );
        self.finish(update);
        count
    }

    /// Replaces the first occurrence of `old` with `new`. Returns `false` if `old` is absent.
    pub fn replace_item(&mut self, old: &T, new: T) -> bool {
        match self.position_of(old) {
            Some(at) => self.replace_item_at(at, new).is_ok(),
            None => false,
        }
    }

    /// Reports the first occurrence of `item` as updated, e.g. after it was mutated in place
    /// through interior mutability. Returns `false` if `item` is absent.
    pub fn reload_item(&mut self, item: &T) -> bool {
        let Some(at) = self.position_of(item) else {
            return false;
        };
        self.finish(ChangeEvent::item(ChangeKind::Update, at).into());
        true
    }
}
