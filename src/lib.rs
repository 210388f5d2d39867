//! A sectioned, in-memory item storage for list and grid UIs.
//!
//! Items live in ordered sections and are addressed by [`Position`] (section index plus offset
//! inside the section). Every mutating call on [`Storage`] reports one ordered
//! [`StorageUpdate`] to a [`ChangeObserver`], so a UI binding can animate the difference against
//! the state it last rendered.
//!
//! Batch removal by position is the core algorithm: targets are processed deepest-first so that
//! no removal shifts a target still waiting, while the reported deletes keep naming the original
//! positions.
//!
//! It is UI-agnostic. A TUI/GUI layer is expected to:
//! - install an observer and translate change events into its own animation calls
//! - optionally defer delivery while it performs many edits before one refresh
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod change;
mod error;
mod observer;
mod options;
mod position;
mod section;
mod storage;


pub use change::{ChangeEvent, ChangeKind, StorageUpdate};
pub use error::{Result, StorageError};
pub use observer::{ChangeObserver, UpdateLog};
pub use options::{StorageOptions, UpdateMode};
pub use position::{Position, sort_ascending, sort_descending};
pub use section::Section;
pub use storage::Storage;
