use thiserror::Error;

/// Errors returned by [`crate::Section`] and [`crate::Storage`].
///
/// Batch removals absorb stale positions as no-ops; only operations that name a specific target
/// report these.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageError {
    #[error("item offset {offset} out of bounds (len={len})")]
    IndexOutOfBounds { offset: usize, len: usize },

    #[error("section index {index} out of bounds (sections={count})")]
    SectionIndexOutOfBounds { index: usize, count: usize },
}

impl StorageError {
    pub fn is_section_error(&self) -> bool {
        matches!(self, Self::SectionIndexOutOfBounds { .. })
    }
}

pub type Result<T, E = StorageError> = core::result::Result<T, E>;
