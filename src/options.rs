/// When change batches reach the observer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UpdateMode {
    /// Every mutating call delivers its batch before returning.
    #[default]
    Immediate,
    /// Batches accumulate until [`crate::Storage::flush`] (or a switch back to `Immediate`).
    ///
    /// Data is still mutated immediately; only delivery is postponed.
    Deferred,
}

/// Configuration for [`crate::Storage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StorageOptions {
    pub update_mode: UpdateMode,

    /// Do not call the observer for operations that changed nothing.
    ///
    /// Defaults to `true`. A flush with nothing pending never calls the observer.
    pub skip_empty_updates: bool,
}

impl Default for StorageOptions {
    fn default() -> Self {
        Self {
            update_mode: UpdateMode::Immediate,
            skip_empty_updates: true,
        }
    }
}

impl StorageOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deferred() -> Self {
        Self {
            update_mode: UpdateMode::Deferred,
            ..Self::default()
        }
    }

    pub fn with_update_mode(mut self, update_mode: UpdateMode) -> Self {
        self.update_mode = update_mode;
        self
    }

    pub fn with_skip_empty_updates(mut self, skip: bool) -> Self {
        self.skip_empty_updates = skip;
        self
    }
}
