/// Errors from list store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// An indexed write addressed a slot outside the current list.
    #[error("index {index} out of range for {key} (len {len})")]
    IndexOutOfRange { key: String, index: i64, len: usize },

    /// An indexed write addressed a key that does not exist.
    #[error("no such key: {0}")]
    NoSuchKey(String),

    /// The store cannot currently serve requests.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// An internal lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    LockPoisoned,

    /// Any other failure reported by the underlying backend.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
