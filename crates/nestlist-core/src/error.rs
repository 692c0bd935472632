//! Error types for nested list operations.

use nestlist_store::StoreError;
use thiserror::Error;

/// Errors that can occur while configuring or operating on nested lists.
#[derive(Debug, Error)]
pub enum ListError {
    /// The store handed to the registry is unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An operation needed a store before one was configured.
    #[error("no store configured")]
    NotConfigured,

    /// A value is neither string-convertible, a list, nor a sequence.
    #[error("value is not storable: {0}")]
    TypeNotStorable(String),

    /// The namespace cannot be used to build keys and reference tokens.
    #[error("invalid namespace {name:?}: {reason}")]
    InvalidNamespace { name: String, reason: String },

    /// The logical key cannot address a list.
    #[error("invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    /// Deep materialization followed more references than allowed.
    #[error("nesting under {key} exceeds {limit} levels")]
    DepthLimitExceeded { key: String, limit: usize },

    /// Configuration text could not be parsed.
    #[error("malformed config: {0}")]
    Config(String),

    /// Error reported by the backing store.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Convenience type alias for list operations.
pub type ListResult<T> = std::result::Result<T, ListError>;
