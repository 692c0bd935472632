use serde::{Deserialize, Serialize};

/// A single write executed inside [`ListStore::atomic_batch`].
///
/// [`ListStore::atomic_batch`]: crate::ListStore::atomic_batch
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchOp {
    /// Append `value` to the right end of `key`.
    Push { key: String, value: String },
    /// Overwrite the element at `index` of `key`.
    SetIndex { key: String, index: i64, value: String },
    /// Remove the final element of `key`.
    TrimLast { key: String },
    /// Remove every element of `key` equal to `value`.
    RemoveMatching { key: String, value: String },
    /// Remove `key` and all of its elements.
    Delete { key: String },
}

impl BatchOp {
    pub fn push(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Push {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn delete(key: impl Into<String>) -> Self {
        Self::Delete { key: key.into() }
    }

    /// The key this operation writes to.
    pub fn key(&self) -> &str {
        match self {
            Self::Push { key, .. }
            | Self::SetIndex { key, .. }
            | Self::TrimLast { key }
            | Self::RemoveMatching { key, .. }
            | Self::Delete { key } => key,
        }
    }
}
