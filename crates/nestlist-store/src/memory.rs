use std::collections::{BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::batch::BatchOp;
use crate::error::{StoreError, StoreResult};
use crate::traits::ListStore;

type Lists = HashMap<String, Vec<String>>;

/// In-memory, HashMap-based list store.
///
/// Intended for tests and embedding. Lists are held behind a `RwLock`, so
/// every single-key operation is atomic and batches are applied under one
/// write guard.
pub struct InMemoryListStore {
    lists: RwLock<Lists>,
}

impl InMemoryListStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            lists: RwLock::new(HashMap::new()),
        }
    }

    /// Number of keys currently stored.
    pub fn key_count(&self) -> StoreResult<usize> {
        Ok(self.read_guard()?.len())
    }

    /// Sorted keys starting with `prefix`. Pass `""` for every key.
    pub fn keys(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let lists = self.read_guard()?;
        let mut keys: Vec<String> = lists
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }

    /// Remove every key from the store.
    pub fn flush(&self) -> StoreResult<()> {
        self.write_guard()?.clear();
        Ok(())
    }

    fn read_guard(&self) -> StoreResult<RwLockReadGuard<'_, Lists>> {
        self.lists.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write_guard(&self) -> StoreResult<RwLockWriteGuard<'_, Lists>> {
        self.lists.write().map_err(|_| StoreError::LockPoisoned)
    }
}

impl Default for InMemoryListStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ListStore for InMemoryListStore {
    fn len(&self, key: &str) -> StoreResult<usize> {
        Ok(self.read_guard()?.get(key).map_or(0, Vec::len))
    }

    fn range(&self, key: &str, start: i64, end: i64) -> StoreResult<Vec<String>> {
        let lists = self.read_guard()?;
        let Some(list) = lists.get(key) else {
            return Ok(Vec::new());
        };
        Ok(match clamp_range(list.len(), start, end) {
            Some((from, to)) => list[from..=to].to_vec(),
            None => Vec::new(),
        })
    }

    fn index(&self, key: &str, index: i64) -> StoreResult<Option<String>> {
        let lists = self.read_guard()?;
        Ok(lists
            .get(key)
            .and_then(|list| resolve_index(list.len(), index).map(|i| list[i].clone())))
    }

    fn set_index(&self, key: &str, index: i64, value: &str) -> StoreResult<()> {
        apply(&mut *self.write_guard()?, &BatchOp::SetIndex {
            key: key.to_string(),
            index,
            value: value.to_string(),
        })
        .map(|_| ())
    }

    fn push(&self, key: &str, value: &str) -> StoreResult<usize> {
        let mut lists = self.write_guard()?;
        let list = lists.entry(key.to_string()).or_default();
        list.push(value.to_string());
        Ok(list.len())
    }

    fn trim_last(&self, key: &str) -> StoreResult<()> {
        apply(&mut *self.write_guard()?, &BatchOp::TrimLast {
            key: key.to_string(),
        })
        .map(|_| ())
    }

    fn remove_matching(&self, key: &str, value: &str) -> StoreResult<usize> {
        apply(&mut *self.write_guard()?, &BatchOp::RemoveMatching {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    fn delete(&self, key: &str) -> StoreResult<bool> {
        Ok(self.write_guard()?.remove(key).is_some())
    }

    fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.read_guard()?.contains_key(key))
    }

    fn atomic_batch(&self, ops: &[BatchOp]) -> StoreResult<()> {
        let mut lists = self.write_guard()?;

        // Stage only the touched keys so a failing op leaves the store as-is.
        let mut staged: Lists = HashMap::new();
        for op in ops {
            if let Some(list) = lists.get(op.key()) {
                staged
                    .entry(op.key().to_string())
                    .or_insert_with(|| list.clone());
            }
        }
        for op in ops {
            apply(&mut staged, op)?;
        }

        let touched: BTreeSet<&str> = ops.iter().map(BatchOp::key).collect();
        for key in touched {
            match staged.remove(key) {
                Some(list) => {
                    lists.insert(key.to_string(), list);
                }
                None => {
                    lists.remove(key);
                }
            }
        }
        debug!(ops = ops.len(), "applied atomic batch");
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryListStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.key_count().unwrap_or_default();
        f.debug_struct("InMemoryListStore")
            .field("key_count", &count)
            .finish()
    }
}

/// Apply one write to `lists`, returning the number of elements affected.
fn apply(lists: &mut Lists, op: &BatchOp) -> StoreResult<usize> {
    match op {
        BatchOp::Push { key, value } => {
            let list = lists.entry(key.clone()).or_default();
            list.push(value.clone());
            Ok(1)
        }
        BatchOp::SetIndex { key, index, value } => {
            let list = lists
                .get_mut(key)
                .ok_or_else(|| StoreError::NoSuchKey(key.clone()))?;
            let slot = resolve_index(list.len(), *index).ok_or_else(|| {
                StoreError::IndexOutOfRange {
                    key: key.clone(),
                    index: *index,
                    len: list.len(),
                }
            })?;
            list[slot] = value.clone();
            Ok(1)
        }
        BatchOp::TrimLast { key } => {
            let Some(list) = lists.get_mut(key) else {
                return Ok(0);
            };
            let removed = usize::from(list.pop().is_some());
            if list.is_empty() {
                lists.remove(key);
            }
            Ok(removed)
        }
        BatchOp::RemoveMatching { key, value } => {
            let Some(list) = lists.get_mut(key) else {
                return Ok(0);
            };
            let before = list.len();
            list.retain(|v| v != value);
            let removed = before - list.len();
            if list.is_empty() {
                lists.remove(key);
            }
            Ok(removed)
        }
        BatchOp::Delete { key } => Ok(usize::from(lists.remove(key).is_some())),
    }
}

/// Map a possibly negative index onto `0..len`.
fn resolve_index(len: usize, index: i64) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let i = if index < 0 { len + index } else { index };
    if (0..len).contains(&i) {
        usize::try_from(i).ok()
    } else {
        None
    }
}

/// Clamp inclusive, possibly negative bounds onto `0..len`.
fn clamp_range(len: usize, start: i64, end: i64) -> Option<(usize, usize)> {
    let len = i64::try_from(len).ok()?;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let end = if end < 0 { len + end } else { end.min(len - 1) };
    if len == 0 || start > end || start >= len {
        return None;
    }
    Some((usize::try_from(start).ok()?, usize::try_from(end).ok()?))
}
