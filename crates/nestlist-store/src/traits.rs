use crate::batch::BatchOp;
use crate::error::StoreResult;

/// Flat list storage backend.
///
/// This is the full capability set the nested-list engine relies on. All
/// implementations must satisfy these invariants:
/// - Reads of an absent key behave like reads of an empty list.
/// - A list whose last element is removed ceases to exist.
/// - Indices may be negative, counting back from the end (`-1` is the last
///   element).
/// - [`atomic_batch`](Self::atomic_batch) applies every operation or none,
///   and no reader observes an intermediate state.
/// - All backend errors are propagated, never silently ignored.
pub trait ListStore: Send + Sync {
    /// Number of elements in `key`, `0` if the key is absent.
    fn len(&self, key: &str) -> StoreResult<usize>;

    /// Elements from `start` to `end`, both inclusive.
    ///
    /// Out-of-range bounds are clamped; an empty range yields an empty vec.
    fn range(&self, key: &str, start: i64, end: i64) -> StoreResult<Vec<String>>;

    /// Element at `index`, or `Ok(None)` if it is out of range.
    fn index(&self, key: &str, index: i64) -> StoreResult<Option<String>>;

    /// Overwrite the element at `index`.
    ///
    /// Fails with [`StoreError::NoSuchKey`] or
    /// [`StoreError::IndexOutOfRange`] if the slot does not exist; callers
    /// pad the list first.
    ///
    /// [`StoreError::NoSuchKey`]: crate::StoreError::NoSuchKey
    /// [`StoreError::IndexOutOfRange`]: crate::StoreError::IndexOutOfRange
    fn set_index(&self, key: &str, index: i64, value: &str) -> StoreResult<()>;

    /// Append `value` and return the new length.
    fn push(&self, key: &str, value: &str) -> StoreResult<usize>;

    /// Remove the final element. A no-op on an absent key.
    fn trim_last(&self, key: &str) -> StoreResult<()>;

    /// Remove every element equal to `value` and return how many were removed.
    fn remove_matching(&self, key: &str, value: &str) -> StoreResult<usize>;

    /// Delete `key` and its elements. Returns `true` if the key existed.
    fn delete(&self, key: &str) -> StoreResult<bool>;

    /// Check whether `key` holds a list.
    fn exists(&self, key: &str) -> StoreResult<bool>;

    /// Execute `ops` in order as one indivisible unit.
    fn atomic_batch(&self, ops: &[BatchOp]) -> StoreResult<()>;

    /// Confirm the backend is usable.
    ///
    /// Called once when the store is installed into a registry, so a
    /// misconfigured backend fails at configuration time rather than on
    /// first use.
    fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    /// Read every element of `key`.
    fn all(&self, key: &str) -> StoreResult<Vec<String>> {
        self.range(key, 0, -1)
    }
}
