//! The [`NestedList`] handle.
//!
//! A handle is nothing more than a logical key plus the [`Registry`] it
//! resolves against. The backing list comes into existence on the first
//! write and disappears once emptied or cleared. Nesting is always by
//! indirection: a slot holding a sublist stores that sublist's reference
//! token, never its content.
//!
//! There is no referential integrity. Removing a slot that references a
//! sublist leaves the sublist alone, and clearing a sublist leaves dangling
//! tokens in any parent that still holds them.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use nestlist_store::{BatchOp, ListStore};
use tracing::debug;

use crate::codec::Slot;
use crate::error::{ListError, ListResult};
use crate::namespace::{Namespace, generate_key, validate_key};
use crate::registry::Registry;
use crate::value::{Element, FlatValue, Storable};

/// Placeholder pushed to fill gaps left by sparse indexed writes.
const PADDING: &str = "";

/// A handle to a store-backed list that may contain other lists.
///
/// Two handles are equal iff their logical keys are equal, whatever the
/// store currently holds for them.
#[derive(Clone)]
pub struct NestedList {
    key: String,
    registry: Arc<Registry>,
}

/// Store, namespace and qualified key captured for one operation.
struct Resolved {
    store: Arc<dyn ListStore>,
    namespace: Arc<Namespace>,
    qualified: String,
}

impl NestedList {
    /// A handle for `key`. Does not touch the store.
    pub fn new(registry: &Arc<Registry>, key: impl Into<String>) -> ListResult<Self> {
        let key = key.into();
        validate_key(&key)?;
        Ok(Self {
            key,
            registry: Arc::clone(registry),
        })
    }

    /// A handle with a freshly generated random key.
    pub fn anonymous(registry: &Arc<Registry>) -> Self {
        Self {
            key: generate_key(),
            registry: Arc::clone(registry),
        }
    }

    /// The logical key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The backing key under the registry's current namespace.
    pub fn qualified_key(&self) -> String {
        self.registry.qualify(&self.key)
    }

    /// The registry this handle resolves against.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    fn resolve(&self) -> ListResult<Resolved> {
        let store = self.registry.current_store()?;
        let namespace = self.registry.current_namespace();
        let qualified = namespace.qualify(&self.key);
        Ok(Resolved {
            store,
            namespace,
            qualified,
        })
    }

    fn sibling(&self, key: String) -> Self {
        Self {
            key,
            registry: Arc::clone(&self.registry),
        }
    }

    fn element(&self, namespace: &Namespace, raw: String) -> Element {
        match namespace.classify(raw) {
            Slot::Value(v) => Element::Value(v),
            Slot::Reference(key) => Element::List(self.sibling(key)),
        }
    }

    /// Convert a value to the string written into a slot.
    ///
    /// Sequences are written out as a new anonymous list first.
    fn stored_value(&self, namespace: &Namespace, value: Storable) -> ListResult<String> {
        match value {
            Storable::Value(v) => Ok(v),
            Storable::List(list) => Ok(namespace.encode(&list.key)),
            Storable::Seq(items) => {
                let sublist = Self::anonymous(&self.registry);
                debug!(parent = %self.key, sublist = %sublist.key, len = items.len(), "storing sequence as sublist");
                for item in items {
                    sublist.push(item)?;
                }
                Ok(namespace.encode(&sublist.key))
            }
        }
    }

    // ---- Reads ----

    /// The element at `index`, or `None` if it is out of range.
    pub fn get(&self, index: usize) -> ListResult<Option<Element>> {
        self.at(offset(index))
    }

    /// The element at a signed `index`; negative values count back from
    /// the end (`-1` is the last element). `None` if out of range.
    pub fn at(&self, index: i64) -> ListResult<Option<Element>> {
        let r = self.resolve()?;
        let raw = r.store.index(&r.qualified, index)?;
        Ok(raw.map(|raw| self.element(&r.namespace, raw)))
    }

    /// The final element, or `None` if the list is empty.
    pub fn last(&self) -> ListResult<Option<Element>> {
        self.at(-1)
    }

    /// Current number of elements, `0` if the list does not exist.
    pub fn count(&self) -> ListResult<usize> {
        let r = self.resolve()?;
        Ok(r.store.len(&r.qualified)?)
    }

    pub fn is_empty(&self) -> ListResult<bool> {
        Ok(self.count()? == 0)
    }

    /// Whether the backing key is present in the store.
    pub fn exists(&self) -> ListResult<bool> {
        let r = self.resolve()?;
        Ok(r.store.exists(&r.qualified)?)
    }

    /// Iterate over a snapshot of the list taken now.
    ///
    /// The iterator does not observe later writes; call `iter` again for a
    /// fresh snapshot.
    pub fn iter(&self) -> ListResult<Elements> {
        let r = self.resolve()?;
        let raw = r.store.all(&r.qualified)?;
        Ok(Elements {
            raw: raw.into_iter(),
            namespace: r.namespace,
            parent: self.clone(),
        })
    }

    /// Every element, in list order.
    pub fn all(&self) -> ListResult<Vec<Element>> {
        Ok(self.iter()?.collect())
    }

    // ---- Writes ----

    /// Write `value` at `index`, padding with empty strings past the end.
    ///
    /// Never fails for index bounds: writing beyond the current length
    /// appends placeholders up to `index` and then the value.
    pub fn set(&self, index: usize, value: impl Into<Storable>) -> ListResult<()> {
        let r = self.resolve()?;
        let stored = self.stored_value(&r.namespace, value.into())?;

        let len = r.store.len(&r.qualified)?;
        if index < len {
            r.store.set_index(&r.qualified, offset(index), &stored)?;
            return Ok(());
        }

        let gap = index - len;
        if gap > 0 {
            debug!(key = %self.key, len, index, "padding sparse write");
        }
        for _ in 0..gap {
            r.store.push(&r.qualified, PADDING)?;
        }
        r.store.push(&r.qualified, &stored)?;
        Ok(())
    }

    /// Append `value`, returning the new length.
    pub fn push(&self, value: impl Into<Storable>) -> ListResult<usize> {
        let r = self.resolve()?;
        let stored = self.stored_value(&r.namespace, value.into())?;
        Ok(r.store.push(&r.qualified, &stored)?)
    }

    /// Alias for [`push`](Self::push).
    pub fn append(&self, value: impl Into<Storable>) -> ListResult<usize> {
        self.push(value)
    }

    /// Push each item of a sequence in order; a single value is pushed once.
    pub fn append_many(&self, values: impl Into<Storable>) -> ListResult<()> {
        match values.into() {
            Storable::Seq(items) => {
                for item in items {
                    self.push(item)?;
                }
            }
            single => {
                self.push(single)?;
            }
        }
        Ok(())
    }

    /// Remove the final element. A no-op on an empty list.
    pub fn pop_last(&self) -> ListResult<()> {
        let r = self.resolve()?;
        r.store.trim_last(&r.qualified)?;
        Ok(())
    }

    /// Remove the element at `index`. Returns `false` if out of range.
    ///
    /// The store has no positional delete, so the list is read, filtered,
    /// and rebuilt as delete-plus-pushes inside one atomic batch. Readers
    /// never see the key half rebuilt, but the initial read is not part of
    /// the batch: a write landing between the read and the batch is lost.
    pub fn remove_at(&self, index: usize) -> ListResult<bool> {
        let r = self.resolve()?;
        let values = r.store.all(&r.qualified)?;
        if index >= values.len() {
            return Ok(false);
        }

        let mut ops = Vec::with_capacity(values.len());
        ops.push(BatchOp::delete(r.qualified.as_str()));
        ops.extend(
            values
                .into_iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .map(|(_, v)| BatchOp::push(r.qualified.as_str(), v)),
        );
        debug!(key = %self.key, index, remaining = ops.len() - 1, "rebuilding list without index");
        r.store.atomic_batch(&ops)?;
        Ok(true)
    }

    /// Remove every occurrence of `value`, returning how many were removed.
    ///
    /// A list handle matches its reference token. A sequence has no stored
    /// identity to match, so it removes nothing.
    pub fn remove_value(&self, value: impl Into<Storable>) -> ListResult<usize> {
        let r = self.resolve()?;
        let needle = match value.into() {
            Storable::Value(v) => v,
            Storable::List(list) => r.namespace.encode(&list.key),
            Storable::Seq(_) => return Ok(0),
        };
        Ok(r.store.remove_matching(&r.qualified, &needle)?)
    }

    /// Delete the backing key. Referenced sublists are left untouched.
    pub fn clear(&self) -> ListResult<bool> {
        let r = self.resolve()?;
        Ok(r.store.delete(&r.qualified)?)
    }

    // ---- Materialization ----

    /// Deeply materialize the list, replacing every reference with the
    /// content of the list it names.
    ///
    /// Cycles are not detected; following more than the registry's
    /// `max_depth` references fails with [`ListError::DepthLimitExceeded`].
    pub fn to_flat_array(&self) -> ListResult<Vec<FlatValue>> {
        self.materialize(0)
    }

    fn materialize(&self, depth: usize) -> ListResult<Vec<FlatValue>> {
        let limit = self.registry.max_depth();
        if depth > limit {
            return Err(ListError::DepthLimitExceeded {
                key: self.key.clone(),
                limit,
            });
        }
        self.iter()?
            .map(|element| match element {
                Element::Value(v) => Ok(FlatValue::Value(v)),
                Element::List(list) => list.materialize(depth + 1).map(FlatValue::List),
            })
            .collect()
    }

    /// Deep materialization rendered as a JSON array.
    pub fn to_json(&self) -> ListResult<serde_json::Value> {
        let items = self.to_flat_array()?;
        Ok(serde_json::Value::Array(items.iter().map(Into::into).collect()))
    }

    /// Compare the deep materialization against `other`, element-wise.
    pub fn content_eq(&self, other: &[FlatValue]) -> ListResult<bool> {
        Ok(self.to_flat_array()? == other)
    }
}

/// Clamp a slot index into the store's signed index space.
fn offset(index: usize) -> i64 {
    i64::try_from(index).unwrap_or(i64::MAX)
}

impl PartialEq for NestedList {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for NestedList {}

impl Hash for NestedList {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

/// Deep comparison; a store failure compares unequal.
impl PartialEq<[FlatValue]> for NestedList {
    fn eq(&self, other: &[FlatValue]) -> bool {
        self.content_eq(other).unwrap_or(false)
    }
}

impl PartialEq<Vec<FlatValue>> for NestedList {
    fn eq(&self, other: &Vec<FlatValue>) -> bool {
        self == other.as_slice()
    }
}

impl fmt::Debug for NestedList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NestedList").field(&self.key).finish()
    }
}

/// Lazy iterator over a snapshot of a list's raw slots.
///
/// Each slot is classified as it is yielded.
pub struct Elements {
    raw: std::vec::IntoIter<String>,
    namespace: Arc<Namespace>,
    parent: NestedList,
}

impl Iterator for Elements {
    type Item = Element;

    fn next(&mut self) -> Option<Element> {
        let raw = self.raw.next()?;
        Some(self.parent.element(&self.namespace, raw))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.raw.size_hint()
    }
}

impl ExactSizeIterator for Elements {}

impl fmt::Debug for Elements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Elements")
            .field("list", &self.parent.key)
            .field("remaining", &self.raw.len())
            .finish()
    }
}
