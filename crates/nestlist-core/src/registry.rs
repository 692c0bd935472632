//! The store and namespace context shared by list handles.
//!
//! A [`Registry`] holds the active store handle and the current
//! [`Namespace`]. Handles keep an `Arc<Registry>` and read both on every
//! operation, so reconfiguring the registry takes effect immediately for
//! every handle created from it. Stored reference tokens are never
//! rewritten: switching namespaces does not migrate existing data.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use nestlist_store::ListStore;
use tracing::info;

use crate::config::ListConfig;
use crate::error::{ListError, ListResult};
use crate::list::NestedList;
use crate::namespace::Namespace;

/// Injected configuration for [`NestedList`] handles.
pub struct Registry {
    store: RwLock<Option<Arc<dyn ListStore>>>,
    namespace: RwLock<Arc<Namespace>>,
    max_depth: usize,
}

impl Registry {
    /// A registry with the default namespace and no store.
    pub fn new() -> Self {
        let config = ListConfig::default();
        Self {
            store: RwLock::new(None),
            namespace: RwLock::new(Arc::new(Namespace::default())),
            max_depth: config.max_depth,
        }
    }

    /// A registry with no store, configured from `config`.
    pub fn with_config(config: &ListConfig) -> ListResult<Self> {
        let namespace = Namespace::new(config.namespace.clone())?;
        Ok(Self {
            store: RwLock::new(None),
            namespace: RwLock::new(Arc::new(namespace)),
            max_depth: config.max_depth,
        })
    }

    /// A registry with the default configuration and `store` installed.
    pub fn with_store(store: Arc<dyn ListStore>) -> ListResult<Self> {
        let registry = Self::new();
        registry.configure_store(store)?;
        Ok(registry)
    }

    /// Install the store handle.
    ///
    /// The store is pinged first; a store that cannot serve requests is
    /// rejected here with [`ListError::Configuration`] and the previous
    /// handle, if any, stays in place.
    pub fn configure_store(&self, store: Arc<dyn ListStore>) -> ListResult<()> {
        store
            .ping()
            .map_err(|e| ListError::Configuration(format!("store failed capability check: {e}")))?;
        *self.store.write().unwrap_or_else(PoisonError::into_inner) = Some(store);
        info!(namespace = %self.current_namespace(), "list store configured");
        Ok(())
    }

    /// The configured store handle.
    pub fn current_store(&self) -> ListResult<Arc<dyn ListStore>> {
        self.store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(ListError::NotConfigured)
    }

    /// `true` once a store has been installed.
    pub fn is_configured(&self) -> bool {
        self.store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Switch the namespace used by every subsequent operation.
    pub fn set_namespace(&self, name: &str) -> ListResult<()> {
        let namespace = Arc::new(Namespace::new(name)?);
        let mut current = self.namespace.write().unwrap_or_else(PoisonError::into_inner);
        info!(from = %current, to = %namespace, "namespace changed");
        *current = namespace;
        Ok(())
    }

    /// The namespace in effect right now.
    pub fn current_namespace(&self) -> Arc<Namespace> {
        Arc::clone(&self.namespace.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Snapshot of the reference codec for the current namespace.
    ///
    /// The snapshot keeps encoding and classifying under the namespace it
    /// was taken in, even if the registry switches namespaces afterwards.
    pub fn codec(&self) -> Arc<Namespace> {
        self.current_namespace()
    }

    /// Resolve a logical key against the current namespace.
    pub fn qualify(&self, key: &str) -> String {
        self.current_namespace().qualify(key)
    }

    /// Maximum reference depth followed by deep materialization.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// A handle for `key`. Fails if no store is configured.
    pub fn get(self: &Arc<Self>, key: &str) -> ListResult<NestedList> {
        if !self.is_configured() {
            return Err(ListError::NotConfigured);
        }
        NestedList::new(self, key)
    }

    /// A handle with a freshly generated key. Fails if no store is configured.
    pub fn anonymous(self: &Arc<Self>) -> ListResult<NestedList> {
        if !self.is_configured() {
            return Err(ListError::NotConfigured);
        }
        Ok(NestedList::anonymous(self))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("namespace", &self.current_namespace().name())
            .field("configured", &self.is_configured())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nestlist_store::{BatchOp, InMemoryListStore, StoreError, StoreResult};

    /// A store that refuses every request.
    struct OfflineStore;

    impl ListStore for OfflineStore {
        fn len(&self, _: &str) -> StoreResult<usize> {
            Err(offline())
        }
        fn range(&self, _: &str, _: i64, _: i64) -> StoreResult<Vec<String>> {
            Err(offline())
        }
        fn index(&self, _: &str, _: i64) -> StoreResult<Option<String>> {
            Err(offline())
        }
        fn set_index(&self, _: &str, _: i64, _: &str) -> StoreResult<()> {
            Err(offline())
        }
        fn push(&self, _: &str, _: &str) -> StoreResult<usize> {
            Err(offline())
        }
        fn trim_last(&self, _: &str) -> StoreResult<()> {
            Err(offline())
        }
        fn remove_matching(&self, _: &str, _: &str) -> StoreResult<usize> {
            Err(offline())
        }
        fn delete(&self, _: &str) -> StoreResult<bool> {
            Err(offline())
        }
        fn exists(&self, _: &str) -> StoreResult<bool> {
            Err(offline())
        }
        fn atomic_batch(&self, _: &[BatchOp]) -> StoreResult<()> {
            Err(offline())
        }
        fn ping(&self) -> StoreResult<()> {
            Err(offline())
        }
    }

    fn offline() -> StoreError {
        StoreError::Unavailable("offline".into())
    }

    // -----------------------------------------------------------------------
    // Store configuration
    // -----------------------------------------------------------------------

    #[test]
    fn current_store_requires_configuration() {
        let registry = Registry::new();
        assert!(matches!(
            registry.current_store(),
            Err(ListError::NotConfigured)
        ));
        assert!(!registry.is_configured());
    }

    #[test]
    fn configure_and_return_store() {
        let registry = Registry::new();
        let store: Arc<dyn ListStore> = Arc::new(InMemoryListStore::new());
        registry.configure_store(Arc::clone(&store)).unwrap();
        assert!(Arc::ptr_eq(&registry.current_store().unwrap(), &store));
    }

    #[test]
    fn unusable_store_fails_at_configuration_time() {
        let registry = Registry::new();
        let err = registry.configure_store(Arc::new(OfflineStore)).unwrap_err();
        assert!(matches!(err, ListError::Configuration(_)));
        assert!(!registry.is_configured());
    }

    #[test]
    fn rejected_store_keeps_previous_handle() {
        let registry = Registry::with_store(Arc::new(InMemoryListStore::new())).unwrap();
        assert!(registry.configure_store(Arc::new(OfflineStore)).is_err());
        assert!(registry.current_store().unwrap().ping().is_ok());
    }

    #[test]
    fn get_requires_configuration() {
        let registry = Arc::new(Registry::new());
        assert!(matches!(registry.get("some key"), Err(ListError::NotConfigured)));
        assert!(matches!(registry.anonymous(), Err(ListError::NotConfigured)));
    }

    #[test]
    fn get_returns_handle_for_key() {
        let registry = Arc::new(Registry::with_store(Arc::new(InMemoryListStore::new())).unwrap());
        let list = registry.get("test").unwrap();
        assert_eq!(list.key(), "test");
    }

    #[test]
    fn get_rejects_empty_key() {
        let registry = Arc::new(Registry::with_store(Arc::new(InMemoryListStore::new())).unwrap());
        assert!(matches!(registry.get(""), Err(ListError::InvalidKey { .. })));
    }

    // -----------------------------------------------------------------------
    // Namespacing
    // -----------------------------------------------------------------------

    #[test]
    fn default_namespace() {
        let registry = Registry::new();
        assert_eq!(registry.current_namespace().name(), "redisarray");
        assert_eq!(registry.qualify("k"), "redisarray:k");
    }

    #[test]
    fn set_custom_namespace() {
        let registry = Registry::new();
        registry.set_namespace("rml").unwrap();
        assert_eq!(registry.current_namespace().name(), "rml");
        assert_eq!(registry.qualify("k"), "rml:k");
    }

    #[test]
    fn invalid_namespace_leaves_current_in_place() {
        let registry = Registry::new();
        assert!(registry.set_namespace("").is_err());
        assert_eq!(registry.current_namespace().name(), "redisarray");
    }

    #[test]
    fn with_config_applies_namespace_and_depth() {
        let config = ListConfig {
            namespace: "cfg".into(),
            max_depth: 3,
        };
        let registry = Registry::with_config(&config).unwrap();
        assert_eq!(registry.current_namespace().name(), "cfg");
        assert_eq!(registry.max_depth(), 3);
    }

    #[test]
    fn concurrent_namespace_changes_are_safe() {
        use std::thread;

        let registry = Arc::new(Registry::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    registry.set_namespace(&format!("ns{i}")).unwrap();
                    let _ = registry.qualify("k");
                })
            })
            .collect();
        for h in handles {
            h.join().expect("thread should not panic");
        }
        assert!(registry.current_namespace().name().starts_with("ns"));
    }

    #[test]
    fn codec_snapshot_outlives_namespace_change() {
        let registry = Registry::new();
        registry.set_namespace("ns").unwrap();
        let codec = registry.codec();
        assert_eq!(codec.encode("s1"), "ns:~>s1");

        registry.set_namespace("rml").unwrap();
        assert_eq!(codec.encode("s1"), "ns:~>s1");
        assert_eq!(registry.codec().encode("s1"), "rml:~>s1");
        assert!(!registry.codec().is_reference("ns:~>s1"));
    }

    #[test]
    fn poisoned_namespace_lock_is_recovered() {
        use std::thread;

        let registry = Arc::new(Registry::new());
        let writer = Arc::clone(&registry);
        let result = thread::spawn(move || {
            let _guard = writer.namespace.write().unwrap();
            panic!("writer panicked while holding the lock");
        })
        .join();
        assert!(result.is_err());

        assert_eq!(registry.current_namespace().name(), "redisarray");
        registry.set_namespace("rml").unwrap();
        assert_eq!(registry.qualify("k"), "rml:k");
    }

    #[test]
    fn debug_format() {
        let debug = format!("{:?}", Registry::new());
        assert!(debug.contains("Registry"));
        assert!(debug.contains("redisarray"));
    }
}
