//! Nested lists over a flat list store.
//!
//! The backing store only offers flat lists of strings. This crate lets
//! callers treat those lists as if they nested: a slot may hold a plain
//! value or a *reference token* naming another list, and every list lives
//! under its own namespaced key.
//!
//! # Key Space
//!
//! - Fully-qualified key: `"{namespace}:{logical_key}"`
//! - Reference token (stored as a value): `"{namespace}:~>{logical_key}"`
//! - Padding placeholder for sparse writes: `""`
//!
//! # Modules
//!
//! - [`error`] — [`ListError`] and the [`ListResult`] alias
//! - [`config`] — [`ListConfig`], loadable from TOML
//! - [`namespace`] — [`Namespace`] and key resolution
//! - [`codec`] — reference token encoding and classification
//! - [`registry`] — [`Registry`], the injected store + namespace context
//! - [`value`] — [`Storable`] input, [`Element`] and [`FlatValue`] output
//! - [`list`] — the [`NestedList`] handle and its operations
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use nestlist_core::{FlatValue, Registry};
//! use nestlist_store::InMemoryListStore;
//!
//! let registry = Arc::new(Registry::with_store(Arc::new(InMemoryListStore::new())).unwrap());
//! let list = registry.get("todo").unwrap();
//! list.push("milk").unwrap();
//! list.push(vec!["eggs", "flour"]).unwrap();
//!
//! let expected: Vec<FlatValue> = vec!["milk".into(), vec!["eggs", "flour"].into()];
//! assert_eq!(list.to_flat_array().unwrap(), expected);
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod list;
pub mod namespace;
pub mod registry;
pub mod value;

pub use codec::Slot;
pub use config::ListConfig;
pub use error::{ListError, ListResult};
pub use list::{Elements, NestedList};
pub use namespace::{DEFAULT_NAMESPACE, Namespace, REFERENCE_MARKER};
pub use registry::Registry;
pub use value::{Element, FlatValue, Storable};
