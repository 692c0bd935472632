//! Flat list storage for nestlist.
//!
//! This crate defines the boundary between the nested-list engine and the
//! key-value store that actually holds the data. The backing store only
//! knows about flat lists of strings addressed by string keys; nesting is
//! layered on top of it by `nestlist-core`.
//!
//! # Capability Set
//!
//! Every backend implements the [`ListStore`] trait:
//!
//! - length, inclusive range reads, indexed get and set
//! - right push, trim of the final element, remove-all-matching
//! - key delete and existence checks
//! - [`ListStore::atomic_batch`] for all-or-nothing multi-command writes
//!
//! # Storage Backends
//!
//! - [`InMemoryListStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Semantics
//!
//! 1. A list that becomes empty ceases to exist (its key is absent).
//! 2. Range and index arguments accept negative offsets counted from the end.
//! 3. Reads of absent keys behave like reads of empty lists.
//! 4. A batch is visible to other readers as a single transition.

pub mod batch;
pub mod error;
pub mod memory;
pub mod traits;

pub use batch::BatchOp;
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryListStore;
pub use traits::ListStore;
