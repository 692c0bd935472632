//! Namespaces and key resolution.
//!
//! Every list lives at `"{namespace}:{logical_key}"` in the backing store.
//! Valid namespaces:
//! - Must be non-empty
//! - Must not contain the reserved reference marker `~>`
//!
//! Valid logical keys must be non-empty.

use std::fmt;

use crate::error::{ListError, ListResult};

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "redisarray";

/// Marker separating the namespace from the logical key in a reference token.
pub const REFERENCE_MARKER: &str = "~>";

/// Separator between the namespace and the rest of a key or token.
const SEPARATOR: char = ':';

/// A validated namespace with its key and reference prefixes precomputed.
///
/// The prefixes are derived once at construction. Changing the namespace
/// means building a new `Namespace`, which is what keeps classification in
/// step with the current namespace.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    name: String,
    key_prefix: String,
    reference_prefix: String,
}

impl Namespace {
    /// Build a namespace, validating `name`.
    pub fn new(name: impl Into<String>) -> ListResult<Self> {
        let name = name.into();
        validate_namespace(&name)?;
        let key_prefix = format!("{name}{SEPARATOR}");
        let reference_prefix = format!("{key_prefix}{REFERENCE_MARKER}");
        Ok(Self {
            name,
            key_prefix,
            reference_prefix,
        })
    }

    /// The namespace string itself.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `"{namespace}:"`, the prefix of every fully-qualified key.
    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    /// `"{namespace}:~>"`, the prefix of every reference token.
    pub fn reference_prefix(&self) -> &str {
        &self.reference_prefix
    }

    /// Resolve a logical key to the fully-qualified backing key.
    ///
    /// ```
    /// use nestlist_core::Namespace;
    ///
    /// let ns = Namespace::new("ns").unwrap();
    /// assert_eq!(ns.qualify("todo"), "ns:todo");
    /// ```
    pub fn qualify(&self, key: &str) -> String {
        format!("{}{key}", self.key_prefix)
    }
}

impl Default for Namespace {
    fn default() -> Self {
        let key_prefix = format!("{DEFAULT_NAMESPACE}{SEPARATOR}");
        Self {
            name: DEFAULT_NAMESPACE.to_string(),
            reference_prefix: format!("{key_prefix}{REFERENCE_MARKER}"),
            key_prefix,
        }
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Namespace({})", self.name)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Validate a namespace, returning `Ok(())` if valid.
pub fn validate_namespace(name: &str) -> ListResult<()> {
    if name.is_empty() {
        return Err(ListError::InvalidNamespace {
            name: name.to_string(),
            reason: "namespace must not be empty".into(),
        });
    }

    if name.contains(REFERENCE_MARKER) {
        return Err(ListError::InvalidNamespace {
            name: name.to_string(),
            reason: format!("must not contain the reference marker {REFERENCE_MARKER:?}"),
        });
    }

    Ok(())
}

/// Validate a logical key, returning `Ok(())` if valid.
pub fn validate_key(key: &str) -> ListResult<()> {
    if key.is_empty() {
        return Err(ListError::InvalidKey {
            key: key.to_string(),
            reason: "key must not be empty".into(),
        });
    }
    Ok(())
}

/// Generate a random logical key: 16 random bytes, hex-encoded.
///
/// Collisions are not checked.
pub fn generate_key() -> String {
    let mut bytes = [0u8; 16];
    rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
    hex::encode(bytes)
}
