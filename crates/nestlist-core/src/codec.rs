//! Reference token encoding.
//!
//! A slot in a backing list holds either a plain string or a reference
//! token `"{namespace}:~>{logical_key}"`. Classification is purely
//! syntactic: any value starting with the reference prefix of the current
//! namespace is treated as a reference, however it was written. There is
//! no escaping, so a plain value that happens to carry that prefix is read
//! back as a reference.

use crate::namespace::{Namespace, REFERENCE_MARKER};

/// A raw slot value after classification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Slot {
    /// A plain string value.
    Value(String),
    /// A reference to the list with this logical key.
    Reference(String),
}

impl Namespace {
    /// Encode a logical key as a reference token.
    ///
    /// ```
    /// use nestlist_core::Namespace;
    ///
    /// let ns = Namespace::new("ns").unwrap();
    /// assert_eq!(ns.encode("s1"), "ns:~>s1");
    /// ```
    pub fn encode(&self, key: &str) -> String {
        format!("{}{key}", self.reference_prefix())
    }

    /// `true` iff `raw` starts with this namespace's reference prefix.
    pub fn is_reference(&self, raw: &str) -> bool {
        raw.starts_with(self.reference_prefix())
    }

    /// Recover the logical key from a qualified key or a reference token.
    ///
    /// Strips `"{namespace}:"` and then an optional `~>` marker. Returns
    /// `None` if `raw` is outside this namespace or names no key.
    pub fn decode<'a>(&self, raw: &'a str) -> Option<&'a str> {
        let rest = raw.strip_prefix(self.key_prefix())?;
        let key = rest.strip_prefix(REFERENCE_MARKER).unwrap_or(rest);
        (!key.is_empty()).then_some(key)
    }

    /// Classify a raw stored string.
    pub fn classify(&self, raw: String) -> Slot {
        if self.is_reference(&raw) {
            if let Some(key) = self.decode(&raw) {
                return Slot::Reference(key.to_string());
            }
        }
        Slot::Value(raw)
    }
}
