use serde::{Deserialize, Serialize};

use crate::error::{ListError, ListResult};
use crate::namespace::{DEFAULT_NAMESPACE, validate_namespace};

/// Default bound on reference hops followed by deep materialization.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Configuration for a [`Registry`](crate::Registry).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    /// Prefix isolating this library's keys from other store users.
    pub namespace: String,
    /// Maximum number of nested references `to_flat_array` will follow.
    pub max_depth: usize,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ListConfig {
    /// Parse a configuration from TOML text. Missing fields take defaults.
    ///
    /// ```
    /// use nestlist_core::ListConfig;
    ///
    /// let config = ListConfig::from_toml_str("namespace = \"rml\"").unwrap();
    /// assert_eq!(config.namespace, "rml");
    /// assert_eq!(config.max_depth, 512);
    /// ```
    pub fn from_toml_str(text: &str) -> ListResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ListError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the namespace can build keys and reference tokens.
    pub fn validate(&self) -> ListResult<()> {
        validate_namespace(&self.namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ListConfig::default();
        assert_eq!(c.namespace, "redisarray");
        assert_eq!(c.max_depth, DEFAULT_MAX_DEPTH);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn parse_full_toml() {
        let c = ListConfig::from_toml_str("namespace = \"rml\"\nmax_depth = 8\n").unwrap();
        assert_eq!(
            c,
            ListConfig {
                namespace: "rml".into(),
                max_depth: 8
            }
        );
    }

    #[test]
    fn empty_toml_uses_defaults() {
        assert_eq!(ListConfig::from_toml_str("").unwrap(), ListConfig::default());
    }

    #[test]
    fn reject_malformed_toml() {
        let err = ListConfig::from_toml_str("namespace = ").unwrap_err();
        assert!(matches!(err, ListError::Config(_)));
    }

    #[test]
    fn reject_invalid_namespace() {
        let err = ListConfig::from_toml_str("namespace = \"\"").unwrap_err();
        assert!(matches!(err, ListError::InvalidNamespace { .. }));
    }
}
