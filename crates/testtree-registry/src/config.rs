use serde::{Deserialize, Serialize};

/// What to do when an id resolves to an element of another kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindMismatchPolicy {
    /// Treat the lookup as "not found" and build an element of the requested
    /// kind under the same id.
    #[default]
    Rebuild,
    /// Fail the call with [`RegistryError::KindMismatch`](crate::RegistryError::KindMismatch).
    Reject,
}

/// Configuration for an [`ElementFactory`](crate::ElementFactory).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    /// Behavior when an id is bound to an element of another kind.
    pub on_kind_mismatch: KindMismatchPolicy,
    /// Whether touching an element removes its invalid children from the
    /// store.
    pub prune_invalid_children: bool,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            on_kind_mismatch: KindMismatchPolicy::Rebuild,
            prune_invalid_children: true,
        }
    }
}

impl FactoryConfig {
    /// A configuration that refuses to rebind an id to another kind.
    pub fn strict() -> Self {
        Self {
            on_kind_mismatch: KindMismatchPolicy::Reject,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = FactoryConfig::default();
        assert_eq!(c.on_kind_mismatch, KindMismatchPolicy::Rebuild);
        assert!(c.prune_invalid_children);
    }

    #[test]
    fn strict_rejects_mismatch() {
        let c = FactoryConfig::strict();
        assert_eq!(c.on_kind_mismatch, KindMismatchPolicy::Reject);
        assert!(c.prune_invalid_children);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let c: FactoryConfig = toml::from_str("on_kind_mismatch = \"reject\"").unwrap();
        assert_eq!(c, FactoryConfig::strict());

        let c: FactoryConfig = toml::from_str("").unwrap();
        assert_eq!(c, FactoryConfig::default());
    }
}
