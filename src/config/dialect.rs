use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    LEGACY_SOURCE_KEYS, LEGACY_TOP_LEVEL_KEYS, SOURCE_KEYS, TOP_LEVEL_KEYS,
};

/// Schema revision of artifact definition documents.
///
/// A reader accepts exactly one revision; documents from the other one are
/// rejected with a migration error rather than half-supported.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// `aliases`, no `labels` or top-level `conditions`
    #[default]
    Current,
    /// `labels` and top-level `conditions`, sources may carry `returned_types`
    Legacy,
}

impl Dialect {
    pub fn top_level_keys(&self) -> &'static [&'static str] {
        match self {
            Dialect::Current => TOP_LEVEL_KEYS,
            Dialect::Legacy => LEGACY_TOP_LEVEL_KEYS,
        }
    }

    pub fn source_keys(&self) -> &'static [&'static str] {
        match self {
            Dialect::Current => SOURCE_KEYS,
            Dialect::Legacy => LEGACY_SOURCE_KEYS,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Current => write!(f, "current"),
            Dialect::Legacy => write!(f, "legacy"),
        }
    }
}

/// Serialization format of definition files
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// One or more YAML documents per file
    #[default]
    Yaml,
    /// A JSON array of definitions per file
    Json,
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Yaml => write!(f, "yaml"),
            DocumentFormat::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_serialization() {
        let serialized = serde_json::to_string(&Dialect::Legacy).unwrap();
        assert_eq!(serialized, "\"legacy\"");
        let deserialized: Dialect = serde_yaml::from_str("current").unwrap();
        assert_eq!(deserialized, Dialect::Current);
    }

    #[test]
    fn test_dialect_keys() {
        assert!(Dialect::Current.top_level_keys().contains(&"aliases"));
        assert!(!Dialect::Current.top_level_keys().contains(&"labels"));
        assert!(Dialect::Legacy.top_level_keys().contains(&"labels"));
        assert!(!Dialect::Legacy.top_level_keys().contains(&"aliases"));
        assert!(Dialect::Legacy.source_keys().contains(&"returned_types"));
        assert!(!Dialect::Current.source_keys().contains(&"returned_types"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Dialect::default().to_string(), "current");
        assert_eq!(DocumentFormat::default().to_string(), "yaml");
        assert_eq!(DocumentFormat::Json.to_string(), "json");
    }
}
