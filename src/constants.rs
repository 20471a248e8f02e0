//! Global constants for the artifact definitions crate.
//!
//! This module centralizes the fixed vocabulary of the definition format:
//! type indicators, the keys each format revision accepts, the label
//! catalogue and the Windows Registry key prefixes.

use std::collections::BTreeMap;

use lazy_static::lazy_static;

// Source type indicators
pub const TYPE_INDICATOR_ARTIFACT_GROUP: &str = "ARTIFACT_GROUP";
pub const TYPE_INDICATOR_COMMAND: &str = "COMMAND";
/// Deprecated, superseded by [`TYPE_INDICATOR_PATH`]
pub const TYPE_INDICATOR_DIRECTORY: &str = "DIRECTORY";
pub const TYPE_INDICATOR_FILE: &str = "FILE";
pub const TYPE_INDICATOR_PATH: &str = "PATH";
pub const TYPE_INDICATOR_WINDOWS_REGISTRY_KEY: &str = "REGISTRY_KEY";
pub const TYPE_INDICATOR_WINDOWS_REGISTRY_VALUE: &str = "REGISTRY_VALUE";
pub const TYPE_INDICATOR_WMI_QUERY: &str = "WMI";

/// All built-in type indicators, in registration order
pub const BUILTIN_TYPE_INDICATORS: &[&str] = &[
    TYPE_INDICATOR_ARTIFACT_GROUP,
    TYPE_INDICATOR_COMMAND,
    TYPE_INDICATOR_DIRECTORY,
    TYPE_INDICATOR_FILE,
    TYPE_INDICATOR_PATH,
    TYPE_INDICATOR_WINDOWS_REGISTRY_KEY,
    TYPE_INDICATOR_WINDOWS_REGISTRY_VALUE,
    TYPE_INDICATOR_WMI_QUERY,
];

// Top-level document keys
pub const KEY_NAME: &str = "name";
pub const KEY_DOC: &str = "doc";
pub const KEY_SOURCES: &str = "sources";
pub const KEY_ALIASES: &str = "aliases";
pub const KEY_PROVIDES: &str = "provides";
pub const KEY_SUPPORTED_OS: &str = "supported_os";
pub const KEY_URLS: &str = "urls";
pub const KEY_CONDITIONS: &str = "conditions";
pub const KEY_LABELS: &str = "labels";
/// Superseded by `sources`; always rejected with a migration hint
pub const KEY_COLLECTORS: &str = "collectors";

// Source-level keys
pub const KEY_TYPE: &str = "type";
pub const KEY_ATTRIBUTES: &str = "attributes";
pub const KEY_RETURNED_TYPES: &str = "returned_types";

/// Top-level keys accepted by the current format revision
pub const TOP_LEVEL_KEYS: &[&str] = &[
    KEY_ALIASES,
    KEY_DOC,
    KEY_NAME,
    KEY_PROVIDES,
    KEY_SOURCES,
    KEY_SUPPORTED_OS,
    KEY_URLS,
];

/// Top-level keys accepted by the legacy (labels/conditions) revision
pub const LEGACY_TOP_LEVEL_KEYS: &[&str] = &[
    KEY_CONDITIONS,
    KEY_DOC,
    KEY_LABELS,
    KEY_NAME,
    KEY_PROVIDES,
    KEY_SOURCES,
    KEY_SUPPORTED_OS,
    KEY_URLS,
];

/// Top-level keys the current revision recognizes as legacy and rejects
/// with a migration error instead of reporting them as unknown
pub const LEGACY_ONLY_TOP_LEVEL_KEYS: &[&str] = &[KEY_CONDITIONS, KEY_LABELS];

/// Source-level keys accepted by the current format revision
pub const SOURCE_KEYS: &[&str] = &[KEY_TYPE, KEY_ATTRIBUTES, KEY_SUPPORTED_OS, KEY_CONDITIONS];

/// Source-level keys accepted by the legacy format revision
pub const LEGACY_SOURCE_KEYS: &[&str] = &[
    KEY_TYPE,
    KEY_ATTRIBUTES,
    KEY_SUPPORTED_OS,
    KEY_CONDITIONS,
    KEY_RETURNED_TYPES,
];

/// Key paths a Windows Registry key must start with (case-sensitive)
pub const REGISTRY_KEY_PREFIXES: &[&str] = &[
    "HKEY_LOCAL_MACHINE",
    "HKEY_USERS",
    "HKEY_CLASSES_ROOT",
    "%%current_control_set%%",
];

/// Rejected prefix, user hives must be addressed through `HKEY_USERS`
pub const REGISTRY_CURRENT_USER_PREFIX: &str = "HKEY_CURRENT_USER\\";

/// Default path segment separator of path-based sources
pub const DEFAULT_SEPARATOR: &str = "/";

/// Default extension of definition files in a directory
pub const DEFAULT_EXTENSION: &str = "yaml";

lazy_static! {
    /// Labels accepted by the legacy format revision, with their meaning
    pub static ref LABELS: BTreeMap<&'static str, &'static str> = {
        let mut labels = BTreeMap::new();
        labels.insert("Antivirus", "Antivirus related artifacts, e.g. quarantine files.");
        labels.insert("Authentication", "Authentication artifacts.");
        labels.insert("Browser", "Web Browser artifacts.");
        labels.insert("Cloud", "Cloud applications artifacts.");
        labels.insert("Cloud Storage", "Cloud storage artifacts.");
        labels.insert("Configuration Files", "Configuration files artifacts.");
        labels.insert("Execution", "Contain execution events.");
        labels.insert(
            "ExternalAccount",
            "Information about any user accounts e.g. username, account ID, etc.",
        );
        labels.insert("External Media", "Contain external media data or events e.g. USB drives.");
        labels.insert("IM", "Instant Messaging / Chat applications artifacts.");
        labels.insert("iOS", "Artifacts related to iOS devices connected to the system.");
        labels.insert("History Files", "History files artifacts e.g. .bash_history.");
        labels.insert("KnowledgeBase", "Artifacts used in knowledge base generation.");
        labels.insert("Logs", "Contain log files.");
        labels.insert("Mail", "Mail client applications artifacts.");
        labels.insert("Memory", "Artifacts retrieved from memory.");
        labels.insert("Network", "Describe networking state.");
        labels.insert("Processes", "Describe running processes.");
        labels.insert("Rekall", "Artifacts using the Rekall memory forensics framework.");
        labels.insert("Software", "Installed software.");
        labels.insert("System", "Core system artifacts.");
        labels.insert("Users", "Information about users.");
        labels
    };
}
