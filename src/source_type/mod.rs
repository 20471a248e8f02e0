//! The source type model.
//!
//! A source type describes *how* to locate evidence: files or paths, Windows
//! Registry keys or values, a WMI query, a command, or a group of other
//! artifact definitions. The kinds form one closed enum so every consumer
//! matches exhaustively; kinds registered at runtime through the
//! [`factory::SourceTypeFactory`] travel in the [`SourceType::Custom`]
//! variant.

pub mod factory;
pub mod variants;

use serde_yaml::{Mapping, Value};

use crate::constants::{
    KEY_ATTRIBUTES, KEY_CONDITIONS, KEY_RETURNED_TYPES, KEY_SUPPORTED_OS, KEY_TYPE,
    TYPE_INDICATOR_ARTIFACT_GROUP, TYPE_INDICATOR_COMMAND, TYPE_INDICATOR_DIRECTORY,
    TYPE_INDICATOR_FILE, TYPE_INDICATOR_PATH, TYPE_INDICATOR_WINDOWS_REGISTRY_KEY,
    TYPE_INDICATOR_WINDOWS_REGISTRY_VALUE, TYPE_INDICATOR_WMI_QUERY,
};
use crate::supported_os::SupportedOs;

pub use factory::SourceTypeFactory;
pub use variants::{
    validate_registry_key, ArtifactGroupSource, CommandSource, CustomSource, KeyValuePair,
    PathSource, RegistryKeySource, RegistryValueSource, WmiQuerySource,
};

pub(crate) fn mapping_key(key: &str) -> Value {
    Value::String(key.to_string())
}

pub(crate) fn string_sequence(values: &[String]) -> Value {
    Value::Sequence(values.iter().cloned().map(Value::String).collect())
}

pub(crate) fn os_sequence(values: &[SupportedOs]) -> Value {
    Value::Sequence(
        values
            .iter()
            .map(|os| Value::String(os.to_string()))
            .collect(),
    )
}

/// The kind of a source together with its kind-specific attributes.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceType {
    ArtifactGroup(ArtifactGroupSource),
    Command(CommandSource),
    /// Deprecated alias of [`SourceType::Path`]
    Directory(PathSource),
    File(PathSource),
    Path(PathSource),
    WindowsRegistryKey(RegistryKeySource),
    WindowsRegistryValue(RegistryValueSource),
    WmiQuery(WmiQuerySource),
    Custom(CustomSource),
}

impl SourceType {
    pub fn type_indicator(&self) -> &str {
        match self {
            SourceType::ArtifactGroup(_) => TYPE_INDICATOR_ARTIFACT_GROUP,
            SourceType::Command(_) => TYPE_INDICATOR_COMMAND,
            SourceType::Directory(_) => TYPE_INDICATOR_DIRECTORY,
            SourceType::File(_) => TYPE_INDICATOR_FILE,
            SourceType::Path(_) => TYPE_INDICATOR_PATH,
            SourceType::WindowsRegistryKey(_) => TYPE_INDICATOR_WINDOWS_REGISTRY_KEY,
            SourceType::WindowsRegistryValue(_) => TYPE_INDICATOR_WINDOWS_REGISTRY_VALUE,
            SourceType::WmiQuery(_) => TYPE_INDICATOR_WMI_QUERY,
            SourceType::Custom(custom) => &custom.type_indicator,
        }
    }

    /// The attributes in the shape the reader accepts.
    pub fn as_dict(&self) -> Mapping {
        match self {
            SourceType::ArtifactGroup(source) => source.as_dict(),
            SourceType::Command(source) => source.as_dict(),
            SourceType::Directory(source) | SourceType::File(source) | SourceType::Path(source) => {
                source.as_dict()
            }
            SourceType::WindowsRegistryKey(source) => source.as_dict(),
            SourceType::WindowsRegistryValue(source) => source.as_dict(),
            SourceType::WmiQuery(source) => source.as_dict(),
            SourceType::Custom(source) => source.attributes.clone(),
        }
    }

    /// Path attributes of the `FILE`, `PATH` and `DIRECTORY` kinds.
    pub fn path_source(&self) -> Option<&PathSource> {
        match self {
            SourceType::Directory(source) | SourceType::File(source) | SourceType::Path(source) => {
                Some(source)
            }
            _ => None,
        }
    }
}

/// A source of an artifact definition: its type plus the attributes common
/// to every kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub source_type: SourceType,
    /// Empty means the source applies wherever its artifact does
    pub supported_os: Vec<SupportedOs>,
    /// Deprecated, kept so documents round-trip
    pub conditions: Vec<String>,
    /// Only populated by the legacy format revision
    pub returned_types: Vec<String>,
}

impl Source {
    pub fn new(source_type: SourceType) -> Self {
        Self {
            source_type,
            supported_os: Vec::new(),
            conditions: Vec::new(),
            returned_types: Vec::new(),
        }
    }

    pub fn type_indicator(&self) -> &str {
        self.source_type.type_indicator()
    }

    pub fn as_dict(&self) -> Mapping {
        let mut source = Mapping::new();
        source.insert(mapping_key(KEY_TYPE), Value::String(self.type_indicator().to_string()));
        source.insert(mapping_key(KEY_ATTRIBUTES), Value::Mapping(self.source_type.as_dict()));
        if !self.supported_os.is_empty() {
            source.insert(mapping_key(KEY_SUPPORTED_OS), os_sequence(&self.supported_os));
        }
        if !self.conditions.is_empty() {
            source.insert(mapping_key(KEY_CONDITIONS), string_sequence(&self.conditions));
        }
        if !self.returned_types.is_empty() {
            source.insert(mapping_key(KEY_RETURNED_TYPES), string_sequence(&self.returned_types));
        }
        source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_indicators() {
        let paths = PathSource::new(vec!["/etc/passwd".to_string()], None).unwrap();
        assert_eq!(SourceType::File(paths.clone()).type_indicator(), "FILE");
        assert_eq!(SourceType::Path(paths.clone()).type_indicator(), "PATH");
        assert_eq!(SourceType::Directory(paths).type_indicator(), "DIRECTORY");

        let custom = SourceType::Custom(CustomSource::new("TEST_KIND", Mapping::new()));
        assert_eq!(custom.type_indicator(), "TEST_KIND");
    }

    #[test]
    fn test_source_as_dict_omits_empty_lists() {
        let group = ArtifactGroupSource::new(vec!["Other".to_string()]).unwrap();
        let source = Source::new(SourceType::ArtifactGroup(group));

        let dict = source.as_dict();
        assert_eq!(dict.get("type"), Some(&Value::String("ARTIFACT_GROUP".to_string())));
        assert!(dict.contains_key("attributes"));
        assert!(!dict.contains_key("supported_os"));
        assert!(!dict.contains_key("conditions"));
        assert!(!dict.contains_key("returned_types"));
    }

    #[test]
    fn test_source_as_dict_keeps_common_attributes() {
        let query = WmiQuerySource::new("SELECT * FROM Win32_UserProfile", None).unwrap();
        let mut source = Source::new(SourceType::WmiQuery(query));
        source.supported_os = vec![SupportedOs::Windows];
        source.conditions = vec!["os_major_version >= 6".to_string()];

        let dict = source.as_dict();
        assert_eq!(
            dict.get("supported_os"),
            Some(&Value::Sequence(vec![Value::String("Windows".to_string())]))
        );
        assert!(dict.contains_key("conditions"));
    }

    #[test]
    fn test_path_source_accessor() {
        let command = SourceType::Command(CommandSource::new("/bin/rpm", vec!["-qa".to_string()]));
        assert!(command.path_source().is_none());

        let paths = PathSource::new(vec!["C:\\Windows".to_string()], Some("\\".to_string())).unwrap();
        let file = SourceType::File(paths);
        assert_eq!(file.path_source().map(|p| p.separator.as_str()), Some("\\"));
    }
}
