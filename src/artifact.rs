//! The artifact definition.

use serde::{Serialize, Serializer};
use serde_yaml::{Mapping, Value};

use crate::constants::{
    KEY_ALIASES, KEY_CONDITIONS, KEY_DOC, KEY_LABELS, KEY_NAME, KEY_PROVIDES, KEY_SOURCES,
    KEY_SUPPORTED_OS, KEY_URLS,
};
use crate::errors::{Error, Result};
use crate::source_type::{mapping_key, os_sequence, string_sequence, Source, SourceType, SourceTypeFactory};
use crate::supported_os::SupportedOs;

/// A named, documented description of where forensic evidence lives.
///
/// Sources keep their document order; it matters for round-trips.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactDefinition {
    /// Unique (case-insensitive) identifier within a registry
    pub name: String,
    pub description: String,
    /// Alternate unique identifiers
    pub aliases: Vec<String>,
    /// Hints to what information the definition provides
    pub provides: Vec<String>,
    pub supported_os: Vec<SupportedOs>,
    pub urls: Vec<String>,
    pub sources: Vec<Source>,
    /// Legacy format revision only
    pub conditions: Vec<String>,
    /// Legacy format revision only
    pub labels: Vec<String>,
}

impl ArtifactDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            aliases: Vec::new(),
            provides: Vec::new(),
            supported_os: Vec::new(),
            urls: Vec::new(),
            sources: Vec::new(),
            conditions: Vec::new(),
            labels: Vec::new(),
        }
    }

    /// Builds a source through the factory and appends it.
    ///
    /// # Errors
    ///
    /// Returns a format error when the type indicator is empty, and passes on
    /// whatever the factory reports for unsupported indicators or bad
    /// attributes. Nothing is appended on failure.
    pub fn append_source(
        &mut self,
        factory: &SourceTypeFactory,
        type_indicator: &str,
        attributes: &Mapping,
    ) -> Result<&mut Source> {
        if type_indicator.is_empty() {
            return Err(Error::format("Missing type indicator."));
        }

        let source_type = factory.create_source_type(type_indicator, attributes)?;
        self.sources.push(Source::new(source_type));
        let last = self.sources.len() - 1;
        Ok(&mut self.sources[last])
    }

    /// Names of the artifact definitions referenced by artifact group sources.
    pub fn referenced_artifacts(&self) -> impl Iterator<Item = &str> {
        self.sources
            .iter()
            .filter_map(|source| match &source.source_type {
                SourceType::ArtifactGroup(group) => Some(group.names.iter()),
                _ => None,
            })
            .flatten()
            .map(String::as_str)
    }

    /// Represents the definition as a document the reader accepts.
    ///
    /// Empty list-valued fields are omitted.
    pub fn as_dict(&self) -> Mapping {
        let mut definition = Mapping::new();
        definition.insert(mapping_key(KEY_NAME), Value::String(self.name.clone()));
        definition.insert(mapping_key(KEY_DOC), Value::String(self.description.clone()));
        if !self.aliases.is_empty() {
            definition.insert(mapping_key(KEY_ALIASES), string_sequence(&self.aliases));
        }
        definition.insert(
            mapping_key(KEY_SOURCES),
            Value::Sequence(
                self.sources
                    .iter()
                    .map(|source| Value::Mapping(source.as_dict()))
                    .collect(),
            ),
        );
        if !self.labels.is_empty() {
            definition.insert(mapping_key(KEY_LABELS), string_sequence(&self.labels));
        }
        if !self.supported_os.is_empty() {
            definition.insert(mapping_key(KEY_SUPPORTED_OS), os_sequence(&self.supported_os));
        }
        if !self.provides.is_empty() {
            definition.insert(mapping_key(KEY_PROVIDES), string_sequence(&self.provides));
        }
        if !self.conditions.is_empty() {
            definition.insert(mapping_key(KEY_CONDITIONS), string_sequence(&self.conditions));
        }
        if !self.urls.is_empty() {
            definition.insert(mapping_key(KEY_URLS), string_sequence(&self.urls));
        }
        definition
    }
}

impl Serialize for ArtifactDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.as_dict().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attributes(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_append_source() {
        let factory = SourceTypeFactory::default();
        let mut definition = ArtifactDefinition::new("EventLogs", "Windows Event logs.");

        let source = definition
            .append_source(&factory, "ARTIFACT_GROUP", &attributes("names: [SecurityEventLogEvtx]"))
            .unwrap();
        source.supported_os = vec![SupportedOs::Windows];

        assert_eq!(definition.sources.len(), 1);
        assert_eq!(definition.sources[0].type_indicator(), "ARTIFACT_GROUP");
        assert_eq!(definition.sources[0].supported_os, vec![SupportedOs::Windows]);
    }

    #[test]
    fn test_append_source_failures_leave_sources_untouched() {
        let factory = SourceTypeFactory::default();
        let mut definition = ArtifactDefinition::new("Broken", "Broken.");

        assert!(definition.append_source(&factory, "", &Mapping::new()).is_err());
        assert!(matches!(
            definition.append_source(&factory, "BOGUS", &Mapping::new()),
            Err(Error::UnsupportedTypeIndicator(_))
        ));
        assert!(definition
            .append_source(&factory, "FILE", &attributes("broken: [test]"))
            .is_err());
        assert!(definition.sources.is_empty());
    }

    #[test]
    fn test_referenced_artifacts() {
        let factory = SourceTypeFactory::default();
        let mut definition = ArtifactDefinition::new("Group", "Group.");
        definition
            .append_source(&factory, "ARTIFACT_GROUP", &attributes("names: [A, B]"))
            .unwrap();
        definition
            .append_source(&factory, "FILE", &attributes("paths: [/tmp/x]"))
            .unwrap();
        definition
            .append_source(&factory, "ARTIFACT_GROUP", &attributes("names: [C]"))
            .unwrap();

        let names: Vec<&str> = definition.referenced_artifacts().collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_as_dict_omits_empty_fields() {
        let factory = SourceTypeFactory::default();
        let mut definition = ArtifactDefinition::new("Passwd", "Password file.");
        definition
            .append_source(&factory, "FILE", &attributes("paths: [/etc/passwd]"))
            .unwrap();

        let dict = definition.as_dict();
        let keys: Vec<&str> = dict.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, vec!["name", "doc", "sources"]);
    }

    #[test]
    fn test_serialize_uses_document_shape() {
        let factory = SourceTypeFactory::default();
        let mut definition = ArtifactDefinition::new("Passwd", "Password file.");
        definition.supported_os = vec![SupportedOs::Linux];
        definition.urls = vec!["https://example.com/passwd".to_string()];
        definition
            .append_source(&factory, "FILE", &attributes("paths: [/etc/passwd]"))
            .unwrap();

        let yaml = serde_yaml::to_string(&definition).unwrap();
        assert!(yaml.contains("name: Passwd"));
        assert!(yaml.contains("type: FILE"));
        assert!(yaml.contains("- Linux"));
        assert!(!yaml.contains("aliases"));
    }
}
