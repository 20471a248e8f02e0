//! The artifact definitions reader.
//!
//! Turns generic document trees (`serde_yaml::Value`, whether they came from
//! YAML or JSON) into validated [`ArtifactDefinition`]s. The checks run in a
//! fixed order so the first error reported for a document is deterministic,
//! and every error raised after the name is known carries that name.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::iter;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use walkdir::WalkDir;

use crate::artifact::ArtifactDefinition;
use crate::config::{Dialect, DocumentFormat, ReaderConfig};
use crate::constants::{
    KEY_ALIASES, KEY_ATTRIBUTES, KEY_COLLECTORS, KEY_CONDITIONS, KEY_DOC, KEY_LABELS, KEY_NAME,
    KEY_PROVIDES, KEY_RETURNED_TYPES, KEY_SOURCES, KEY_SUPPORTED_OS, KEY_TYPE, KEY_URLS, LABELS,
    LEGACY_ONLY_TOP_LEVEL_KEYS,
};
use crate::errors::{Error, Result};
use crate::source_type::SourceTypeFactory;
use crate::supported_os::SupportedOs;

/// Render a mapping key for error messages.
fn key_name(key: &Value) -> String {
    match key {
        Value::String(key) => key.clone(),
        other => format!("{:?}", other),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Reads an optional list of strings. Absent and null both mean empty.
fn read_string_list(values: &Mapping, key: &str, name: &str) -> Result<Vec<String>> {
    match values.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Sequence(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(item) => Ok(item.clone()),
                other => Err(Error::format(format!(
                    "Invalid artifact definition: {} {} entries must be strings, got: {}.",
                    name,
                    key,
                    value_kind(other)
                ))),
            })
            .collect(),
        Some(other) => Err(Error::format(format!(
            "Invalid artifact definition: {} {} must be a list, got: {}.",
            name,
            key,
            value_kind(other)
        ))),
    }
}

/// Reads a required non-empty string, `None` when absent, empty or not a string.
fn read_required_string(values: &Mapping, key: &str) -> Option<String> {
    match values.get(key) {
        Some(Value::String(value)) if !value.is_empty() => Some(value.clone()),
        _ => None,
    }
}

/// Validates artifact definition documents against the schema.
#[derive(Debug, Default)]
pub struct ArtifactsReader {
    config: ReaderConfig,
    factory: SourceTypeFactory,
}

impl ArtifactsReader {
    pub fn new(config: ReaderConfig) -> Self {
        Self {
            config,
            factory: SourceTypeFactory::default(),
        }
    }

    /// A reader that builds sources with a caller-provided factory.
    pub fn with_factory(config: ReaderConfig, factory: SourceTypeFactory) -> Self {
        Self { config, factory }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn factory(&self) -> &SourceTypeFactory {
        &self.factory
    }

    pub fn factory_mut(&mut self) -> &mut SourceTypeFactory {
        &mut self.factory
    }

    fn read_supported_os(&self, values: &Mapping, name: &str) -> Result<Vec<SupportedOs>> {
        let items = match values.get(KEY_SUPPORTED_OS) {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Sequence(items)) => items,
            Some(other) => {
                return Err(Error::format(format!(
                    "Invalid artifact definition: {} invalid supported_os type: {}.",
                    name,
                    value_kind(other)
                )))
            }
        };

        let mut supported_os = Vec::with_capacity(items.len());
        let mut undefined = Vec::new();
        for item in items {
            match item.as_str().and_then(SupportedOs::from_name) {
                Some(os) => supported_os.push(os),
                None => undefined.push(match item {
                    Value::String(item) => item.clone(),
                    other => format!("{:?}", other),
                }),
            }
        }

        if !undefined.is_empty() {
            return Err(Error::format(format!(
                "Artifact definition: {} undefined supported operating system: {}.",
                name,
                undefined.join(", ")
            )));
        }
        Ok(supported_os)
    }

    fn read_labels(&self, values: &Mapping, name: &str) -> Result<Vec<String>> {
        let labels = read_string_list(values, KEY_LABELS, name)?;
        let undefined: BTreeSet<&str> = labels
            .iter()
            .map(String::as_str)
            .filter(|label| !LABELS.contains_key(label))
            .collect();
        if !undefined.is_empty() {
            return Err(Error::format(format!(
                "Artifact definition: {} found undefined labels: {}.",
                name,
                undefined.into_iter().collect::<Vec<_>>().join(", ")
            )));
        }
        Ok(labels)
    }

    fn read_sources(&self, values: &Mapping, definition: &mut ArtifactDefinition) -> Result<()> {
        let name = definition.name.clone();
        let sources = match values.get(KEY_SOURCES) {
            Some(Value::Sequence(sources)) if !sources.is_empty() => sources,
            None | Some(Value::Null) | Some(Value::Sequence(_)) => {
                return Err(Error::format(format!(
                    "Invalid artifact definition: {} missing sources.",
                    name
                )))
            }
            Some(other) => {
                return Err(Error::format(format!(
                    "Invalid artifact definition: {} sources must be a list, got: {}.",
                    name,
                    value_kind(other)
                )))
            }
        };

        let dialect = self.config.dialect;
        let artifact_os = definition.supported_os.clone();

        for source_value in sources {
            let source_values = match source_value {
                Value::Mapping(source_values) => source_values,
                other => {
                    return Err(Error::format(format!(
                        "Invalid artifact definition: {} source must be a mapping, got: {}.",
                        name,
                        value_kind(other)
                    )))
                }
            };

            if dialect == Dialect::Current && source_values.contains_key(KEY_RETURNED_TYPES) {
                return Err(Error::format(format!(
                    "Invalid artifact definition: {} source uses returned_types which is no longer supported.",
                    name
                )));
            }

            let mut undefined_keys: Vec<String> = source_values
                .keys()
                .filter(|key| !key.as_str().is_some_and(|key| dialect.source_keys().contains(&key)))
                .map(key_name)
                .collect();
            if !undefined_keys.is_empty() {
                undefined_keys.sort();
                return Err(Error::format(format!(
                    "Invalid artifact definition: {} source undefined keys: {}.",
                    name,
                    undefined_keys.join(", ")
                )));
            }

            let type_indicator = read_required_string(source_values, KEY_TYPE).ok_or_else(|| {
                Error::format(format!("Invalid artifact definition: {} source type.", name))
            })?;

            let attributes = match source_values.get(KEY_ATTRIBUTES) {
                None | Some(Value::Null) => Mapping::new(),
                Some(Value::Mapping(attributes)) => attributes.clone(),
                Some(other) => {
                    return Err(Error::format(format!(
                        "Invalid artifact definition: {} source attributes must be a mapping, got: {}.",
                        name,
                        value_kind(other)
                    )))
                }
            };

            let source = definition
                .append_source(&self.factory, &type_indicator, &attributes)
                .map_err(|e| {
                    Error::format(format!(
                        "Invalid artifact definition: {}, with error: {}",
                        name, e
                    ))
                })?;

            source.conditions = read_string_list(source_values, KEY_CONDITIONS, &name)?;
            if dialect == Dialect::Legacy {
                source.returned_types = read_string_list(source_values, KEY_RETURNED_TYPES, &name)?;
            }
            source.supported_os = self.read_supported_os(source_values, &name)?;

            let outside: Vec<String> = source
                .supported_os
                .iter()
                .filter(|os| !artifact_os.contains(os))
                .map(ToString::to_string)
                .collect();
            if !outside.is_empty() {
                return Err(Error::format(format!(
                    "Invalid artifact definition: {} source supported_os: {} not in artifact supported_os.",
                    name,
                    outside.join(", ")
                )));
            }
        }

        Ok(())
    }

    /// Reads an artifact definition from a generic document tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] for any schema violation.
    pub fn read_definition_values(&self, document: &Value) -> Result<ArtifactDefinition> {
        let values = match document {
            Value::Mapping(values) if !values.is_empty() => values,
            Value::Null | Value::Mapping(_) => {
                return Err(Error::format("Missing artifact definition values."))
            }
            other => {
                return Err(Error::format(format!(
                    "Invalid artifact definition values, expected a mapping, got: {}.",
                    value_kind(other)
                )))
            }
        };

        let dialect = self.config.dialect;
        let allowed_keys = dialect.top_level_keys();

        // `collectors` and, for the current dialect, the legacy-only keys get
        // a migration error once the name is known.
        let mut undefined_keys: Vec<String> = values
            .keys()
            .filter(|key| match key.as_str() {
                Some(key) => {
                    !allowed_keys.contains(&key)
                        && key != KEY_COLLECTORS
                        && !(dialect == Dialect::Current && LEGACY_ONLY_TOP_LEVEL_KEYS.contains(&key))
                }
                None => true,
            })
            .map(key_name)
            .collect();
        if !undefined_keys.is_empty() {
            undefined_keys.sort();
            return Err(Error::format(format!(
                "Undefined keys: {}",
                undefined_keys.join(", ")
            )));
        }

        let name = read_required_string(values, KEY_NAME)
            .ok_or_else(|| Error::format("Invalid artifact definition missing name."))?;

        let description = read_required_string(values, KEY_DOC).ok_or_else(|| {
            Error::format(format!(
                "Invalid artifact definition: {} missing description.",
                name
            ))
        })?;

        if values.contains_key(KEY_COLLECTORS) {
            return Err(Error::format(format!(
                "Invalid artifact definition: {} still uses collectors, migrate them to sources.",
                name
            )));
        }

        let mut definition = ArtifactDefinition::new(name.clone(), description);

        match dialect {
            Dialect::Current => {
                let legacy_keys: Vec<&str> = LEGACY_ONLY_TOP_LEVEL_KEYS
                    .iter()
                    .copied()
                    .filter(|key| values.contains_key(*key))
                    .collect();
                if !legacy_keys.is_empty() {
                    return Err(Error::format(format!(
                        "Invalid artifact definition: {} uses legacy keys: {}, remove them or read the document with the legacy dialect.",
                        name,
                        legacy_keys.join(", ")
                    )));
                }
                definition.aliases = read_string_list(values, KEY_ALIASES, &name)?;
            }
            Dialect::Legacy => {
                definition.conditions = read_string_list(values, KEY_CONDITIONS, &name)?;
                definition.labels = self.read_labels(values, &name)?;
            }
        }

        definition.urls = read_string_list(values, KEY_URLS, &name)?;
        definition.provides = read_string_list(values, KEY_PROVIDES, &name)?;
        definition.supported_os = self.read_supported_os(values, &name)?;
        self.read_sources(values, &mut definition)?;

        Ok(definition)
    }

    /// Validates documents one at a time, in order.
    ///
    /// The stream stops after the first error; errors are prefixed with the
    /// name of the last definition read successfully, or `At start`.
    pub fn read_documents(&self, documents: Vec<Value>) -> DefinitionStream<'_> {
        self.stream(Box::new(documents.into_iter().map(Ok::<Value, Error>)))
    }

    /// Validates the definitions of a text in the configured format.
    ///
    /// YAML documents are parsed one at a time, so a syntax error only ends
    /// the stream at the document holding it.
    pub fn read_str<'a>(&'a self, content: &'a str) -> DefinitionStream<'a> {
        match self.config.format {
            DocumentFormat::Yaml => self.stream(Box::new(Self::yaml_documents(content))),
            DocumentFormat::Json => self.stream(Self::json_documents(content)),
        }
    }

    fn stream<'a>(
        &'a self,
        documents: Box<dyn Iterator<Item = Result<Value>> + 'a>,
    ) -> DefinitionStream<'a> {
        DefinitionStream {
            reader: self,
            documents,
            last_name: None,
            failed: false,
        }
    }

    /// Parses the documents of a YAML stream lazily.
    pub fn yaml_documents(content: &str) -> impl Iterator<Item = Result<Value>> + '_ {
        serde_yaml::Deserializer::from_str(content)
            .map(|document| Value::deserialize(document).map_err(Error::from))
    }

    fn json_documents(content: &str) -> Box<dyn Iterator<Item = Result<Value>>> {
        match Self::parse_json_str(content) {
            Ok(documents) => Box::new(documents.into_iter().map(Ok::<Value, Error>)),
            Err(e) => Box::new(iter::once(Err::<Value, Error>(e))),
        }
    }

    /// Splits YAML text into its documents.
    pub fn parse_yaml_str(content: &str) -> Result<Vec<Value>> {
        Self::yaml_documents(content).collect()
    }

    /// Parses JSON text holding an array of definitions (or a single one).
    pub fn parse_json_str(content: &str) -> Result<Vec<Value>> {
        let value: Value = serde_json::from_str(content)?;
        match value {
            Value::Sequence(documents) => Ok(documents),
            other => Ok(vec![other]),
        }
    }

    pub fn read_yaml_str(&self, content: &str) -> Result<Vec<ArtifactDefinition>> {
        self.stream(Box::new(Self::yaml_documents(content))).collect()
    }

    pub fn read_json_str(&self, content: &str) -> Result<Vec<ArtifactDefinition>> {
        self.stream(Self::json_documents(content)).collect()
    }

    /// Loads the text of a definitions file.
    pub fn read_content(&self, path: &Path) -> Result<String> {
        debug!("Reading artifact definitions from {}", path.display());
        fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads the document trees of a file in the configured format.
    pub fn parse_file(&self, path: &Path) -> Result<Vec<Value>> {
        let content = self.read_content(path)?;
        match self.config.format {
            DocumentFormat::Yaml => Self::parse_yaml_str(&content),
            DocumentFormat::Json => Self::parse_json_str(&content),
        }
    }

    pub fn read_file(&self, path: &Path) -> Result<Vec<ArtifactDefinition>> {
        let content = self.read_content(path)?;
        let definitions = self.read_str(&content).collect::<Result<Vec<_>>>()?;
        Ok(definitions)
    }

    /// Files of a directory with the configured extension, sorted by name.
    ///
    /// Sub directories are not recursed.
    pub fn definition_files(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let extension = self.config.extension.as_deref();
        let mut files = Vec::new();

        for entry in WalkDir::new(path).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::Io {
                path: path.to_path_buf(),
                source: e.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let matches = match extension {
                Some(extension) => entry.path().extension().and_then(OsStr::to_str) == Some(extension),
                None => true,
            };
            if matches {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    pub fn read_directory(&self, path: &Path) -> Result<Vec<ArtifactDefinition>> {
        let mut definitions = Vec::new();
        for file in self.definition_files(path)? {
            definitions.extend(self.read_file(&file)?);
        }
        Ok(definitions)
    }
}

/// Lazily validated definitions of one document stream.
pub struct DefinitionStream<'r> {
    reader: &'r ArtifactsReader,
    documents: Box<dyn Iterator<Item = Result<Value>> + 'r>,
    last_name: Option<String>,
    failed: bool,
}

impl fmt::Debug for DefinitionStream<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefinitionStream")
            .field("last_name", &self.last_name)
            .field("failed", &self.failed)
            .finish()
    }
}

impl Iterator for DefinitionStream<'_> {
    type Item = Result<ArtifactDefinition>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let definition = self
            .documents
            .next()?
            .and_then(|document| self.reader.read_definition_values(&document));
        match definition {
            Ok(definition) => {
                self.last_name = Some(definition.name.clone());
                Some(Ok(definition))
            }
            Err(e) => {
                self.failed = true;
                let location = match &self.last_name {
                    Some(name) => format!("After: {}", name),
                    None => "At start".to_string(),
                };
                Some(Err(Error::Format(format!("{} {}", location, e))))
            }
        }
    }
}
