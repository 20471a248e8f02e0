//! Source type factory.
//!
//! Maps type indicators to constructors. The factory is an explicit value
//! handed to readers, so registering a test-only kind never leaks into other
//! readers in the same process.

use std::collections::BTreeMap;
use std::fmt;

use log::warn;
use serde_yaml::Mapping;

use crate::constants::{
    TYPE_INDICATOR_ARTIFACT_GROUP, TYPE_INDICATOR_COMMAND, TYPE_INDICATOR_DIRECTORY,
    TYPE_INDICATOR_FILE, TYPE_INDICATOR_PATH, TYPE_INDICATOR_WINDOWS_REGISTRY_KEY,
    TYPE_INDICATOR_WINDOWS_REGISTRY_VALUE, TYPE_INDICATOR_WMI_QUERY,
};
use crate::errors::{Error, Result};
use crate::source_type::variants::{
    ArtifactGroupSource, CommandSource, PathSource, RegistryKeySource, RegistryValueSource,
    WmiQuerySource,
};
use crate::source_type::SourceType;

/// Builds a source type from its attributes.
pub type SourceTypeConstructor = Box<dyn Fn(&Mapping) -> Result<SourceType> + Send + Sync>;

pub struct SourceTypeFactory {
    constructors: BTreeMap<String, SourceTypeConstructor>,
}

impl Default for SourceTypeFactory {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for SourceTypeFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceTypeFactory")
            .field("type_indicators", &self.constructors.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SourceTypeFactory {
    /// A factory without any registered source types.
    pub fn empty() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    /// A factory with the eight built-in source types registered.
    pub fn with_builtins() -> Self {
        let mut constructors: BTreeMap<String, SourceTypeConstructor> = BTreeMap::new();

        constructors.insert(
            TYPE_INDICATOR_ARTIFACT_GROUP.to_string(),
            Box::new(|attributes: &Mapping| {
                ArtifactGroupSource::from_attributes(TYPE_INDICATOR_ARTIFACT_GROUP, attributes)
                    .map(SourceType::ArtifactGroup)
            }),
        );
        constructors.insert(
            TYPE_INDICATOR_COMMAND.to_string(),
            Box::new(|attributes: &Mapping| {
                CommandSource::from_attributes(TYPE_INDICATOR_COMMAND, attributes)
                    .map(SourceType::Command)
            }),
        );
        constructors.insert(
            TYPE_INDICATOR_DIRECTORY.to_string(),
            Box::new(|attributes: &Mapping| {
                warn!(
                    "Source type {} is deprecated, use {} instead",
                    TYPE_INDICATOR_DIRECTORY, TYPE_INDICATOR_PATH
                );
                PathSource::from_attributes(TYPE_INDICATOR_DIRECTORY, attributes)
                    .map(SourceType::Directory)
            }),
        );
        constructors.insert(
            TYPE_INDICATOR_FILE.to_string(),
            Box::new(|attributes: &Mapping| {
                PathSource::from_attributes(TYPE_INDICATOR_FILE, attributes).map(SourceType::File)
            }),
        );
        constructors.insert(
            TYPE_INDICATOR_PATH.to_string(),
            Box::new(|attributes: &Mapping| {
                PathSource::from_attributes(TYPE_INDICATOR_PATH, attributes).map(SourceType::Path)
            }),
        );
        constructors.insert(
            TYPE_INDICATOR_WINDOWS_REGISTRY_KEY.to_string(),
            Box::new(|attributes: &Mapping| {
                RegistryKeySource::from_attributes(TYPE_INDICATOR_WINDOWS_REGISTRY_KEY, attributes)
                    .map(SourceType::WindowsRegistryKey)
            }),
        );
        constructors.insert(
            TYPE_INDICATOR_WINDOWS_REGISTRY_VALUE.to_string(),
            Box::new(|attributes: &Mapping| {
                RegistryValueSource::from_attributes(
                    TYPE_INDICATOR_WINDOWS_REGISTRY_VALUE,
                    attributes,
                )
                .map(SourceType::WindowsRegistryValue)
            }),
        );
        constructors.insert(
            TYPE_INDICATOR_WMI_QUERY.to_string(),
            Box::new(|attributes: &Mapping| {
                WmiQuerySource::from_attributes(TYPE_INDICATOR_WMI_QUERY, attributes)
                    .map(SourceType::WmiQuery)
            }),
        );

        Self { constructors }
    }

    /// Creates a source type.
    ///
    /// # Errors
    ///
    /// * [`Error::UnsupportedTypeIndicator`] if no constructor is registered
    ///   for `type_indicator`
    /// * [`Error::Format`] if the attributes are missing, malformed or fail
    ///   the kind's own validation
    pub fn create_source_type(&self, type_indicator: &str, attributes: &Mapping) -> Result<SourceType> {
        let constructor = self
            .constructors
            .get(type_indicator)
            .ok_or_else(|| Error::UnsupportedTypeIndicator(type_indicator.to_string()))?;
        constructor(attributes)
    }

    /// Registers a constructor for a new type indicator.
    ///
    /// Fails with [`Error::KeyExists`] if the indicator is already set.
    pub fn register_source_type<F>(&mut self, type_indicator: impl Into<String>, constructor: F) -> Result<()>
    where
        F: Fn(&Mapping) -> Result<SourceType> + Send + Sync + 'static,
    {
        let type_indicator = type_indicator.into();
        if self.constructors.contains_key(&type_indicator) {
            return Err(Error::KeyExists(format!(
                "Source type already set for type: {}.",
                type_indicator
            )));
        }
        self.constructors.insert(type_indicator, Box::new(constructor));
        Ok(())
    }

    /// Removes the constructor of a type indicator.
    ///
    /// Fails with [`Error::KeyNotFound`] if the indicator is not set.
    pub fn deregister_source_type(&mut self, type_indicator: &str) -> Result<()> {
        if self.constructors.remove(type_indicator).is_none() {
            return Err(Error::KeyNotFound(format!(
                "Source type not set for type: {}.",
                type_indicator
            )));
        }
        Ok(())
    }

    pub fn is_registered(&self, type_indicator: &str) -> bool {
        self.constructors.contains_key(type_indicator)
    }

    /// Registered type indicators, sorted.
    pub fn source_type_indicators(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }
}
