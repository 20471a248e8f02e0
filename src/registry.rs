//! The artifact definitions registry.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use log::debug;

use crate::artifact::ArtifactDefinition;
use crate::errors::{Error, Result};
use crate::reader::ArtifactsReader;

/// In-memory store of artifact definitions, indexed by lowercase name and
/// lowercase alias.
///
/// Names and aliases share one key space: no alias may equal a name or
/// another alias, compared case-insensitively. The registry does no locking;
/// callers sharing it between threads wrap it in a mutex.
#[derive(Debug, Default)]
pub struct ArtifactDefinitionsRegistry {
    by_name: HashMap<String, ArtifactDefinition>,
    /// Lowercase alias to lowercase name
    by_alias: HashMap<String, String>,
    defined_names: BTreeSet<String>,
    referenced_names: BTreeSet<String>,
}

impl ArtifactDefinitionsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_taken(&self, key: &str) -> bool {
        self.by_name.contains_key(key) || self.by_alias.contains_key(key)
    }

    /// Registers a definition under its name and all of its aliases.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyExists`] when the name or an alias is already in
    /// use. Nothing is registered in that case.
    pub fn register_definition(&mut self, definition: ArtifactDefinition) -> Result<()> {
        let name = definition.name.to_lowercase();
        if self.is_taken(&name) {
            return Err(Error::KeyExists(format!(
                "Artifact definition already set for name: {}.",
                definition.name
            )));
        }

        let mut aliases = BTreeSet::new();
        for alias in &definition.aliases {
            let key = alias.to_lowercase();
            if self.is_taken(&key) || key == name || !aliases.insert(key) {
                return Err(Error::KeyExists(format!(
                    "Artifact definition already set for alias: {}.",
                    alias
                )));
            }
        }

        debug!("Registering artifact definition: {}", definition.name);
        self.defined_names.insert(definition.name.clone());
        self.referenced_names
            .extend(definition.referenced_artifacts().map(str::to_string));
        for alias in aliases {
            self.by_alias.insert(alias, name.clone());
        }
        self.by_name.insert(name, definition);
        Ok(())
    }

    /// Removes a definition and all of its aliases.
    ///
    /// The defined and referenced name sets are not updated, they record
    /// everything the registry has seen.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] when the name or any alias is not
    /// registered. Nothing is removed in that case.
    pub fn deregister_definition(
        &mut self,
        definition: &ArtifactDefinition,
    ) -> Result<ArtifactDefinition> {
        let name = definition.name.to_lowercase();
        if !self.by_name.contains_key(&name) {
            return Err(Error::KeyNotFound(format!(
                "Artifact definition not set for name: {}.",
                definition.name
            )));
        }

        let aliases: Vec<String> = definition
            .aliases
            .iter()
            .map(|alias| alias.to_lowercase())
            .collect();
        if let Some(missing) = definition
            .aliases
            .iter()
            .zip(&aliases)
            .find(|(_, key)| self.by_alias.get(*key) != Some(&name))
        {
            return Err(Error::KeyNotFound(format!(
                "Artifact definition not set for alias: {}.",
                missing.0
            )));
        }

        for alias in &aliases {
            self.by_alias.remove(alias);
        }
        self.by_name.remove(&name).ok_or_else(|| {
            Error::KeyNotFound(format!(
                "Artifact definition not set for name: {}.",
                definition.name
            ))
        })
    }

    pub fn get_definition_by_name(&self, name: &str) -> Option<&ArtifactDefinition> {
        self.by_name.get(&name.to_lowercase())
    }

    pub fn get_definition_by_alias(&self, alias: &str) -> Option<&ArtifactDefinition> {
        self.by_alias
            .get(&alias.to_lowercase())
            .and_then(|name| self.by_name.get(name))
    }

    /// All registered definitions, in no particular order.
    pub fn get_definitions(&self) -> impl Iterator<Item = &ArtifactDefinition> {
        self.by_name.values()
    }

    /// Names referenced by artifact groups that no registered definition
    /// defines.
    pub fn get_undefined_artifacts(&self) -> BTreeSet<String> {
        self.referenced_names
            .difference(&self.defined_names)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Reads a file and registers every definition in it.
    ///
    /// Definitions registered before a failure stay registered. Returns the
    /// number of definitions registered.
    pub fn read_from_file(&mut self, reader: &ArtifactsReader, path: &Path) -> Result<usize> {
        let content = reader.read_content(path)?;
        let mut count = 0;
        for definition in reader.read_str(&content) {
            self.register_definition(definition?)?;
            count += 1;
        }
        Ok(count)
    }

    /// Reads every definition file of a directory, see
    /// [`ArtifactsReader::definition_files`].
    pub fn read_from_directory(&mut self, reader: &ArtifactsReader, path: &Path) -> Result<usize> {
        let mut count = 0;
        for file in reader.definition_files(path)? {
            count += self.read_from_file(reader, &file)?;
        }
        debug!(
            "Registered {} artifact definitions from {}",
            count,
            path.display()
        );
        Ok(count)
    }
}
