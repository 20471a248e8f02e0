//! Corpus validation of artifact definition files.
//!
//! On top of the schema checks of the reader, the validator registers every
//! definition (catching duplicates across files), enforces the path
//! conventions of the platforms and tracks artifact group references.

mod paths;

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use log::{debug, warn};

use crate::artifact::ArtifactDefinition;
use crate::config::ValidatorConfig;
use crate::errors::{Error, Result};
use crate::reader::ArtifactsReader;
use crate::registry::ArtifactDefinitionsRegistry;
use crate::source_type::SourceType;
use crate::supported_os::SupportedOs;

pub use paths::{check_macos_paths, check_registry_key_path, check_windows_path};

#[derive(Debug)]
pub struct ArtifactDefinitionsValidator {
    config: ValidatorConfig,
    reader: ArtifactsReader,
    registry: ArtifactDefinitionsRegistry,
    registry_key_paths: HashSet<String>,
}

impl ArtifactDefinitionsValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            reader: ArtifactsReader::new(config.reader.clone()),
            config,
            registry: ArtifactDefinitionsRegistry::new(),
            registry_key_paths: HashSet::new(),
        }
    }

    pub fn registry(&self) -> &ArtifactDefinitionsRegistry {
        &self.registry
    }

    fn is_legacy_file(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| self.config.legacy_files.iter().any(|legacy| legacy == name))
    }

    /// Registry key paths already defined by an earlier source.
    fn duplicate_registry_key_paths(&mut self, keys: &[String]) -> Vec<String> {
        let mut duplicates: Vec<String> = keys
            .iter()
            .filter(|key| self.registry_key_paths.contains(*key))
            .cloned()
            .collect();
        duplicates.sort();
        duplicates.dedup();
        self.registry_key_paths.extend(keys.iter().cloned());
        duplicates
    }

    fn check_definition(&mut self, filename: &str, legacy_file: bool, definition: &ArtifactDefinition) -> bool {
        let mut problems = Vec::new();
        let supports_macos = definition.supported_os.contains(&SupportedOs::Darwin);
        let supports_windows = definition.supported_os.contains(&SupportedOs::Windows);

        for source in &definition.sources {
            match &source.source_type {
                SourceType::File(path_source) | SourceType::Path(path_source) => {
                    if source.supported_os.contains(&SupportedOs::Darwin)
                        || (supports_macos && source.supported_os.is_empty())
                    {
                        problems.extend(check_macos_paths(&path_source.paths, &path_source.separator));
                    } else if supports_windows || source.supported_os.contains(&SupportedOs::Windows) {
                        for path in &path_source.paths {
                            problems.extend(check_windows_path(path, &path_source.separator));
                        }
                    }
                }
                SourceType::WindowsRegistryKey(registry_key) => {
                    if !legacy_file {
                        let duplicates = self.duplicate_registry_key_paths(&registry_key.keys);
                        if !duplicates.is_empty() {
                            problems.push(format!(
                                "Duplicate Registry key paths: {}",
                                duplicates.join(", ")
                            ));
                        }
                    }
                    problems.extend(registry_key.keys.iter().filter_map(|key| check_registry_key_path(key)));
                }
                SourceType::WindowsRegistryValue(registry_value) => {
                    problems.extend(
                        registry_value
                            .key_value_pairs
                            .iter()
                            .filter_map(|pair| check_registry_key_path(&pair.key)),
                    );
                }
                _ => {}
            }
        }

        for problem in &problems {
            warn!(
                "Artifact definition: {} in file: {}: {}",
                definition.name, filename, problem
            );
        }
        problems.is_empty()
    }

    /// Validates the artifact definitions of one file.
    ///
    /// Every problem found is logged as a warning; returns whether the file
    /// is valid.
    pub fn check_file(&mut self, path: &Path) -> bool {
        let filename = path.display().to_string();
        debug!("Validating: {}", filename);

        let content = match self.reader.read_content(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Unable to validate file: {} with error: {}", filename, e);
                return false;
            }
        };

        let mut result = true;
        let mut definitions = Vec::new();
        for definition in self.reader.read_str(&content) {
            match definition {
                Ok(definition) => definitions.push(definition),
                Err(e) => {
                    warn!("Unable to validate file: {} with error: {}", filename, e);
                    result = false;
                }
            }
        }

        let legacy_file = self.is_legacy_file(path);
        for definition in definitions {
            if !self.check_definition(&filename, legacy_file, &definition) {
                result = false;
            }

            let name = definition.name.clone();
            if let Err(e) = self.registry.register_definition(definition) {
                warn!(
                    "Duplicate artifact definition: {} in file: {} ({})",
                    name, filename, e
                );
                result = false;
            }
        }

        result
    }

    /// Validates every definition file of a directory; keeps going after a
    /// file fails.
    pub fn check_directory(&mut self, path: &Path) -> bool {
        let files = match self.reader.definition_files(path) {
            Ok(files) => files,
            Err(e) => {
                warn!("Unable to validate directory: {} with error: {}", path.display(), e);
                return false;
            }
        };

        let mut result = true;
        for file in files {
            result = self.check_file(&file) && result;
        }
        result
    }

    /// Names referenced by artifact groups but defined by no checked file.
    pub fn undefined_artifacts(&self) -> BTreeSet<String> {
        self.registry.get_undefined_artifacts()
    }

    /// # Errors
    ///
    /// Returns [`Error::MissingDependency`] listing the undefined artifacts.
    pub fn check_dependencies(&self) -> Result<()> {
        let undefined = self.undefined_artifacts();
        if undefined.is_empty() {
            return Ok(());
        }
        Err(Error::MissingDependency(undefined.into_iter().collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_corpus, write_definitions_file, TEST_DEFINITIONS};
    use tempfile::TempDir;

    const REGISTRY_KEY_DEFINITION: &str = r#"
name: ProfileList
doc: Profile list.
sources:
- type: REGISTRY_KEY
  attributes:
    keys: ['HKEY_LOCAL_MACHINE\Software\Microsoft\Windows NT\CurrentVersion\ProfileList\*']
supported_os: [Windows]
"#;

    #[test]
    fn test_check_fixture() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_definitions_file(temp_dir.path(), "definitions.yaml", TEST_DEFINITIONS).unwrap();

        let mut validator = ArtifactDefinitionsValidator::new(ValidatorConfig::default());
        assert!(validator.check_file(&path));
        assert_eq!(validator.registry().len(), 7);
        assert!(validator.check_dependencies().is_ok());
    }

    #[test]
    fn test_duplicate_definitions_across_files() {
        let temp_dir = TempDir::new().unwrap();
        write_definitions_file(temp_dir.path(), "a.yaml", TEST_DEFINITIONS).unwrap();
        write_definitions_file(temp_dir.path(), "b.yaml", TEST_DEFINITIONS).unwrap();

        let mut validator = ArtifactDefinitionsValidator::new(ValidatorConfig::default());
        assert!(!validator.check_directory(temp_dir.path()));
        assert_eq!(validator.registry().len(), 7);
    }

    #[test]
    fn test_duplicate_registry_keys_and_legacy_files() {
        let temp_dir = TempDir::new().unwrap();
        let first = write_definitions_file(temp_dir.path(), "first.yaml", REGISTRY_KEY_DEFINITION).unwrap();
        let second = write_definitions_file(
            temp_dir.path(),
            "legacy.yaml",
            &REGISTRY_KEY_DEFINITION.replace("name: ProfileList", "name: ProfileListLegacy"),
        )
        .unwrap();
        let third = write_definitions_file(
            temp_dir.path(),
            "third.yaml",
            &REGISTRY_KEY_DEFINITION.replace("name: ProfileList", "name: ProfileListCopy"),
        )
        .unwrap();

        let config = ValidatorConfig {
            legacy_files: vec!["legacy.yaml".to_string()],
            ..ValidatorConfig::default()
        };
        let mut validator = ArtifactDefinitionsValidator::new(config);
        assert!(validator.check_file(&first));
        assert!(validator.check_file(&second));
        assert!(!validator.check_file(&third));
    }

    #[test]
    fn test_current_control_set_variable() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_definitions_file(
            temp_dir.path(),
            "services.yaml",
            r#"
name: Services
doc: Services.
sources:
- type: REGISTRY_VALUE
  attributes:
    key_value_pairs:
    - {key: '%%CURRENT_CONTROL_SET%%\Services\*', value: 'ImagePath'}
supported_os: [Windows]
"#,
        )
        .unwrap();

        let mut validator = ArtifactDefinitionsValidator::new(ValidatorConfig::default());
        assert!(!validator.check_file(&path));
    }

    #[test]
    fn test_format_error_fails_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_definitions_file(temp_dir.path(), "broken.yaml", "name: Broken\ndoc: x.\n").unwrap();

        let mut validator = ArtifactDefinitionsValidator::new(ValidatorConfig::default());
        assert!(!validator.check_file(&path));
        assert!(!validator.check_file(&temp_dir.path().join("missing.yaml")));
    }

    #[test]
    fn test_missing_dependencies() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_definitions_file(
            temp_dir.path(),
            "group.yaml",
            "name: Group\ndoc: Group.\nsources:\n- type: ARTIFACT_GROUP\n  attributes: {names: [Nowhere, Missing]}\n",
        )
        .unwrap();

        let mut validator = ArtifactDefinitionsValidator::new(ValidatorConfig::default());
        assert!(validator.check_file(&path));
        match validator.check_dependencies() {
            Err(Error::MissingDependency(names)) => assert_eq!(names, vec!["Missing", "Nowhere"]),
            other => panic!("Expected missing dependency, got {:?}", other),
        }
    }

    #[test]
    fn test_check_corpus_directory() {
        let corpus = create_test_corpus().unwrap();

        let mut validator = ArtifactDefinitionsValidator::new(ValidatorConfig::default());
        assert!(validator.check_directory(corpus.path()));
        assert_eq!(validator.registry().len(), 7);
        assert!(validator.undefined_artifacts().is_empty());
    }

    #[test]
    fn test_syntax_error_keeps_earlier_definitions() {
        let temp_dir = TempDir::new().unwrap();
        let content = format!("{}\n---\nname: [unterminated\n", REGISTRY_KEY_DEFINITION.trim_end());
        let path = write_definitions_file(temp_dir.path(), "truncated.yaml", &content).unwrap();

        let mut validator = ArtifactDefinitionsValidator::new(ValidatorConfig::default());
        assert!(!validator.check_file(&path));
        assert_eq!(validator.registry().len(), 1);
    }
}
