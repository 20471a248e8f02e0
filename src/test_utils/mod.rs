//! Test utilities for the artifact definitions crate
//!
//! Shared fixtures and helpers for the unit test modules.

#![cfg(test)]

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// The seven definition fixture, one of every built-in source kind
pub const TEST_DEFINITIONS: &str = include_str!("../../test_data/definitions.yaml");

/// Creates a temporary directory that is automatically cleaned up
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Writes a definitions file into a directory and returns its path
pub fn write_definitions_file(dir: &Path, file_name: &str, content: &str) -> Result<PathBuf> {
    let path = dir.join(file_name);
    fs::write(&path, content)?;
    Ok(path)
}

/// Creates a temporary corpus directory holding the fixture split in one
/// file per definition, named in document order.
pub fn create_test_corpus() -> Result<TempDir> {
    let temp_dir = create_temp_dir()?;
    for (index, document) in TEST_DEFINITIONS.split("\n---\n").enumerate() {
        write_definitions_file(
            temp_dir.path(),
            &format!("{:02}_definition.yaml", index),
            document,
        )?;
    }
    Ok(temp_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::ArtifactsReader;

    #[test]
    fn test_create_test_corpus() {
        let corpus = create_test_corpus().unwrap();
        let reader = ArtifactsReader::default();

        let files = reader.definition_files(corpus.path()).unwrap();
        assert_eq!(files.len(), 7);

        let names: Vec<String> = reader
            .read_directory(corpus.path())
            .unwrap()
            .into_iter()
            .map(|definition| definition.name)
            .collect();
        assert_eq!(names.first().map(String::as_str), Some("SecurityEventLogEvtx"));
        assert_eq!(names.last().map(String::as_str), Some("UnixUsersHomeDirs"));
    }
}
