//! # artifact_definitions
//!
//! A schema-governed registry of forensic artifact definitions.
//!
//! ## Overview
//!
//! An artifact definition is a named, documented description of where
//! evidence lives on a system: files and paths, Windows Registry keys and
//! values, WMI queries, commands, or a group of other definitions. This
//! crate reads definitions from YAML or JSON documents, validates them
//! against the definition schema, and indexes them by name and alias so
//! dangling artifact group references can be found across a corpus.
//!
//! ## Features
//!
//! - **Strict validation**: unknown keys, malformed attributes and unknown
//!   operating systems are rejected with errors naming the artifact
//! - **Extensible source types**: new kinds register with a
//!   [`SourceTypeFactory`] at runtime
//! - **Two format revisions**: the current schema and the legacy one with
//!   labels and conditions
//! - **Corpus checks**: duplicate definitions, platform path conventions
//!   and undefined artifact group references
//!
//! ## Usage
//!
//! ```no_run
//! use artifact_definitions::config::ReaderConfig;
//! use artifact_definitions::reader::ArtifactsReader;
//! use artifact_definitions::registry::ArtifactDefinitionsRegistry;
//! use std::path::Path;
//!
//! # fn main() -> artifact_definitions::errors::Result<()> {
//! let reader = ArtifactsReader::new(ReaderConfig::default());
//! let mut registry = ArtifactDefinitionsRegistry::new();
//!
//! registry.read_from_directory(&reader, Path::new("data"))?;
//!
//! for name in registry.get_undefined_artifacts() {
//!     println!("Undefined artifact definition: {}", name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`source_type`]: Source kinds and the factory that builds them
//! - [`artifact`]: The artifact definition
//! - [`reader`]: Document validation and file reading
//! - [`registry`]: Name and alias index of definitions
//! - [`validator`]: Corpus validation
//! - [`config`]: Reader and validator configuration
//! - [`constants`]: Type indicators, document keys and the label catalogue

/// Command-line interface of the validator
pub mod cli;

/// Artifact definitions and their sources
pub mod artifact;

/// Reader and validator configuration
pub mod config;

/// Type indicators, document keys and catalogues
pub mod constants;

/// Error types
pub mod errors;

/// Document reading and schema validation
pub mod reader;

/// In-memory definitions registry
pub mod registry;

/// Source kinds and their factory
pub mod source_type;

/// Supported operating systems
pub mod supported_os;

/// Corpus validation
pub mod validator;

/// Test utilities and helpers
#[cfg(test)]
pub mod test_utils;

pub use artifact::ArtifactDefinition;
pub use errors::{Error, Result};
pub use reader::ArtifactsReader;
pub use registry::ArtifactDefinitionsRegistry;
pub use source_type::{Source, SourceType, SourceTypeFactory};
pub use supported_os::SupportedOs;
pub use validator::ArtifactDefinitionsValidator;
