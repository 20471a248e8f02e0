use clap::Parser;
use std::path::PathBuf;

use crate::config::{Dialect, DocumentFormat, ValidatorConfig};

/// Command-line arguments for the artifact definitions validator.
#[derive(Parser, Debug)]
#[clap(name = "validate_artifacts", about = "Validates artifact definition files")]
pub struct Args {
    /// Artifact definitions file or directory of definition files
    pub path: PathBuf,

    /// Validator configuration file (YAML)
    #[clap(short, long)]
    pub config: Option<PathBuf>,

    /// Read definitions in the legacy format (labels and conditions)
    #[clap(long)]
    pub legacy: bool,

    /// Read JSON definition files instead of YAML
    #[clap(long)]
    pub json: bool,

    /// Verbose output
    #[clap(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Applies the command-line overrides to a loaded configuration.
    pub fn apply_to(&self, config: &mut ValidatorConfig) {
        if self.legacy {
            config.reader.dialect = Dialect::Legacy;
        }
        if self.json {
            config.reader.format = DocumentFormat::Json;
            config.reader.extension = Some("json".to_string());
        }
    }
}
