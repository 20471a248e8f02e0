use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use artifact_definitions::cli::Args;
use artifact_definitions::config::{load_config, ValidatorConfig};
use artifact_definitions::validator::ArtifactDefinitionsValidator;

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    initialize_logging(args.verbose)?;

    let config = load_and_apply_config(&args)?;

    if !args.path.exists() {
        println!("No such file or directory: {}", args.path.display());
        return Ok(ExitCode::FAILURE);
    }

    println!("Validating: {}", args.path.display());
    if validate(&args, config) {
        println!("SUCCESS");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("FAILURE");
        Ok(ExitCode::FAILURE)
    }
}

/// Initialize logging based on verbosity
fn initialize_logging(verbose: bool) -> Result<()> {
    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    TermLogger::init(
        log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ).context("Failed to initialize logger")?;
    Ok(())
}

fn load_and_apply_config(args: &Args) -> Result<ValidatorConfig> {
    let mut config = load_config(args.config.as_deref())
        .context("Failed to load validator configuration")?;
    args.apply_to(&mut config);
    info!(
        "Reading {} definitions in the {} dialect",
        config.reader.format, config.reader.dialect
    );
    Ok(config)
}

fn validate(args: &Args, config: ValidatorConfig) -> bool {
    let mut validator = ArtifactDefinitionsValidator::new(config);

    let mut result = if args.path.is_dir() {
        validator.check_directory(&args.path)
    } else {
        validator.check_file(&args.path)
    };

    if let Err(e) = validator.check_dependencies() {
        warn!("{}", e);
        result = false;
    }

    info!("Checked {} artifact definitions", validator.registry().len());
    result
}
