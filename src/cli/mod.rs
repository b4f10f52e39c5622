//! CLI module for readmegen

mod args;

pub use args::{Args, Command, GenerateArgs};

use crate::analysis::{check_root, manifests};
use crate::config::Config;
use crate::error::Result;
use crate::info::{self, ProjectInfo, INFO_FILE_NAME};
use crate::output::write_atomic;
use crate::pipeline::{resolve_output, Pipeline};
use env_logger::Env;
use log::LevelFilter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Run the CLI application
pub fn run() -> ExitCode {
    let args = Args::parse_args();

    match execute(args.into_command()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else if quiet {
        LevelFilter::Error
    } else {
        LevelFilter::Warn
    };

    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(level.as_str()))
        .format_timestamp(None)
        .try_init();
}

fn execute(command: Command) -> Result<()> {
    match command {
        Command::Generate(args) => generate(args),

        Command::Info {
            path,
            output,
            print,
            verbose,
        } => {
            init_logging(verbose, false);
            save_info(&path, output, print)
        }

        Command::Version => {
            println!("readmegen {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn generate(args: GenerateArgs) -> Result<()> {
    init_logging(args.verbose, args.quiet);

    let root = args.path;
    let mut cfg = Config::discover(&root, args.config.as_deref())?;

    // CLI takes precedence
    cfg.merge_cli(
        args.output,
        args.metadata,
        args.no_metadata,
        args.exclude,
        args.exclude_pattern,
        args.backup,
    );
    if args.no_samples {
        cfg.output.code_samples = false;
    }
    cfg.validate()?;

    if args.verbose {
        println!("Scanning: {}", root.display());
        println!("Output: {}", resolve_output(&root, &cfg.output.readme).display());
        if cfg.output.write_metadata {
            println!("Metadata: {}", resolve_output(&root, &cfg.output.metadata).display());
        }
        println!("Exclude: {:?}", cfg.scan.exclude_dirs);
        if !cfg.scan.exclude_patterns.is_empty() {
            println!("Exclude patterns: {:?}", cfg.scan.exclude_patterns);
        }
    }

    let pipeline = Pipeline::new(cfg).with_verbose(args.verbose);

    if args.dry_run {
        let prepared = pipeline.prepare(&root)?;
        print!("{}", prepared.document.to_markdown());
        return Ok(());
    }

    let report = pipeline.run(&root)?;

    if !args.quiet {
        println!("{}", report.summary());
        if let Some(backup) = &report.backup {
            println!("Previous README saved to: {}", backup.display());
        }
        println!("README written to: {}", report.readme.display());
        if let Some(metadata) = &report.metadata {
            println!("Metadata written to: {}", metadata.display());
        }
    }

    Ok(())
}

/// Detect project details and save (or print) them as JSON
fn save_info(root: &Path, output: Option<PathBuf>, print: bool) -> Result<()> {
    check_root(root)?;

    let report = manifests::inspect(root)?;
    let mut details = info::detect(root, &report);
    if let Some(saved) = ProjectInfo::load_from_root(root)? {
        // keep hand edits from a previous save
        details.overlay(saved);
    }

    let mut json = serde_json::to_string_pretty(&details)?;
    json.push('\n');

    if print {
        print!("{}", json);
        return Ok(());
    }

    let path = match output {
        Some(path) => resolve_output(root, &path),
        None => root.join(INFO_FILE_NAME),
    };
    write_atomic(&path, json.as_bytes())?;
    println!("Project details saved to: {}", path.display());
    Ok(())
}
