//! CLI argument parsing

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// Generate a README from a scan of your project
#[derive(Parser, Debug)]
#[command(name = "readmegen")]
#[command(about = "Generate a README from a scan of your project")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub generate: GenerateArgs,
}

impl Args {
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// The command to run; bare `readmegen [PATH]` means `generate`
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Generate(self.generate))
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan a project and write its README
    Generate(GenerateArgs),

    /// Detect project details and save them for later runs
    Info {
        /// Project root
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Where to save the details (default: readme_info.json in the root)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the details instead of saving them
        #[arg(long)]
        print: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show version information
    Version,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct GenerateArgs {
    /// Project root to scan
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// README path, relative to the project root unless absolute
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Metadata JSON path
    #[arg(long)]
    pub metadata: Option<PathBuf>,

    /// Skip the metadata file
    #[arg(long, conflicts_with = "metadata")]
    pub no_metadata: bool,

    /// Directory names to skip (can be repeated)
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Glob patterns to skip, matched against root-relative paths (can be repeated)
    #[arg(long)]
    pub exclude_pattern: Vec<String>,

    /// Config file path (default: readmegen.toml in the root)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Keep the existing README as a timestamped backup
    #[arg(long)]
    pub backup: bool,

    /// Leave source excerpts out of the README
    #[arg(long)]
    pub no_samples: bool,

    /// Print the README instead of writing it
    #[arg(long)]
    pub dry_run: bool,

    /// Verbose output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only report errors
    #[arg(short, long)]
    pub quiet: bool,
}
