use crate::error::{Error, Result};
use crate::info::ProjectInfo;
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the config file looked up in the scanned root
pub const CONFIG_FILE_NAME: &str = "readmegen.toml";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hand-written project details; set fields win over detection
    pub project: ProjectInfo,
    pub scan: ScanConfig,
    pub output: OutputConfig,
}

/// Directory traversal settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Directory names that are never descended into
    pub exclude_dirs: Vec<String>,
    /// Glob patterns matched against root-relative file paths
    pub exclude_patterns: Vec<String>,
    pub follow_links: bool,
    /// Files larger than this many bytes are skipped
    pub max_file_size: u64,
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub readme: PathBuf,
    pub metadata: PathBuf,
    pub write_metadata: bool,
    /// Copy an existing README aside before overwriting it
    pub backup: bool,
    /// Excerpt source files into a "Code Examples" section
    pub code_samples: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            exclude_dirs: [
                ".git",
                "node_modules",
                "__pycache__",
                "venv",
                ".venv",
                "dist",
                "build",
                "target",
                ".idea",
                ".vscode",
                "coverage",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            exclude_patterns: vec![],
            follow_links: false,
            max_file_size: 10 * 1024 * 1024,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            readme: PathBuf::from("README.md"),
            metadata: PathBuf::from("readme_metadata.json"),
            write_metadata: true,
            backup: false,
            code_samples: true,
        }
    }
}

impl ScanConfig {
    /// Compile the exclude patterns
    pub fn patterns(&self) -> Result<Vec<Pattern>> {
        self.exclude_patterns
            .iter()
            .map(|p| Pattern::new(p).map_err(Error::from))
            .collect()
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the config for a run.
    ///
    /// An explicit path must load. Otherwise `readmegen.toml` in the root is
    /// used when present, and defaults when it is not.
    pub fn discover(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidate = root.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            log::debug!("Using config file {}", candidate.display());
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Merge CLI arguments into config (CLI takes precedence)
    pub fn merge_cli(
        &mut self,
        output: Option<PathBuf>,
        metadata: Option<PathBuf>,
        no_metadata: bool,
        exclude: Vec<String>,
        exclude_patterns: Vec<String>,
        backup: bool,
    ) {
        if let Some(out) = output {
            self.output.readme = out;
        }

        if let Some(meta) = metadata {
            self.output.metadata = meta;
        }

        if no_metadata {
            self.output.write_metadata = false;
        }

        for dir in exclude {
            if !self.scan.exclude_dirs.contains(&dir) {
                self.scan.exclude_dirs.push(dir);
            }
        }

        self.scan.exclude_patterns.extend(exclude_patterns);

        if backup {
            self.output.backup = true;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.output.readme.as_os_str().is_empty() {
            return Err(Error::config_validation("readme path must not be empty"));
        }

        if self.output.write_metadata && self.output.metadata.as_os_str().is_empty() {
            return Err(Error::config_validation(
                "metadata path must not be empty when metadata is enabled",
            ));
        }

        if self.scan.max_file_size == 0 {
            return Err(Error::config_validation("max_file_size must be at least 1"));
        }

        self.scan.patterns()?;

        Ok(())
    }
}
