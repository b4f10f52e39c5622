// Analysis module: scan a project and aggregate it into a summary

pub mod classify;
pub mod manifests;
pub mod samples;
pub mod scanner;
pub mod stats;
pub mod structure;

pub use classify::*;
pub use manifests::{Manifest, ManifestReport};
pub use samples::{CodeSample, SampleCollector};
pub use scanner::*;
pub use stats::*;
pub use structure::*;

use crate::config::Config;
use crate::error::Result;
use chrono::{Local, NaiveDate};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Everything known about a project after one scan
#[derive(Debug, Clone, Serialize)]
pub struct ProjectSummary {
    pub project_name: String,
    /// Derived label such as "Rust Project"
    pub project_type: String,
    pub generated_date: NaiveDate,
    pub total_files: usize,
    pub total_lines: usize,
    pub tallies: TechnologyTally,
    pub test_files: usize,
    pub doc_files: Vec<String>,
    /// Files left out as binary, oversized or unreadable
    pub skipped: usize,
    /// Root-relative paths of tooling config such as `Dockerfile`
    pub config_files: Vec<String>,
    pub code_samples: Vec<CodeSample>,
    pub manifests: ManifestReport,
    pub structure: Vec<StructureEntry>,
}

impl ProjectSummary {
    pub fn has_technology(&self, label: &str) -> bool {
        self.tallies.contains(label)
    }

    /// Recognised technologies, most lines first; "Other" is left out
    pub fn technologies(&self) -> Vec<(&str, Tally)> {
        self.tallies
            .by_lines()
            .into_iter()
            .filter(|(label, _)| *label != OTHER)
            .collect()
    }
}

/// Runs scan, classification and aggregation over a project root
pub struct Analyzer {
    scanner: Scanner,
    max_file_size: u64,
    project_name: Option<String>,
    date: Option<NaiveDate>,
    ignored: Vec<PathBuf>,
    code_samples: bool,
    verbose: bool,
}

impl Analyzer {
    /// Create a new analyzer with the given configuration
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            scanner: Scanner::from_config(&config.scan)?,
            max_file_size: config.scan.max_file_size,
            project_name: config.project.name.clone(),
            date: None,
            ignored: Vec::new(),
            code_samples: config.output.code_samples,
            verbose: false,
        })
    }

    /// Create analyzer with verbose output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Stamp the summary with a fixed date instead of today
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Leave these files out of the counts (previous outputs of this tool)
    pub fn with_ignored(mut self, paths: Vec<PathBuf>) -> Self {
        self.ignored = paths;
        self
    }

    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    /// Analyze the project at `root`
    pub fn analyze(&self, root: &Path) -> Result<ProjectSummary> {
        let files = self.scanner.scan(root)?;

        let progress = if self.verbose {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {pos} files {msg}") {
                pb.set_style(style);
            }
            Some(pb)
        } else {
            None
        };

        let mut aggregator = Aggregator::new(root).with_max_file_size(self.max_file_size);
        let mut layout = StructureBuilder::new();
        let mut samples = SampleCollector::new();

        // Outputs may be spelled differently from the walk (`./x` vs `/abs/x`)
        let root_abs = root.canonicalize()?;
        let ignored: Vec<PathBuf> = self.ignored.iter().map(|p| absolute(p)).collect();
        let is_ignored = |path: &Path| {
            let relative = path.strip_prefix(root).unwrap_or(path);
            ignored.contains(&root_abs.join(relative))
        };

        for path in files {
            if is_ignored(&path) {
                debug!("Ignoring previous output {}", path.display());
                continue;
            }
            if let Some(ref pb) = progress {
                let msg = path.file_name().unwrap_or_default().to_string_lossy().to_string();
                pb.set_message(msg);
                pb.inc(1);
            }
            layout.observe(&path, root);
            samples.observe(&path);
            aggregator.add_path(&path);
        }

        if let Some(pb) = progress {
            pb.finish_with_message("scanned");
        }

        let stats = aggregator.finish();
        let manifests = manifests::inspect(root)?;
        let mut structure = layout.build(root, &self.scanner)?;
        structure.retain(|entry| !is_ignored(&root.join(&entry.name)));
        let code_samples = if self.code_samples {
            samples.collect(root)
        } else {
            Vec::new()
        };

        info!(
            "Counted {} files, {} lines ({} skipped)",
            stats.total_files, stats.total_lines, stats.skipped
        );

        Ok(ProjectSummary {
            project_name: self
                .project_name
                .clone()
                .unwrap_or_else(|| project_name(root)),
            project_type: manifests.project_type().to_string(),
            generated_date: self.date.unwrap_or_else(|| Local::now().date_naive()),
            total_files: stats.total_files,
            total_lines: stats.total_lines,
            tallies: stats.tallies,
            test_files: stats.test_files,
            doc_files: stats.doc_files,
            skipped: stats.skipped,
            config_files: stats.config_files,
            code_samples,
            manifests,
            structure,
        })
    }
}

/// Absolute form of a path that may not exist yet
fn absolute(path: &Path) -> PathBuf {
    if let Ok(path) = path.canonicalize() {
        return path;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            parent
                .canonicalize()
                .map(|p| p.join(name))
                .unwrap_or_else(|_| path.to_path_buf())
        }
        _ => path.to_path_buf(),
    }
}

/// Directory name of the root, resolving `.` and similar
pub fn project_name(root: &Path) -> String {
    root.canonicalize()
        .ok()
        .as_deref()
        .unwrap_or(root)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("Project")
        .to_string()
}
