// Line counting and per-technology tallies
//
// Reads each scanned file once, counts its lines and folds the result into
// running totals. A file that cannot be read is logged and left out; it
// never aborts the run.

use crate::analysis::classify::{classify, extension_of};
use crate::error::{Error, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Bytes inspected when sniffing for binary content
const BINARY_SNIFF_LEN: usize = 8192;

/// Tooling config recognised by file name; any `.env*` file also counts
const CONFIG_FILES: &[&str] = &[
    ".gitignore",
    ".dockerignore",
    "Dockerfile",
    "docker-compose.yml",
    ".eslintrc",
    ".prettierrc",
    "tsconfig.json",
    "webpack.config.js",
    "vite.config.js",
    ".babelrc",
    "jest.config.js",
    "pytest.ini",
    "tox.ini",
    ".flake8",
    "mypy.ini",
    "setup.cfg",
];

/// Default cap on the size of a counted file
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// One scanned file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    /// Lowercased extension without the dot, empty if none
    pub extension: String,
    pub line_count: usize,
}

/// File and line counts for one technology
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub files: usize,
    pub lines: usize,
}

/// Per-technology tallies, ordered by label
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TechnologyTally(BTreeMap<String, Tally>);

impl TechnologyTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one file with `lines` lines to the bucket for `label`
    pub fn record(&mut self, label: &str, lines: usize) {
        let tally = self.0.entry(label.to_string()).or_default();
        tally.files += 1;
        tally.lines += lines;
    }

    pub fn get(&self, label: &str) -> Option<Tally> {
        self.0.get(label).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tally)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Labels in alphabetical order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Labels sorted by descending line count, ties by name
    pub fn by_lines(&self) -> Vec<(&str, Tally)> {
        let mut entries: Vec<_> = self.0.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        entries.sort_by(|a, b| b.1.lines.cmp(&a.1.lines).then(a.0.cmp(b.0)));
        entries
    }
}

/// Totals produced by the aggregator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    pub total_files: usize,
    pub total_lines: usize,
    pub tallies: TechnologyTally,
    /// Files that look like tests
    pub test_files: usize,
    /// Root-relative paths of documentation files
    pub doc_files: Vec<String>,
    /// Files left out as binary, oversized or unreadable
    pub skipped: usize,
    /// Root-relative paths of tooling config files
    pub config_files: Vec<String>,
}

/// Folds scanned files into [`Statistics`]
#[derive(Debug)]
pub struct Aggregator {
    root: PathBuf,
    max_file_size: u64,
    stats: Statistics,
}

impl Aggregator {
    /// Create an aggregator for files under `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            stats: Statistics::default(),
        }
    }

    pub fn with_max_file_size(mut self, max: u64) -> Self {
        self.max_file_size = max;
        self
    }

    /// Aggregate every path in `paths`
    pub fn aggregate<I>(mut self, paths: I) -> Statistics
    where
        I: IntoIterator<Item = PathBuf>,
    {
        for path in paths {
            self.add_path(&path);
        }
        self.finish()
    }

    /// Read and count one file, recording it or noting it as skipped
    pub fn add_path(&mut self, path: &Path) {
        match self.read_entry(path) {
            Ok(Some(entry)) => self.add(&entry),
            Ok(None) => self.stats.skipped += 1,
            Err(e) => {
                warn!("{}", e);
                self.stats.skipped += 1;
            }
        }
    }

    /// Build a [`FileEntry`] for a file.
    ///
    /// Returns `Ok(None)` for binary or oversized files, which are skipped
    /// rather than counted.
    pub fn read_entry(&self, path: &Path) -> Result<Option<FileEntry>> {
        let meta = fs::metadata(path).map_err(|e| Error::read(path, e))?;
        if meta.len() > self.max_file_size {
            debug!(
                "Skipping {} ({} bytes exceeds limit)",
                path.display(),
                meta.len()
            );
            return Ok(None);
        }

        let bytes = fs::read(path).map_err(|e| Error::read(path, e))?;
        if is_binary(&bytes) {
            debug!("Skipping binary file {}", path.display());
            return Ok(None);
        }

        Ok(Some(FileEntry {
            path: path.to_path_buf(),
            extension: extension_of(path),
            line_count: count_lines(&bytes),
        }))
    }

    /// Record an already-read entry
    pub fn add(&mut self, entry: &FileEntry) {
        self.stats.total_files += 1;
        self.stats.total_lines += entry.line_count;
        self.stats
            .tallies
            .record(classify(&entry.extension), entry.line_count);

        if is_test_file(&entry.path) {
            self.stats.test_files += 1;
        }

        if is_doc_file(&entry.path, &entry.extension) {
            let relative = self.relative(&entry.path);
            self.stats.doc_files.push(relative);
        }

        if is_config_file(&entry.path) {
            let relative = self.relative(&entry.path);
            self.stats.config_files.push(relative);
        }
    }

    fn relative(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative.to_string_lossy().replace('\\', "/")
    }

    pub fn finish(self) -> Statistics {
        self.stats
    }
}

/// Count newline-delimited lines; a final line without a newline counts
pub fn count_lines(bytes: &[u8]) -> usize {
    let newlines = bytes.iter().filter(|&&b| b == b'\n').count();
    match bytes.last() {
        Some(b'\n') | None => newlines,
        Some(_) => newlines + 1,
    }
}

/// A NUL byte near the start marks a file as binary
pub fn is_binary(bytes: &[u8]) -> bool {
    bytes.iter().take(BINARY_SNIFF_LEN).any(|&b| b == 0)
}

fn is_test_file(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if name.contains("test") {
        return true;
    }
    path.parent()
        .and_then(|p| p.file_name())
        .map(|p| p.to_string_lossy().to_lowercase())
        .map_or(false, |p| matches!(p.as_str(), "tests" | "test" | "__tests__"))
}

fn is_config_file(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    name.starts_with(".env") || CONFIG_FILES.contains(&name.as_str())
}

fn is_doc_file(path: &Path, extension: &str) -> bool {
    if !matches!(extension, "md" | "rst" | "txt") {
        return false;
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_uppercase())
        .unwrap_or_default();
    !(name.starts_with("README") || name.starts_with("LICENSE"))
}
