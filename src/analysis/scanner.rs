// File discovery
//
// Walks the project root and yields the files to analyze. Excluded
// directories are pruned, so nothing below them is ever visited.

use crate::config::ScanConfig;
use crate::error::{Error, Result};
use glob::Pattern;
use log::{debug, trace, warn};
use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Recursive file scanner with directory and pattern exclusions
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    exclude_dirs: HashSet<String>,
    patterns: Vec<Pattern>,
    follow_links: bool,
}

impl Scanner {
    /// Create a scanner that skips the given directory names
    pub fn new<I, S>(exclude_dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            exclude_dirs: exclude_dirs.into_iter().map(Into::into).collect(),
            patterns: Vec::new(),
            follow_links: false,
        }
    }

    /// Build a scanner from the `[scan]` config section
    pub fn from_config(config: &ScanConfig) -> Result<Self> {
        Ok(Self::new(config.exclude_dirs.iter().cloned())
            .with_patterns(config.patterns()?)
            .with_follow_links(config.follow_links))
    }

    /// Also skip files whose root-relative path matches any of these globs
    pub fn with_patterns(mut self, patterns: Vec<Pattern>) -> Self {
        self.patterns = patterns;
        self
    }

    pub fn with_follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Whether a directory with this name is pruned
    pub fn is_excluded_dir(&self, name: &OsStr) -> bool {
        name.to_str()
            .map_or(false, |n| self.exclude_dirs.contains(n))
    }

    /// Lazily walk `root`, yielding regular files in file-name order.
    ///
    /// Fails up front if the root is missing or not a directory. Entries
    /// that cannot be read during the walk are logged and skipped.
    pub fn scan<'a>(&'a self, root: &Path) -> Result<impl Iterator<Item = PathBuf> + 'a> {
        check_root(root)?;
        debug!("Scanning {}", root.display());

        let root = root.to_path_buf();
        let walker = WalkDir::new(&root)
            .follow_links(self.follow_links)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| self.keep_entry(entry));

        Ok(walker
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(move |entry| !self.matches_pattern(entry.path(), &root))
            .map(|entry| {
                trace!("Found file: {}", entry.path().display());
                entry.into_path()
            }))
    }

    fn keep_entry(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }
        let excluded = self.is_excluded_dir(entry.file_name());
        if excluded {
            debug!("Pruning {}", entry.path().display());
        }
        !excluded
    }

    fn matches_pattern(&self, path: &Path, root: &Path) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        self.patterns.iter().any(|p| p.matches_path(relative))
    }
}

/// Ensure the root exists and is a directory
pub fn check_root(root: &Path) -> Result<()> {
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(Error::NotADirectory(root.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(Error::RootNotFound(root.to_path_buf()))
        }
        Err(e) => Err(Error::Io(e)),
    }
}
