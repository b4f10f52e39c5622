// Top-level project layout for the "Project Structure" section

use crate::analysis::scanner::Scanner;
use crate::error::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Component, Path};

/// One entry directly under the project root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureEntry {
    pub name: String,
    pub is_dir: bool,
    /// Scanned files beneath a directory; zero for plain files
    pub files: usize,
}

impl fmt::Display for StructureEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dir {
            let noun = if self.files == 1 { "file" } else { "files" };
            write!(f, "{}/ ({} {})", self.name, self.files, noun)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// Counts scanned files per top-level directory as they stream past
#[derive(Debug, Default)]
pub struct StructureBuilder {
    counts: HashMap<String, usize>,
}

impl StructureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Note one scanned file
    pub fn observe(&mut self, path: &Path, root: &Path) {
        let relative = path.strip_prefix(root).unwrap_or(path);
        let mut components = relative.components();
        if let (Some(Component::Normal(first)), Some(_)) = (components.next(), components.next()) {
            *self
                .counts
                .entry(first.to_string_lossy().to_string())
                .or_default() += 1;
        }
    }

    /// List the root's entries in name order.
    ///
    /// Hidden entries, excluded directories and timestamped scan dumps
    /// (`name_YYYYmmdd_HHMMSS.json` and similar) are left out.
    pub fn build(self, root: &Path, scanner: &Scanner) -> Result<Vec<StructureEntry>> {
        let dump = Regex::new(r"_\d{8}_\d{6}\.(csv|json|txt)$").expect("static regex");

        let mut entries: Vec<_> = fs::read_dir(root)?.filter_map(|e| e.ok()).collect();
        entries.sort_by_key(|e| e.file_name());

        let mut structure = Vec::new();
        for entry in entries {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') || dump.is_match(&name) {
                continue;
            }

            let is_dir = entry.file_type().map_or(false, |t| t.is_dir());
            if is_dir && scanner.is_excluded_dir(&entry.file_name()) {
                continue;
            }

            let files = if is_dir {
                self.counts.get(&name).copied().unwrap_or(0)
            } else {
                0
            };
            structure.push(StructureEntry {
                name,
                is_dir,
                files,
            });
        }

        Ok(structure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_display() {
        let dir = StructureEntry {
            name: "src".to_string(),
            is_dir: true,
            files: 4,
        };
        let one = StructureEntry {
            name: "docs".to_string(),
            is_dir: true,
            files: 1,
        };
        let file = StructureEntry {
            name: "Cargo.toml".to_string(),
            is_dir: false,
            files: 0,
        };
        assert_eq!(dir.to_string(), "src/ (4 files)");
        assert_eq!(one.to_string(), "docs/ (1 file)");
        assert_eq!(file.to_string(), "Cargo.toml");
    }

    #[test]
    fn test_build_structure() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/nested")).unwrap();
        fs::create_dir_all(root.join("target/debug")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join("src/main.rs"), "").unwrap();
        fs::write(root.join("src/nested/lib.rs"), "").unwrap();
        fs::write(root.join("Cargo.toml"), "").unwrap();
        fs::write(root.join(".gitignore"), "").unwrap();
        fs::write(root.join("scan_20240101_120000.json"), "").unwrap();

        let scanner = Scanner::new(["target", ".git"]);
        let mut builder = StructureBuilder::new();
        for path in scanner.scan(root).unwrap() {
            builder.observe(&path, root);
        }
        let structure = builder.build(root, &scanner).unwrap();

        let rendered: Vec<_> = structure.iter().map(|e| e.to_string()).collect();
        assert_eq!(rendered, vec!["Cargo.toml", "src/ (2 files)"]);
    }
}
