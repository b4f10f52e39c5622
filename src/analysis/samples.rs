// Short source excerpts for the "Code Examples" section

use crate::analysis::classify::extension_of;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions eligible for excerpts, in priority order
const CODE_EXTENSIONS: &[&str] = &[
    "py", "js", "jsx", "ts", "tsx", "java", "cpp", "c", "go", "rs", "rb", "php", "vue", "swift",
];

/// Stems preferred once the first sample is taken
const ENTRY_STEMS: &[&str] = &["main", "index", "app"];

/// Most samples collected
pub const MAX_SAMPLES: usize = 3;
/// Characters of a file kept in an excerpt
pub const EXCERPT_CHARS: usize = 600;

const MIN_SAMPLE_LEN: usize = 100;
const MAX_SAMPLE_LEN: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSample {
    /// Root-relative, `/`-separated
    pub path: String,
    /// Fence language, the file extension
    pub language: String,
    pub excerpt: String,
    /// Whether the file continues past the excerpt
    pub truncated: bool,
}

/// Remembers scanned source files and picks excerpts from them
#[derive(Debug, Default)]
pub struct SampleCollector {
    candidates: Vec<(usize, PathBuf)>,
}

impl SampleCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Note one scanned file
    pub fn observe(&mut self, path: &Path) {
        let ext = extension_of(path);
        if let Some(rank) = CODE_EXTENSIONS.iter().position(|e| *e == ext) {
            self.candidates.push((rank, path.to_path_buf()));
        }
    }

    /// Pick up to [`MAX_SAMPLES`] excerpts.
    ///
    /// Extensions are tried in priority order. The first readable file of a
    /// reasonable size is taken; after that only entry points (`main`,
    /// `index`, `app`) qualify.
    pub fn collect(mut self, root: &Path) -> Vec<CodeSample> {
        // stable, so scan order holds within an extension
        self.candidates.sort_by_key(|(rank, _)| *rank);

        let mut samples = Vec::new();
        for (_, path) in &self.candidates {
            if samples.len() >= MAX_SAMPLES {
                break;
            }

            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            if !samples.is_empty() && !ENTRY_STEMS.contains(&stem.as_str()) {
                continue;
            }

            let content = match fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    debug!("No sample from {}: {}", path.display(), e);
                    continue;
                }
            };
            if content.len() <= MIN_SAMPLE_LEN || content.len() >= MAX_SAMPLE_LEN {
                continue;
            }

            samples.push(excerpt(path, root, &content));
        }
        samples
    }
}

fn excerpt(path: &Path, root: &Path, content: &str) -> CodeSample {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let mut chars = content.char_indices();
    let (text, truncated) = match chars.nth(EXCERPT_CHARS) {
        Some((end, _)) => (&content[..end], !content[end..].trim().is_empty()),
        None => (content, false),
    };

    CodeSample {
        path: relative.to_string_lossy().replace('\\', "/"),
        language: extension_of(path),
        excerpt: text.trim_end().to_string(),
        truncated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn body(lines: usize) -> String {
        (0..lines).map(|i| format!("value_{} = {}\n", i, i)).collect()
    }

    #[test]
    fn test_collect_prefers_extension_order_then_entry_points() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/lib.rs"), body(20)).unwrap();
        fs::write(root.join("helpers.py"), body(20)).unwrap();
        fs::write(root.join("tools.py"), body(20)).unwrap();
        fs::write(root.join("src/main.rs"), body(20)).unwrap();

        let mut collector = SampleCollector::new();
        for name in ["helpers.py", "src/lib.rs", "src/main.rs", "tools.py"] {
            collector.observe(&root.join(name));
        }
        let paths: Vec<_> = collector.collect(root).into_iter().map(|s| s.path).collect();

        assert_eq!(paths, vec!["helpers.py", "src/main.rs"]);
    }

    #[test]
    fn test_tiny_and_non_code_files_ignored() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("main.py"), "print(1)\n").unwrap();
        fs::write(root.join("notes.md"), body(20)).unwrap();

        let mut collector = SampleCollector::new();
        collector.observe(&root.join("main.py"));
        collector.observe(&root.join("notes.md"));
        assert!(collector.collect(root).is_empty());
    }

    #[test]
    fn test_excerpt_is_truncated() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let content = body(100);
        fs::write(root.join("app.js"), &content).unwrap();

        let mut collector = SampleCollector::new();
        collector.observe(&root.join("app.js"));
        let samples = collector.collect(root);

        assert_eq!(samples.len(), 1);
        let sample = &samples[0];
        assert_eq!(sample.language, "js");
        assert!(sample.truncated);
        assert!(sample.excerpt.chars().count() <= EXCERPT_CHARS);
        assert!(content.starts_with(&sample.excerpt));
    }

    #[test]
    fn test_short_file_kept_whole() {
        let content = body(10);
        let sample = excerpt(Path::new("/p/main.go"), Path::new("/p"), &content);
        assert_eq!(sample.path, "main.go");
        assert_eq!(sample.excerpt, content.trim_end());
        assert!(!sample.truncated);
    }
}
