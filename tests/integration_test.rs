// Integration tests for readmegen

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use readmegen::analysis::{classify, Scanner, Tally, OTHER};
use readmegen::{Analyzer, Config, Error, Pipeline, ProjectInfo, Renderer};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn fixed_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date")
}

// Helper to create an analyzer with default config
fn create_analyzer() -> Analyzer {
    Analyzer::new(&Config::default())
        .expect("Failed to create analyzer")
        .with_date(fixed_date())
}

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

// ============================================================================
// Analysis Tests
// ============================================================================

#[test]
fn test_three_file_scenario() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "a.py", "one\ntwo\nthree\n");
    write(root, "b.json", "{}");
    write(root, "c.md", &"line\n".repeat(10));

    let summary = create_analyzer().analyze(root).expect("Analysis failed");

    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.total_lines, 14);
    assert_eq!(summary.tallies.len(), 3);
    assert_eq!(summary.tallies.get("Python"), Some(Tally { files: 1, lines: 3 }));
    assert_eq!(summary.tallies.get("JSON"), Some(Tally { files: 1, lines: 1 }));
    assert_eq!(summary.tallies.get("Markdown"), Some(Tally { files: 1, lines: 10 }));
}

#[test]
fn test_totals_match_per_file_counts() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let files = [
        ("src/lib.rs", "fn a() {}\n"),
        ("src/bin/tool.rs", "fn main() {}\nfn helper() {}"),
        ("docs/guide.txt", "\n\n\n"),
        ("empty.toml", ""),
        ("Makefile", "all:\n\techo hi\n"),
    ];
    for (path, contents) in files {
        write(root, path, contents);
    }

    let summary = create_analyzer().analyze(root).unwrap();

    assert_eq!(summary.total_files, files.len());
    assert_eq!(summary.total_lines, 1 + 2 + 3 + 0 + 2);
    let tallied: usize = summary.tallies.iter().map(|(_, t)| t.files).sum();
    assert_eq!(tallied, summary.total_files);
    assert_eq!(summary.tallies.get(OTHER), Some(Tally { files: 1, lines: 2 }));
}

#[test]
fn test_excluded_directories_at_any_depth() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "keep.py", "x\n");
    write(root, "node_modules/pkg/index.js", "x\n");
    write(root, "a/b/c/node_modules/deep.js", "x\n");
    write(root, "a/b/c/kept.js", "x\n");
    write(root, ".git/config", "[core]\n");

    let scanner = Scanner::from_config(&Config::default().scan).unwrap();
    let found: Vec<_> = scanner
        .scan(root)
        .unwrap()
        .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();

    assert_eq!(found, vec!["a/b/c/kept.js".to_string(), "keep.py".to_string()]);
}

#[test]
fn test_binary_files_are_skipped() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "main.rs", "fn main() {}\n");
    fs::write(root.join("logo.png"), [0x89, b'P', b'N', b'G', 0, 0, 1, 2]).unwrap();

    let summary = create_analyzer().analyze(root).unwrap();
    assert_eq!(summary.total_files, 1);
    assert_eq!(summary.skipped, 1);
}

#[test]
fn test_classifier_is_pure() {
    for ext in ["py", ".PY", "Json", "md", "unknownext", ""] {
        assert_eq!(classify(ext), classify(ext));
    }
    assert_eq!(classify(".PY"), "Python");
    assert_eq!(classify("unknownext"), OTHER);
}

#[test]
fn test_analyze_missing_root() {
    let result = create_analyzer().analyze(Path::new("/nonexistent/readmegen/root"));
    assert!(matches!(result, Err(Error::RootNotFound(_))));
}

#[test]
fn test_analyze_file_as_root() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("file.txt");
    fs::write(&file, "x").unwrap();

    let result = create_analyzer().analyze(&file);
    assert!(matches!(result, Err(Error::NotADirectory(_))));
}

// ============================================================================
// Rendering Tests
// ============================================================================

#[test]
fn test_empty_directory_renders_defaults() {
    let dir = TempDir::new().unwrap();
    let summary = create_analyzer().analyze(dir.path()).unwrap();
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.total_lines, 0);

    let document = Renderer::new()
        .unwrap()
        .render(&summary, &ProjectInfo::default())
        .unwrap();

    assert_eq!(
        document.titles(),
        vec![
            "Overview",
            "Features",
            "Technologies Used",
            "Installation",
            "Usage",
            "Project Structure",
            "Contributing",
            "License",
            "Contact",
        ]
    );
    let markdown = document.to_markdown();
    for placeholder in ["Describe your main feature", "Your Name", "yourusername", "MIT"] {
        assert!(markdown.contains(placeholder), "missing default {:?}", placeholder);
    }
    assert!(markdown.contains("0 files and 0 lines"));
}

#[test]
fn test_rendering_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "package.json", r#"{"name": "web", "dependencies": {"react": "^18"}, "scripts": {"start": "vite"}}"#);
    write(root, "src/App.jsx", "export default () => null;\n");
    write(root, "src/App.test.jsx", "test('x', () => {});\n");

    let summary = create_analyzer().analyze(root).unwrap();
    let renderer = Renderer::new().unwrap();
    let first = renderer.render(&summary, &ProjectInfo::default()).unwrap();
    let second = renderer.render(&summary, &ProjectInfo::default()).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.to_markdown(), second.to_markdown());
    assert!(first.section("Testing").is_some());
    assert!(first.section("Dependencies").unwrap().body.contains("react"));
    assert!(first.section("Usage").unwrap().body.contains("`start`: `vite`"));
}

// ============================================================================
// Pipeline Tests
// ============================================================================

#[test]
fn test_pipeline_writes_readme_and_metadata() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "a.py", "one\ntwo\nthree\n");
    write(root, "b.json", "{}");
    write(root, "c.md", &"line\n".repeat(10));

    let report = Pipeline::new(Config::default())
        .with_date(fixed_date())
        .run(root)
        .expect("Run failed");

    let readme = fs::read_to_string(&report.readme).unwrap();
    assert!(readme.contains("## Technologies Used"));
    assert!(readme.contains("**Markdown**: 1 file, 10 lines"));
    assert!(readme.contains("*Generated on March 01, 2024*"));

    let metadata: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(root.join("readme_metadata.json")).unwrap())
            .unwrap();
    assert_eq!(metadata["totalFiles"], 3);
    assert_eq!(metadata["totalLines"], 14);
    assert_eq!(metadata["technologies"]["Python"], 1);
    assert_eq!(metadata["technologyLines"]["Markdown"], 10);
    assert_eq!(metadata["generatedDate"], "2024-03-01");
}

#[test]
fn test_pipeline_missing_root_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("nope");

    let err = Pipeline::new(Config::default()).run(&root).unwrap_err();
    assert!(matches!(err, Error::RootNotFound(_)));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_pipeline_overwrites_existing_readme() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "README.md", "# Old\n\nStale text.\n");
    write(root, "main.go", "package main\n");

    Pipeline::new(Config::default()).run(root).unwrap();

    let readme = fs::read_to_string(root.join("README.md")).unwrap();
    assert!(!readme.contains("Stale text."));
    assert!(readme.contains("## Overview"));
}

#[test]
fn test_pipeline_honours_config_file() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "main.py", "print('hi')\n");
    write(root, "fixtures/data.py", "x = 1\n");
    write(
        root,
        "readmegen.toml",
        "[project]\nname = \"Configured\"\nfeatures = [\"Does one thing well\"]\n\n\
         [scan]\nexclude_dirs = [\"fixtures\"]\n\n\
         [output]\nreadme = \"docs/README.md\"\nwrite_metadata = false\n",
    );
    fs::create_dir_all(root.join("docs")).unwrap();

    let config = Config::discover(root, None).unwrap();
    let report = Pipeline::new(config).run(root).unwrap();

    assert_eq!(report.readme, root.join("docs/README.md"));
    assert_eq!(report.metadata, None);
    // main.py and readmegen.toml
    assert_eq!(report.total_files, 2);
    let readme = fs::read_to_string(&report.readme).unwrap();
    assert!(readme.starts_with("# Configured\n"));
    assert!(readme.contains("- Does one thing well"));
}
