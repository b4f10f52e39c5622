// One README generation run: analyze, render, write

use crate::analysis::{check_root, Analyzer, ProjectSummary};
use crate::config::Config;
use crate::error::Result;
use crate::info::{self, ProjectInfo, INFO_FILE_NAME};
use crate::output::{self, Document, Renderer};
use chrono::NaiveDate;
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Everything rendered for a project, before anything is written
#[derive(Debug, Clone)]
pub struct Prepared {
    pub summary: ProjectSummary,
    pub info: ProjectInfo,
    pub document: Document,
}

/// What a completed run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub readme: PathBuf,
    pub metadata: Option<PathBuf>,
    pub backup: Option<PathBuf>,
    pub total_files: usize,
    pub total_lines: usize,
    pub technologies: usize,
    pub skipped: usize,
}

impl RunReport {
    /// Get summary string
    pub fn summary(&self) -> String {
        let mut out = format!(
            "README generated: {} files, {} lines, {} technologies",
            output::thousands(self.total_files as u64),
            output::thousands(self.total_lines as u64),
            self.technologies
        );
        if self.skipped > 0 {
            out.push_str(&format!(" ({} skipped)", self.skipped));
        }
        out
    }
}

pub struct Pipeline {
    config: Config,
    date: Option<NaiveDate>,
    verbose: bool,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            date: None,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Stamp the document with a fixed date instead of today
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// README path for `root`
    pub fn readme_path(&self, root: &Path) -> PathBuf {
        resolve_output(root, &self.config.output.readme)
    }

    /// Metadata path for `root`, if metadata is enabled
    pub fn metadata_path(&self, root: &Path) -> Option<PathBuf> {
        self.config
            .output
            .write_metadata
            .then(|| resolve_output(root, &self.config.output.metadata))
    }

    /// Analyze and render without touching the filesystem
    pub fn prepare(&self, root: &Path) -> Result<Prepared> {
        check_root(root)?;

        let mut ignored = vec![self.readme_path(root), root.join(INFO_FILE_NAME)];
        ignored.extend(self.metadata_path(root));

        let mut analyzer = Analyzer::new(&self.config)?
            .with_verbose(self.verbose)
            .with_ignored(ignored);
        if let Some(date) = self.date {
            analyzer = analyzer.with_date(date);
        }

        let mut summary = analyzer.analyze(root)?;
        let info = collect_info(root, &summary, &self.config)?;
        if self.config.project.name.is_none() {
            if let Some(name) = &info.name {
                summary.project_name = name.clone();
            }
        }

        let document = Renderer::new()?.render(&summary, &info)?;
        debug!("Rendered {} sections", document.sections.len());

        Ok(Prepared {
            summary,
            info,
            document,
        })
    }

    /// Generate and write the README (and metadata) for `root`
    pub fn run(&self, root: &Path) -> Result<RunReport> {
        let prepared = self.prepare(root)?;
        let readme = self.readme_path(root);

        let backup = if self.config.output.backup {
            output::backup_existing(&readme)?
        } else {
            None
        };

        output::write_document(&prepared.document, &readme)?;

        let metadata = self.metadata_path(root);
        if let Some(path) = &metadata {
            output::write_metadata(&prepared.summary, path)?;
        }

        let summary = &prepared.summary;
        info!("Finished {}", summary.project_name);
        Ok(RunReport {
            readme,
            metadata,
            backup,
            total_files: summary.total_files,
            total_lines: summary.total_lines,
            technologies: summary.technologies().len(),
            skipped: summary.skipped,
        })
    }
}

/// Relative output paths land next to the scanned project
pub fn resolve_output(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Layer project details: detection, then `readme_info.json`, then the
/// `[project]` table of the config file
pub fn collect_info(root: &Path, summary: &ProjectSummary, config: &Config) -> Result<ProjectInfo> {
    let mut info = info::detect(root, &summary.manifests);
    if let Some(saved) = ProjectInfo::load_from_root(root)? {
        info.overlay(saved);
    }
    info.overlay(config.project.clone());
    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::fs;
    use tempfile::TempDir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_resolve_output() {
        let root = Path::new("/work/project");
        assert_eq!(
            resolve_output(root, Path::new("README.md")),
            PathBuf::from("/work/project/README.md")
        );
        assert_eq!(
            resolve_output(root, Path::new("/tmp/out.md")),
            PathBuf::from("/tmp/out.md")
        );
    }

    #[test]
    fn test_collect_info_layering() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(
            root.join("Cargo.toml"),
            "[package]\nname = \"x\"\ndescription = \"From cargo\"\nlicense = \"MIT\"\n",
        )
        .unwrap();
        fs::write(
            root.join(INFO_FILE_NAME),
            r#"{"description": "From info file", "author_name": "Info Author"}"#,
        )
        .unwrap();

        let mut config = Config::default();
        config.project.author_name = Some("Config Author".to_string());

        let summary = Analyzer::new(&config).unwrap().analyze(root).unwrap();
        let info = collect_info(root, &summary, &config).unwrap();

        assert_eq!(info.description.as_deref(), Some("From info file"));
        assert_eq!(info.author_name.as_deref(), Some("Config Author"));
        assert_eq!(info.license.as_deref(), Some("MIT"));
    }

    #[test]
    fn test_run_writes_readme_and_metadata() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("main.py"), "print('hi')\n").unwrap();

        let report = Pipeline::new(Config::default()).with_date(date()).run(root).unwrap();

        assert_eq!(report.readme, root.join("README.md"));
        assert_eq!(report.metadata, Some(root.join("readme_metadata.json")));
        assert_eq!(report.total_files, 1);
        assert!(report.readme.is_file());
        assert!(root.join("readme_metadata.json").is_file());
        assert_eq!(report.summary(), "README generated: 1 files, 1 lines, 1 technologies");
    }

    #[test]
    fn test_rerun_ignores_own_outputs() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("main.py"), "print('hi')\n").unwrap();

        let pipeline = Pipeline::new(Config::default()).with_date(date());
        pipeline.run(root).unwrap();
        let first = fs::read_to_string(root.join("README.md")).unwrap();
        let report = pipeline.run(root).unwrap();
        let second = fs::read_to_string(root.join("README.md")).unwrap();

        assert_eq!(report.total_files, 1);
        assert_eq!(first, second);
    }

    #[test]
    fn test_run_with_backup() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("README.md"), "handwritten\n").unwrap();

        let mut config = Config::default();
        config.output.backup = true;
        config.output.write_metadata = false;
        let report = Pipeline::new(config).run(root).unwrap();

        let backup = report.backup.unwrap();
        assert_eq!(fs::read_to_string(backup).unwrap(), "handwritten\n");
        assert!(report.metadata.is_none());
        assert!(!root.join("readme_metadata.json").exists());
    }

    #[test]
    fn test_missing_root_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("missing");

        let err = Pipeline::new(Config::default()).run(&root).unwrap_err();
        assert!(matches!(err, Error::RootNotFound(_)));
        assert!(!root.join("README.md").exists());
        assert!(!root.exists());
    }

    #[test]
    fn test_name_from_info_file() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join(INFO_FILE_NAME), r#"{"name": "Fancy"}"#).unwrap();

        let prepared = Pipeline::new(Config::default()).prepare(root).unwrap();
        assert_eq!(prepared.summary.project_name, "Fancy");
        assert!(prepared.document.preamble.starts_with("# Fancy"));
        assert_eq!(prepared.summary.total_files, 0);
    }
}
