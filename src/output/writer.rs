// Persisting the README and its metadata

use crate::analysis::ProjectSummary;
use crate::error::{Error, Result};
use crate::output::document::Document;
use chrono::{Local, NaiveDate};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Machine-readable companion to the README
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub project_name: String,
    pub project_type: String,
    pub total_files: usize,
    pub total_lines: usize,
    /// Label to file count
    pub technologies: BTreeMap<String, usize>,
    /// Label to line count
    pub technology_lines: BTreeMap<String, usize>,
    #[serde(with = "iso_date")]
    pub generated_date: NaiveDate,
}

impl From<&ProjectSummary> for Metadata {
    fn from(summary: &ProjectSummary) -> Self {
        Self {
            project_name: summary.project_name.clone(),
            project_type: summary.project_type.clone(),
            total_files: summary.total_files,
            total_lines: summary.total_lines,
            technologies: summary
                .tallies
                .iter()
                .map(|(label, t)| (label.to_string(), t.files))
                .collect(),
            technology_lines: summary
                .tallies
                .iter()
                .map(|(label, t)| (label.to_string(), t.lines))
                .collect(),
            generated_date: summary.generated_date,
        }
    }
}

mod iso_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let s = String::deserialize(d)?;
        NaiveDate::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Write `contents` to `path`, replacing any existing file.
///
/// The bytes go to a temporary file in the same directory first and are
/// renamed over the target once complete, so the target is either the old
/// file or the whole new one.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::write(path, e))?;
    tmp.write_all(contents).map_err(|e| Error::write(path, e))?;
    tmp.as_file().sync_all().map_err(|e| Error::write(path, e))?;

    let permissions = match fs::metadata(path) {
        Ok(meta) => Some(meta.permissions()),
        Err(_) => default_permissions(),
    };
    if let Some(permissions) = permissions {
        fs::set_permissions(tmp.path(), permissions).map_err(|e| Error::write(path, e))?;
    }

    tmp.persist(path).map_err(|e| Error::write(path, e.error))?;
    debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}

/// Path an existing README is copied to by [`backup_existing`]
pub fn backup_path(path: &Path, stamp: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "README".to_string());
    let name = match path.extension() {
        Some(ext) => format!("{}.backup.{}.{}", stem, stamp, ext.to_string_lossy()),
        None => format!("{}.backup.{}", stem, stamp),
    };
    path.with_file_name(name)
}

/// Copy an existing file aside. The original stays in place until the new
/// contents are persisted over it. Returns the backup location, or `None`
/// when there was nothing to back up.
pub fn backup_existing(path: &Path) -> Result<Option<PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }
    let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup = backup_path(path, &stamp);
    fs::copy(path, &backup).map_err(|e| Error::write(&backup, e))?;
    info!("Backed up {} to {}", path.display(), backup.display());
    Ok(Some(backup))
}

/// Write the README
pub fn write_document(document: &Document, path: &Path) -> Result<()> {
    write_atomic(path, document.to_markdown().as_bytes())?;
    info!("README written to {}", path.display());
    Ok(())
}

/// Write the metadata JSON, pretty-printed
pub fn write_metadata(summary: &ProjectSummary, path: &Path) -> Result<()> {
    let mut json = serde_json::to_string_pretty(&Metadata::from(summary))?;
    json.push('\n');
    write_atomic(path, json.as_bytes())?;
    info!("Metadata written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{ManifestReport, TechnologyTally};
    use crate::output::document::Section;
    use tempfile::TempDir;

    fn summary() -> ProjectSummary {
        let mut tallies = TechnologyTally::new();
        tallies.record("Python", 3);
        tallies.record("Python", 4);
        tallies.record("Markdown", 10);
        ProjectSummary {
            project_name: "demo".to_string(),
            project_type: "Python Project".to_string(),
            generated_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            total_files: 3,
            total_lines: 17,
            tallies,
            test_files: 0,
            doc_files: Vec::new(),
            skipped: 0,
            manifests: ManifestReport::default(),
            structure: Vec::new(),
            config_files: Vec::new(),
            code_samples: Vec::new(),
        }
    }

    fn document() -> Document {
        Document {
            title: "demo".to_string(),
            preamble: "# demo".to_string(),
            sections: vec![Section {
                title: "Overview".to_string(),
                anchor: "overview".to_string(),
                body: "Hello".to_string(),
            }],
            footer: "---".to_string(),
        }
    }

    #[test]
    fn test_write_atomic_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("README.md");
        fs::write(&path, "old contents that are longer").unwrap();

        write_atomic(&path, b"new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");

        let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing/README.md");

        let err = write_atomic(&path, b"x").unwrap_err();
        assert!(matches!(err, Error::Write { .. }));
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_new_file_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("README.md");

        write_atomic(&path, b"x").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn test_write_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("README.md");

        write_document(&document(), &path).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "# demo\n\n## Overview\n\nHello\n\n---\n"
        );
    }

    #[test]
    fn test_backup_path() {
        let path = Path::new("/p/README.md");
        assert_eq!(
            backup_path(path, "20240301_101500"),
            PathBuf::from("/p/README.backup.20240301_101500.md")
        );
    }

    #[test]
    fn test_backup_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("README.md");
        assert_eq!(backup_existing(&path).unwrap(), None);

        fs::write(&path, "old").unwrap();
        let backup = backup_existing(&path).unwrap().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
        assert_eq!(fs::read_to_string(&backup).unwrap(), "old");
        let name = backup.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("README.backup."));
        assert!(name.ends_with(".md"));
    }

    #[test]
    fn test_metadata_json_shape() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("readme_metadata.json");

        write_metadata(&summary(), &path).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(value["projectName"], "demo");
        assert_eq!(value["projectType"], "Python Project");
        assert_eq!(value["totalFiles"], 3);
        assert_eq!(value["totalLines"], 17);
        assert_eq!(value["technologies"]["Python"], 2);
        assert_eq!(value["technologyLines"]["Python"], 7);
        assert_eq!(value["technologies"]["Markdown"], 1);
        assert_eq!(value["generatedDate"], "2024-03-01");
    }

    #[test]
    fn test_metadata_reads_back() {
        let json = serde_json::to_string(&Metadata::from(&summary())).unwrap();
        let parsed: Metadata = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Metadata::from(&summary()));
    }
}
