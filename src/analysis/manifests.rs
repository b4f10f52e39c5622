// Dependency manifest detection and parsing
//
// Recognises the package manifests of common ecosystems at the project
// root and pulls out dependency names and scripts for the README.

use crate::error::{Error, Result};
use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Most dependency names kept per ecosystem
pub const MAX_DEPENDENCIES: usize = 15;

/// Manifest file name to ecosystem label
const MANIFESTS: &[(&str, &str)] = &[
    ("requirements.txt", "Python"),
    ("setup.py", "Python"),
    ("pyproject.toml", "Python"),
    ("Pipfile", "Python"),
    ("environment.yml", "Conda"),
    ("package.json", "Node.js"),
    ("package-lock.json", "Node.js"),
    ("yarn.lock", "Yarn"),
    ("pnpm-lock.yaml", "pnpm"),
    ("Gemfile", "Ruby"),
    ("Gemfile.lock", "Ruby"),
    ("pom.xml", "Maven (Java)"),
    ("build.gradle", "Gradle (Java)"),
    ("Cargo.toml", "Rust"),
    ("go.mod", "Go"),
    ("go.sum", "Go"),
    ("composer.json", "PHP"),
    ("Podfile", "iOS/CocoaPods"),
    ("pubspec.yaml", "Dart/Flutter"),
];

/// A recognised manifest file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// File name, e.g. `Cargo.toml`
    pub name: String,
    pub path: PathBuf,
    pub ecosystem: String,
}

/// Dependencies and scripts pulled from the root manifests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestReport {
    pub manifests: Vec<Manifest>,
    /// Ecosystem label to dependency names
    pub dependencies: BTreeMap<String, Vec<String>>,
    /// `package.json` scripts, name to command
    pub scripts: BTreeMap<String, String>,
}

impl ManifestReport {
    /// Whether a manifest with this file name was found
    pub fn has(&self, name: &str) -> bool {
        self.manifests.iter().any(|m| m.name == name)
    }

    /// Whether any dependency name contains `needle` (case-insensitive)
    pub fn depends_on(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.dependencies
            .values()
            .flatten()
            .any(|d| d.to_lowercase().contains(&needle))
    }

    /// Derive a project type label from manifests and dependencies
    pub fn project_type(&self) -> &'static str {
        if self.has("package.json") {
            return if self.depends_on("react") {
                "React Application"
            } else if self.depends_on("vue") {
                "Vue.js Application"
            } else if self.depends_on("express") {
                "Node.js/Express Backend"
            } else if self.depends_on("next") {
                "Next.js Application"
            } else {
                "Node.js Application"
            };
        }

        if self.has("requirements.txt") || self.has("setup.py") || self.has("pyproject.toml") {
            return if self.depends_on("django") {
                "Django Application"
            } else if self.depends_on("flask") {
                "Flask Application"
            } else if self.depends_on("fastapi") {
                "FastAPI Application"
            } else {
                "Python Project"
            };
        }

        if self.has("Cargo.toml") {
            return "Rust Project";
        }
        if self.has("go.mod") {
            return "Go Project";
        }
        if self.has("pom.xml") || self.has("build.gradle") {
            return "Java Project";
        }

        "Software Project"
    }
}

/// Ecosystem label for a manifest file name
pub fn ecosystem(file_name: &str) -> Option<&'static str> {
    MANIFESTS
        .iter()
        .find(|(name, _)| *name == file_name)
        .map(|(_, eco)| *eco)
}

/// Find and parse the manifests directly inside `root`.
///
/// A manifest that fails to parse is logged and contributes no
/// dependencies; it is still listed.
pub fn inspect(root: &Path) -> Result<ManifestReport> {
    let mut report = ManifestReport::default();

    let mut entries: Vec<_> = fs::read_dir(root)?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map_or(false, |t| t.is_file()))
        .collect();
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let name = entry.file_name().to_string_lossy().to_string();
        let Some(eco) = ecosystem(&name) else {
            continue;
        };
        debug!("Found manifest {} ({})", name, eco);

        let path = entry.path();
        if let Err(e) = parse_into(&path, &name, eco, &mut report) {
            warn!("{}", e);
        }

        report.manifests.push(Manifest {
            name,
            path,
            ecosystem: eco.to_string(),
        });
    }

    Ok(report)
}

fn parse_into(path: &Path, name: &str, eco: &str, report: &mut ManifestReport) -> Result<()> {
    let read = || fs::read_to_string(path).map_err(|e| Error::read(path, e));

    let deps = match name {
        "Cargo.toml" => cargo_dependencies(&read()?).map_err(|m| Error::manifest(path, m))?,
        "package.json" => {
            let (deps, scripts) =
                package_json(&read()?).map_err(|m| Error::manifest(path, m))?;
            report.scripts.extend(scripts);
            deps
        }
        "pyproject.toml" => {
            pyproject_dependencies(&read()?).map_err(|m| Error::manifest(path, m))?
        }
        "requirements.txt" => requirements(&read()?),
        "go.mod" => go_mod(&read()?),
        "Gemfile" => gemfile(&read()?),
        _ => return Ok(()),
    };

    if deps.is_empty() {
        return Ok(());
    }

    let list = report.dependencies.entry(eco.to_string()).or_default();
    for dep in deps {
        if list.len() >= MAX_DEPENDENCIES {
            break;
        }
        if !list.contains(&dep) {
            list.push(dep);
        }
    }
    Ok(())
}

/// Dependency names from a `Cargo.toml`
pub fn cargo_dependencies(content: &str) -> std::result::Result<Vec<String>, String> {
    let value: toml::Value = toml::from_str(content).map_err(|e| e.to_string())?;
    let mut deps = Vec::new();

    let tables = [
        value.get("dependencies"),
        value.get("dev-dependencies"),
        value.get("build-dependencies"),
        value.get("workspace").and_then(|w| w.get("dependencies")),
    ];
    for table in tables.into_iter().flatten().filter_map(|t| t.as_table()) {
        deps.extend(table.keys().cloned());
    }

    Ok(deps)
}

/// Dependency names and scripts from a `package.json`
pub fn package_json(
    content: &str,
) -> std::result::Result<(Vec<String>, BTreeMap<String, String>), String> {
    let value: serde_json::Value = serde_json::from_str(content).map_err(|e| e.to_string())?;

    let mut deps = Vec::new();
    for key in ["dependencies", "devDependencies"] {
        if let Some(obj) = value.get(key).and_then(|v| v.as_object()) {
            deps.extend(obj.keys().cloned());
        }
    }

    let scripts = value
        .get("scripts")
        .and_then(|v| v.as_object())
        .map(|obj| {
            obj.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default();

    Ok((deps, scripts))
}

/// Dependency names from a `pyproject.toml` (PEP 621 or Poetry)
pub fn pyproject_dependencies(content: &str) -> std::result::Result<Vec<String>, String> {
    let value: toml::Value = toml::from_str(content).map_err(|e| e.to_string())?;
    let mut deps = Vec::new();

    if let Some(list) = value
        .get("project")
        .and_then(|p| p.get("dependencies"))
        .and_then(|d| d.as_array())
    {
        deps.extend(list.iter().filter_map(|v| v.as_str()).filter_map(requirement_name));
    }

    if let Some(table) = value
        .get("tool")
        .and_then(|t| t.get("poetry"))
        .and_then(|p| p.get("dependencies"))
        .and_then(|d| d.as_table())
    {
        deps.extend(table.keys().filter(|k| *k != "python").cloned());
    }

    Ok(deps)
}

/// Package names from a `requirements.txt`
pub fn requirements(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with('-'))
        .filter_map(requirement_name)
        .collect()
}

/// Module paths from the `require` directives of a `go.mod`
pub fn go_mod(content: &str) -> Vec<String> {
    let mut deps = Vec::new();
    let mut in_block = false;

    for line in content.lines().map(str::trim) {
        if in_block {
            if line.starts_with(')') {
                in_block = false;
            } else if let Some(module) = line.split_whitespace().next() {
                if !module.starts_with("//") {
                    deps.push(module.to_string());
                }
            }
        } else if line.starts_with("require (") || line == "require(" {
            in_block = true;
        } else if let Some(rest) = line.strip_prefix("require ") {
            if let Some(module) = rest.split_whitespace().next() {
                deps.push(module.to_string());
            }
        }
    }

    deps
}

/// Gem names from a `Gemfile`
pub fn gemfile(content: &str) -> Vec<String> {
    let re = Regex::new(r#"(?m)^\s*gem\s+["']([^"']+)["']"#).expect("static regex");
    re.captures_iter(content)
        .map(|c| c[1].to_string())
        .collect()
}

/// Name part of a PEP 508 requirement such as `requests>=2.0; python_version>"3"`
fn requirement_name(spec: &str) -> Option<String> {
    let end = spec
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'))
        .unwrap_or(spec.len());
    let name = spec[..end].trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
