//! Project details that are not statistics: description, author,
//! license, run command and so on.
//!
//! Values are detected from files in the project root and can be
//! overridden by `readme_info.json` and then by the `[project]` section of
//! `readmegen.toml`.

use crate::analysis::manifests::ManifestReport;
use crate::error::{Error, Result};
use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// File the `info` command writes and `generate` reads back
pub const INFO_FILE_NAME: &str = "readme_info.json";

/// Descriptive project details, every field optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    pub run_command: Option<String>,
    pub additional_usage: Option<String>,
    pub install_notes: Option<String>,
    pub author_name: Option<String>,
    pub github_username: Option<String>,
    pub email: Option<String>,
    pub repo_name: Option<String>,
    pub license: Option<String>,
    pub acknowledgments: Option<String>,
    /// Root-relative image shown under "Screenshots"
    pub screenshot: Option<String>,
}

impl ProjectInfo {
    /// Replace fields with the ones set in `other`
    pub fn overlay(&mut self, other: ProjectInfo) {
        let other = other.normalized();
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() { self.$field = other.$field; })*
            };
        }
        take!(
            name,
            description,
            run_command,
            additional_usage,
            install_notes,
            author_name,
            github_username,
            email,
            repo_name,
            license,
            acknowledgments,
            screenshot
        );
        if !other.features.is_empty() {
            self.features = other.features;
        }
    }

    /// Treat blank strings as unset
    pub fn normalized(mut self) -> Self {
        for field in [
            &mut self.name,
            &mut self.description,
            &mut self.run_command,
            &mut self.additional_usage,
            &mut self.install_notes,
            &mut self.author_name,
            &mut self.github_username,
            &mut self.email,
            &mut self.repo_name,
            &mut self.license,
            &mut self.acknowledgments,
            &mut self.screenshot,
        ] {
            if field.as_deref().map_or(false, |s| s.trim().is_empty()) {
                *field = None;
            }
        }
        self.features.retain(|f| !f.trim().is_empty());
        self
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| Error::read(path, e))?;
        let info: ProjectInfo = serde_json::from_str(&contents)?;
        Ok(info.normalized())
    }

    /// Load `readme_info.json` from the root if it exists.
    ///
    /// A file that cannot be read or parsed is logged and skipped, so a bad
    /// hand edit falls back to detected details.
    pub fn load_from_root(root: &Path) -> Result<Option<Self>> {
        let path = root.join(INFO_FILE_NAME);
        if !path.is_file() {
            return Ok(None);
        }

        debug!("Loading {}", path.display());
        match Self::load(&path) {
            Ok(info) => Ok(Some(info)),
            Err(e) => {
                warn!("Ignoring {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }
}

/// Detect project details from the files in `root`
pub fn detect(root: &Path, manifests: &ManifestReport) -> ProjectInfo {
    let mut info = ProjectInfo::default();

    let git = read_optional(&root.join(".git").join("config"))
        .map(|c| GitConfig::parse(&c))
        .unwrap_or_default();
    let cargo: Option<toml::Value> =
        read_optional(&root.join("Cargo.toml")).and_then(|c| toml::from_str(&c).ok());
    let package = read_optional(&root.join("package.json"))
        .and_then(|c| serde_json::from_str::<serde_json::Value>(&c).ok());
    let setup_py = read_optional(&root.join("setup.py"));

    info.description = cargo
        .as_ref()
        .and_then(|c| str_at(c, &["package", "description"]))
        .or_else(|| json_str(package.as_ref(), "description"))
        .or_else(|| setup_py.as_deref().and_then(|s| setup_field(s, "description")))
        .or_else(|| pyproject_description(root))
        .or_else(|| readme_description(root));

    info.author_name = git
        .user_name
        .clone()
        .or_else(|| {
            cargo
                .as_ref()
                .and_then(|c| c.get("package")?.get("authors")?.get(0)?.as_str().map(strip_email))
        })
        .or_else(|| package_author(package.as_ref()).0)
        .or_else(|| setup_py.as_deref().and_then(|s| setup_field(s, "author")));

    info.email = git
        .user_email
        .clone()
        .or_else(|| package_author(package.as_ref()).1)
        .or_else(|| setup_py.as_deref().and_then(|s| setup_field(s, "author_email")));

    let repository = cargo
        .as_ref()
        .and_then(|c| str_at(c, &["package", "repository"]))
        .into_iter()
        .chain(git.remote_urls.iter().cloned());
    for url in repository {
        if let Some((user, repo)) = parse_github_url(&url) {
            info.github_username = Some(user);
            info.repo_name = Some(repo);
            break;
        }
    }

    info.license = detect_license(root)
        .or_else(|| cargo.as_ref().and_then(|c| str_at(c, &["package", "license"])))
        .or_else(|| json_str(package.as_ref(), "license"));

    info.run_command = detect_run_command(root, manifests);
    info.additional_usage = detect_usage(manifests);
    info.install_notes = join_nonempty(detect_install_notes(root), " | ");
    info.acknowledgments = join_nonempty(detect_acknowledgments(manifests), " • ");
    info.screenshot = detect_screenshot(root);

    info.normalized()
}

/// The subset of `.git/config` used for author and remote detection
#[derive(Debug, Default, PartialEq, Eq)]
pub struct GitConfig {
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub remote_urls: Vec<String>,
}

impl GitConfig {
    pub fn parse(content: &str) -> Self {
        let mut config = GitConfig::default();
        let mut section = String::new();

        for line in content.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if line.starts_with('[') && line.ends_with(']') {
                section = line[1..line.len() - 1].trim().to_lowercase();
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim().trim_matches('"').to_string();

            match (section.as_str(), key.as_str()) {
                ("user", "name") => config.user_name = Some(value),
                ("user", "email") => config.user_email = Some(value),
                (s, "url") if s.starts_with("remote") => config.remote_urls.push(value),
                _ => {}
            }
        }

        config
    }
}

/// Owner and repository name from a GitHub URL (https or ssh)
pub fn parse_github_url(url: &str) -> Option<(String, String)> {
    let re = Regex::new(r"github\.com[:/]([^/\s]+)/([^/\s]+?)(?:\.git)?/?$").expect("static regex");
    let caps = re.captures(url.trim())?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

/// License identifier from a `LICENSE` file in the root
pub fn detect_license(root: &Path) -> Option<String> {
    const FILES: &[&str] = &["LICENSE", "LICENSE.txt", "LICENSE.md", "license", "license.txt"];

    for name in FILES {
        let Some(text) = read_optional(&root.join(name)) else {
            continue;
        };
        let head: String = text.lines().take(20).collect::<Vec<_>>().join("\n").to_lowercase();

        let license = if head.contains("mit license") {
            Some("MIT")
        } else if head.contains("apache") && head.contains("2.0") {
            Some("Apache-2.0")
        } else if head.contains("gnu general public license") {
            if head.contains("version 3") {
                Some("GPL-3.0")
            } else if head.contains("version 2") {
                Some("GPL-2.0")
            } else {
                None
            }
        } else if head.contains("bsd") {
            Some("BSD-3-Clause")
        } else {
            None
        };

        if let Some(license) = license {
            return Some(license.to_string());
        }
    }

    None
}

fn detect_run_command(root: &Path, manifests: &ManifestReport) -> Option<String> {
    if manifests.has("Cargo.toml") {
        return Some("cargo run --release".to_string());
    }

    if manifests.scripts.contains_key("start") {
        return Some("npm start".to_string());
    }
    if manifests.scripts.contains_key("dev") {
        return Some("npm run dev".to_string());
    }

    for main in ["main.py", "app.py", "run.py", "__main__.py", "manage.py"] {
        if root.join(main).is_file() {
            return Some(if main == "manage.py" {
                "python manage.py runserver".to_string()
            } else {
                format!("python {}", main)
            });
        }
    }

    if manifests.has("go.mod") {
        return Some("go run .".to_string());
    }

    None
}

fn detect_usage(manifests: &ManifestReport) -> Option<String> {
    let cli = ["clap", "argparse", "click", "typer", "commander", "yargs", "cobra"];
    if cli.iter().any(|c| manifests.depends_on(c)) {
        Some("Run with `--help` to see all available options.".to_string())
    } else {
        None
    }
}

fn detect_install_notes(root: &Path) -> Vec<String> {
    let mut notes = Vec::new();
    if root.join("Dockerfile").is_file() {
        notes.push("Docker available for containerized deployment".to_string());
    }
    if root.join(".env.example").is_file() {
        notes.push("Copy .env.example to .env and configure environment variables".to_string());
    }
    notes
}

/// First png or jpg in a conventional image directory
fn detect_screenshot(root: &Path) -> Option<String> {
    const DIRS: &[&str] = &["screenshots", "images", "docs/images", "assets/images"];

    for dir in DIRS {
        let Ok(entries) = fs::read_dir(root.join(dir)) else {
            continue;
        };
        let mut images: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| {
                let lower = name.to_lowercase();
                lower.ends_with(".png") || lower.ends_with(".jpg")
            })
            .collect();
        images.sort();
        if let Some(first) = images.into_iter().next() {
            return Some(format!("{}/{}", dir, first));
        }
    }

    None
}

fn detect_acknowledgments(manifests: &ManifestReport) -> Vec<String> {
    const FRAMEWORKS: &[(&str, &str)] = &[
        ("django", "Built with Django"),
        ("flask", "Built with Flask"),
        ("fastapi", "Built with FastAPI"),
        ("numpy", "Built with NumPy"),
        ("pandas", "Built with Pandas"),
        ("tensorflow", "Built with TensorFlow"),
        ("torch", "Built with PyTorch"),
        ("scikit-learn", "Built with Scikit-learn"),
        ("react", "Built with React"),
        ("vue", "Built with Vue.js"),
        ("express", "Powered by Express.js"),
        ("tokio", "Powered by Tokio"),
        ("axum", "Built with Axum"),
        ("actix-web", "Built with Actix Web"),
    ];

    let deps: Vec<String> = manifests
        .dependencies
        .values()
        .flatten()
        .map(|d| d.to_lowercase())
        .collect();

    FRAMEWORKS
        .iter()
        .filter(|(name, _)| deps.iter().any(|d| d == name))
        .map(|(_, ack)| ack.to_string())
        .collect()
}

fn readme_description(root: &Path) -> Option<String> {
    let text = ["README.md", "README.txt", "readme.md"]
        .iter()
        .find_map(|name| read_optional(&root.join(name)))?;

    text.lines()
        .take(20)
        .map(str::trim)
        .take_while(|l| !l.starts_with("## "))
        .find(|l| {
            !l.is_empty()
                && !l.starts_with('#')
                && !l.starts_with('-')
                && !l.starts_with('[')
                && !l.starts_with('!')
                && !l.starts_with('<')
                && !l.starts_with("---")
        })
        .map(|l| l.trim_start_matches('>').trim().chars().take(200).collect())
}

fn pyproject_description(root: &Path) -> Option<String> {
    let text = read_optional(&root.join("pyproject.toml"))?;
    let value: toml::Value = toml::from_str(&text).ok()?;
    str_at(&value, &["project", "description"])
        .or_else(|| str_at(&value, &["tool", "poetry", "description"]))
}

fn setup_field(content: &str, field: &str) -> Option<String> {
    let re = Regex::new(&format!(r#"\b{}\s*=\s*["']([^"']+)["']"#, regex::escape(field))).ok()?;
    re.captures(content).map(|c| c[1].to_string())
}

fn package_author(package: Option<&serde_json::Value>) -> (Option<String>, Option<String>) {
    match package.and_then(|p| p.get("author")) {
        Some(serde_json::Value::String(s)) => {
            let email = s
                .split_once('<')
                .and_then(|(_, rest)| rest.split_once('>'))
                .map(|(e, _)| e.to_string());
            (Some(strip_email(s)), email)
        }
        Some(serde_json::Value::Object(obj)) => (
            obj.get("name").and_then(|v| v.as_str()).map(str::to_string),
            obj.get("email").and_then(|v| v.as_str()).map(str::to_string),
        ),
        _ => (None, None),
    }
}

fn strip_email(author: &str) -> String {
    author.split('<').next().unwrap_or(author).trim().to_string()
}

fn str_at(value: &toml::Value, path: &[&str]) -> Option<String> {
    let mut current = value;
    for key in path {
        current = current.get(key)?;
    }
    current.as_str().map(str::to_string)
}

fn json_str(value: Option<&serde_json::Value>, key: &str) -> Option<String> {
    value?.get(key)?.as_str().map(str::to_string)
}

fn join_nonempty(items: Vec<String>, sep: &str) -> Option<String> {
    if items.is_empty() {
        None
    } else {
        Some(items.join(sep))
    }
}

fn read_optional(path: &Path) -> Option<String> {
    if !path.is_file() {
        return None;
    }
    match fs::read(path) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            debug!("Could not read {}: {}", path.display(), e);
            None
        }
    }
}
