// Values substituted into the README templates
//
// Every placeholder is resolved here, so templates never see a missing
// value: anything the scan or the project info cannot supply gets a fixed
// default string.

use crate::analysis::{CodeSample, ProjectSummary};
use crate::info::ProjectInfo;
use serde::Serialize;

pub const DEFAULT_DESCRIPTION: &str = "Describe what your project does in a sentence or two.";
pub const DEFAULT_FEATURES: &[&str] = &[
    "Feature 1: Describe your main feature",
    "Feature 2: Another key feature",
    "Feature 3: Additional functionality",
];
pub const DEFAULT_TECHNOLOGIES: &str = "List the languages and tools your project uses";
pub const DEFAULT_PREREQUISITES: &str = "List the tools needed to build and run the project";
pub const DEFAULT_RUN_COMMAND: &str = "# Add the command that runs your project";
pub const DEFAULT_AUTHOR: &str = "Your Name";
pub const DEFAULT_GITHUB_USERNAME: &str = "yourusername";
pub const DEFAULT_LICENSE: &str = "MIT";

/// Most structure entries listed before summarising the rest
pub const MAX_STRUCTURE_ENTRIES: usize = 15;
/// Most dependencies listed per ecosystem
pub const MAX_LISTED_DEPENDENCIES: usize = 10;
/// Most package scripts listed
pub const MAX_SCRIPTS: usize = 5;
/// Most excerpts shown under "Code Examples"
pub const MAX_CODE_EXAMPLES: usize = 2;

const JAVASCRIPT_FAMILY: &[&str] = &["JavaScript", "TypeScript", "React (JSX)", "React (TypeScript)"];

#[derive(Debug, Clone, Serialize)]
pub struct TechnologyRow {
    pub label: String,
    pub files: usize,
    pub lines: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SetupStep {
    pub title: String,
    pub command: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Script {
    pub name: String,
    pub command: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DependencyGroup {
    pub ecosystem: String,
    pub names: Vec<String>,
    pub more: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TocEntry {
    pub title: String,
    pub anchor: String,
}

/// Flattened template context for one README
#[derive(Debug, Clone, Serialize)]
pub struct ReadmeContext {
    pub project_name: String,
    pub project_type: String,
    pub description: Option<String>,
    pub description_text: String,
    pub total_files: usize,
    pub total_lines: usize,
    pub technologies: Vec<TechnologyRow>,
    pub default_technologies: String,
    pub features: Vec<String>,
    pub prerequisites: Vec<String>,
    pub repo_url: String,
    pub repo_dir: String,
    pub setup_steps: Vec<SetupStep>,
    pub run_command: String,
    pub usage_notes: Option<String>,
    pub scripts: Vec<Script>,
    pub structure: Vec<String>,
    pub structure_more: usize,
    pub config_files: Vec<String>,
    pub code_samples: Vec<CodeSample>,
    pub dependencies: Vec<DependencyGroup>,
    pub test_files: usize,
    pub license: String,
    pub license_badge: String,
    pub python_badge: bool,
    pub javascript_badge: bool,
    pub screenshot: Option<String>,
    pub author_name: String,
    pub github_username: String,
    /// `owner/repo` when both are known
    pub github_repo: Option<String>,
    pub email: Option<String>,
    pub acknowledgments: Option<String>,
    pub generated_date: String,
    pub toc: Vec<TocEntry>,
}

impl ReadmeContext {
    /// Resolve every placeholder from the summary and project info
    pub fn build(summary: &ProjectSummary, info: &ProjectInfo) -> Self {
        let description = info.description.clone();
        let license = info
            .license
            .clone()
            .unwrap_or_else(|| DEFAULT_LICENSE.to_string());
        let github_username = info.github_username.clone();
        let repo_name = info.repo_name.clone();

        let github_repo = match (&github_username, &repo_name) {
            (Some(user), Some(repo)) => Some(format!("{}/{}", user, repo)),
            _ => None,
        };
        let repo_url = match &github_repo {
            Some(repo) => format!("https://github.com/{}.git", repo),
            None => format!(
                "https://github.com/{}/{}.git",
                github_username.as_deref().unwrap_or(DEFAULT_GITHUB_USERNAME),
                summary.project_name
            ),
        };

        let features = if info.features.is_empty() {
            DEFAULT_FEATURES.iter().map(|f| f.to_string()).collect()
        } else {
            info.features.clone()
        };

        let structure: Vec<String> = summary
            .structure
            .iter()
            .take(MAX_STRUCTURE_ENTRIES)
            .map(|e| e.to_string())
            .collect();

        Self {
            project_name: summary.project_name.clone(),
            project_type: summary.project_type.clone(),
            description_text: description
                .clone()
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            description,
            total_files: summary.total_files,
            total_lines: summary.total_lines,
            technologies: summary
                .technologies()
                .into_iter()
                .map(|(label, tally)| TechnologyRow {
                    label: label.to_string(),
                    files: tally.files,
                    lines: tally.lines,
                })
                .collect(),
            default_technologies: DEFAULT_TECHNOLOGIES.to_string(),
            features,
            prerequisites: prerequisites(summary, info),
            repo_dir: repo_name.unwrap_or_else(|| summary.project_name.clone()),
            repo_url,
            setup_steps: setup_steps(summary),
            run_command: info
                .run_command
                .clone()
                .unwrap_or_else(|| DEFAULT_RUN_COMMAND.to_string()),
            usage_notes: info.additional_usage.clone(),
            scripts: summary
                .manifests
                .scripts
                .iter()
                .take(MAX_SCRIPTS)
                .map(|(name, command)| Script {
                    name: name.clone(),
                    command: command.clone(),
                })
                .collect(),
            structure_more: summary.structure.len().saturating_sub(MAX_STRUCTURE_ENTRIES),
            structure,
            config_files: summary.config_files.clone(),
            code_samples: summary
                .code_samples
                .iter()
                .take(MAX_CODE_EXAMPLES)
                .cloned()
                .collect(),
            dependencies: summary
                .manifests
                .dependencies
                .iter()
                .map(|(eco, deps)| DependencyGroup {
                    ecosystem: eco.clone(),
                    names: deps.iter().take(MAX_LISTED_DEPENDENCIES).cloned().collect(),
                    more: deps.len().saturating_sub(MAX_LISTED_DEPENDENCIES),
                })
                .collect(),
            test_files: summary.test_files,
            license_badge: license.replace('-', "--"),
            license,
            python_badge: summary.has_technology("Python"),
            javascript_badge: JAVASCRIPT_FAMILY.iter().any(|t| summary.has_technology(t)),
            screenshot: info.screenshot.clone(),
            author_name: info
                .author_name
                .clone()
                .unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            github_username: github_username
                .unwrap_or_else(|| DEFAULT_GITHUB_USERNAME.to_string()),
            github_repo,
            email: info.email.clone(),
            acknowledgments: info.acknowledgments.clone(),
            generated_date: summary.generated_date.format("%B %d, %Y").to_string(),
            toc: Vec::new(),
        }
    }
}

fn prerequisites(summary: &ProjectSummary, info: &ProjectInfo) -> Vec<String> {
    let mut items = Vec::new();
    if summary.has_technology("Python") {
        items.push("Python 3.8 or higher".to_string());
    }
    if JAVASCRIPT_FAMILY.iter().any(|t| summary.has_technology(t)) {
        items.push("Node.js 18.x or higher".to_string());
    }
    if summary.has_technology("Rust") {
        items.push("Rust 1.70 or higher".to_string());
    }
    if summary.has_technology("Go") {
        items.push("Go 1.21 or higher".to_string());
    }
    if let Some(notes) = &info.install_notes {
        items.push(notes.clone());
    }
    if items.is_empty() {
        items.push(DEFAULT_PREREQUISITES.to_string());
    }
    items
}

fn setup_steps(summary: &ProjectSummary) -> Vec<SetupStep> {
    let manifests = &summary.manifests;
    let mut steps = Vec::new();

    if manifests.has("requirements.txt") {
        steps.push(SetupStep {
            title: "Create a virtual environment (recommended)".to_string(),
            command: "python -m venv venv\nsource venv/bin/activate  # On Windows: venv\\Scripts\\activate"
                .to_string(),
        });
        steps.push(SetupStep {
            title: "Install dependencies".to_string(),
            command: "pip install -r requirements.txt".to_string(),
        });
    }
    if manifests.has("package.json") {
        steps.push(SetupStep {
            title: "Install dependencies".to_string(),
            command: "npm install".to_string(),
        });
    }
    if manifests.has("Cargo.toml") {
        steps.push(SetupStep {
            title: "Build the project".to_string(),
            command: "cargo build --release".to_string(),
        });
    }
    if manifests.has("go.mod") {
        steps.push(SetupStep {
            title: "Download modules".to_string(),
            command: "go mod download".to_string(),
        });
    }

    steps
}
