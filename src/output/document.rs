// README document model and renderer

use crate::analysis::ProjectSummary;
use crate::error::Result;
use crate::info::ProjectInfo;
use crate::output::context::{ReadmeContext, TocEntry};
use crate::output::templates::{slugify, TemplateEngine, FOOTER_TEMPLATE, HEADER_TEMPLATE};
use tera::Context;

/// A section of the fixed README layout
pub struct SectionTemplate {
    pub title: &'static str,
    /// Name the template is registered under
    pub template: &'static str,
    pub source: &'static str,
    /// Whether the section appears for a given context
    pub condition: fn(&ReadmeContext) -> bool,
}

fn always(_: &ReadmeContext) -> bool {
    true
}

fn has_dependencies(ctx: &ReadmeContext) -> bool {
    !ctx.dependencies.is_empty()
}

fn has_tests(ctx: &ReadmeContext) -> bool {
    ctx.test_files > 0
}

fn has_code_samples(ctx: &ReadmeContext) -> bool {
    !ctx.code_samples.is_empty()
}

fn has_acknowledgments(ctx: &ReadmeContext) -> bool {
    ctx.acknowledgments.is_some()
}

macro_rules! section {
    ($title:expr, $name:literal, $condition:expr) => {
        SectionTemplate {
            title: $title,
            template: concat!("sections/", $name, ".md"),
            source: include_str!(concat!("../../templates/sections/", $name, ".md.tera")),
            condition: $condition,
        }
    };
}

/// Section order of every generated README
pub const SECTIONS: &[SectionTemplate] = &[
    section!("Overview", "overview", always),
    section!("Features", "features", always),
    section!("Technologies Used", "technologies", always),
    section!("Installation", "installation", always),
    section!("Usage", "usage", always),
    section!("Project Structure", "structure", always),
    section!("Code Examples", "code_examples", has_code_samples),
    section!("Dependencies", "dependencies", has_dependencies),
    section!("Testing", "testing", has_tests),
    section!("Contributing", "contributing", always),
    section!("License", "license", always),
    section!("Contact", "contact", always),
    section!("Acknowledgments", "acknowledgments", has_acknowledgments),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub anchor: String,
    pub body: String,
}

/// A rendered README
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub title: String,
    /// Title line, badges, description and table of contents
    pub preamble: String,
    pub sections: Vec<Section>,
    pub footer: String,
}

impl Document {
    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }

    pub fn titles(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.title.as_str()).collect()
    }

    /// Serialize to Markdown, ending with exactly one newline
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.preamble);
        out.push_str("\n\n");
        for section in &self.sections {
            out.push_str("## ");
            out.push_str(&section.title);
            out.push_str("\n\n");
            if !section.body.is_empty() {
                out.push_str(&section.body);
                out.push_str("\n\n");
            }
        }
        out.push_str(&self.footer);
        out.push('\n');
        out
    }
}

/// Renders a `Document` from a summary and project info
pub struct Renderer {
    engine: TemplateEngine,
}

impl Renderer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            engine: TemplateEngine::new()?,
        })
    }

    /// Render the README. Output depends only on the inputs.
    pub fn render(&self, summary: &ProjectSummary, info: &ProjectInfo) -> Result<Document> {
        let mut ctx = ReadmeContext::build(summary, info);

        let present: Vec<&SectionTemplate> =
            SECTIONS.iter().filter(|s| (s.condition)(&ctx)).collect();
        ctx.toc = present
            .iter()
            .map(|s| TocEntry {
                title: s.title.to_string(),
                anchor: slugify(s.title),
            })
            .collect();

        let context = Context::from_serialize(&ctx)?;

        let mut sections = Vec::with_capacity(present.len());
        for template in present {
            let body = self.engine.render(template.template, &context)?;
            sections.push(Section {
                title: template.title.to_string(),
                anchor: slugify(template.title),
                body: tidy(&body),
            });
        }

        Ok(Document {
            title: ctx.project_name.clone(),
            preamble: tidy(&self.engine.render(HEADER_TEMPLATE, &context)?),
            sections,
            footer: tidy(&self.engine.render(FOOTER_TEMPLATE, &context)?),
        })
    }

}

/// Trim and collapse blank-line runs to one, leaving fenced code untouched
fn tidy(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut in_fence = false;
    let mut previous_blank = false;

    for line in text.trim().lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
        } else if !in_fence && line.trim().is_empty() {
            if !previous_blank {
                lines.push("");
            }
            previous_blank = true;
            continue;
        }
        lines.push(line);
        previous_blank = false;
    }

    lines.join("\n")
}
