// Template engine for generating the README

use crate::error::Result;
use crate::output::document::SECTIONS;
use std::collections::HashMap;
use tera::{Context, Tera, Value};

pub const HEADER_TEMPLATE: &str = "header.md";
pub const FOOTER_TEMPLATE: &str = "footer.md";

/// Template engine wrapping Tera with custom filters and templates
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Create a new template engine with embedded templates
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        let mut templates = vec![
            (HEADER_TEMPLATE, include_str!("../../templates/header.md.tera")),
            (FOOTER_TEMPLATE, include_str!("../../templates/footer.md.tera")),
        ];
        templates.extend(SECTIONS.iter().map(|s| (s.template, s.source)));
        tera.add_raw_templates(templates)?;

        tera.register_filter("thousands", thousands_filter);
        tera.register_filter("pluralize", pluralize);
        tera.register_filter("slugify", slugify_filter);

        Ok(Self { tera })
    }

    /// Render a template with context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// Names of every registered template
    pub fn template_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.tera.get_template_names().collect();
        names.sort_unstable();
        names
    }
}

/// Format an integer with comma thousands separators
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn thousands_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    match value.as_u64() {
        Some(n) => Ok(Value::String(thousands(n))),
        None => Err(tera::Error::msg(format!(
            "thousands expects a non-negative integer, got {}",
            value
        ))),
    }
}

/// Pluralize a word based on count
fn pluralize(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let count = value.as_u64().unwrap_or(0);
    let singular = args
        .get("singular")
        .and_then(|v| v.as_str())
        .unwrap_or("item");
    let default_plural = format!("{}s", singular);
    let plural = args
        .get("plural")
        .and_then(|v| v.as_str())
        .unwrap_or(&default_plural);

    if count == 1 {
        Ok(Value::String(format!("1 {}", singular)))
    } else {
        Ok(Value::String(format!("{} {}", thousands(count), plural)))
    }
}

fn slugify_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = value.as_str().unwrap_or("");
    Ok(Value::String(slugify(s)))
}

/// Convert a heading to its GitHub-style anchor
pub fn slugify(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
