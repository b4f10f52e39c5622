// Extension to technology classification

use std::path::Path;

/// Label for extensions missing from the table
pub const OTHER: &str = "Other";

/// Extension (lowercase, no dot) to technology label
const TECHNOLOGIES: &[(&str, &str)] = &[
    ("py", "Python"),
    ("js", "JavaScript"),
    ("mjs", "JavaScript"),
    ("cjs", "JavaScript"),
    ("ts", "TypeScript"),
    ("jsx", "React (JSX)"),
    ("tsx", "React (TypeScript)"),
    ("java", "Java"),
    ("cpp", "C++"),
    ("cc", "C++"),
    ("cxx", "C++"),
    ("hpp", "C++"),
    ("c", "C"),
    ("h", "C/C++ Header"),
    ("cs", "C#"),
    ("php", "PHP"),
    ("rb", "Ruby"),
    ("go", "Go"),
    ("rs", "Rust"),
    ("swift", "Swift"),
    ("kt", "Kotlin"),
    ("scala", "Scala"),
    ("r", "R"),
    ("m", "MATLAB/Objective-C"),
    ("lua", "Lua"),
    ("pl", "Perl"),
    ("sh", "Shell Script"),
    ("bash", "Bash"),
    ("html", "HTML"),
    ("htm", "HTML"),
    ("css", "CSS"),
    ("scss", "SCSS"),
    ("sass", "Sass"),
    ("less", "Less"),
    ("sql", "SQL"),
    ("vue", "Vue.js"),
    ("svelte", "Svelte"),
    ("dart", "Dart"),
    ("xml", "XML"),
    ("json", "JSON"),
    ("yaml", "YAML"),
    ("yml", "YAML"),
    ("toml", "TOML"),
    ("md", "Markdown"),
    ("tex", "LaTeX"),
];

/// Map a file extension to its technology label.
///
/// Accepts the extension with or without a leading dot and ignores case.
/// Anything not in the table is [`OTHER`].
pub fn classify(extension: &str) -> &'static str {
    let ext = extension.trim_start_matches('.');
    TECHNOLOGIES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(ext))
        .map_or(OTHER, |(_, label)| *label)
}

/// Lowercased extension of a path, empty when it has none
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Classify a path by its extension
pub fn classify_path(path: &Path) -> &'static str {
    classify(&extension_of(path))
}
