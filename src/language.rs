//! Language identifiers and the families the import stripper understands

use std::path::Path;

/// Editor language identifier for a file, derived from its name
pub fn language_id_for_path(path: &Path) -> &'static str {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match file_name.as_str() {
        "dockerfile" => return "dockerfile",
        "makefile" => return "makefile",
        _ => {}
    }

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "rs" => "rust",
        "py" | "pyw" | "pyi" => "python",
        "js" | "mjs" | "cjs" => "javascript",
        "jsx" => "javascriptreact",
        "ts" | "mts" | "cts" => "typescript",
        "tsx" => "typescriptreact",
        "css" => "css",
        "scss" => "scss",
        "sass" => "sass",
        "less" => "less",
        "go" => "go",
        "java" => "java",
        "c" | "h" => "c",
        "cpp" | "cc" | "cxx" | "hpp" | "hxx" => "cpp",
        "cs" => "csharp",
        "rb" => "ruby",
        "sh" | "bash" | "zsh" => "shellscript",
        "html" | "htm" => "html",
        "md" | "markdown" => "markdown",
        "json" => "json",
        "toml" => "toml",
        "yaml" | "yml" => "yaml",
        "xml" => "xml",
        "sql" => "sql",
        _ => "plaintext",
    }
}

/// Import syntax family, derived once from a language identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageFamily {
    /// `javascript`, `typescript` and their variants
    JsLike,
    /// `css`, `less`, `scss`, `sass`
    CssLike,
    /// `python`
    Python,
    /// No import heuristics
    Other,
}

impl LanguageFamily {
    /// Classify by case-insensitive substring match, JS before CSS before Python
    pub fn from_language_id(language_id: &str) -> Self {
        let lower = language_id.to_lowercase();
        if lower.contains("javascript") || lower.contains("typescript") {
            Self::JsLike
        } else if ["css", "less", "scss", "sass"].iter().any(|k| lower.contains(k)) {
            Self::CssLike
        } else if lower.contains("python") {
            Self::Python
        } else {
            Self::Other
        }
    }

    /// Wrap text in this family's comment syntax
    pub fn comment(self, text: &str) -> String {
        match self {
            Self::Python => format!("# {}", text),
            Self::JsLike | Self::CssLike | Self::Other => format!("/* {} */", text),
        }
    }
}
