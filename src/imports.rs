/*!
 * Line-based removal of import statements
 *
 * Detection is a heuristic over trimmed lines; no grammar is parsed.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ImportsMode;
use crate::language::LanguageFamily;

static JS_IMPORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^import\s").unwrap());
static JS_REEXPORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^export\s+(\*|\{)").unwrap());
static JS_FROM_CLAUSE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\sfrom\s+['"]"#).unwrap());
static JS_REQUIRE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(const|let|var)\s+\w+\s*=\s*require\(").unwrap());
static CSS_IMPORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^@import\s").unwrap());
static PY_IMPORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^import\s+\S+").unwrap());
static PY_FROM_IMPORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^from\s+\S+\s+import\s+").unwrap());

/// Prefixes of a leading line that must stay above the placeholder
const LEADING_DIRECTIVES: [&str; 6] = ["/*", "//", "#!", "# ", "'use ", "\"use "];

/// Result of import handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripOutcome {
    /// Resulting text
    pub text: String,
    /// Whether a placeholder line was inserted
    pub inserted_placeholder: bool,
}

/// Whether a single trimmed line is an import for the given family
pub fn is_import_line(family: LanguageFamily, trimmed: &str) -> bool {
    match family {
        LanguageFamily::JsLike => {
            JS_IMPORT.is_match(trimmed)
                || (JS_REEXPORT.is_match(trimmed) && JS_FROM_CLAUSE.is_match(trimmed))
                || JS_REQUIRE.is_match(trimmed)
        }
        LanguageFamily::CssLike => CSS_IMPORT.is_match(trimmed),
        LanguageFamily::Python => {
            PY_IMPORT.is_match(trimmed) || PY_FROM_IMPORT.is_match(trimmed)
        }
        LanguageFamily::Other => false,
    }
}

/// Remove import lines from `original` according to `mode`.
///
/// `keep` returns the text untouched. Otherwise lines are split on `\n`
/// (with an optional `\r`) and re-joined with `\n`.
pub fn strip_imports(
    original: &str,
    language_id: &str,
    mode: ImportsMode,
    placeholder_text: &str,
) -> StripOutcome {
    if mode == ImportsMode::Keep {
        return StripOutcome {
            text: original.to_string(),
            inserted_placeholder: false,
        };
    }

    let family = LanguageFamily::from_language_id(language_id);
    let mut removed_any = false;
    let mut kept: Vec<&str> = Vec::new();

    for line in original.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if is_import_line(family, line.trim()) {
            removed_any = true;
            continue;
        }
        kept.push(line);
    }

    if removed_any && mode == ImportsMode::Placeholder {
        let placeholder = family.comment(placeholder_text);
        let insert_at = match kept.first() {
            Some(first) if LEADING_DIRECTIVES.iter().any(|p| first.trim().starts_with(p)) => 1,
            _ => 0,
        };
        kept.insert(insert_at, &placeholder);
        return StripOutcome {
            text: kept.join("\n"),
            inserted_placeholder: true,
        };
    }

    StripOutcome {
        text: kept.join("\n"),
        inserted_placeholder: false,
    }
}
