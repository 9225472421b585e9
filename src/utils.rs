/*!
 * Utility functions for ctxtools
 */

use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::Hash;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

/// Replace every occurrence of a literal substring.
///
/// The needle is never interpreted as a pattern. An empty needle leaves the
/// haystack unchanged.
pub fn replace_all_literal(haystack: &str, needle: &str, replacement: &str) -> String {
    if needle.is_empty() {
        return haystack.to_string();
    }
    haystack.replace(needle, replacement)
}

/// Render a path with forward slashes regardless of platform
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapse whitespace runs into single spaces and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}

/// Remove duplicates, keeping the first occurrence of each item
pub fn unique<T: Clone + Eq + Hash>(items: &[T]) -> Vec<T> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .iter()
        .filter(|item| seen.insert(*item))
        .cloned()
        .collect()
}

/// Case-aware ordering close to a locale collation.
///
/// Names compare case-insensitively first; on a tie lowercase sorts before
/// uppercase so the result never depends on input order.
///
/// Punctuation compares by code point, unlike ICU collation which ignores it
/// at the first level: `test.rs` sorts before `test_utils.rs` here.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| {
            a.chars()
                .zip(b.chars())
                .find(|(x, y)| x != y)
                .map_or(Ordering::Equal, |(x, y)| {
                    match (x.is_lowercase(), y.is_lowercase()) {
                        (true, false) => Ordering::Less,
                        (false, true) => Ordering::Greater,
                        _ => x.cmp(&y),
                    }
                })
        })
        .then_with(|| a.len().cmp(&b.len()))
}

/// Folder names left out of project trees by default
pub static DEFAULT_EXCLUDE_FOLDERS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        // Version Control
        ".git",
        ".svn",
        ".hg",
        // Dependencies
        "node_modules",
        "bower_components",
        ".pnpm-store",
        ".yarn",
        // Build & Dist
        "dist",
        "out",
        "build",
        "target",
        // Python
        "__pycache__",
        ".pytest_cache",
        ".venv",
        "venv",
        // JavaScript/TypeScript
        ".next",
        ".nuxt",
        "coverage",
        // Caches
        ".cache",
        ".gradle",
    ]
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_all_literal() {
        assert_eq!(replace_all_literal("${a}-${a}", "${a}", "x"), "x-x");
        // regex metacharacters are plain text
        assert_eq!(replace_all_literal("a.b.c", ".", "/"), "a/b/c");
        assert_eq!(replace_all_literal("abc", "", "z"), "abc");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  expected `;`\n\t found  `}` "), "expected `;` found `}`");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_unique_keeps_first_seen_order() {
        assert_eq!(unique(&["b", "a", "b", "c", "a"]), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_locale_cmp() {
        let mut names = vec!["beta", "Alpha", "alpha", "Beta", "_x", "gamma"];
        names.sort_by(|a, b| locale_cmp(a, b));
        assert_eq!(names, vec!["_x", "alpha", "Alpha", "beta", "Beta", "gamma"]);

        let mut files = vec!["test_utils.rs", "test.rs", "test-data.rs"];
        files.sort_by(|a, b| locale_cmp(a, b));
        assert_eq!(files, vec!["test-data.rs", "test.rs", "test_utils.rs"]);
    }

    #[test]
    fn test_to_slash() {
        assert_eq!(to_slash(Path::new("src/lib.rs")), "src/lib.rs");
        assert_eq!(to_slash(Path::new("src\\lib.rs")), "src/lib.rs");
    }
}
