/*!
 * Diagnostics store loading and the Markdown problems report
 */

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ResultExt};
use crate::types::{Position, Resource};
use crate::utils::collapse_whitespace;

/// Diagnostic severity, ordered from most to least severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    #[serde(alias = "information")]
    Info,
    Hint,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Error => "Error",
            Self::Warning => "Warning",
            Self::Info => "Info",
            Self::Hint => "Hint",
        };
        f.write_str(label)
    }
}

/// Diagnostic code as reported by a tool: a string, a number, or an object
/// carrying a value and a documentation link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DiagnosticCode {
    Text(String),
    Number(i64),
    Linked {
        value: CodeValue,
        #[serde(default)]
        target: Option<String>,
    },
}

/// Scalar value of a linked code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CodeValue {
    Text(String),
    Number(i64),
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) | Self::Linked { value: CodeValue::Text(s), .. } => f.write_str(s),
            Self::Number(n) | Self::Linked { value: CodeValue::Number(n), .. } => write!(f, "{}", n),
        }
    }
}

/// Start and end of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    #[serde(default)]
    pub end: Position,
}

/// A single problem reported against a resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub range: Range,
    #[serde(default)]
    pub code: Option<DiagnosticCode>,
    #[serde(default)]
    pub source: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, line: usize, character: usize, message: impl Into<String>) -> Self {
        Self {
            severity,
            range: Range {
                start: Position::new(line, character),
                end: Position::new(line, character),
            },
            code: None,
            source: None,
            message: message.into(),
        }
    }

    /// Render as one Markdown list item
    pub fn to_markdown(&self) -> String {
        let code = self
            .code
            .as_ref()
            .map(|c| c.to_string())
            .filter(|c| !c.is_empty())
            .map(|c| format!(" `{}`", c))
            .unwrap_or_default();
        let source = self
            .source
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| format!(" _(source: {})_", s))
            .unwrap_or_default();

        format!(
            "- **{}** at {}:{}{}{} — {}",
            self.severity,
            self.range.start.line + 1,
            self.range.start.character + 1,
            code,
            source,
            collapse_whitespace(&self.message)
        )
    }
}

/// All diagnostics of one resource
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticGroup {
    pub resource: Resource,
    pub diagnostics: Vec<Diagnostic>,
}

/// Merge entries by resource identity, keeping first-seen order and dropping
/// resources without diagnostics
pub fn group_diagnostics(entries: Vec<(Resource, Vec<Diagnostic>)>) -> Vec<DiagnosticGroup> {
    let mut index: HashMap<Resource, usize> = HashMap::new();
    let mut groups: Vec<DiagnosticGroup> = Vec::new();

    for (resource, diagnostics) in entries {
        if diagnostics.is_empty() {
            continue;
        }
        match index.get(&resource) {
            Some(&idx) => groups[idx].diagnostics.extend(diagnostics),
            None => {
                index.insert(resource.clone(), groups.len());
                groups.push(DiagnosticGroup {
                    resource,
                    diagnostics,
                });
            }
        }
    }

    groups
}

/// Render the problems report.
///
/// A non-empty `filter` keeps only groups for those resources. `display_path`
/// names each resource and is also the group sort key.
pub fn render_problems<F>(groups: &[DiagnosticGroup], filter: Option<&[Resource]>, display_path: F) -> String
where
    F: Fn(&Resource) -> String,
{
    let allowed: Option<HashSet<&Resource>> = filter
        .filter(|f| !f.is_empty())
        .map(|f| f.iter().collect());

    let mut selected: Vec<(String, &DiagnosticGroup)> = groups
        .iter()
        .filter(|g| !g.diagnostics.is_empty())
        .filter(|g| allowed.as_ref().map_or(true, |set| set.contains(&g.resource)))
        .map(|g| (display_path(&g.resource), g))
        .collect();

    if selected.is_empty() {
        return "# Problems\n\nNo problems found.\n".to_string();
    }

    selected.sort_by(|(a, _), (b, _)| a.cmp(b));

    let mut parts = vec!["# Problems\n".to_string()];
    for (file, group) in selected {
        parts.push(format!("## {}", file));

        let mut ordered: Vec<&Diagnostic> = group.diagnostics.iter().collect();
        ordered.sort_by_key(|d| (d.severity, d.range.start.line));
        parts.extend(ordered.iter().map(|d| d.to_markdown()));
        parts.push(String::new());
    }

    parts.join("\n")
}

/// One entry of the diagnostics store file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreEntry {
    pub path: String,
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

/// Load a diagnostics store.
///
/// The file holds an array of `{ "path", "diagnostics": [...] }` entries.
/// Relative paths are resolved against `workspace`.
pub fn load_store(path: &Path, workspace: Option<&Path>) -> Result<Vec<(Resource, Vec<Diagnostic>)>> {
    let raw = fs::read_to_string(path).with_path(path)?;
    let entries: Vec<StoreEntry> = serde_json::from_str(&raw)?;
    tracing::debug!(path = %path.display(), entries = entries.len(), "loaded diagnostics store");

    Ok(entries
        .into_iter()
        .map(|e| (Resource::resolve(workspace, &e.path), e.diagnostics))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn rel(r: &Resource) -> String {
        r.path()
            .strip_prefix("/ws")
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_else(|_| r.to_string())
    }

    #[test]
    fn test_severity_before_line() {
        let groups = group_diagnostics(vec![(
            Resource::new("/ws/a.rs"),
            vec![
                Diagnostic::new(Severity::Warning, 4, 0, "unused"),
                Diagnostic::new(Severity::Error, 1, 2, "mismatched types"),
            ],
        )]);

        assert_eq!(
            render_problems(&groups, None, rel),
            "# Problems\n\n## a.rs\n- **Error** at 2:3 — mismatched types\n- **Warning** at 5:1 — unused\n"
        );
    }

    #[test]
    fn test_line_format_with_code_and_source() {
        let mut d = Diagnostic::new(Severity::Info, 0, 9, "  consider\n\tborrowing  ");
        d.code = Some(DiagnosticCode::Linked {
            value: CodeValue::Text("E0308".to_string()),
            target: Some("https://doc.rust-lang.org/error_codes/E0308.html".to_string()),
        });
        d.source = Some("rustc".to_string());
        assert_eq!(
            d.to_markdown(),
            "- **Info** at 1:10 `E0308` _(source: rustc)_ — consider borrowing"
        );

        d.code = Some(DiagnosticCode::Number(2304));
        d.source = Some(String::new());
        assert_eq!(d.to_markdown(), "- **Info** at 1:10 `2304` — consider borrowing");
    }

    #[test]
    fn test_groups_sorted_and_filtered() {
        let groups = group_diagnostics(vec![
            (Resource::new("/ws/z.rs"), vec![Diagnostic::new(Severity::Hint, 0, 0, "z")]),
            (Resource::new("/ws/empty.rs"), vec![]),
            (Resource::new("/ws/b.rs"), vec![Diagnostic::new(Severity::Error, 3, 0, "b1")]),
            (Resource::new("/ws/z.rs"), vec![Diagnostic::new(Severity::Error, 9, 0, "z2")]),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].diagnostics.len(), 2);

        let all = render_problems(&groups, None, rel);
        let b = all.find("## b.rs").unwrap();
        let z = all.find("## z.rs").unwrap();
        assert!(b < z);
        assert!(all.find("z2").unwrap() < all.find("— z\n").unwrap());

        let only_b = render_problems(&groups, Some(&[Resource::new("/ws/b.rs")][..]), rel);
        assert!(!only_b.contains("z.rs"));

        let none = render_problems(&groups, Some(&[Resource::new("/ws/other.rs")][..]), rel);
        assert_eq!(none, "# Problems\n\nNo problems found.\n");

        // an empty filter means no filtering
        let empty: &[Resource] = &[];
        assert_eq!(render_problems(&groups, Some(empty), rel), all);
    }

    #[test]
    fn test_load_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("problems.json");
        fs::write(
            &path,
            r#"[
                {"path": "src/a.ts", "diagnostics": [
                    {"severity": "information", "range": {"start": {"line": 2, "character": 4}},
                     "code": 2304, "source": "ts", "message": "Cannot find name"}
                ]},
                {"path": "/abs/b.ts", "diagnostics": [
                    {"severity": "warning", "range": {"start": {"line": 0, "character": 0}}, "message": "w"}
                ]}
            ]"#,
        )
        .unwrap();

        let entries = load_store(&path, Some(Path::new("/ws"))).unwrap();
        assert_eq!(entries[0].0, Resource::new("/ws/src/a.ts"));
        assert_eq!(entries[0].1[0].severity, Severity::Info);
        assert_eq!(entries[0].1[0].code, Some(DiagnosticCode::Number(2304)));
        assert_eq!(entries[1].0, Resource::new("/abs/b.ts"));
    }
}
