/*!
 * Fenced block construction
 *
 * A block is `open + header + "\n" + body + "\n" + close`, where the wrapper
 * comes from `fence.wrapper`/`fence.count` and the header from
 * `fenceInfoMode`. With the `none` style the body is returned bare.
 */

use std::path::Path;

use crate::config::{FenceStyle, HeaderMode, Settings};
use crate::imports::strip_imports;
use crate::types::{Selection, TextDocument};
use crate::utils::{replace_all_literal, to_slash};

/// Inserted into broken fence tokens
pub const ZERO_WIDTH_JOINER: char = '\u{200D}';

/// Opening and closing delimiters of a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenceWrapper {
    /// Marker run followed by a space, the header goes right after it
    pub open: String,
    /// Newline followed by the marker run
    pub close: String,
}

impl FenceWrapper {
    /// Wrapper for a style and (unclamped) marker count
    pub fn new(style: FenceStyle, count: i64) -> Self {
        match marker(style) {
            Some(ch) => {
                let bar = fence_token(ch, clamp_count(count));
                Self {
                    open: format!("{} ", bar),
                    close: format!("\n{}", bar),
                }
            }
            None => Self {
                open: String::new(),
                close: String::new(),
            },
        }
    }

    /// Wrapper described by the settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.fence_wrapper, settings.fence_count)
    }

    /// `none` style: callers emit bare content
    pub fn is_none(&self) -> bool {
        self.open.is_empty() && self.close.is_empty()
    }

    /// Wrap a body under a header line
    pub fn wrap(&self, header: &str, body: &str) -> String {
        if self.is_none() {
            return body.to_string();
        }
        format!("{}{}\n{}\n{}", self.open, header, body, self.close)
    }
}

fn marker(style: FenceStyle) -> Option<char> {
    match style {
        FenceStyle::Backticks => Some('`'),
        FenceStyle::Tildes => Some('~'),
        FenceStyle::None => None,
    }
}

fn clamp_count(count: i64) -> usize {
    count.clamp(
        crate::config::MIN_FENCE_COUNT,
        crate::config::MAX_FENCE_COUNT,
    ) as usize
}

fn fence_token(ch: char, count: usize) -> String {
    std::iter::repeat(ch).take(count).collect()
}

/// Break every fence token inside `text`.
///
/// Each token loses its last marker, which is re-added after a zero-width
/// joiner. Runs longer than the token are handled by repeating the pass until
/// the token no longer occurs.
pub fn escape_fence(text: &str, style: FenceStyle, count: i64) -> String {
    let Some(ch) = marker(style) else {
        return text.to_string();
    };
    let count = clamp_count(count);
    let token = fence_token(ch, count);
    let broken = format!("{}{}{}", fence_token(ch, count - 1), ZERO_WIDTH_JOINER, ch);

    let mut out = text.to_string();
    while out.contains(&token) {
        out = out.replace(&token, &broken);
    }
    out
}

/// Escape according to the settings toggle
pub fn escape_with_settings(text: &str, settings: &Settings) -> String {
    if !settings.fence_escape {
        return text.to_string();
    }
    escape_fence(text, settings.fence_wrapper, settings.fence_count)
}

/// Values available to header templates, in substitution order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholders(Vec<(&'static str, String)>);

impl Placeholders {
    /// Collect file metadata for a document.
    ///
    /// `workspace` is the root of the workspace folder containing the file, if
    /// any. Files outside it use their full path as `path`.
    pub fn for_file(path: &Path, workspace: Option<&Path>, language_id: &str) -> Self {
        let full_path = to_slash(path);
        let rel = relative_path(path, workspace);
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();
        let dir = match rel.rfind('/') {
            Some(0) => "/".to_string(),
            Some(idx) => rel[..idx].to_string(),
            None => ".".to_string(),
        };
        let workspace_name = workspace
            .filter(|ws| path.starts_with(ws))
            .and_then(|ws| ws.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Self(vec![
            ("path", rel),
            ("fullPath", full_path),
            ("filename", filename),
            ("ext", ext),
            ("dir", dir),
            ("workspace", workspace_name),
            ("language", language_id.to_string()),
        ])
    }

    /// Value for a key
    pub fn get(&self, key: &str) -> &str {
        self.0
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    /// Replace every `${key}` in the template literally
    pub fn expand(&self, template: &str) -> String {
        self.0.iter().fold(template.to_string(), |acc, (key, value)| {
            replace_all_literal(&acc, &format!("${{{}}}", key), value)
        })
    }
}

/// Workspace-relative path with forward slashes, or the full path when the
/// file lies outside the workspace
pub fn relative_path(path: &Path, workspace: Option<&Path>) -> String {
    match workspace.and_then(|ws| path.strip_prefix(ws).ok()) {
        Some(rel) => to_slash(rel),
        None => to_slash(path),
    }
}

/// Header line for a document
pub fn build_header(mode: HeaderMode, placeholders: &Placeholders, settings: &Settings) -> String {
    match mode {
        HeaderMode::Path => format!("PATH: {}", placeholders.get("path")),
        HeaderMode::Fullpath => format!("PATH: {}", placeholders.get("fullPath")),
        HeaderMode::Language => placeholders.get("language").to_string(),
        HeaderMode::Literal => settings.header_literal.clone(),
        HeaderMode::Format => placeholders.expand(&settings.header_template),
        HeaderMode::None => String::new(),
    }
}

/// Build the fenced block for a document or a selection of it.
///
/// The body goes through import handling, then fence escaping, then wrapping.
pub fn build_fence(
    doc: &TextDocument,
    selection: Option<&Selection>,
    workspace: Option<&Path>,
    settings: &Settings,
) -> String {
    let placeholders = Placeholders::for_file(doc.resource.path(), workspace, &doc.language_id);
    let header = build_header(settings.header_mode, &placeholders, settings);

    let handled = strip_imports(
        doc.text_in(selection),
        &doc.language_id,
        settings.imports_mode,
        &settings.imports_placeholder,
    );
    let body = escape_with_settings(&handled.text, settings);

    FenceWrapper::from_settings(settings).wrap(&header, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImportsMode;
    use crate::types::{Position, Resource};

    fn doc(path: &str, language: &str, text: &str) -> TextDocument {
        TextDocument {
            resource: Resource::new(path),
            language_id: language.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_wrapper_styles() {
        let w = FenceWrapper::new(FenceStyle::Backticks, 3);
        assert_eq!(w.open, "``` ");
        assert_eq!(w.close, "\n```");

        let w = FenceWrapper::new(FenceStyle::Tildes, 10);
        assert_eq!(w.open, "~~~~~ ");

        let w = FenceWrapper::new(FenceStyle::Backticks, 1);
        assert_eq!(w.close, "\n```");

        assert!(FenceWrapper::new(FenceStyle::None, 4).is_none());
        assert_eq!(FenceWrapper::new(FenceStyle::None, 4).wrap("h", "body"), "body");
    }

    #[test]
    fn test_escape_breaks_every_token() {
        for count in 3..=5 {
            let token = "`".repeat(count as usize);
            for run in 1..=12 {
                let text = format!("a{}b", "`".repeat(run));
                let escaped = escape_fence(&text, FenceStyle::Backticks, count);
                assert!(!escaped.contains(&token), "run {} count {}: {:?}", run, count, escaped);
                assert_eq!(escaped.replace(ZERO_WIDTH_JOINER, ""), text);
            }
        }
    }

    #[test]
    fn test_escape_shape() {
        assert_eq!(
            escape_fence("```rust", FenceStyle::Backticks, 3),
            "``\u{200D}`rust"
        );
        // tildes only escape tildes
        assert_eq!(escape_fence("```", FenceStyle::Tildes, 3), "```");
        assert_eq!(escape_fence("```", FenceStyle::None, 3), "```");
    }

    #[test]
    fn test_placeholders() {
        let ph = Placeholders::for_file(
            Path::new("/home/me/proj/src/app/main.ts"),
            Some(Path::new("/home/me/proj")),
            "typescript",
        );
        assert_eq!(ph.get("path"), "src/app/main.ts");
        assert_eq!(ph.get("fullPath"), "/home/me/proj/src/app/main.ts");
        assert_eq!(ph.get("filename"), "main.ts");
        assert_eq!(ph.get("ext"), "ts");
        assert_eq!(ph.get("dir"), "src/app");
        assert_eq!(ph.get("workspace"), "proj");
        assert_eq!(ph.get("language"), "typescript");

        let root = Placeholders::for_file(Path::new("/ws/README"), Some(Path::new("/ws")), "plaintext");
        assert_eq!(root.get("dir"), ".");
        assert_eq!(root.get("ext"), "");

        let outside = Placeholders::for_file(Path::new("/tmp/x.rs"), Some(Path::new("/ws")), "rust");
        assert_eq!(outside.get("path"), "/tmp/x.rs");
        assert_eq!(outside.get("workspace"), "");
    }

    #[test]
    fn test_header_modes() {
        let mut settings = Settings::default();
        let ph = Placeholders::for_file(Path::new("/ws/lib/a.py"), Some(Path::new("/ws")), "python");

        assert_eq!(build_header(HeaderMode::Path, &ph, &settings), "PATH: lib/a.py");
        assert_eq!(build_header(HeaderMode::Fullpath, &ph, &settings), "PATH: /ws/lib/a.py");
        assert_eq!(build_header(HeaderMode::Language, &ph, &settings), "python");
        assert_eq!(build_header(HeaderMode::Literal, &ph, &settings), "PATH");
        assert_eq!(build_header(HeaderMode::None, &ph, &settings), "");

        settings.header_template = "${language} ${filename} in ${dir} (${workspace}) ${unknown}".to_string();
        assert_eq!(
            build_header(HeaderMode::Format, &ph, &settings),
            "python a.py in lib (ws) ${unknown}"
        );
    }

    #[test]
    fn test_build_fence_default() {
        let settings = Settings::default();
        let d = doc("/ws/src/a.js", "javascript", "import x from 'y';\nconst z = '```';");
        assert_eq!(
            build_fence(&d, None, Some(Path::new("/ws")), &settings),
            "``` PATH: src/a.js\n/* { ... imports ... } */\nconst z = '``\u{200D}`';\n\n```"
        );
    }

    #[test]
    fn test_build_fence_none_style_is_bare() {
        let mut settings = Settings::default();
        settings.fence_wrapper = FenceStyle::None;
        settings.imports_mode = ImportsMode::Strip;
        let d = doc("/ws/a.js", "javascript", "import x from 'y';\nconst z = '```';");
        assert_eq!(build_fence(&d, None, Some(Path::new("/ws")), &settings), "const z = '```';");
    }

    #[test]
    fn test_build_fence_selection() {
        let mut settings = Settings::default();
        settings.header_mode = HeaderMode::Language;
        let d = doc("/ws/a.rs", "rust", "fn a() {}\nfn b() {}\nfn c() {}");
        let sel = Selection::new(Position::new(1, 0), Position::new(1, 9));
        assert_eq!(
            build_fence(&d, Some(&sel), Some(Path::new("/ws")), &settings),
            "``` rust\nfn b() {}\n\n```"
        );
    }
}
