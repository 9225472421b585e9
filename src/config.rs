/*!
 * Configuration handling for ctxtools
 *
 * Settings live in a flat namespace of dotted keys (`fence.wrapper`,
 * `tree.maxDepth`, ...) stored as JSON. Command-line flags override
 * individual settings for a single invocation.
 */

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{CtxError, Result, ResultExt};
use crate::types::{OpenTab, Resource, Selection};
use crate::utils::DEFAULT_EXCLUDE_FOLDERS;

/// File name of the per-workspace settings file
pub const WORKSPACE_SETTINGS_FILE: &str = ".ctxtools.json";

/// Smallest accepted fence marker count
pub const MIN_FENCE_COUNT: i64 = 3;

/// Largest accepted fence marker count
pub const MAX_FENCE_COUNT: i64 = 5;

/// Character used for fence markers
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FenceStyle {
    /// ``` markers (default)
    #[default]
    Backticks,
    /// ~~~ markers
    Tildes,
    /// No wrapping at all
    None,
}

/// What goes on the opening fence line
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HeaderMode {
    /// Workspace-relative path (default)
    #[default]
    Path,
    /// Absolute path with forward slashes
    Fullpath,
    /// Language identifier
    Language,
    /// Fixed configured text
    Literal,
    /// Configured template with `${key}` placeholders
    Format,
    /// Empty header
    None,
}

/// How import statements are treated when copying
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ImportsMode {
    /// Leave the text untouched
    Keep,
    /// Remove import lines
    Strip,
    /// Remove import lines and leave a single comment in their place (default)
    #[default]
    Placeholder,
}

/// Which files the Markdown document includes
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum IncludeFiles {
    /// Explicit selection if any, otherwise every open editor (default)
    #[default]
    SelectedOrOpen,
    /// Always the open editors, explicit selection is ignored
    OpenEditorsOnly,
    /// Only the explicit selection
    SelectedOnly,
}

/// Persistent settings, keyed the same way as the JSON settings file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Fence marker style
    #[serde(rename = "fence.wrapper")]
    pub fence_wrapper: FenceStyle,

    /// Number of fence markers, clamped to 3..=5 on use
    #[serde(rename = "fence.count")]
    pub fence_count: i64,

    /// Break fence tokens found inside copied content
    #[serde(rename = "fence.escape")]
    pub fence_escape: bool,

    /// Header mode for the opening fence line
    #[serde(rename = "fenceInfoMode")]
    pub header_mode: HeaderMode,

    /// Header text for `literal` mode
    #[serde(rename = "fenceInfoLiteral")]
    pub header_literal: String,

    /// Header template for `format` mode
    #[serde(rename = "fenceHeaderTemplate")]
    pub header_template: String,

    /// Import handling
    #[serde(rename = "copy.importsMode")]
    pub imports_mode: ImportsMode,

    /// Text of the placeholder comment
    #[serde(rename = "copy.importsPlaceholder")]
    pub imports_placeholder: String,

    /// Base exclude glob for tree enumeration
    #[serde(rename = "tree.exclude")]
    pub tree_exclude: String,

    /// Folder names excluded anywhere in the tree
    #[serde(rename = "tree.excludeFolders")]
    pub tree_exclude_folders: Vec<String>,

    /// Additional exclude globs
    #[serde(rename = "tree.extraExcludeGlobs")]
    pub tree_extra_exclude_globs: String,

    /// Maximum number of files enumerated for a tree, negative counts as 0
    #[serde(rename = "tree.maxFiles")]
    pub tree_max_files: i64,

    /// Maximum path depth shown in a tree, negative counts as 0
    #[serde(rename = "tree.maxDepth")]
    pub tree_max_depth: i64,

    /// Honour .gitignore files while enumerating
    #[serde(rename = "tree.respectGitignore")]
    pub tree_respect_gitignore: bool,

    /// Document title template, `${workspace}` is substituted
    #[serde(rename = "doc.title")]
    pub doc_title: String,

    /// Include the project tree in the document
    #[serde(rename = "doc.includeTree")]
    pub doc_include_tree: bool,

    /// File selection policy for the document
    #[serde(rename = "doc.includeFiles")]
    pub doc_include_files: IncludeFiles,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fence_wrapper: FenceStyle::Backticks,
            fence_count: MIN_FENCE_COUNT,
            fence_escape: true,
            header_mode: HeaderMode::Path,
            header_literal: "PATH".to_string(),
            header_template: "PATH: ${path}".to_string(),
            imports_mode: ImportsMode::Placeholder,
            imports_placeholder: "{ ... imports ... }".to_string(),
            tree_exclude: String::new(),
            tree_exclude_folders: DEFAULT_EXCLUDE_FOLDERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            tree_extra_exclude_globs: String::new(),
            tree_max_files: 800,
            tree_max_depth: 8,
            tree_respect_gitignore: true,
            doc_title: "${workspace} Context".to_string(),
            doc_include_tree: true,
            doc_include_files: IncludeFiles::SelectedOrOpen,
        }
    }
}

impl Settings {
    /// Effective fence marker count
    pub fn fence_count(&self) -> usize {
        self.fence_count.clamp(MIN_FENCE_COUNT, MAX_FENCE_COUNT) as usize
    }

    /// Effective file limit for tree enumeration
    pub fn tree_max_files(&self) -> usize {
        clamp_non_negative(self.tree_max_files)
    }

    /// Effective tree depth
    pub fn tree_max_depth(&self) -> usize {
        clamp_non_negative(self.tree_max_depth)
    }

    /// Load settings from a JSON file; missing keys take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).with_path(path)?;
        let settings: Settings = serde_json::from_str(&raw)
            .map_err(|e| CtxError::Config(format!("{}: {}", path.display(), e)))?;
        Ok(settings)
    }

    /// Locate and load settings.
    ///
    /// Lookup order: the explicit path, `<workspace>/.ctxtools.json`, then the
    /// user config directory. Returns the defaults when nothing is found.
    pub fn resolve(explicit: Option<&Path>, workspace: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }

        for candidate in Self::candidates(workspace) {
            if candidate.is_file() {
                tracing::debug!(path = %candidate.display(), "loading settings");
                return Ok((Self::load(&candidate)?, Some(candidate)));
            }
        }

        Ok((Self::default(), None))
    }

    /// Settings file locations, most specific first
    pub fn candidates(workspace: Option<&Path>) -> Vec<PathBuf> {
        let mut out = Vec::with_capacity(2);
        if let Some(ws) = workspace {
            out.push(ws.join(WORKSPACE_SETTINGS_FILE));
        }
        if let Some(dir) = dirs::config_dir() {
            out.push(dir.join("ctxtools").join("settings.json"));
        }
        out
    }

    /// Apply per-invocation overrides from the command line
    pub fn apply_overrides(&mut self, args: &Args) {
        if let Some(style) = args.fence {
            self.fence_wrapper = style;
        }
        if let Some(count) = args.fence_count {
            self.fence_count = count;
        }
        if args.no_escape {
            self.fence_escape = false;
        }
        if let Some(mode) = args.header {
            self.header_mode = mode;
        }
        if let Some(mode) = args.imports {
            self.imports_mode = mode;
        }
        if let Some(depth) = args.max_depth {
            self.tree_max_depth = depth;
        }
        if let Some(files) = args.max_files {
            self.tree_max_files = files;
        }
        if let Some(mode) = args.include_files {
            self.doc_include_files = mode;
        }
    }
}

fn clamp_non_negative(value: i64) -> usize {
    usize::try_from(value.max(0)).unwrap_or(usize::MAX)
}

/// Command-line arguments for ctxtools
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "ctxtools",
    version = env!("CARGO_PKG_VERSION"),
    about = "Copy files, selections, project trees and problems as Markdown context",
    long_about = "Formats source files, selections, directory trees and diagnostics as fenced Markdown blocks and places the result on the system clipboard, ready to paste into an LLM conversation."
)]
pub struct Args {
    /// Action to run
    #[clap(subcommand)]
    pub command: Option<CommandKind>,

    /// Workspace root (defaults to the current directory)
    #[clap(long, short = 'w', global = true)]
    pub workspace: Option<String>,

    /// Settings file to use instead of the default lookup
    #[clap(long, global = true)]
    pub config: Option<String>,

    /// File treated as the active editor
    #[clap(long, global = true)]
    pub active: Option<String>,

    /// Selection in the active editor: `LINE`, `START-END` or `L:C-L:C` (1-based)
    #[clap(long, global = true)]
    pub selection: Option<Selection>,

    /// Comma-separated list of files treated as open editors, in tab order
    #[clap(long, global = true, value_delimiter = ',')]
    pub open: Vec<String>,

    /// Open diff editor given as ORIGINAL MODIFIED (repeatable)
    #[clap(long, global = true, num_args = 2, value_names = ["ORIGINAL", "MODIFIED"])]
    pub diff: Vec<String>,

    /// JSON file holding the diagnostics store
    #[clap(long, global = true)]
    pub diagnostics: Option<String>,

    /// Write the result to stdout instead of the clipboard
    #[clap(long, global = true)]
    pub print: bool,

    /// Print a summary table of what was copied
    #[clap(long, global = true)]
    pub report: bool,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,

    /// Override `fence.wrapper`
    #[clap(long, value_enum, global = true)]
    pub fence: Option<FenceStyle>,

    /// Override `fence.count`
    #[clap(long, global = true)]
    pub fence_count: Option<i64>,

    /// Disable fence escaping
    #[clap(long, global = true)]
    pub no_escape: bool,

    /// Override `fenceInfoMode`
    #[clap(long, value_enum, global = true)]
    pub header: Option<HeaderMode>,

    /// Override `copy.importsMode`
    #[clap(long, value_enum, global = true)]
    pub imports: Option<ImportsMode>,

    /// Override `tree.maxDepth`
    #[clap(long, global = true)]
    pub max_depth: Option<i64>,

    /// Override `tree.maxFiles`
    #[clap(long, global = true)]
    pub max_files: Option<i64>,

    /// Override `doc.includeFiles`
    #[clap(long, value_enum, global = true)]
    pub include_files: Option<IncludeFiles>,
}

/// Available actions
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    /// Copy the active file as a fenced block
    File,
    /// Copy the selection of the active file (whole file if empty)
    Selection,
    /// Copy every open editor
    OpenEditors,
    /// Copy the given files
    Files {
        /// Files to copy
        paths: Vec<String>,
    },
    /// Copy the project tree
    Tree,
    /// Copy a Markdown document with title, tree and files
    Doc {
        /// Explicitly selected files
        paths: Vec<String>,
    },
    /// Show the effective settings
    Settings {
        /// Write the effective settings to the workspace settings file
        #[clap(long)]
        init: bool,
    },
    /// Copy every problem in the diagnostics store
    Problems,
    /// Copy the active file followed by its problems
    FileWithProblems,
    /// Copy every open editor followed by their problems
    OpenEditorsWithProblems,
}

/// Resolved configuration for one invocation
#[derive(Clone, Debug)]
pub struct Config {
    /// Canonical workspace root, if any
    pub workspace: Option<PathBuf>,

    /// Effective settings
    pub settings: Settings,

    /// Where the settings came from
    pub settings_path: Option<PathBuf>,

    /// Active editor resource
    pub active: Option<Resource>,

    /// Selection within the active editor
    pub selection: Option<Selection>,

    /// Open tabs in order
    pub tabs: Vec<OpenTab>,

    /// Diagnostics store file
    pub diagnostics_file: Option<PathBuf>,

    /// Write output to stdout instead of the clipboard
    pub print: bool,

    /// Print a copy report
    pub report: bool,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args(args: &Args) -> Result<Self> {
        let raw_ws = match &args.workspace {
            Some(ws) => PathBuf::from(ws),
            None => env::current_dir()?,
        };
        let workspace = fs::canonicalize(&raw_ws).with_path(&raw_ws)?;

        let (mut settings, settings_path) =
            Settings::resolve(args.config.as_deref().map(Path::new), Some(&workspace))?;
        settings.apply_overrides(args);

        let base = Some(workspace.as_path());
        let mut tabs: Vec<OpenTab> = args
            .open
            .iter()
            .filter(|p| !p.trim().is_empty())
            .map(|p| OpenTab::Text(Resource::resolve(base, p)))
            .collect();
        for pair in args.diff.chunks(2) {
            if let [original, modified] = pair {
                tabs.push(OpenTab::Diff {
                    original: Resource::resolve(base, original),
                    modified: Resource::resolve(base, modified),
                });
            }
        }

        Ok(Self {
            active: args.active.as_deref().map(|p| Resource::resolve(base, p)),
            selection: args.selection,
            diagnostics_file: args
                .diagnostics
                .as_deref()
                .map(|p| Resource::resolve(base, p).path().to_path_buf()),
            workspace: Some(workspace),
            settings,
            settings_path,
            tabs,
            print: args.print,
            report: args.report,
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(ws) = &self.workspace {
            crate::ensure!(ws.is_dir(), PathNotFound, "workspace {}", ws.display());
        }

        if let Some(path) = &self.diagnostics_file {
            crate::ensure!(path.is_file(), PathNotFound, "diagnostics file {}", path.display());
        }

        for (key, value) in [
            ("tree.maxFiles", self.settings.tree_max_files),
            ("tree.maxDepth", self.settings.tree_max_depth),
        ] {
            if value < 0 {
                tracing::warn!(key, value, "negative limit, clamping to 0");
            }
        }

        if !(MIN_FENCE_COUNT..=MAX_FENCE_COUNT).contains(&self.settings.fence_count) {
            tracing::warn!(
                count = self.settings.fence_count,
                effective = self.settings.fence_count(),
                "fence.count out of range, clamping"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_fence_count_clamped() {
        let mut settings = Settings::default();
        for (raw, expected) in [(-4, 3), (0, 3), (2, 3), (3, 3), (4, 4), (5, 5), (6, 5), (99, 5)] {
            settings.fence_count = raw;
            assert_eq!(settings.fence_count(), expected, "raw count {}", raw);
        }
    }

    #[test]
    fn test_partial_settings_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{ "fence.wrapper": "tildes", "fence.count": 9, "doc.includeFiles": "selected-only" }"#,
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.fence_wrapper, FenceStyle::Tildes);
        assert_eq!(settings.fence_count(), 5);
        assert_eq!(settings.doc_include_files, IncludeFiles::SelectedOnly);
        assert_eq!(settings.imports_mode, ImportsMode::Placeholder);
        assert_eq!(settings.tree_max_files, 800);
        assert_eq!(settings.tree_max_depth, 8);
    }

    #[test]
    fn test_negative_tree_limits_are_clamped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "tree.maxFiles": -1, "tree.maxDepth": -5 }"#).unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.tree_max_files(), 0);
        assert_eq!(settings.tree_max_depth(), 0);
        assert_eq!(Settings::default().tree_max_files(), 800);
        assert_eq!(Settings::default().tree_max_depth(), 8);
    }

    #[test]
    fn test_invalid_settings_file_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "fence.wrapper": "quotes" }"#).unwrap();

        let err = Settings::load(&path).unwrap_err();
        assert!(matches!(err, CtxError::Config(_)));
    }

    #[test]
    fn test_workspace_settings_file_wins() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(WORKSPACE_SETTINGS_FILE),
            r#"{ "fenceInfoMode": "language" }"#,
        )
        .unwrap();

        let (settings, path) = Settings::resolve(None, Some(dir.path())).unwrap();
        assert_eq!(settings.header_mode, HeaderMode::Language);
        assert_eq!(path, Some(dir.path().join(WORKSPACE_SETTINGS_FILE)));
    }

    #[test]
    fn test_overrides_and_tabs_from_args() {
        let dir = tempdir().unwrap();
        let ws = dir.path().to_string_lossy().to_string();
        let args = Args::parse_from([
            "ctxtools",
            "--workspace",
            &ws,
            "--open",
            "a.rs,b.rs",
            "--diff",
            "old.rs",
            "new.rs",
            "--fence",
            "none",
            "--imports",
            "keep",
            "open-editors",
        ]);

        let config = Config::from_args(&args).unwrap();
        let root = fs::canonicalize(dir.path()).unwrap();
        assert_eq!(config.settings.fence_wrapper, FenceStyle::None);
        assert_eq!(config.settings.imports_mode, ImportsMode::Keep);
        assert_eq!(config.tabs.len(), 3);
        assert_eq!(
            config.tabs[2],
            OpenTab::Diff {
                original: Resource::new(root.join("old.rs")),
                modified: Resource::new(root.join("new.rs")),
            }
        );
        assert_eq!(args.command, Some(CommandKind::OpenEditors));
    }

    #[test]
    fn test_missing_workspace_is_path_not_found() {
        let args = Args::parse_from(["ctxtools", "--workspace", "/definitely/not/here", "tree"]);
        let err = Config::from_args(&args).unwrap_err();
        assert!(matches!(err, CtxError::PathNotFound(_)));
    }
}
