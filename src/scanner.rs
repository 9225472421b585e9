/*!
 * Workspace file enumeration for project trees
 */

use std::path::{Path, PathBuf};

use glob_match::glob_match;
use ignore::WalkBuilder;
use walkdir::WalkDir;

use crate::config::Settings;
use crate::utils::to_slash;

/// Exclusion rules for tree enumeration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludeSet {
    /// Glob patterns matched against workspace-relative paths
    pub globs: Vec<String>,
    /// Folder names excluded at any depth
    pub folders: Vec<String>,
}

impl ExcludeSet {
    /// Combine `tree.exclude`, `tree.extraExcludeGlobs` and `tree.excludeFolders`
    pub fn from_settings(settings: &Settings) -> Self {
        let mut globs = split_glob_list(&settings.tree_exclude);
        globs.extend(split_glob_list(&settings.tree_extra_exclude_globs));

        let folders = settings
            .tree_exclude_folders
            .iter()
            .map(|n| n.trim_matches('/').to_string())
            .filter(|n| !n.is_empty())
            .collect();

        Self { globs, folders }
    }

    /// Whether a workspace-relative file path (forward slashes) is excluded.
    ///
    /// Folder names only match directory components, never the file name.
    pub fn is_excluded(&self, rel_path: &str) -> bool {
        let in_excluded_folder = rel_path
            .rsplit_once('/')
            .map_or(false, |(dirs, _)| {
                dirs.split('/')
                    .any(|component| self.folders.iter().any(|f| f == component))
            });
        if in_excluded_folder {
            return true;
        }

        self.globs.iter().any(|pattern| glob_match(pattern, rel_path))
    }
}

/// Split `{a,b}` or `a,b` into individual patterns.
///
/// Commas nested inside braces stay with their pattern.
pub fn split_glob_list(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .unwrap_or(trimmed);

    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for ch in inner.chars() {
        match ch {
            '{' => {
                depth += 1;
                current.push(ch);
            }
            '}' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if depth == 0 => {
                out.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    out.push(current);

    out.into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Bounded, exclusion-aware walk over a workspace
pub struct Scanner {
    /// Workspace root
    root: PathBuf,
    /// Exclusion rules
    excludes: ExcludeSet,
    /// Stop after this many files
    max_files: usize,
    /// Honour .gitignore files
    respect_gitignore: bool,
}

impl Scanner {
    /// Create a new scanner
    pub fn new(root: impl Into<PathBuf>, excludes: ExcludeSet, max_files: usize, respect_gitignore: bool) -> Self {
        Self {
            root: root.into(),
            excludes,
            max_files,
            respect_gitignore,
        }
    }

    /// Scanner configured from settings
    pub fn from_settings(root: impl Into<PathBuf>, settings: &Settings) -> Self {
        Self::new(
            root,
            ExcludeSet::from_settings(settings),
            settings.tree_max_files(),
            settings.tree_respect_gitignore,
        )
    }

    /// Workspace-relative paths of regular files, in walk order, at most
    /// `max_files` of them
    pub fn scan(&self) -> Vec<String> {
        if self.max_files == 0 {
            return Vec::new();
        }

        let mut out = Vec::new();
        let mut push = |path: &Path| -> bool {
            if let Some(rel) = self.relative(path) {
                if !self.excludes.is_excluded(&rel) {
                    out.push(rel);
                }
            }
            out.len() < self.max_files
        };

        if self.respect_gitignore {
            // Hidden files are governed by the exclude rules, not by the walker
            let walker = WalkBuilder::new(&self.root)
                .hidden(false)
                .parents(false)
                .require_git(false)
                .git_global(false)
                .git_exclude(false)
                .sort_by_file_name(|a, b| a.cmp(b))
                .filter_entry({
                    let root = self.root.clone();
                    let excludes = self.excludes.clone();
                    move |e| keep_dir(&root, &excludes, e.path(), e.file_type().map_or(false, |t| t.is_dir()))
                })
                .build();

            for entry in walker.filter_map(Result::ok) {
                if entry.file_type().map_or(false, |ft| ft.is_file()) && !push(entry.path()) {
                    break;
                }
            }
        } else {
            let walker = WalkDir::new(&self.root)
                .min_depth(1)
                .sort_by(|a, b| a.file_name().cmp(b.file_name()))
                .into_iter()
                .filter_entry(|e| keep_dir(&self.root, &self.excludes, e.path(), e.file_type().is_dir()));

            for entry in walker.filter_map(Result::ok) {
                if entry.file_type().is_file() && !push(entry.path()) {
                    break;
                }
            }
        }

        tracing::debug!(root = %self.root.display(), files = out.len(), "scanned workspace");
        out
    }

    fn relative(&self, path: &Path) -> Option<String> {
        path.strip_prefix(&self.root)
            .ok()
            .map(to_slash)
            .filter(|rel| !rel.is_empty())
    }
}

/// Prune excluded folders before descending into them
fn keep_dir(root: &Path, excludes: &ExcludeSet, path: &Path, is_dir: bool) -> bool {
    if !is_dir {
        return true;
    }
    match path.strip_prefix(root) {
        Ok(rel) if !rel.as_os_str().is_empty() => {
            let name = rel
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            !excludes.folders.iter().any(|f| *f == name)
        }
        _ => true,
    }
}
