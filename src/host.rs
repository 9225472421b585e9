/*!
 * Editor/workspace host
 *
 * Commands talk to the host through the [`Host`] trait. [`LocalHost`] backs
 * it with the file system: the workspace is a directory, editors and the
 * selection come from the command line and diagnostics from a JSON store.
 */

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{Config, Settings};
use crate::diagnostics::{self, Diagnostic};
use crate::error::{Result, ResultExt};
use crate::fence::relative_path;
use crate::language::language_id_for_path;
use crate::scanner::Scanner;
use crate::types::{FileKind, OpenTab, Resource, Selection, TextDocument};
use crate::utils::unique;

/// Everything the commands need from an editor
pub trait Host {
    /// Root of the (first) workspace folder
    fn workspace_root(&self) -> Option<&Path>;

    /// Resource of the focused editor
    fn active_editor(&self) -> Option<&Resource>;

    /// Selection in the focused editor
    fn selection(&self) -> Option<Selection>;

    /// Open tabs in tab order
    fn open_tabs(&self) -> Vec<OpenTab>;

    /// Full text and language of a resource
    fn read_document(&self, resource: &Resource) -> Result<TextDocument>;

    /// Kind of entry behind a resource, `None` if it cannot be stat-ed
    fn stat(&self, resource: &Resource) -> Option<FileKind>;

    /// Workspace-relative paths of files, bounded and filtered per settings
    fn find_files(&self, settings: &Settings) -> Vec<String>;

    /// Every `(resource, diagnostics)` pair in the store
    fn diagnostics(&self) -> Vec<(Resource, Vec<Diagnostic>)>;

    /// Base name of the workspace folder
    fn workspace_name(&self) -> Option<String> {
        self.workspace_root()
            .and_then(|root| root.file_name())
            .map(|n| n.to_string_lossy().to_string())
    }

    /// Display path of a resource
    fn relative_path(&self, resource: &Resource) -> String {
        relative_path(resource.path(), self.workspace_root())
    }

    /// Resources of all open tabs, de-duplicated
    fn open_resources(&self) -> Vec<Resource> {
        open_resources(&self.open_tabs())
    }
}

/// Flatten tabs into resources.
///
/// Diff tabs contribute their original and then their modified side; later
/// duplicates are dropped.
pub fn open_resources(tabs: &[OpenTab]) -> Vec<Resource> {
    let flat: Vec<Resource> = tabs
        .iter()
        .flat_map(|tab| match tab {
            OpenTab::Text(r) => vec![r.clone()],
            OpenTab::Diff { original, modified } => vec![original.clone(), modified.clone()],
        })
        .collect();
    unique(&flat)
}

/// File-system backed host
#[derive(Debug, Clone, Default)]
pub struct LocalHost {
    /// Workspace root
    workspace: Option<PathBuf>,
    /// Focused editor
    active: Option<Resource>,
    /// Selection in the focused editor
    selection: Option<Selection>,
    /// Open tabs
    tabs: Vec<OpenTab>,
    /// Diagnostics store
    diagnostics: Vec<(Resource, Vec<Diagnostic>)>,
}

impl LocalHost {
    /// Host rooted at `workspace`
    pub fn new(workspace: Option<PathBuf>) -> Self {
        Self {
            workspace,
            ..Self::default()
        }
    }

    /// Host described by the invocation config, loading the diagnostics store
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut host = Self::new(config.workspace.clone())
            .with_tabs(config.tabs.clone());
        if let Some(active) = &config.active {
            host = host.with_active(active.clone(), config.selection);
        }
        if let Some(path) = &config.diagnostics_file {
            let entries = diagnostics::load_store(path, config.workspace.as_deref())?;
            host = host.with_diagnostics(entries);
        }
        Ok(host)
    }

    /// Set the focused editor and its selection
    pub fn with_active(mut self, resource: Resource, selection: Option<Selection>) -> Self {
        self.active = Some(resource);
        self.selection = selection;
        self
    }

    /// Set the open tabs
    pub fn with_tabs(mut self, tabs: Vec<OpenTab>) -> Self {
        self.tabs = tabs;
        self
    }

    /// Set the diagnostics store
    pub fn with_diagnostics(mut self, entries: Vec<(Resource, Vec<Diagnostic>)>) -> Self {
        self.diagnostics = entries;
        self
    }

    /// Resource for a path given relative to the workspace
    pub fn resource(&self, raw: &str) -> Resource {
        Resource::resolve(self.workspace.as_deref(), raw)
    }
}

impl Host for LocalHost {
    fn workspace_root(&self) -> Option<&Path> {
        self.workspace.as_deref()
    }

    fn active_editor(&self) -> Option<&Resource> {
        self.active.as_ref()
    }

    fn selection(&self) -> Option<Selection> {
        self.selection
    }

    fn open_tabs(&self) -> Vec<OpenTab> {
        self.tabs.clone()
    }

    fn read_document(&self, resource: &Resource) -> Result<TextDocument> {
        let path = resource.path();
        let bytes = fs::read(path).with_path(path)?;
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(path = %path.display(), "not valid UTF-8, decoding lossily");
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };
        tracing::debug!(path = %path.display(), bytes = text.len(), "read document");

        Ok(TextDocument {
            resource: resource.clone(),
            language_id: language_id_for_path(path).to_string(),
            text,
        })
    }

    fn stat(&self, resource: &Resource) -> Option<FileKind> {
        let meta = fs::metadata(resource.path()).ok()?;
        Some(if meta.is_file() {
            FileKind::File
        } else if meta.is_dir() {
            FileKind::Directory
        } else {
            FileKind::Other
        })
    }

    fn find_files(&self, settings: &Settings) -> Vec<String> {
        match &self.workspace {
            Some(root) => Scanner::from_settings(root, settings).scan(),
            None => Vec::new(),
        }
    }

    fn diagnostics(&self) -> Vec<(Resource, Vec<Diagnostic>)> {
        self.diagnostics.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_resources_splits_diffs_and_dedupes() {
        let a = Resource::new("/ws/a.rs");
        let b = Resource::new("/ws/b.rs");
        let c = Resource::new("/ws/c.rs");
        let tabs = vec![
            OpenTab::Text(a.clone()),
            OpenTab::Diff {
                original: b.clone(),
                modified: a.clone(),
            },
            OpenTab::Text(c.clone()),
            OpenTab::Text(b.clone()),
        ];
        assert_eq!(open_resources(&tabs), vec![a, b, c]);
    }

    #[test]
    fn test_read_document_and_stat() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/app.py"), "print('hi')\n").unwrap();

        let host = LocalHost::new(Some(dir.path().to_path_buf()));
        let res = host.resource("src/app.py");
        let doc = host.read_document(&res).unwrap();
        assert_eq!(doc.language_id, "python");
        assert_eq!(doc.text, "print('hi')\n");

        assert_eq!(host.stat(&res), Some(FileKind::File));
        assert_eq!(host.stat(&host.resource("src")), Some(FileKind::Directory));
        assert_eq!(host.stat(&host.resource("missing.txt")), None);
        assert!(host.read_document(&host.resource("missing.txt")).is_err());
        assert_eq!(host.relative_path(&res), "src/app.py");
    }

    #[test]
    fn test_read_document_decodes_invalid_utf8() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("latin1.txt"), b"caf\xe9\n").unwrap();

        let host = LocalHost::new(Some(dir.path().to_path_buf()));
        let doc = host.read_document(&host.resource("latin1.txt")).unwrap();
        assert_eq!(doc.text, "caf\u{FFFD}\n");
    }

    #[test]
    fn test_workspace_name() {
        let host = LocalHost::new(Some(PathBuf::from("/home/me/project")));
        assert_eq!(host.workspace_name().as_deref(), Some("project"));
        assert_eq!(LocalHost::new(None).workspace_name(), None);
        assert!(LocalHost::new(None).find_files(&Settings::default()).is_empty());
    }
}
