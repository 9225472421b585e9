/*!
 * Command surface
 *
 * Each command gathers its targets from the host, runs them through the
 * formatters and returns an [`Outcome`]. Unmet preconditions are notices,
 * not errors. Delivering the text is left to [`deliver`].
 */

use std::fs;

use crate::clipboard::Clipboard;
use crate::config::{CommandKind, Settings, WORKSPACE_SETTINGS_FILE};
use crate::diagnostics::{group_diagnostics, render_problems};
use crate::document::{build_markdown_doc, workspace_tree};
use crate::error::{Result, ResultExt};
use crate::fence::{build_fence, FenceWrapper};
use crate::host::Host;
use crate::types::{FileKind, Resource};
use crate::utils::unique;

pub const NO_ACTIVE_EDITOR: &str = "No active editor.";
pub const NO_OPEN_EDITORS: &str = "No open editors.";
pub const NO_FILES_SELECTED: &str = "No files selected.";
pub const NO_REGULAR_FILES: &str = "No regular files selected.";
pub const NO_WORKSPACE: &str = "Open a workspace first.";

/// A fenced block and the file it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopiedBlock {
    /// Display path of the source
    pub path: String,
    /// Rendered block
    pub text: String,
}

/// Text ready for the clipboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Copied {
    /// Full clipboard text
    pub text: String,
    /// Status line shown after copying
    pub status: &'static str,
    /// Per-file blocks contained in `text`
    pub blocks: Vec<CopiedBlock>,
}

/// Result of running a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Text to place on the clipboard
    Copied(Copied),
    /// Precondition not met, nothing copied
    Notice(&'static str),
    /// Text to show the user directly
    Shown(String),
}

impl Outcome {
    fn copied(text: String, status: &'static str, blocks: Vec<CopiedBlock>) -> Self {
        Self::Copied(Copied { text, status, blocks })
    }

    /// Clipboard text, if any
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Copied(c) => Some(&c.text),
            _ => None,
        }
    }
}

/// Runs commands against a host with fixed settings
pub struct Commands<'a> {
    host: &'a dyn Host,
    settings: &'a Settings,
}

impl<'a> Commands<'a> {
    pub fn new(host: &'a dyn Host, settings: &'a Settings) -> Self {
        Self { host, settings }
    }

    /// Dispatch a parsed command
    pub fn run(&self, command: &CommandKind) -> Result<Outcome> {
        tracing::info!(?command, "running command");
        match command {
            CommandKind::File => self.copy_current_file(),
            CommandKind::Selection => self.copy_selection(),
            CommandKind::OpenEditors => self.copy_open_editors(),
            CommandKind::Files { paths } => self.copy_selected_files(&self.resources(paths)),
            CommandKind::Tree => Ok(self.copy_project_tree()),
            CommandKind::Doc { paths } => {
                let selected = self.resources(paths);
                let selected = (!selected.is_empty()).then_some(selected.as_slice());
                self.copy_markdown_doc(selected)
            }
            CommandKind::Settings { init } => self.open_settings(*init),
            CommandKind::Problems => Ok(self.copy_all_problems()),
            CommandKind::FileWithProblems => self.copy_current_file_with_problems(),
            CommandKind::OpenEditorsWithProblems => self.copy_open_editors_with_problems(),
        }
    }

    fn resources(&self, paths: &[String]) -> Vec<Resource> {
        paths
            .iter()
            .map(|p| Resource::resolve(self.host.workspace_root(), p))
            .collect()
    }

    fn fence_for(&self, resource: &Resource) -> Result<CopiedBlock> {
        let doc = self.host.read_document(resource)?;
        Ok(CopiedBlock {
            path: self.host.relative_path(resource),
            text: build_fence(&doc, None, self.host.workspace_root(), self.settings),
        })
    }

    fn fences_for(&self, resources: &[Resource]) -> Result<Vec<CopiedBlock>> {
        unique(resources).iter().map(|r| self.fence_for(r)).collect()
    }

    fn problems_for(&self, filter: Option<&[Resource]>) -> String {
        let groups = group_diagnostics(self.host.diagnostics());
        render_problems(&groups, filter, |r| self.host.relative_path(r))
    }

    /// Copy the active file
    pub fn copy_current_file(&self) -> Result<Outcome> {
        let Some(active) = self.host.active_editor() else {
            return Ok(Outcome::Notice(NO_ACTIVE_EDITOR));
        };
        let block = self.fence_for(active)?;
        Ok(Outcome::copied(
            block.text.clone(),
            "Context Tools: Current file copied.",
            vec![block],
        ))
    }

    /// Copy the selection of the active file, or the whole file when the
    /// selection is empty
    pub fn copy_selection(&self) -> Result<Outcome> {
        let Some(active) = self.host.active_editor() else {
            return Ok(Outcome::Notice(NO_ACTIVE_EDITOR));
        };
        let doc = self.host.read_document(active)?;
        let selection = self.host.selection();
        let text = build_fence(&doc, selection.as_ref(), self.host.workspace_root(), self.settings);
        let block = CopiedBlock {
            path: self.host.relative_path(active),
            text: text.clone(),
        };
        Ok(Outcome::copied(text, "Context Tools: Selection copied.", vec![block]))
    }

    /// Copy every open editor in tab order
    pub fn copy_open_editors(&self) -> Result<Outcome> {
        let open = self.host.open_resources();
        if open.is_empty() {
            return Ok(Outcome::Notice(NO_OPEN_EDITORS));
        }
        let blocks = self.fences_for(&open)?;
        Ok(Outcome::copied(
            join_blocks(&blocks),
            "Context Tools: Open editors copied.",
            blocks,
        ))
    }

    /// Copy explicitly selected files, skipping anything that is not a
    /// regular file
    pub fn copy_selected_files(&self, targets: &[Resource]) -> Result<Outcome> {
        if targets.is_empty() {
            return Ok(Outcome::Notice(NO_FILES_SELECTED));
        }

        let mut blocks = Vec::new();
        for target in unique(targets) {
            match self.host.stat(&target) {
                Some(FileKind::File) => blocks.push(self.fence_for(&target)?),
                kind => tracing::debug!(target = %target, ?kind, "skipping non-regular target"),
            }
        }

        if blocks.is_empty() {
            return Ok(Outcome::Notice(NO_REGULAR_FILES));
        }
        Ok(Outcome::copied(
            join_blocks(&blocks),
            "Context Tools: Selected files copied.",
            blocks,
        ))
    }

    /// Copy the workspace tree inside the configured fence
    pub fn copy_project_tree(&self) -> Outcome {
        let Some(tree) = workspace_tree(self.host, self.settings, false) else {
            return Outcome::Notice(NO_WORKSPACE);
        };
        let text = FenceWrapper::from_settings(self.settings).wrap("", &tree);
        Outcome::copied(text, "Context Tools: Project tree copied.", Vec::new())
    }

    /// Copy the Markdown document
    pub fn copy_markdown_doc(&self, selected: Option<&[Resource]>) -> Result<Outcome> {
        let text = build_markdown_doc(self.host, self.settings, selected)?;
        Ok(Outcome::copied(text, "Context Tools: Markdown doc copied.", Vec::new()))
    }

    /// Show the effective settings; with `init`, also write them to the
    /// workspace settings file
    pub fn open_settings(&self, init: bool) -> Result<Outcome> {
        let json = serde_json::to_string_pretty(self.settings)?;

        if init {
            let Some(root) = self.host.workspace_root() else {
                return Ok(Outcome::Notice(NO_WORKSPACE));
            };
            let path = root.join(WORKSPACE_SETTINGS_FILE);
            crate::ensure!(!path.exists(), InvalidArgument, "{} already exists", path.display());
            fs::write(&path, format!("{}\n", json)).with_path(&path)?;
            tracing::info!(path = %path.display(), "wrote settings file");
        }

        Ok(Outcome::Shown(json))
    }

    /// Copy the problems report for every file
    pub fn copy_all_problems(&self) -> Outcome {
        Outcome::copied(
            self.problems_for(None),
            "Context Tools: Problems (all) copied.",
            Vec::new(),
        )
    }

    /// Copy the active file followed by its problems
    pub fn copy_current_file_with_problems(&self) -> Result<Outcome> {
        let Some(active) = self.host.active_editor() else {
            return Ok(Outcome::Notice(NO_ACTIVE_EDITOR));
        };
        let block = self.fence_for(active)?;
        let problems = self.problems_for(Some(std::slice::from_ref(active)));
        Ok(Outcome::copied(
            format!("{}\n\n{}", block.text, problems),
            "Context Tools: Current file + problems copied.",
            vec![block],
        ))
    }

    /// Copy every open editor followed by their problems
    pub fn copy_open_editors_with_problems(&self) -> Result<Outcome> {
        let open = self.host.open_resources();
        if open.is_empty() {
            return Ok(Outcome::Notice(NO_OPEN_EDITORS));
        }
        let blocks = self.fences_for(&open)?;
        let problems = self.problems_for(Some(&open));
        Ok(Outcome::copied(
            format!("{}\n\n{}", join_blocks(&blocks), problems),
            "Context Tools: Open editors + problems copied.",
            blocks,
        ))
    }
}

fn join_blocks(blocks: &[CopiedBlock]) -> String {
    blocks
        .iter()
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Hand a copied outcome to the clipboard; other outcomes are left to the
/// caller
pub fn deliver(outcome: &Outcome, clipboard: &dyn Clipboard) -> Result<()> {
    if let Outcome::Copied(copied) = outcome {
        clipboard.copy_to_clipboard(&copied.text)?;
        tracing::debug!(chars = copied.text.chars().count(), "copied to clipboard");
    }
    Ok(())
}
