/*!
 * Markdown document assembly
 *
 * A document is a title, an optional project tree and one fenced block per
 * file. When no files are selected the `## Files` section is left out.
 */

use crate::config::{IncludeFiles, Settings};
use crate::error::Result;
use crate::fence::build_fence;
use crate::host::Host;
use crate::tree::build_tree_text;
use crate::types::Resource;
use crate::utils::{replace_all_literal, unique};

/// Title used when there is no workspace
pub const DEFAULT_WORKSPACE_NAME: &str = "Workspace";

/// Pick the files for a document according to the inclusion policy
pub fn select_files(mode: IncludeFiles, selected: Option<&[Resource]>, open: &[Resource]) -> Vec<Resource> {
    let selected = selected.filter(|s| !s.is_empty());
    let chosen: &[Resource] = match mode {
        IncludeFiles::SelectedOrOpen => selected.unwrap_or(open),
        IncludeFiles::OpenEditorsOnly => open,
        IncludeFiles::SelectedOnly => selected.unwrap_or(&[]),
    };
    unique(chosen)
}

/// Render the workspace tree.
///
/// With `hide_dotted` set, entries whose relative path starts with `.` are
/// left out. Returns `None` without a workspace.
pub fn workspace_tree(host: &dyn Host, settings: &Settings, hide_dotted: bool) -> Option<String> {
    let root_name = host.workspace_name()?;
    let rels: Vec<String> = host
        .find_files(settings)
        .into_iter()
        .filter(|rel| !rel.is_empty() && !(hide_dotted && rel.starts_with('.')))
        .collect();
    Some(build_tree_text(&root_name, &rels, settings.tree_max_depth()))
}

/// Join the document parts
pub fn assemble(title: &str, tree: Option<&str>, blocks: &[String]) -> String {
    let mut parts = vec![format!("# {}\n", title)];

    if let Some(tree) = tree {
        parts.push(format!("## Project Tree\n\n```\n{}\n```\n", tree));
    }

    if !blocks.is_empty() {
        parts.push("## Files\n".to_string());
        for block in blocks {
            parts.push(block.clone());
            parts.push(String::new());
        }
    }

    format!("{}\n", parts.join("\n").trim())
}

/// Build the full Markdown document for the workspace
pub fn build_markdown_doc(host: &dyn Host, settings: &Settings, selected: Option<&[Resource]>) -> Result<String> {
    let workspace = host
        .workspace_name()
        .unwrap_or_else(|| DEFAULT_WORKSPACE_NAME.to_string());
    let title = replace_all_literal(&settings.doc_title, "${workspace}", &workspace);

    let tree = if settings.doc_include_tree {
        Some(workspace_tree(host, settings, true).unwrap_or_else(|| "(no workspace)".to_string()))
    } else {
        None
    };

    let files = select_files(settings.doc_include_files, selected, &host.open_resources());
    tracing::debug!(files = files.len(), mode = %settings.doc_include_files, "assembling document");

    let mut blocks = Vec::with_capacity(files.len());
    for resource in &files {
        let doc = host.read_document(resource)?;
        blocks.push(build_fence(&doc, None, host.workspace_root(), settings));
    }

    Ok(assemble(&title, tree.as_deref(), &blocks))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn res(name: &str) -> Resource {
        Resource::new(format!("/ws/{}", name))
    }

    #[test]
    fn test_select_files_policies() {
        let open = vec![res("o1"), res("o2"), res("o1")];
        let sel = vec![res("s1"), res("s1"), res("s2")];

        assert_eq!(
            select_files(IncludeFiles::SelectedOrOpen, Some(&sel), &open),
            vec![res("s1"), res("s2")]
        );
        assert_eq!(
            select_files(IncludeFiles::SelectedOrOpen, None, &open),
            vec![res("o1"), res("o2")]
        );
        assert_eq!(
            select_files(IncludeFiles::OpenEditorsOnly, Some(&sel), &open),
            vec![res("o1"), res("o2")]
        );
        assert_eq!(
            select_files(IncludeFiles::SelectedOnly, Some(&sel), &open),
            vec![res("s1"), res("s2")]
        );
        assert!(select_files(IncludeFiles::SelectedOnly, None, &open).is_empty());
    }

    #[test]
    fn test_assemble_layout() {
        let doc = assemble(
            "demo Context",
            Some("demo\n└─ a.rs"),
            &["``` PATH: a.rs\nfn a() {}\n\n```".to_string(), "``` PATH: b.rs\n\n\n```".to_string()],
        );
        assert_eq!(
            doc,
            "# demo Context\n\n## Project Tree\n\n```\ndemo\n└─ a.rs\n```\n\n## Files\n\n``` PATH: a.rs\nfn a() {}\n\n```\n\n``` PATH: b.rs\n\n\n```\n"
        );
    }

    #[test]
    fn test_assemble_without_files_omits_heading() {
        let doc = assemble("T", None, &[]);
        assert_eq!(doc, "# T\n");
        assert!(!doc.contains("## Files"));
    }
}
