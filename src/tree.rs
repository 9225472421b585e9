/*!
 * Project tree building and rendering
 *
 * Relative paths are folded into a tree of owned nodes and drawn with
 * box-drawing glyphs, directories first.
 */

use std::collections::BTreeMap;

use crate::utils::locale_cmp;

const BRANCH: &str = "├─ ";
const LAST_BRANCH: &str = "└─ ";
const PIPE: &str = "│  ";
const SPACE: &str = "   ";

/// A directory in the rendered tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeNode {
    /// Directory name
    pub name: String,
    /// Child directories by name
    pub dirs: BTreeMap<String, TreeNode>,
    /// File names directly inside this directory
    pub files: Vec<String>,
}

impl TreeNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Insert a slash-separated relative path.
    ///
    /// Components deeper than `max_depth` are dropped; intermediate
    /// directories are created on demand.
    pub fn add_path(&mut self, rel_path: &str, max_depth: usize) {
        let parts: Vec<&str> = rel_path.split('/').filter(|p| !p.is_empty()).collect();
        let mut node = self;

        for (idx, part) in parts.iter().enumerate() {
            if idx + 1 > max_depth {
                break;
            }
            if idx + 1 == parts.len() {
                if !node.files.iter().any(|f| f == part) {
                    node.files.push(part.to_string());
                }
            } else {
                node = node
                    .dirs
                    .entry(part.to_string())
                    .or_insert_with(|| TreeNode::new(*part));
            }
        }
    }

    /// Render the children of this node, one line per entry
    pub fn render(&self) -> Vec<String> {
        let mut lines = Vec::new();
        self.render_into("", &mut lines);
        lines
    }

    fn render_into(&self, prefix: &str, lines: &mut Vec<String>) {
        let mut dir_names: Vec<&String> = self.dirs.keys().collect();
        dir_names.sort_by(|a, b| locale_cmp(a, b));
        let mut file_names: Vec<&String> = self.files.iter().collect();
        file_names.sort_by(|a, b| locale_cmp(a, b));

        let total = dir_names.len() + file_names.len();
        let entries = dir_names
            .into_iter()
            .map(|n| (n, true))
            .chain(file_names.into_iter().map(|n| (n, false)));

        for (idx, (name, is_dir)) in entries.enumerate() {
            let is_last = idx + 1 == total;
            let branch = if is_last { LAST_BRANCH } else { BRANCH };
            lines.push(format!("{}{}{}", prefix, branch, name));

            if is_dir {
                if let Some(child) = self.dirs.get(name) {
                    let next = format!("{}{}", prefix, if is_last { SPACE } else { PIPE });
                    child.render_into(&next, lines);
                }
            }
        }
    }
}

/// Render a tree for `rel_paths` under a root label
pub fn build_tree_text<S: AsRef<str>>(root_name: &str, rel_paths: &[S], max_depth: usize) -> String {
    let mut root = TreeNode::new(root_name);
    for rel in rel_paths {
        root.add_path(rel.as_ref(), max_depth);
    }

    let mut lines = vec![root_name.to_string()];
    lines.extend(root.render());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_before_files() {
        let tree = build_tree_text("proj", &["a/b.txt", "a/c/d.txt", "e.txt"], usize::MAX);
        assert_eq!(
            tree,
            ["proj", "├─ a", "│  ├─ c", "│  │  └─ d.txt", "│  └─ b.txt", "└─ e.txt"].join("\n")
        );
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let a = build_tree_text("r", &["src/z.rs", "src/A.rs", "README.md", "src/a.rs", "docs/x.md"], 8);
        let b = build_tree_text("r", &["docs/x.md", "src/a.rs", "README.md", "src/A.rs", "src/z.rs"], 8);
        assert_eq!(a, b);
        assert_eq!(
            a,
            [
                "r",
                "├─ docs",
                "│  └─ x.md",
                "├─ src",
                "│  ├─ a.rs",
                "│  ├─ A.rs",
                "│  └─ z.rs",
                "└─ README.md",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_depth_limit_truncates() {
        let tree = build_tree_text("r", &["a/b/c/d.txt", "top.txt"], 2);
        assert_eq!(tree, ["r", "├─ a", "│  └─ b", "└─ top.txt"].join("\n"));

        let tree = build_tree_text("r", &["a/b.txt"], 0);
        assert_eq!(tree, "r");
    }

    #[test]
    fn test_empty_segments_and_duplicates() {
        let tree = build_tree_text("r", &["/a//b.txt", "a/b.txt", ""], 8);
        assert_eq!(tree, ["r", "└─ a", "   └─ b.txt"].join("\n"));
    }
}
