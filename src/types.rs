/*!
 * Core types shared by the formatters and the host
 */

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identity of a file-like unit (an open editor or an on-disk file)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Resource(PathBuf);

impl Resource {
    /// Wrap a path as a resource
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Resolve a user-supplied path against an optional base directory
    pub fn resolve(base: Option<&Path>, raw: &str) -> Self {
        let path = PathBuf::from(raw);
        match base {
            Some(base) if path.is_relative() => Self(base.join(path)),
            _ => Self(path),
        }
    }

    /// Underlying path
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Kind of entry behind a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Anything else (sockets, devices, ...)
    Other,
}

/// An editor tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenTab {
    /// Plain text editor
    Text(Resource),
    /// Side-by-side diff editor
    Diff {
        /// Left-hand side
        original: Resource,
        /// Right-hand side
        modified: Resource,
    },
}

/// Zero-based line/character position
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Position {
    /// Line index
    pub line: usize,
    /// Character index within the line
    pub character: usize,
}

impl Position {
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

/// A range in a document; empty means "no selection"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    /// Anchor position
    pub start: Position,
    /// Active position
    pub end: Position,
}

impl Selection {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Whether the selection covers nothing
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Start and end in document order
    pub fn ordered(&self) -> (Position, Position) {
        if self.start <= self.end {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        }
    }
}

/// Parses `LINE`, `START-END` (whole lines) or `L:C-L:C`, all 1-based
impl FromStr for Selection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        fn number(part: &str) -> Result<usize, String> {
            let n: usize = part
                .trim()
                .parse()
                .map_err(|_| format!("invalid number '{}'", part.trim()))?;
            if n == 0 {
                return Err("positions are 1-based".to_string());
            }
            Ok(n - 1)
        }

        fn position(part: &str) -> Result<Option<Position>, String> {
            match part.split_once(':') {
                Some((line, col)) => Ok(Some(Position::new(number(line)?, number(col)?))),
                None => Ok(None),
            }
        }

        let (from, to) = s.split_once('-').unwrap_or((s, s));
        match (position(from)?, position(to)?) {
            (Some(start), Some(end)) => Ok(Self::new(start, end)),
            (None, None) => {
                let first = number(from)?;
                let last = number(to)?;
                Ok(Self::new(
                    Position::new(first.min(last), 0),
                    Position::new(first.max(last), usize::MAX),
                ))
            }
            _ => Err(format!("cannot mix line and line:column forms in '{}'", s)),
        }
    }
}

/// A document as read from the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDocument {
    /// Where the text came from
    pub resource: Resource,
    /// Editor language identifier (`rust`, `typescript`, ...)
    pub language_id: String,
    /// Full text
    pub text: String,
}

impl TextDocument {
    /// Text covered by the selection, or everything when the selection is empty
    pub fn text_in(&self, selection: Option<&Selection>) -> &str {
        match selection {
            Some(sel) if !sel.is_empty() => {
                let (start, end) = sel.ordered();
                let from = self.offset_at(start);
                let to = self.offset_at(end).max(from);
                &self.text[from..to]
            }
            _ => &self.text,
        }
    }

    /// Byte offset of a position, clamped to the document
    fn offset_at(&self, pos: Position) -> usize {
        let mut line_start = 0;
        for (idx, line) in self.text.split_inclusive('\n').enumerate() {
            if idx == pos.line {
                let content = line.trim_end_matches(&['\r', '\n'][..]);
                return line_start
                    + content
                        .char_indices()
                        .nth(pos.character)
                        .map_or(content.len(), |(i, _)| i);
            }
            line_start += line.len();
        }
        self.text.len()
    }
}
