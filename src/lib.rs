/*!
 * ctxtools - Copy source files, selections, project trees and diagnostics as
 * Markdown context
 *
 * Formats workspace content into fenced Markdown blocks, ready to paste into
 * a conversation with a Large Language Model.
 */

pub mod clipboard;
pub mod commands;
pub mod config;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod fence;
pub mod host;
pub mod imports;
pub mod language;
pub mod report;
pub mod scanner;
pub mod tree;
pub mod types;
pub mod utils;


// Re-export main components for easier access
pub use commands::{Commands, Outcome};
pub use config::{Config, Settings};
pub use error::{CtxError, Result};
pub use fence::build_fence;
pub use host::{Host, LocalHost};
pub use imports::strip_imports;
pub use report::{CopyReport, ReportFormat, Reporter};
pub use scanner::Scanner;
pub use tree::build_tree_text;
pub use types::{OpenTab, Resource, Selection, TextDocument};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
