//! Global error handling for ctxtools
//!
//! This module provides a centralized error type that can represent errors
//! from all modules in the project.

use std::io;
use thiserror::Error;

use crate::clipboard::ClipboardError;

/// Global error type for ctxtools operations
#[derive(Error, Debug)]
pub enum CtxError {
    /// Clipboard-related errors
    #[error("Clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),

    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON processing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Path not found
    #[error("Path not found: {0}")]
    PathNotFound(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Specialized Result type for ctxtools operations
pub type Result<T> = std::result::Result<T, CtxError>;

/// Creates a CtxError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::CtxError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Attach the offending path to an IO error
    fn with_path<P: AsRef<std::path::Path>>(self, path: P) -> Result<T>;
}

impl<T> ResultExt<T> for std::result::Result<T, io::Error> {
    fn with_path<P: AsRef<std::path::Path>>(self, path: P) -> Result<T> {
        self.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => CtxError::PathNotFound(path.as_ref().display().to_string()),
            _ => CtxError::Io(io::Error::new(
                e.kind(),
                format!("{}: {}", path.as_ref().display(), e),
            )),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_path_maps_not_found() {
        let res: std::result::Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let err = res.with_path("src/missing.rs").unwrap_err();
        assert!(matches!(err, CtxError::PathNotFound(ref p) if p == "src/missing.rs"));
    }

    #[test]
    fn test_ensure_macro() {
        fn check(count: i64) -> Result<i64> {
            crate::ensure!(count > 0, InvalidArgument, "count must be positive, got {}", count);
            Ok(count)
        }

        assert_eq!(check(3).unwrap(), 3);
        let err = check(0).unwrap_err();
        assert_eq!(err.to_string(), "Invalid argument: count must be positive, got 0");
    }
}
