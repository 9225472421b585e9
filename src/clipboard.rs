/*!
 * Clipboard support for ctxtools
 *
 * Text is piped into whichever clipboard command the system provides. When
 * several are available they are tried in order until one succeeds.
 */

use std::env;
use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::sync::OnceLock;

use thiserror::Error;

/// Error type for clipboard operations
#[derive(Error, Debug)]
pub enum ClipboardError {
    /// Failed to execute the command
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// No suitable clipboard mechanism was found
    #[error("No suitable clipboard mechanism found (use --print to write to stdout)")]
    NoClipboardFound,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for clipboard operations
pub type Result<T> = std::result::Result<T, ClipboardError>;

/// Destination for copied text
pub trait Clipboard {
    /// Copy text to the clipboard
    fn copy_to_clipboard(&self, text: &str) -> Result<()>;
}

/// Clipboard commands known to work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardProvider {
    /// tmux paste buffer, forwarded to the terminal clipboard
    Tmux,
    /// Wayland
    Wayland,
    /// X11 via xsel
    Xsel,
    /// X11 via xclip
    Xclip,
    /// macOS
    MacOS,
    /// Windows, including WSL
    Windows,
    /// Termux on Android
    Termux,
}

impl ClipboardProvider {
    /// Program and arguments that read the text from stdin
    pub fn command(self) -> (&'static str, Vec<&'static str>) {
        match self {
            Self::Tmux => ("tmux", vec!["load-buffer", "-w", "-"]),
            Self::Wayland => ("wl-copy", vec![]),
            Self::Xsel => ("xsel", vec!["-b", "-i"]),
            Self::Xclip => ("xclip", vec!["-selection", "clipboard", "-in"]),
            Self::MacOS => ("pbcopy", vec![]),
            Self::Windows => ("clip.exe", vec![]),
            Self::Termux => ("termux-clipboard-set", vec![]),
        }
    }
}

impl Clipboard for ClipboardProvider {
    fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        let (cmd, args) = self.command();
        pipe_to_command(cmd, &args, text)
    }
}

/// The system clipboard, backed by every provider detected on this machine
#[derive(Debug, Clone)]
pub struct SystemClipboard {
    providers: Vec<ClipboardProvider>,
}

impl SystemClipboard {
    /// Detect the available providers
    pub fn detect() -> Result<Self> {
        let providers = determine_clipboard_providers();
        if providers.is_empty() {
            return Err(ClipboardError::NoClipboardFound);
        }
        tracing::debug!(?providers, "clipboard providers");
        Ok(Self { providers })
    }
}

impl Clipboard for SystemClipboard {
    fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        let mut last_err = ClipboardError::NoClipboardFound;
        for provider in &self.providers {
            match provider.copy_to_clipboard(text) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(?provider, error = %e, "clipboard provider failed, trying next");
                    last_err = e;
                }
            }
        }
        Err(last_err)
    }
}

/// Writes the text to stdout instead of a clipboard
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutClipboard;

impl Clipboard for StdoutClipboard {
    fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(text.as_bytes())?;
        if !text.ends_with('\n') {
            out.write_all(b"\n")?;
        }
        out.flush()?;
        Ok(())
    }
}

/// Copy text to the system clipboard
///
/// # Examples
/// ```no_run
/// use ctxtools::clipboard::copy_to_clipboard;
///
/// if let Err(e) = copy_to_clipboard("Hello, clipboard!") {
///     eprintln!("Failed to copy to clipboard: {}", e);
/// }
/// ```
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    SystemClipboard::detect()?.copy_to_clipboard(text)
}

/// Check if a command is on the PATH
pub fn command_exists(command: &str) -> bool {
    env::var_os("PATH")
        .map(|paths| env::split_paths(&paths).any(|dir| dir.join(command).is_file()))
        .unwrap_or(false)
}

fn pipe_to_command(cmd: &str, args: &[&str], text: &str) -> Result<()> {
    let mut child = Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| ClipboardError::CommandFailed(format!("failed to spawn {}: {}", cmd, e)))?;

    let written = match child.stdin.take() {
        // Dropping stdin closes it so the command sees EOF
        Some(mut stdin) => stdin
            .write_all(text.as_bytes())
            .map_err(|e| ClipboardError::CommandFailed(format!("failed to write to {}: {}", cmd, e))),
        None => Err(ClipboardError::CommandFailed(format!(
            "failed to open stdin for {}",
            cmd
        ))),
    };
    if let Err(e) = written {
        let _ = child.kill();
        let _ = child.wait();
        return Err(e);
    }

    let status = child.wait()?;
    if status.success() {
        Ok(())
    } else {
        Err(ClipboardError::CommandFailed(format!(
            "{} exited with status: {}",
            cmd, status
        )))
    }
}

static PLATFORM: OnceLock<&'static str> = OnceLock::new();

fn get_platform() -> &'static str {
    PLATFORM.get_or_init(|| {
        if cfg!(target_os = "macos") {
            "macos"
        } else if cfg!(target_os = "windows") {
            "windows"
        } else if cfg!(target_os = "android") {
            "android"
        } else if cfg!(target_os = "linux") {
            if env::var("WSL_DISTRO_NAME").is_ok() {
                "wsl"
            } else {
                "linux"
            }
        } else {
            "unknown"
        }
    })
}

/// Providers to try, most preferred first
fn determine_clipboard_providers() -> Vec<ClipboardProvider> {
    let mut candidates = Vec::with_capacity(4);

    if env::var("TMUX").is_ok() {
        candidates.push(ClipboardProvider::Tmux);
    }

    match get_platform() {
        "macos" => candidates.push(ClipboardProvider::MacOS),
        "windows" | "wsl" => candidates.push(ClipboardProvider::Windows),
        "android" => candidates.push(ClipboardProvider::Termux),
        "linux" => {
            if env::var("WAYLAND_DISPLAY").is_ok() {
                candidates.push(ClipboardProvider::Wayland);
            }
            candidates.push(ClipboardProvider::Xsel);
            candidates.push(ClipboardProvider::Xclip);
        }
        _ => {}
    }

    candidates
        .into_iter()
        .filter(|p| command_exists(p.command().0))
        .collect()
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn test_command_exists() {
        assert!(command_exists("sh"));
        assert!(!command_exists("nonexistentcommandxyz"));
    }

    #[test]
    fn test_get_platform_is_cached() {
        let platform = get_platform();
        assert!(["macos", "windows", "wsl", "linux", "android", "unknown"].contains(&platform));
        assert_eq!(platform, get_platform());
    }

    #[test]
    fn test_detected_providers_exist() {
        for provider in determine_clipboard_providers() {
            assert!(command_exists(provider.command().0));
        }
    }

    #[test]
    fn test_pipe_to_command() {
        pipe_to_command("sh", &["-c", "cat > /dev/null"], "hello").unwrap();

        let err = pipe_to_command("sh", &["-c", "exit 3"], "").unwrap_err();
        assert!(matches!(err, ClipboardError::CommandFailed(_)));

        let err = pipe_to_command("nonexistentcommandxyz", &[], "x").unwrap_err();
        assert!(matches!(err, ClipboardError::CommandFailed(_)));
    }

    #[test]
    fn test_pipe_to_command_reaps_child_when_write_fails() {
        // The command exits without reading, so a large write hits a broken pipe
        let text = "x".repeat(1 << 22);
        let err = pipe_to_command("sh", &["-c", "exec 0<&-; sleep 5"], &text).unwrap_err();
        assert!(matches!(err, ClipboardError::CommandFailed(ref m) if m.contains("failed to write")));
    }

    #[test]
    #[ignore] // requires a running tmux session
    fn test_tmux_clipboard() {
        if env::var("TMUX").is_err() {
            return;
        }

        let text = "ctxtools tmux clipboard test";
        ClipboardProvider::Tmux.copy_to_clipboard(text).unwrap();

        let output = Command::new("tmux").args(["show-buffer"]).output().unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), text);
    }
}
