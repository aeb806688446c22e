//! Clipboard access through platform shell utilities
//!
//! Non-ASCII text cannot be typed reliably with synthesized key events, so it
//! is staged on the clipboard and pasted. Staging shells out to the
//! utility every desktop already ships with:
//!
//! | OS      | write              | read                              |
//! |---------|--------------------|-----------------------------------|
//! | macOS   | `pbcopy`           | `pbpaste`                         |
//! | Windows | `clip` (UTF-16LE)  | `powershell -Command Get-Clipboard` |
//! | Linux   | `xclip -selection clipboard` | `xclip -selection clipboard -o` |
//!
//! A missing utility is reported as `BackendUnavailable`, never a panic.

use std::{io::ErrorKind as IoErrorKind, process::Stdio};

use async_trait::async_trait;
use tokio::{io::AsyncWriteExt, process::Command};

use super::Clipboard;
use crate::error::{AutomationError, AutomationResult};

/// Clipboard utility family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardTool {
    /// macOS `pbcopy` / `pbpaste`
    Pbcopy,
    /// Windows `clip.exe` / PowerShell `Get-Clipboard`
    Clip,
    /// X11 `xclip`
    Xclip,
}

impl ClipboardTool {
    /// Returns the utility name as reported in errors
    pub fn name(&self) -> &'static str {
        match self {
            ClipboardTool::Pbcopy => "pbcopy",
            ClipboardTool::Clip => "clip",
            ClipboardTool::Xclip => "xclip",
        }
    }

    /// Default command that writes stdin to the clipboard
    pub fn write_command(&self) -> ShellCommand {
        match self {
            ClipboardTool::Pbcopy => ShellCommand::new("pbcopy", &[]),
            ClipboardTool::Clip => ShellCommand::new("clip", &[]),
            ClipboardTool::Xclip => ShellCommand::new("xclip", &["-selection", "clipboard"]),
        }
    }

    /// Default command that prints the clipboard to stdout
    pub fn read_command(&self) -> ShellCommand {
        match self {
            ClipboardTool::Pbcopy => ShellCommand::new("pbpaste", &[]),
            ClipboardTool::Clip => {
                ShellCommand::new("powershell", &["-NoProfile", "-Command", "Get-Clipboard"])
            }
            ClipboardTool::Xclip => {
                ShellCommand::new("xclip", &["-selection", "clipboard", "-o"])
            }
        }
    }

    /// Encodes text the way the write utility expects it on stdin
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            // clip.exe reads the console code page unless given UTF-16LE
            ClipboardTool::Clip => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
            ClipboardTool::Pbcopy | ClipboardTool::Xclip => text.as_bytes().to_vec(),
        }
    }
}

/// A program plus its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    /// Executable name or path
    pub program: String,
    /// Arguments
    pub args:    Vec<String>,
}

impl ShellCommand {
    /// Creates a new ShellCommand
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args:    args.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).kill_on_drop(true);
        command
    }
}

/// Clipboard backed by a platform shell utility
#[derive(Debug, Clone)]
pub struct ShellClipboard {
    tool:  ClipboardTool,
    write: ShellCommand,
    read:  ShellCommand,
}

impl ShellClipboard {
    /// Creates a clipboard using the tool's default commands
    pub fn new(tool: ClipboardTool) -> Self {
        Self {
            tool,
            write: tool.write_command(),
            read: tool.read_command(),
        }
    }

    /// Creates a clipboard with explicit commands, keeping the tool's
    /// encoding and error naming
    pub fn with_commands(tool: ClipboardTool, write: ShellCommand, read: ShellCommand) -> Self {
        Self { tool, write, read }
    }

    fn spawn_error(&self, operation: &str, command: &ShellCommand, e: std::io::Error) -> AutomationError {
        if e.kind() == IoErrorKind::NotFound {
            AutomationError::backend_unavailable(
                operation,
                self.tool.name(),
                format!("'{}' was not found on PATH", command.program),
            )
        } else {
            AutomationError::execution_failed(
                operation,
                format!("failed to run '{}': {}", command.program, e),
            )
        }
    }
}

#[async_trait]
impl Clipboard for ShellClipboard {
    fn name(&self) -> &str {
        self.tool.name()
    }

    async fn write_text(&self, text: &str) -> AutomationResult<()> {
        const OP: &str = "write_clipboard";
        tracing::debug!("Staging {} chars via {}", text.chars().count(), self.write.program);

        // xclip forks a daemon that keeps inherited pipes open; only stdin is
        // piped so waiting on the child cannot hang on stdout/stderr.
        let mut child = self
            .write
            .command()
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| self.spawn_error(OP, &self.write, e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&self.tool.encode(text))
                .await
                .map_err(|e| AutomationError::execution_failed(OP, e.to_string()))?;
            stdin
                .shutdown()
                .await
                .map_err(|e| AutomationError::execution_failed(OP, e.to_string()))?;
        }

        let status = child
            .wait()
            .await
            .map_err(|e| AutomationError::execution_failed(OP, e.to_string()))?;

        if status.success() {
            Ok(())
        } else {
            Err(AutomationError::execution_failed(
                OP,
                format!("'{}' exited with {}", self.write.program, status),
            ))
        }
    }

    async fn read_text(&self) -> AutomationResult<String> {
        const OP: &str = "read_clipboard";

        let output = self
            .read
            .command()
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(OP, &self.read, e))?;

        if !output.status.success() {
            return Err(AutomationError::execution_failed(
                OP,
                format!("'{}' exited with {}", self.read.program, output.status),
            ));
        }

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        // Get-Clipboard appends a line terminator
        if self.tool == ClipboardTool::Clip && text.ends_with("\r\n") {
            text.truncate(text.len() - 2);
        }
        Ok(text)
    }
}

/// Clipboard for platforms without a known utility
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedClipboard;

#[async_trait]
impl Clipboard for UnsupportedClipboard {
    fn name(&self) -> &str {
        "none"
    }

    async fn write_text(&self, _text: &str) -> AutomationResult<()> {
        Err(AutomationError::backend_unavailable(
            "write_clipboard",
            "clipboard",
            format!("no clipboard utility is known for '{}'", std::env::consts::OS),
        ))
    }

    async fn read_text(&self) -> AutomationResult<String> {
        Err(AutomationError::backend_unavailable(
            "read_clipboard",
            "clipboard",
            format!("no clipboard utility is known for '{}'", std::env::consts::OS),
        ))
    }
}
