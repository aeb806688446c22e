//! Runtime configuration
//!
//! [`AutomationConfig`] holds the safety settings the dispatcher enforces on
//! every input call. [`Cli`] is the command-line surface of the binary; each
//! flag also reads a `DESKTOP_MCP_*` environment variable so MCP client
//! configs can set options without editing argument lists.

use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::{keys::Key, model::Point, util::detect::paste_modifier_for};

/// Default delay after each input action
pub const DEFAULT_PAUSE: Duration = Duration::from_millis(100);

/// Safety and behavior settings for the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutomationConfig {
    /// Delay after every input-synthesizing operation
    pub pause:             Duration,
    /// Whether the failsafe check runs before input operations
    pub failsafe:          bool,
    /// Cursor positions that abort input while the cursor sits on them
    pub failsafe_points:   Vec<Point>,
    /// Whether the clipboard is restored after pasting non-ASCII text
    pub restore_clipboard: bool,
    /// Modifier held with `v` to paste
    pub paste_modifier:    Key,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            pause:             DEFAULT_PAUSE,
            failsafe:          true,
            failsafe_points:   vec![Point::new(0, 0)],
            restore_clipboard: false,
            paste_modifier:    paste_modifier_for(std::env::consts::OS),
        }
    }
}

impl AutomationConfig {
    /// Sets the post-action pause
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Enables or disables the failsafe check
    pub fn with_failsafe(mut self, enabled: bool) -> Self {
        self.failsafe = enabled;
        self
    }

    /// Replaces the failsafe points
    pub fn with_failsafe_points(mut self, points: Vec<Point>) -> Self {
        self.failsafe_points = points;
        self
    }

    /// Enables or disables clipboard restoration after paste
    pub fn with_restore_clipboard(mut self, enabled: bool) -> Self {
        self.restore_clipboard = enabled;
        self
    }

    /// Sets the paste modifier (`cmd` on macOS, `ctrl` elsewhere)
    pub fn with_paste_modifier(mut self, key: Key) -> Self {
        self.paste_modifier = key;
        self
    }

    /// Returns true if the failsafe is armed and `point` is a failsafe point
    pub fn is_failsafe_point(&self, point: Point) -> bool {
        self.failsafe && self.failsafe_points.contains(&point)
    }
}

/// Which automation backend the server drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// Real mouse, keyboard and screen (enigo + xcap)
    Os,
    /// In-memory recording backend; nothing reaches the OS
    Mock,
}

/// Log output format on stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

/// desktop-mcp: MCP server for desktop control over stdio
#[derive(Debug, Parser)]
#[command(name = "desktop-mcp", version)]
#[command(about = "MCP server for desktop control: mouse, keyboard, screenshots, and screen info")]
pub struct Cli {
    /// Delay after each input action, in milliseconds
    #[arg(long, env = "DESKTOP_MCP_PAUSE_MS", default_value_t = 100)]
    pub pause_ms: u64,

    /// Disable the top-left corner failsafe
    #[arg(long, env = "DESKTOP_MCP_NO_FAILSAFE")]
    pub no_failsafe: bool,

    /// Restore the previous clipboard text after typing non-ASCII text
    #[arg(long, env = "DESKTOP_MCP_RESTORE_CLIPBOARD")]
    pub restore_clipboard: bool,

    /// Automation backend
    #[arg(long, env = "DESKTOP_MCP_BACKEND", value_enum, default_value_t = BackendKind::Os)]
    pub backend: BackendKind,

    /// Log output format
    #[arg(long, env = "DESKTOP_MCP_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Cli {
    /// Builds the dispatcher configuration from the parsed flags
    pub fn to_config(&self) -> AutomationConfig {
        AutomationConfig::default()
            .with_pause(Duration::from_millis(self.pause_ms))
            .with_failsafe(!self.no_failsafe)
            .with_restore_clipboard(self.restore_clipboard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AutomationConfig::default();
        assert_eq!(config.pause, Duration::from_millis(100));
        assert!(config.failsafe);
        assert_eq!(config.failsafe_points, vec![Point::new(0, 0)]);
        assert!(!config.restore_clipboard);
    }

    #[test]
    fn test_failsafe_point_detection() {
        let config = AutomationConfig::default();
        assert!(config.is_failsafe_point(Point::new(0, 0)));
        assert!(!config.is_failsafe_point(Point::new(1, 0)));

        let disabled = config.with_failsafe(false);
        assert!(!disabled.is_failsafe_point(Point::new(0, 0)));
    }

    #[test]
    fn test_custom_failsafe_points() {
        let config = AutomationConfig::default()
            .with_failsafe_points(vec![Point::new(1919, 0), Point::new(0, 1079)]);
        assert!(config.is_failsafe_point(Point::new(1919, 0)));
        assert!(!config.is_failsafe_point(Point::new(0, 0)));
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["desktop-mcp"]).unwrap();
        assert_eq!(cli.pause_ms, 100);
        assert_eq!(cli.backend, BackendKind::Os);
        assert_eq!(cli.log_format, LogFormat::Text);

        let config = cli.to_config();
        assert!(config.failsafe);
        assert!(!config.restore_clipboard);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "desktop-mcp",
            "--pause-ms",
            "0",
            "--no-failsafe",
            "--restore-clipboard",
            "--backend",
            "mock",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.backend, BackendKind::Mock);
        assert_eq!(cli.log_format, LogFormat::Json);

        let config = cli.to_config();
        assert_eq!(config.pause, Duration::ZERO);
        assert!(!config.failsafe);
        assert!(config.restore_clipboard);
    }

    #[test]
    fn test_cli_rejects_unknown_backend() {
        assert!(Cli::try_parse_from(["desktop-mcp", "--backend", "x11"]).is_err());
    }
}
