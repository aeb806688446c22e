//! Data models and type definitions for desktop-mcp
//!
//! This module defines the transient, parameter-only types that flow through
//! a single tool call:
//! - Coordinates, screen sizes and capture regions (logical pixels)
//! - Mouse buttons
//! - Screenshot results
//! - Platform detection and health check structures

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A logical-pixel screen coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Point {
    /// Horizontal position, 0 at the left edge
    pub x: i32,
    /// Vertical position, 0 at the top edge
    pub y: i32,
}

impl Point {
    /// Creates a new Point
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns this point shifted by `(dx, dy)`, saturating at the i32 range
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Logical size of the primary screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScreenSize {
    /// Width in logical pixels
    pub width:  u32,
    /// Height in logical pixels
    pub height: u32,
}

impl ScreenSize {
    /// Creates a new ScreenSize
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for ScreenSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Rectangular part of the screen to capture, in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScreenRegion {
    /// Left edge
    pub x:      i32,
    /// Top edge
    pub y:      i32,
    /// Width (must be > 0)
    pub width:  u32,
    /// Height (must be > 0)
    pub height: u32,
}

impl ScreenRegion {
    /// Creates a new ScreenRegion
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns true if width or height is zero
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Mouse button to press
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    /// Primary button
    #[default]
    Left,
    /// Wheel button
    Middle,
    /// Secondary button
    Right,
}

impl MouseButton {
    /// Returns the button name as a lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            MouseButton::Left => "left",
            MouseButton::Middle => "middle",
            MouseButton::Right => "right",
        }
    }
}

impl std::fmt::Display for MouseButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether an input event presses or releases a button/key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Button or key goes down
    Press,
    /// Button or key goes up
    Release,
}

/// An encoded screenshot ready to be returned to the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotResult {
    /// PNG-encoded image bytes
    pub data:        Vec<u8>,
    /// Pixel width of the encoded image
    pub width:       u32,
    /// Pixel height of the encoded image
    pub height:      u32,
    /// Whether linear dimensions were halved before encoding
    pub downscaled:  bool,
    /// Captured region, `None` for the full screen
    pub region:      Option<ScreenRegion>,
    /// RFC 3339 capture timestamp
    pub captured_at: String,
}

impl ScreenshotResult {
    /// Image encoding name
    pub const FORMAT: &'static str = "png";
    /// MIME type of [`ScreenshotResult::data`]
    pub const MIME_TYPE: &'static str = "image/png";

    /// Returns (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Display server the process is running under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DisplayServer {
    /// No display detected
    None,
    /// Wayland compositor (Linux)
    Wayland,
    /// X11 server (Linux)
    X11,
    /// Windows desktop
    Windows,
    /// macOS Quartz
    #[serde(rename = "macos")]
    MacOS,
}

impl DisplayServer {
    /// Returns the display server as a lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayServer::None => "none",
            DisplayServer::Wayland => "wayland",
            DisplayServer::X11 => "x11",
            DisplayServer::Windows => "windows",
            DisplayServer::MacOS => "macos",
        }
    }
}

impl std::fmt::Display for DisplayServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Platform information including OS and display server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PlatformInfo {
    /// Operating system name (e.g., "linux", "windows", "macos")
    pub os:      String,
    /// Detected display server
    pub display: DisplayServer,
}

impl PlatformInfo {
    /// Creates a new PlatformInfo instance
    pub fn new(os: impl Into<String>, display: DisplayServer) -> Self {
        Self {
            os: os.into(),
            display,
        }
    }
}

/// Response structure for the health_check MCP tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HealthCheckResponse {
    /// Platform/OS name
    pub platform:  String,
    /// Display server name
    pub display:   String,
    /// Automation backend name ("os" or "mock")
    pub backend:   String,
    /// Clipboard helper used for non-ASCII typing
    pub clipboard: String,
    /// Whether the failsafe corner is armed
    pub failsafe:  bool,
    /// Whether the server is functioning correctly
    pub ok:        bool,
}
