//! Platform detection for desktop-mcp
//!
//! Detects the operating system and display server at runtime, and selects
//! the platform conventions that depend on them: which shell utility stages
//! clipboard text and which modifier triggers paste.

use std::env;

use crate::{
    backend::clipboard::ClipboardTool,
    keys::Key,
    model::{DisplayServer, PlatformInfo},
};

/// Detects the current platform and display server
///
/// On Linux `$WAYLAND_DISPLAY` takes precedence over `$DISPLAY`; empty values
/// count as unset. Windows and macOS always report their native display.
///
/// # Examples
///
/// ```
/// use desktop_mcp::util::detect::detect_platform;
///
/// let platform = detect_platform();
/// println!("Running on: {} ({})", platform.os, platform.display);
/// ```
pub fn detect_platform() -> PlatformInfo {
    detect_platform_with_env(|key| env::var(key).ok())
}

/// Platform detection with an injectable environment provider
fn detect_platform_with_env<F>(_env_provider: F) -> PlatformInfo
where
    F: Fn(&str) -> Option<String>,
{
    #[cfg(target_os = "linux")]
    {
        PlatformInfo::new("linux", detect_linux_display(&_env_provider))
    }

    #[cfg(target_os = "windows")]
    {
        PlatformInfo::new("windows", DisplayServer::Windows)
    }

    #[cfg(target_os = "macos")]
    {
        PlatformInfo::new("macos", DisplayServer::MacOS)
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
    {
        PlatformInfo::new("unknown", DisplayServer::None)
    }
}

#[cfg(target_os = "linux")]
fn detect_linux_display<F>(env_provider: &F) -> DisplayServer
where
    F: Fn(&str) -> Option<String>,
{
    let is_set = |key: &str| env_provider(key).is_some_and(|value| !value.is_empty());

    if is_set("WAYLAND_DISPLAY") {
        DisplayServer::Wayland
    } else if is_set("DISPLAY") {
        DisplayServer::X11
    } else {
        DisplayServer::None
    }
}

/// Selects the clipboard utility for an OS name as reported by
/// [`detect_platform`]
///
/// Returns `None` for platforms without a known utility.
pub fn clipboard_tool_for(os: &str) -> Option<ClipboardTool> {
    match os {
        "macos" => Some(ClipboardTool::Pbcopy),
        "windows" => Some(ClipboardTool::Clip),
        "linux" => Some(ClipboardTool::Xclip),
        _ => None,
    }
}

/// Returns the modifier that, with `v`, pastes on the given OS
pub fn paste_modifier_for(os: &str) -> Key {
    if os == "macos" { Key::Meta } else { Key::Control }
}
