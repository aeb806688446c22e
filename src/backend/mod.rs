//! Automation backends
//!
//! This module provides the capability traits the dispatcher drives, the
//! [`DesktopBackend`] composite that bundles them, and the implementations:
//!
//! - [`MockBackend`]: in-memory recording backend for tests and dry runs
//! - [`clipboard::ShellClipboard`]: `pbcopy` / `clip` / `xclip` clipboard
//! - `os::OsBackend`: `enigo` input + `xcap` capture (feature `os-backend`)

use std::sync::Arc;

use crate::{
    error::{AutomationError, AutomationResult},
    model::{PlatformInfo, ScreenRegion},
    util::{detect::clipboard_tool_for, image_buffer::PixelRect},
};

pub mod clipboard;
pub mod composite;
pub mod mock;
#[cfg(feature = "os-backend")]
pub mod os;
pub mod traits;

pub use composite::{DesktopBackend, composite_from_mock};
pub use mock::{InputEvent, MockBackend};
#[cfg(feature = "os-backend")]
pub use os::OsBackend;
pub use traits::{Clipboard, InputDriver, ScreenCapture};

/// Selects the clipboard implementation for a platform.
///
/// Falls back to [`clipboard::UnsupportedClipboard`], which fails every call
/// with `BackendUnavailable`, on platforms without a known utility.
pub fn clipboard_for_platform(platform: &PlatformInfo) -> Arc<dyn Clipboard> {
    match clipboard_tool_for(&platform.os) {
        Some(tool) => Arc::new(clipboard::ShellClipboard::new(tool)),
        None => Arc::new(clipboard::UnsupportedClipboard),
    }
}

/// Creates the real OS backend for the current platform.
#[cfg(feature = "os-backend")]
pub fn create_default_backend(platform: &PlatformInfo) -> AutomationResult<DesktopBackend> {
    let os = Arc::new(OsBackend::new()?);
    Ok(DesktopBackend::new(
        Arc::clone(&os) as Arc<dyn InputDriver>,
        os as Arc<dyn ScreenCapture>,
        clipboard_for_platform(platform),
        "os",
    ))
}

/// Creates the real OS backend for the current platform.
#[cfg(not(feature = "os-backend"))]
pub fn create_default_backend(_platform: &PlatformInfo) -> AutomationResult<DesktopBackend> {
    Err(AutomationError::backend_unavailable(
        "startup",
        "os-backend",
        "this build was compiled without the os-backend feature; use --backend mock",
    ))
}

/// Converts a logical-pixel region into a pixel rectangle of an image
/// captured at `scale` physical pixels per logical pixel.
pub fn region_to_pixels(region: ScreenRegion, scale: f64) -> AutomationResult<PixelRect> {
    if region.is_empty() {
        return Err(AutomationError::invalid_argument(
            "screenshot",
            "region",
            "width and height must be greater than 0",
        ));
    }
    if region.x < 0 || region.y < 0 {
        return Err(AutomationError::invalid_argument(
            "screenshot",
            "region",
            format!("origin ({}, {}) is off screen", region.x, region.y),
        ));
    }

    let to_px = |v: f64| (v * scale).round().clamp(0.0, u32::MAX as f64) as u32;
    Ok(PixelRect {
        x:      to_px(region.x as f64),
        y:      to_px(region.y as f64),
        width:  to_px(region.width as f64).max(1),
        height: to_px(region.height as f64).max(1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DisplayServer;

    #[test]
    fn test_region_to_pixels_identity() {
        let rect = region_to_pixels(ScreenRegion::new(10, 20, 30, 40), 1.0).unwrap();
        assert_eq!(
            rect,
            PixelRect {
                x:      10,
                y:      20,
                width:  30,
                height: 40,
            }
        );
    }

    #[test]
    fn test_region_to_pixels_retina() {
        let rect = region_to_pixels(ScreenRegion::new(10, 20, 30, 40), 2.0).unwrap();
        assert_eq!((rect.x, rect.y, rect.width, rect.height), (20, 40, 60, 80));
    }

    #[test]
    fn test_region_to_pixels_rejects_negative_and_empty() {
        assert!(region_to_pixels(ScreenRegion::new(-1, 0, 10, 10), 1.0).is_err());
        assert!(region_to_pixels(ScreenRegion::new(0, 0, 0, 10), 1.0).is_err());
    }

    #[test]
    fn test_clipboard_for_unknown_platform() {
        let clipboard = clipboard_for_platform(&PlatformInfo::new("unknown", DisplayServer::None));
        assert_eq!(clipboard.name(), "none");
    }

    #[test]
    fn test_clipboard_for_linux_is_xclip() {
        let clipboard = clipboard_for_platform(&PlatformInfo::new("linux", DisplayServer::X11));
        assert_eq!(clipboard.name(), "xclip");
    }
}
