//! Composite backend bundling the capability trait objects
//!
//! The dispatcher never talks to a concrete backend. It holds a
//! [`DesktopBackend`] whose fields are the capabilities it needs, so a test
//! can pair the mock input driver with a real shell clipboard, or the OS
//! input driver with a mock clipboard.

use std::sync::Arc;

use super::{Clipboard, InputDriver, MockBackend, ScreenCapture};

/// Composite backend holding one trait object per capability.
pub struct DesktopBackend {
    /// Mouse/keyboard synthesis and cursor/screen queries.
    pub input: Arc<dyn InputDriver>,

    /// Screen capture.
    pub capture: Arc<dyn ScreenCapture>,

    /// Clipboard staging for non-ASCII text entry.
    pub clipboard: Arc<dyn Clipboard>,

    /// Backend name for diagnostics ("os", "mock").
    pub name: &'static str,
}

impl DesktopBackend {
    /// Creates a new DesktopBackend from its capabilities.
    pub fn new(
        input: Arc<dyn InputDriver>,
        capture: Arc<dyn ScreenCapture>,
        clipboard: Arc<dyn Clipboard>,
        name: &'static str,
    ) -> Self {
        Self {
            input,
            capture,
            clipboard,
            name,
        }
    }

    /// Returns a copy of this backend with a different clipboard.
    pub fn with_clipboard(self, clipboard: Arc<dyn Clipboard>) -> Self {
        Self { clipboard, ..self }
    }
}

impl std::fmt::Debug for DesktopBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DesktopBackend")
            .field("name", &self.name)
            .field("clipboard", &self.clipboard.name())
            .finish()
    }
}

/// Wraps a [`MockBackend`] so it serves every capability.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use desktop_mcp::backend::{MockBackend, composite_from_mock};
///
/// let mock = Arc::new(MockBackend::new());
/// let backend = composite_from_mock(Arc::clone(&mock));
/// assert_eq!(backend.name, "mock");
/// ```
pub fn composite_from_mock(mock: Arc<MockBackend>) -> DesktopBackend {
    DesktopBackend::new(
        Arc::clone(&mock) as Arc<dyn InputDriver>,
        Arc::clone(&mock) as Arc<dyn ScreenCapture>,
        mock as Arc<dyn Clipboard>,
        "mock",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::clipboard::UnsupportedClipboard;

    #[test]
    fn test_composite_from_mock() {
        let backend = composite_from_mock(Arc::new(MockBackend::new()));
        assert_eq!(backend.name, "mock");
        assert_eq!(backend.clipboard.name(), "mock");
    }

    #[test]
    fn test_with_clipboard_replaces_only_clipboard() {
        let backend = composite_from_mock(Arc::new(MockBackend::new()))
            .with_clipboard(Arc::new(UnsupportedClipboard));
        assert_eq!(backend.name, "mock");
        assert_eq!(backend.clipboard.name(), "none");

        let debug = format!("{:?}", backend);
        assert!(debug.contains("DesktopBackend"));
    }
}
