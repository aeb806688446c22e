//! Capability traits for automation backends
//!
//! Each trait is one capability the dispatcher needs from the OS:
//!
//! - [`InputDriver`]: synthesize mouse and keyboard events, query the cursor
//!   and the screen size
//! - [`ScreenCapture`]: grab the primary screen (or part of it)
//! - [`Clipboard`]: stage text on the system clipboard
//!
//! Real implementations live in [`os`](super::os) and
//! [`clipboard`](super::clipboard); [`MockBackend`](super::MockBackend)
//! implements all three in memory.

use async_trait::async_trait;

use crate::{
    error::AutomationResult,
    keys::Key,
    model::{Direction, MouseButton, Point, ScreenRegion, ScreenSize},
    util::image_buffer::ImageBuffer,
};

/// Capability: synthesize input events.
///
/// All coordinates are logical pixels. Methods are primitive on purpose:
/// a click is `button(Press)` + `button(Release)`, composed by the
/// dispatcher, so ordering is observable in tests.
#[async_trait]
pub trait InputDriver: Send + Sync {
    /// Returns the logical size of the primary screen.
    async fn screen_size(&self) -> AutomationResult<ScreenSize>;

    /// Returns the current cursor position.
    async fn cursor_position(&self) -> AutomationResult<Point>;

    /// Moves the cursor to an absolute position.
    async fn move_cursor(&self, to: Point) -> AutomationResult<()>;

    /// Presses or releases a mouse button at the current position.
    async fn button(&self, button: MouseButton, direction: Direction) -> AutomationResult<()>;

    /// Scrolls the vertical wheel; positive scrolls up, negative down.
    async fn scroll(&self, delta: i32) -> AutomationResult<()>;

    /// Presses or releases a single key.
    async fn key(&self, key: Key, direction: Direction) -> AutomationResult<()>;

    /// Types ASCII text directly.
    async fn text(&self, text: &str) -> AutomationResult<()>;
}

/// Capability: capture the primary screen.
#[async_trait]
pub trait ScreenCapture: Send + Sync {
    /// Captures the full screen, or `region` (logical pixels) of it.
    ///
    /// The image is at native resolution: on a 2x display a 100x100 logical
    /// region yields a 200x200 image.
    async fn capture(&self, region: Option<ScreenRegion>) -> AutomationResult<ImageBuffer>;
}

/// Capability: read and write clipboard text.
#[async_trait]
pub trait Clipboard: Send + Sync {
    /// Name of the utility or implementation, for diagnostics.
    fn name(&self) -> &str;

    /// Replaces the clipboard contents with `text`.
    async fn write_text(&self, text: &str) -> AutomationResult<()>;

    /// Returns the current clipboard text.
    async fn read_text(&self) -> AutomationResult<String>;
}
