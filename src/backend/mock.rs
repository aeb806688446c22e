//! Mock automation backend for testing
//!
//! [`MockBackend`] implements every capability trait in memory. It records
//! each input event in order, so tests can assert on exactly what would have
//! reached the OS, and simulates the cursor, the screen, the clipboard and a
//! 2x-density display.
//!
//! # Examples
//!
//! ```
//! use desktop_mcp::{
//!     backend::{InputDriver, InputEvent, MockBackend},
//!     model::Point,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = MockBackend::new();
//!     backend.move_cursor(Point::new(10, 20)).await.unwrap();
//!
//!     assert_eq!(backend.cursor_position().await.unwrap(), Point::new(10, 20));
//!     assert_eq!(backend.events(), vec![InputEvent::MoveTo(Point::new(10, 20))]);
//! }
//! ```
//!
//! ## With Error Injection
//!
//! ```
//! use desktop_mcp::{
//!     backend::{InputDriver, MockBackend},
//!     error::AutomationError,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let error = AutomationError::backend_unavailable("screen_size", "display", "no display");
//!     let backend = MockBackend::new().with_error(error);
//!
//!     assert!(backend.screen_size().await.is_err());
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::sleep;

use super::{Clipboard, InputDriver, ScreenCapture, region_to_pixels};
use crate::{
    error::{AutomationError, AutomationResult},
    keys::Key,
    model::{Direction, MouseButton, Point, ScreenRegion, ScreenSize},
    util::image_buffer::ImageBuffer,
};

/// Logical screen size of a fresh mock
pub const DEFAULT_SCREEN_SIZE: ScreenSize = ScreenSize::new(1920, 1080);

/// Physical pixels per logical pixel of a fresh mock
pub const DEFAULT_SCALE_FACTOR: u32 = 2;

/// One recorded backend interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Cursor moved to an absolute position (after clamping)
    MoveTo(Point),
    /// Mouse button pressed or released
    Button(MouseButton, Direction),
    /// Wheel scrolled; positive is up
    Scroll(i32),
    /// Key pressed or released
    Key(Key, Direction),
    /// ASCII text typed directly
    Text(String),
    /// Clipboard contents replaced
    ClipboardWrite(String),
    /// Clipboard contents read
    ClipboardRead,
}

#[derive(Debug)]
struct MockState {
    cursor:    Point,
    events:    Vec<InputEvent>,
    clipboard: String,
    moves:     usize,
}

/// In-memory backend implementing [`InputDriver`], [`ScreenCapture`] and
/// [`Clipboard`]
///
/// Thread-safe; share it with `Arc` and keep a handle to inspect
/// [`events`](MockBackend::events) after driving it through a dispatcher.
#[derive(Debug)]
pub struct MockBackend {
    state:                 Mutex<MockState>,
    screen:                ScreenSize,
    scale_factor:          u32,
    delay:                 Option<Duration>,
    error_injection:       Option<AutomationError>,
    failing_key:           Option<Key>,
    failing_moves_after:   Option<usize>,
    clipboard_unavailable: bool,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Creates a mock with a 1920x1080 screen, cursor at the center and an
    /// empty clipboard
    pub fn new() -> Self {
        let screen = DEFAULT_SCREEN_SIZE;
        Self {
            state: Mutex::new(MockState {
                cursor:    Point::new((screen.width / 2) as i32, (screen.height / 2) as i32),
                events:    Vec::new(),
                clipboard: String::new(),
                moves:     0,
            }),
            screen,
            scale_factor: DEFAULT_SCALE_FACTOR,
            delay: None,
            error_injection: None,
            failing_key: None,
            failing_moves_after: None,
            clipboard_unavailable: false,
        }
    }

    /// Sets the logical screen size; the cursor is re-centered
    pub fn with_screen_size(mut self, width: u32, height: u32) -> Self {
        self.screen = ScreenSize::new(width, height);
        self.state.get_mut().cursor = Point::new((width / 2) as i32, (height / 2) as i32);
        self
    }

    /// Sets the number of physical pixels per logical pixel used by capture
    pub fn with_scale_factor(mut self, scale_factor: u32) -> Self {
        self.scale_factor = scale_factor.max(1);
        self
    }

    /// Sleeps before every input and capture call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fails every input and capture call with `error`
    pub fn with_error(mut self, error: AutomationError) -> Self {
        self.error_injection = Some(error);
        self
    }

    /// Fails presses of `key`; releases still succeed
    pub fn with_failing_key(mut self, key: Key) -> Self {
        self.failing_key = Some(key);
        self
    }

    /// Lets the first `count` cursor moves succeed and fails the rest
    pub fn with_failing_moves_after(mut self, count: usize) -> Self {
        self.failing_moves_after = Some(count);
        self
    }

    /// Makes every clipboard call fail with `BackendUnavailable`
    pub fn with_clipboard_unavailable(mut self) -> Self {
        self.clipboard_unavailable = true;
        self
    }

    /// Places the cursor without recording an event, as a human moving the
    /// mouse would
    pub fn set_cursor(&self, point: Point) {
        self.state.lock().cursor = point;
    }

    /// Pre-loads the clipboard without recording an event
    pub fn set_clipboard_text(&self, text: &str) {
        self.state.lock().clipboard = text.to_string();
    }

    /// Returns the recorded events in order
    pub fn events(&self) -> Vec<InputEvent> {
        self.state.lock().events.clone()
    }

    /// Forgets all recorded events
    pub fn clear_events(&self) {
        self.state.lock().events.clear();
    }

    /// Returns the current clipboard contents
    pub fn clipboard_text(&self) -> String {
        self.state.lock().clipboard.clone()
    }

    /// Returns the logical screen size
    pub fn screen(&self) -> ScreenSize {
        self.screen
    }

    async fn simulate(&self) -> AutomationResult<()> {
        if let Some(delay) = self.delay {
            sleep(delay).await;
        }
        match &self.error_injection {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn record(&self, event: InputEvent) {
        self.state.lock().events.push(event);
    }

    fn clamp(&self, point: Point) -> Point {
        let max_x = self.screen.width.saturating_sub(1) as i32;
        let max_y = self.screen.height.saturating_sub(1) as i32;
        Point::new(point.x.clamp(0, max_x), point.y.clamp(0, max_y))
    }

    fn check_clipboard(&self, operation: &str) -> AutomationResult<()> {
        if self.clipboard_unavailable {
            return Err(AutomationError::backend_unavailable(
                operation,
                "clipboard",
                "mock clipboard disabled",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl InputDriver for MockBackend {
    async fn screen_size(&self) -> AutomationResult<ScreenSize> {
        self.simulate().await?;
        Ok(self.screen)
    }

    async fn cursor_position(&self) -> AutomationResult<Point> {
        self.simulate().await?;
        Ok(self.state.lock().cursor)
    }

    async fn move_cursor(&self, to: Point) -> AutomationResult<()> {
        self.simulate().await?;

        let target = self.clamp(to);
        let mut state = self.state.lock();
        if self.failing_moves_after.is_some_and(|limit| state.moves >= limit) {
            return Err(AutomationError::execution_failed(
                "move_cursor",
                format!("injected failure moving to {}", to),
            ));
        }
        state.moves += 1;
        state.cursor = target;
        state.events.push(InputEvent::MoveTo(target));
        Ok(())
    }

    async fn button(&self, button: MouseButton, direction: Direction) -> AutomationResult<()> {
        self.simulate().await?;
        self.record(InputEvent::Button(button, direction));
        Ok(())
    }

    async fn scroll(&self, delta: i32) -> AutomationResult<()> {
        self.simulate().await?;
        self.record(InputEvent::Scroll(delta));
        Ok(())
    }

    async fn key(&self, key: Key, direction: Direction) -> AutomationResult<()> {
        self.simulate().await?;
        if direction == Direction::Press && self.failing_key == Some(key) {
            return Err(AutomationError::execution_failed(
                "key",
                format!("injected failure pressing '{}'", key),
            ));
        }
        self.record(InputEvent::Key(key, direction));
        Ok(())
    }

    async fn text(&self, text: &str) -> AutomationResult<()> {
        self.simulate().await?;
        self.record(InputEvent::Text(text.to_string()));
        Ok(())
    }
}

#[async_trait]
impl ScreenCapture for MockBackend {
    async fn capture(&self, region: Option<ScreenRegion>) -> AutomationResult<ImageBuffer> {
        self.simulate().await?;

        let full = ImageBuffer::from_test_pattern(
            self.screen.width * self.scale_factor,
            self.screen.height * self.scale_factor,
        );
        match region {
            None => Ok(full),
            Some(region) => full.crop(region_to_pixels(region, self.scale_factor as f64)?),
        }
    }
}

#[async_trait]
impl Clipboard for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn write_text(&self, text: &str) -> AutomationResult<()> {
        self.check_clipboard("write_clipboard")?;
        let mut state = self.state.lock();
        state.clipboard = text.to_string();
        state.events.push(InputEvent::ClipboardWrite(text.to_string()));
        Ok(())
    }

    async fn read_text(&self) -> AutomationResult<String> {
        self.check_clipboard("read_clipboard")?;
        let mut state = self.state.lock();
        state.events.push(InputEvent::ClipboardRead);
        Ok(state.clipboard.clone())
    }
}
