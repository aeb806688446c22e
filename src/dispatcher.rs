//! Tool dispatcher
//!
//! [`Dispatcher`] turns validated tool arguments into backend calls. Every
//! operation follows the same sequence:
//!
//! 1. validate arguments (no backend call happens for a bad request)
//! 2. take the serialization lock
//! 3. for input operations, check the failsafe corner
//! 4. drive the backend
//! 5. for input operations, sleep for the configured pause
//!
//! Errors from the backend are re-labelled with the tool-level operation
//! name. Nothing here panics on bad input.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use desktop_mcp::{
//!     backend::{MockBackend, composite_from_mock},
//!     config::AutomationConfig,
//!     dispatcher::Dispatcher,
//!     model::Point,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let mock = Arc::new(MockBackend::new());
//!     let dispatcher = Dispatcher::new(
//!         Arc::new(composite_from_mock(Arc::clone(&mock))),
//!         AutomationConfig::default(),
//!     );
//!
//!     let at = dispatcher.move_mouse(100, 200, false, 0).await.unwrap();
//!     assert_eq!(at, Point::new(100, 200));
//! }
//! ```

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{Mutex, MutexGuard},
    time::sleep,
};

use crate::{
    backend::DesktopBackend,
    config::AutomationConfig,
    error::{AutomationError, AutomationResult},
    keys::{Key, KeyCombo},
    model::{Direction, MouseButton, Point, ScreenRegion, ScreenSize, ScreenshotResult},
    util::encode::encode_png,
};

/// Highest accepted `clicks` value
pub const MAX_CLICKS: u32 = 10;

/// Highest accepted `presses` value
pub const MAX_PRESSES: u32 = 100;

/// Shortest drag the OS reliably recognizes
pub const MIN_DRAG_DURATION_MS: u64 = 100;

/// Default drag duration
pub const DEFAULT_DRAG_DURATION_MS: u64 = 500;

/// Default duration of a tool-initiated cursor move
pub const DEFAULT_MOVE_DURATION_MS: u64 = 250;

/// Longest accepted move or drag duration
pub const MAX_MOVE_DURATION_MS: u64 = 60_000;

/// Default delay between typed characters
pub const DEFAULT_TYPE_INTERVAL_MS: u64 = 20;

/// Longest accepted delay between typed characters
pub const MAX_TYPE_INTERVAL_MS: u64 = 1_000;

/// Largest accepted scroll amount, in wheel clicks either way
pub const MAX_SCROLL_CLICKS: i32 = 1_000;

/// Shortest step of an interpolated move
const MOVE_STEP: Duration = Duration::from_millis(10);

/// Validates and executes desktop automation operations
#[derive(Debug)]
pub struct Dispatcher {
    backend: Arc<DesktopBackend>,
    config:  AutomationConfig,
    serial:  Mutex<()>,
}

impl Dispatcher {
    /// Creates a new Dispatcher
    pub fn new(backend: Arc<DesktopBackend>, config: AutomationConfig) -> Self {
        Self {
            backend,
            config,
            serial: Mutex::new(()),
        }
    }

    /// Returns the backend this dispatcher drives
    pub fn backend(&self) -> &DesktopBackend {
        &self.backend
    }

    /// Returns the active configuration
    pub fn config(&self) -> &AutomationConfig {
        &self.config
    }

    // ----- queries -----

    /// Returns the logical size of the primary screen
    pub async fn get_screen_size(&self) -> AutomationResult<ScreenSize> {
        let _guard = self.serial.lock().await;
        self.backend
            .input
            .screen_size()
            .await
            .map_err(|e| e.in_operation("get_screen_size"))
    }

    /// Returns the current cursor position
    pub async fn get_mouse_position(&self) -> AutomationResult<Point> {
        let _guard = self.serial.lock().await;
        self.backend
            .input
            .cursor_position()
            .await
            .map_err(|e| e.in_operation("get_mouse_position"))
    }

    // ----- mouse -----

    /// Moves the cursor to `(x, y)`, or by `(x, y)` when `relative`
    ///
    /// A non-zero `duration_ms` interpolates the path linearly. Returns the
    /// cursor position after the move.
    pub async fn move_mouse(
        &self,
        x: i32,
        y: i32,
        relative: bool,
        duration_ms: u64,
    ) -> AutomationResult<Point> {
        const OP: &str = "move_mouse";
        check_duration(OP, "duration_ms", duration_ms, 0)?;

        let _guard = self.begin_input(OP).await?;
        let result = async {
            let target = if relative {
                self.backend.input.cursor_position().await?.offset(x, y)
            } else {
                Point::new(x, y)
            };
            let screen = self.backend.input.screen_size().await?;
            check_in_reach(OP, target, screen)?;

            tracing::debug!("Moving cursor to {} over {}ms", target, duration_ms);
            self.move_smoothly(OP, target, Duration::from_millis(duration_ms)).await?;
            self.backend.input.cursor_position().await
        }
        .await;
        self.finish_input(OP, result).await
    }

    /// Clicks `button` `clicks` times, at `(x, y)` if given
    ///
    /// Returns the cursor position the click landed on.
    pub async fn click(
        &self,
        x: Option<i32>,
        y: Option<i32>,
        button: MouseButton,
        clicks: u32,
    ) -> AutomationResult<Point> {
        const OP: &str = "click";
        let target = both_or_neither(OP, x, y)?;
        if !(1..=MAX_CLICKS).contains(&clicks) {
            return Err(AutomationError::invalid_argument(
                OP,
                "clicks",
                format!("must be between 1 and {}, got {}", MAX_CLICKS, clicks),
            ));
        }

        let _guard = self.begin_input(OP).await?;
        let result = async {
            if let Some(target) = target {
                let screen = self.backend.input.screen_size().await?;
                check_in_reach(OP, target, screen)?;
                self.backend.input.move_cursor(target).await?;
            }

            tracing::debug!("Clicking {} button {} time(s)", button, clicks);
            for i in 0..clicks {
                if i > 0 {
                    self.check_failsafe(OP).await?;
                }
                self.backend.input.button(button, Direction::Press).await?;
                self.backend.input.button(button, Direction::Release).await?;
            }
            self.backend.input.cursor_position().await
        }
        .await;
        self.finish_input(OP, result).await
    }

    /// Scrolls the wheel by `amount` notches; positive is up
    ///
    /// Moves to `(x, y)` first when given.
    pub async fn scroll(&self, amount: i32, x: Option<i32>, y: Option<i32>) -> AutomationResult<()> {
        const OP: &str = "scroll";
        if amount == 0 {
            return Err(AutomationError::invalid_argument(OP, "amount", "must not be 0"));
        }
        if amount.unsigned_abs() > MAX_SCROLL_CLICKS.unsigned_abs() {
            return Err(AutomationError::invalid_argument(
                OP,
                "amount",
                format!("must be within ±{}, got {}", MAX_SCROLL_CLICKS, amount),
            ));
        }
        let target = both_or_neither(OP, x, y)?;

        let _guard = self.begin_input(OP).await?;
        let result = async {
            if let Some(target) = target {
                let screen = self.backend.input.screen_size().await?;
                check_in_reach(OP, target, screen)?;
                self.backend.input.move_cursor(target).await?;
            }

            tracing::debug!("Scrolling {} notch(es)", amount);
            self.backend.input.scroll(amount).await
        }
        .await;
        self.finish_input(OP, result).await
    }

    /// Drags from `from` to `to` holding `button`
    ///
    /// The button is released even when the move in between fails.
    pub async fn drag(
        &self,
        from: Point,
        to: Point,
        button: MouseButton,
        duration_ms: u64,
    ) -> AutomationResult<()> {
        const OP: &str = "drag";
        check_duration(OP, "duration_ms", duration_ms, MIN_DRAG_DURATION_MS)?;

        let _guard = self.begin_input(OP).await?;
        let result = async {
            let screen = self.backend.input.screen_size().await?;
            check_in_reach(OP, from, screen)?;
            check_in_reach(OP, to, screen)?;

            tracing::debug!("Dragging {} button from {} to {}", button, from, to);
            self.move_smoothly(OP, from, Duration::from_millis(MIN_DRAG_DURATION_MS))
                .await?;
            self.backend.input.button(button, Direction::Press).await?;

            let moved = self
                .move_smoothly(OP, to, Duration::from_millis(duration_ms))
                .await;
            let released = self.backend.input.button(button, Direction::Release).await;
            if let (Err(_), Err(e)) = (&moved, &released) {
                tracing::warn!("Failed to release {} button after aborted drag: {}", button, e);
            }
            moved.and(released)
        }
        .await;
        self.finish_input(OP, result).await
    }

    // ----- keyboard -----

    /// Types `text` and returns the number of characters typed
    ///
    /// ASCII text is synthesized directly. Anything else is staged on the
    /// clipboard and pasted, which replaces the user's clipboard unless
    /// `restore_clipboard` is configured.
    pub async fn type_text(&self, text: &str, interval_ms: u64) -> AutomationResult<usize> {
        const OP: &str = "type_text";
        if text.is_empty() {
            return Err(AutomationError::invalid_argument(OP, "text", "must not be empty"));
        }
        if interval_ms > MAX_TYPE_INTERVAL_MS {
            return Err(AutomationError::invalid_argument(
                OP,
                "interval_ms",
                format!("must be at most {}", MAX_TYPE_INTERVAL_MS),
            ));
        }

        let _guard = self.begin_input(OP).await?;
        let result = if text.is_ascii() {
            self.type_ascii(text, Duration::from_millis(interval_ms)).await
        } else {
            self.type_via_clipboard(text).await
        };
        self.finish_input(OP, result.map(|()| text.chars().count()))
            .await
    }

    /// Presses and releases `key` `presses` times
    pub async fn press_key(&self, key: &str, presses: u32) -> AutomationResult<Key> {
        const OP: &str = "press_key";
        let parsed = Key::parse_for(OP, key)?;
        if !(1..=MAX_PRESSES).contains(&presses) {
            return Err(AutomationError::invalid_argument(
                OP,
                "presses",
                format!("must be between 1 and {}, got {}", MAX_PRESSES, presses),
            ));
        }

        let _guard = self.begin_input(OP).await?;
        let result = async {
            tracing::debug!("Pressing '{}' {} time(s)", parsed, presses);
            for i in 0..presses {
                if i > 0 {
                    self.check_failsafe(OP).await?;
                }
                self.backend.input.key(parsed, Direction::Press).await?;
                self.backend.input.key(parsed, Direction::Release).await?;
            }
            Ok::<_, AutomationError>(parsed)
        }
        .await;
        self.finish_input(OP, result).await
    }

    /// Presses `keys` in order and releases them in reverse order
    pub async fn hotkey<S: AsRef<str>>(&self, keys: &[S]) -> AutomationResult<KeyCombo> {
        const OP: &str = "hotkey";
        let combo = KeyCombo::parse(OP, keys)?;

        let _guard = self.begin_input(OP).await?;
        tracing::debug!("Pressing hotkey {}", combo);
        let result = self.press_combo(combo.keys()).await.map(|()| combo);
        self.finish_input(OP, result).await
    }

    // ----- screen -----

    /// Captures the screen or `region` of it
    ///
    /// With `reduce_resolution` both dimensions are halved (floor, at least
    /// 1) before PNG encoding, so on a 2x display the image maps 1:1 to
    /// logical coordinates.
    pub async fn screenshot(
        &self,
        region: Option<ScreenRegion>,
        reduce_resolution: bool,
    ) -> AutomationResult<ScreenshotResult> {
        const OP: &str = "screenshot";
        if region.is_some_and(|r| r.is_empty()) {
            return Err(AutomationError::invalid_argument(
                OP,
                "region",
                "width and height must be greater than 0",
            ));
        }

        let _guard = self.serial.lock().await;
        let image = self
            .backend
            .capture
            .capture(region)
            .await
            .map_err(|e| e.in_operation(OP))?;
        let captured_at = chrono::Utc::now().to_rfc3339();

        // Downscale + encode is CPU-bound
        let (data, width, height) = tokio::task::spawn_blocking(move || {
            let image = if reduce_resolution {
                image.downscale_half()
            } else {
                image
            };
            let (width, height) = image.dimensions();
            encode_png(&image).map(|data| (data, width, height))
        })
        .await
        .map_err(|e| AutomationError::execution_failed(OP, format!("encode task panicked: {}", e)))?
        .map_err(|e| e.in_operation(OP))?;

        tracing::debug!("Captured {}x{} screenshot ({} bytes)", width, height, data.len());
        Ok(ScreenshotResult {
            data,
            width,
            height,
            downscaled: reduce_resolution,
            region,
            captured_at,
        })
    }

    // ----- internals -----

    /// Takes the serialization lock and checks the failsafe
    async fn begin_input(&self, operation: &str) -> AutomationResult<MutexGuard<'_, ()>> {
        let guard = self.serial.lock().await;
        self.check_failsafe(operation).await?;
        Ok(guard)
    }

    /// Re-labels errors and applies the post-action pause on success
    async fn finish_input<T>(&self, operation: &str, result: AutomationResult<T>) -> AutomationResult<T> {
        match result {
            Ok(value) => {
                if !self.config.pause.is_zero() {
                    sleep(self.config.pause).await;
                }
                Ok(value)
            }
            Err(e) => {
                tracing::debug!("{} failed: {}", operation, e);
                Err(e.in_operation(operation))
            }
        }
    }

    async fn check_failsafe(&self, operation: &str) -> AutomationResult<()> {
        if !self.config.failsafe {
            return Ok(());
        }
        let position = self
            .backend
            .input
            .cursor_position()
            .await
            .map_err(|e| e.in_operation(operation))?;
        if self.config.is_failsafe_point(position) {
            tracing::warn!("Failsafe triggered: cursor at {}, aborting {}", position, operation);
            return Err(AutomationError::FailsafeTriggered {
                operation: operation.to_string(),
                position,
            });
        }
        Ok(())
    }

    /// Moves to `target` in linear steps of at least [`MOVE_STEP`]
    ///
    /// The failsafe is checked before every step after the first, so a
    /// human can abort a slow move by flinging the mouse into the corner.
    async fn move_smoothly(&self, operation: &str, target: Point, duration: Duration) -> AutomationResult<()> {
        let steps = (duration.as_millis() / MOVE_STEP.as_millis()) as u32;
        if steps <= 1 {
            if !duration.is_zero() {
                sleep(duration).await;
            }
            return self.backend.input.move_cursor(target).await;
        }

        let start = self.backend.input.cursor_position().await?;
        let step_delay = duration / steps;
        for (i, point) in interpolate(start, target, steps).into_iter().enumerate() {
            if i > 0 {
                self.check_failsafe(operation).await?;
            }
            self.backend.input.move_cursor(point).await?;
            sleep(step_delay).await;
        }
        Ok(())
    }

    async fn type_ascii(&self, text: &str, interval: Duration) -> AutomationResult<()> {
        if interval.is_zero() {
            return self.backend.input.text(text).await;
        }
        let mut buf = [0u8; 4];
        for (i, c) in text.chars().enumerate() {
            if i > 0 {
                sleep(interval).await;
                self.check_failsafe("type_text").await?;
            }
            self.backend.input.text(c.encode_utf8(&mut buf)).await?;
        }
        Ok(())
    }

    async fn type_via_clipboard(&self, text: &str) -> AutomationResult<()> {
        let clipboard = &self.backend.clipboard;
        tracing::debug!("Pasting {} chars via {}", text.chars().count(), clipboard.name());

        let previous = if self.config.restore_clipboard {
            match clipboard.read_text().await {
                Ok(previous) => Some(previous),
                Err(e) => {
                    tracing::warn!("Could not save clipboard before paste: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let pasted = match clipboard.write_text(text).await {
            Ok(()) => {
                self.press_combo(&[self.config.paste_modifier, Key::Char('v')])
                    .await
            }
            Err(e) => Err(e),
        };

        // Restore even when the paste chord failed
        if let Some(previous) = previous {
            if pasted.is_ok() {
                // The target application reads the clipboard asynchronously
                sleep(self.config.pause).await;
            }
            if let Err(e) = clipboard.write_text(&previous).await {
                tracing::warn!("Could not restore clipboard after paste: {}", e);
            }
        }
        pasted
    }

    /// Presses keys in order, then releases every pressed key in reverse
    ///
    /// A failed press stops further presses; keys already down are still
    /// released. The first error is returned.
    async fn press_combo(&self, keys: &[Key]) -> AutomationResult<()> {
        let mut pressed = Vec::with_capacity(keys.len());
        let mut result = Ok(());

        for &key in keys {
            match self.backend.input.key(key, Direction::Press).await {
                Ok(()) => pressed.push(key),
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }

        for &key in pressed.iter().rev() {
            if let Err(e) = self.backend.input.key(key, Direction::Release).await {
                tracing::warn!("Failed to release '{}': {}", key, e);
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        result
    }
}

/// Accepts both coordinates or neither
fn both_or_neither(operation: &str, x: Option<i32>, y: Option<i32>) -> AutomationResult<Option<Point>> {
    match (x, y) {
        (Some(x), Some(y)) => Ok(Some(Point::new(x, y))),
        (None, None) => Ok(None),
        (Some(_), None) => Err(AutomationError::invalid_argument(
            operation,
            "y",
            "x and y must be given together",
        )),
        (None, Some(_)) => Err(AutomationError::invalid_argument(
            operation,
            "x",
            "x and y must be given together",
        )),
    }
}

/// Rejects targets further than one screen width/height off screen
fn check_in_reach(operation: &str, point: Point, screen: ScreenSize) -> AutomationResult<()> {
    let in_reach = |value: i32, extent: u32| {
        let value = value as i64;
        let extent = extent as i64;
        value >= -extent && value < 2 * extent
    };

    if !in_reach(point.x, screen.width) {
        return Err(AutomationError::invalid_argument(
            operation,
            "x",
            format!("{} is far outside the {} screen", point.x, screen),
        ));
    }
    if !in_reach(point.y, screen.height) {
        return Err(AutomationError::invalid_argument(
            operation,
            "y",
            format!("{} is far outside the {} screen", point.y, screen),
        ));
    }
    Ok(())
}

fn check_duration(operation: &str, parameter: &str, duration_ms: u64, min: u64) -> AutomationResult<()> {
    if duration_ms < min || duration_ms > MAX_MOVE_DURATION_MS {
        return Err(AutomationError::invalid_argument(
            operation,
            parameter,
            format!(
                "must be between {} and {} ms, got {}",
                min, MAX_MOVE_DURATION_MS, duration_ms
            ),
        ));
    }
    Ok(())
}

/// Points strictly after `start` up to and including `end`
fn interpolate(start: Point, end: Point, steps: u32) -> Vec<Point> {
    let lerp = |a: i32, b: i32, i: u32| {
        let delta = (b as i64 - a as i64) as f64 * i as f64 / steps as f64;
        (a as i64 + delta.round() as i64).clamp(i32::MIN as i64, i32::MAX as i64) as i32
    };
    (1..=steps)
        .map(|i| Point::new(lerp(start.x, end.x, i), lerp(start.y, end.y, i)))
        .collect()
}
