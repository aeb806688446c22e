//! OS automation backend using enigo + xcap
//!
//! Input synthesis goes through `enigo`, screen capture through `xcap`.
//! Both libraries make synchronous OS calls. Capture runs on the blocking
//! pool. Input runs on one dedicated thread that owns a single long-lived
//! `Enigo` session, so a key pressed by one call is still held when the next
//! call presses the rest of a chord. Sessions are not `Send` on every
//! platform, which is why the session never leaves that thread.
//!
//! # Platform notes
//!
//! - **macOS:** the host terminal needs Accessibility permission for input
//!   and Screen Recording permission for capture.
//! - **Linux:** requires an X11 session (or XWayland). enigo reports a
//!   connection error when `DISPLAY` is unset.
//! - **Windows:** works out of the box for the interactive desktop.

use async_trait::async_trait;
use enigo::{Axis, Coordinate, Enigo, Keyboard, Mouse, Settings};
use tokio::sync::{mpsc, oneshot};

use super::{InputDriver, ScreenCapture, region_to_pixels};
use crate::{
    error::{AutomationError, AutomationResult},
    keys::Key,
    model::{Direction, MouseButton, Point, ScreenRegion, ScreenSize},
    util::image_buffer::ImageBuffer,
};

/// Work item for the input thread; receives the session or the reason it
/// could not be opened
type InputJob = Box<dyn FnOnce(Result<&mut Enigo, String>) + Send>;

/// Settings for the input session
///
/// Keys must survive the session: the dispatcher pairs every press with a
/// release itself, across separate backend calls.
fn session_settings() -> Settings {
    Settings {
        release_keys_when_dropped: false,
        ..Settings::default()
    }
}

/// Owns the enigo session; runs until every sender is dropped
///
/// The session is opened on first use and reopened after a failed open, so
/// a display that appears later is picked up.
fn run_input_thread(mut jobs: mpsc::UnboundedReceiver<InputJob>) {
    let mut session: Option<Enigo> = None;
    while let Some(job) = jobs.blocking_recv() {
        if session.is_none() {
            match Enigo::new(&session_settings()) {
                Ok(enigo) => {
                    tracing::debug!("Opened input session");
                    session = Some(enigo);
                }
                Err(e) => {
                    tracing::error!("Failed to open input session: {}", e);
                    job(Err(e.to_string()));
                    continue;
                }
            }
        }
        if let Some(enigo) = session.as_mut() {
            job(Ok(enigo));
        }
    }
    tracing::debug!("Input thread stopped");
}

/// Builds the error for an input call the OS rejected
///
/// `action` names the argument ("press 'c'", "move to (10, 20)") because
/// enigo's own messages do not.
fn input_error(operation: &str, action: &str, e: impl std::fmt::Display) -> AutomationError {
    tracing::error!("{} ({}) rejected by the OS: {}", operation, action, e);
    AutomationError::execution_failed(operation, format!("{}: {}", action, e))
}

fn direction_verb(direction: Direction) -> &'static str {
    match direction {
        Direction::Press => "press",
        Direction::Release => "release",
    }
}

/// Real input and capture backend
#[derive(Debug, Clone)]
pub struct OsBackend {
    jobs: mpsc::UnboundedSender<InputJob>,
}

impl OsBackend {
    /// Creates a new OsBackend and starts its input thread
    ///
    /// The display connection is opened on the first input call.
    pub fn new() -> AutomationResult<Self> {
        let (jobs, receiver) = mpsc::unbounded_channel();
        std::thread::Builder::new()
            .name("desktop-mcp-input".to_string())
            .spawn(move || run_input_thread(receiver))
            .map_err(|e| {
                AutomationError::backend_unavailable("startup", "input thread", e.to_string())
            })?;
        Ok(Self { jobs })
    }

    /// Runs `f` against the shared enigo session on the input thread
    async fn with_enigo<T, F>(&self, operation: &'static str, action: String, f: F) -> AutomationResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Enigo) -> Result<T, enigo::InputError> + Send + 'static,
    {
        let (reply, response) = oneshot::channel();
        let job_action = action.clone();
        let job: InputJob = Box::new(move |session| {
            let result = match session {
                Ok(enigo) => f(enigo).map_err(|e| input_error(operation, &job_action, e)),
                Err(reason) => Err(AutomationError::backend_unavailable(operation, "display", reason)),
            };
            // The caller may have gone away; nothing to report to
            let _ = reply.send(result);
        });

        self.jobs.send(job).map_err(|_| {
            AutomationError::backend_unavailable(operation, "display", "input thread has stopped")
        })?;
        response
            .await
            .map_err(|_| input_error(operation, &action, "input thread dropped the request"))?
    }
}

fn to_enigo_button(button: MouseButton) -> enigo::Button {
    match button {
        MouseButton::Left => enigo::Button::Left,
        MouseButton::Middle => enigo::Button::Middle,
        MouseButton::Right => enigo::Button::Right,
    }
}

fn to_enigo_direction(direction: Direction) -> enigo::Direction {
    match direction {
        Direction::Press => enigo::Direction::Press,
        Direction::Release => enigo::Direction::Release,
    }
}

fn to_enigo_key(key: Key) -> Option<enigo::Key> {
    use enigo::Key as E;

    let mapped = match key {
        Key::Control => E::Control,
        Key::Shift => E::Shift,
        Key::Alt => E::Alt,
        Key::Meta => E::Meta,
        Key::Return => E::Return,
        Key::Tab => E::Tab,
        Key::Escape => E::Escape,
        Key::Space => E::Space,
        Key::Backspace => E::Backspace,
        Key::Delete => E::Delete,
        Key::UpArrow => E::UpArrow,
        Key::DownArrow => E::DownArrow,
        Key::LeftArrow => E::LeftArrow,
        Key::RightArrow => E::RightArrow,
        Key::Home => E::Home,
        Key::End => E::End,
        Key::PageUp => E::PageUp,
        Key::PageDown => E::PageDown,
        Key::CapsLock => E::CapsLock,
        Key::F(n) => match n {
            1 => E::F1,
            2 => E::F2,
            3 => E::F3,
            4 => E::F4,
            5 => E::F5,
            6 => E::F6,
            7 => E::F7,
            8 => E::F8,
            9 => E::F9,
            10 => E::F10,
            11 => E::F11,
            12 => E::F12,
            13 => E::F13,
            14 => E::F14,
            15 => E::F15,
            16 => E::F16,
            17 => E::F17,
            18 => E::F18,
            19 => E::F19,
            20 => E::F20,
            _ => return None,
        },
        Key::Char(c) => E::Unicode(c),
    };
    Some(mapped)
}

fn map_xcap_error(operation: &'static str, e: xcap::XCapError) -> AutomationError {
    let message = e.to_string();
    let lower = message.to_lowercase();
    if lower.contains("permission") || lower.contains("denied") || lower.contains("not allowed") {
        tracing::warn!("Screen capture refused by the OS: {}", message);
        AutomationError::backend_unavailable(operation, "screen-capture", message)
    } else if lower.contains("display") || lower.contains("connection") {
        AutomationError::backend_unavailable(operation, "display", message)
    } else {
        AutomationError::execution_failed(operation, message)
    }
}

#[async_trait]
impl InputDriver for OsBackend {
    async fn screen_size(&self) -> AutomationResult<ScreenSize> {
        let (width, height) = self
            .with_enigo("screen_size", "query main display".to_string(), |enigo| {
                enigo.main_display()
            })
            .await?;
        Ok(ScreenSize::new(width.max(0) as u32, height.max(0) as u32))
    }

    async fn cursor_position(&self) -> AutomationResult<Point> {
        let (x, y) = self
            .with_enigo("cursor_position", "query cursor".to_string(), |enigo| enigo.location())
            .await?;
        Ok(Point::new(x, y))
    }

    async fn move_cursor(&self, to: Point) -> AutomationResult<()> {
        self.with_enigo("move_cursor", format!("move to {}", to), move |enigo| {
            enigo.move_mouse(to.x, to.y, Coordinate::Abs)
        })
        .await
    }

    async fn button(&self, button: MouseButton, direction: Direction) -> AutomationResult<()> {
        let action = format!("{} {} button", direction_verb(direction), button);
        self.with_enigo("button", action, move |enigo| {
            enigo.button(to_enigo_button(button), to_enigo_direction(direction))
        })
        .await
    }

    async fn scroll(&self, delta: i32) -> AutomationResult<()> {
        // enigo scrolls down for positive lengths
        self.with_enigo("scroll", format!("scroll by {}", delta), move |enigo| {
            enigo.scroll(delta.saturating_neg(), Axis::Vertical)
        })
        .await
    }

    async fn key(&self, key: Key, direction: Direction) -> AutomationResult<()> {
        let mapped = to_enigo_key(key).ok_or_else(|| {
            AutomationError::invalid_argument("key", "key", format!("'{}' has no OS key code", key))
        })?;
        let action = format!("{} '{}'", direction_verb(direction), key);
        self.with_enigo("key", action, move |enigo| enigo.key(mapped, to_enigo_direction(direction)))
            .await
    }

    async fn text(&self, text: &str) -> AutomationResult<()> {
        let action = format!("type {} character(s)", text.chars().count());
        let text = text.to_string();
        self.with_enigo("text", action, move |enigo| enigo.text(&text)).await
    }
}

#[async_trait]
impl ScreenCapture for OsBackend {
    async fn capture(&self, region: Option<ScreenRegion>) -> AutomationResult<ImageBuffer> {
        const OP: &str = "screenshot";

        let (image, logical_width) = tokio::task::spawn_blocking(|| {
            let monitors = xcap::Monitor::all().map_err(|e| map_xcap_error(OP, e))?;
            tracing::debug!("Found {} monitors", monitors.len());

            let monitor = match monitors.iter().position(|m| m.is_primary().unwrap_or(false)) {
                Some(index) => &monitors[index],
                None => monitors.first().ok_or_else(|| {
                    AutomationError::backend_unavailable(OP, "display", "no monitors found")
                })?,
            };

            let logical_width = monitor.width().map_err(|e| map_xcap_error(OP, e))?;
            let image = monitor.capture_image().map_err(|e| map_xcap_error(OP, e))?;
            tracing::debug!(
                "Captured primary monitor: {}x{} (logical width {})",
                image.width(),
                image.height(),
                logical_width
            );
            Ok::<_, AutomationError>((image, logical_width))
        })
        .await
        .map_err(|e| AutomationError::execution_failed(OP, format!("task panicked: {}", e)))??;

        // Physical pixels per logical pixel (2.0 on Retina)
        let scale = if logical_width == 0 {
            1.0
        } else {
            image.width() as f64 / logical_width as f64
        };

        let buffer = ImageBuffer::from_rgba(image);
        match region {
            None => Ok(buffer),
            Some(region) => buffer.crop(region_to_pixels(region, scale)?),
        }
    }
}
