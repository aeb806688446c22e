//! MCP service implementation with tool routing
//!
//! [`DesktopMcpServer`] exposes the [`Dispatcher`] operations as MCP tools.
//! Parameter structs use camelCase field names with serde defaults matching
//! the dispatcher defaults; all validation happens in the dispatcher.

use std::sync::Arc;

use rmcp::{
    ServerHandler,
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, ErrorData as McpError, Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    backend::{MockBackend, composite_from_mock},
    config::AutomationConfig,
    dispatcher::{
        DEFAULT_DRAG_DURATION_MS, DEFAULT_MOVE_DURATION_MS, DEFAULT_TYPE_INTERVAL_MS, Dispatcher,
    },
    error::{AutomationError, ErrorKind},
    mcp_content::{build_screenshot_result, json_result, text_result},
    model::{HealthCheckResponse, MouseButton, Point, ScreenRegion},
    util::detect::detect_platform,
};

/// Server instructions advertised during initialization
pub const SERVER_INSTRUCTIONS: &str =
    "Full desktop control: mouse, keyboard, screenshots, and screen info. Coordinates are \
     logical pixels; use desktop_get_screen_size for the bounds. Moving the mouse to the \
     top-left corner (0, 0) aborts further input until it is moved away.";

/// Parameters for the desktop_move_mouse tool
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveMouseParams {
    /// Target X coordinate (or X offset when relative)
    pub x:           i32,
    /// Target Y coordinate (or Y offset when relative)
    pub y:           i32,
    /// Move relative to the current position instead of absolute
    #[serde(default)]
    pub relative:    bool,
    /// Duration of the movement in milliseconds (default: 250, 0 = instant)
    #[serde(default = "default_move_duration")]
    pub duration_ms: u64,
}

impl Default for MoveMouseParams {
    fn default() -> Self {
        Self {
            x:           0,
            y:           0,
            relative:    false,
            duration_ms: DEFAULT_MOVE_DURATION_MS,
        }
    }
}

/// Parameters for the desktop_click tool
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClickParams {
    /// X coordinate to click (omit both x and y for the current position)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x:      Option<i32>,
    /// Y coordinate to click (omit both x and y for the current position)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y:      Option<i32>,
    /// Mouse button: "left", "middle" or "right" (default: left)
    #[serde(default)]
    pub button: MouseButton,
    /// Number of clicks, 2 = double-click (1-10, default: 1)
    #[serde(default = "default_one")]
    pub clicks: u32,
}

impl Default for ClickParams {
    fn default() -> Self {
        Self {
            x:      None,
            y:      None,
            button: MouseButton::Left,
            clicks: 1,
        }
    }
}

/// Parameters for the desktop_scroll tool
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScrollParams {
    /// Number of wheel notches, at most 1000 either way. Positive = up,
    /// negative = down
    #[serde(alias = "clicks")]
    pub amount: i32,
    /// X coordinate to scroll at (omit both x and y for the current position)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x:      Option<i32>,
    /// Y coordinate to scroll at (omit both x and y for the current position)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y:      Option<i32>,
}

/// Parameters for the desktop_drag tool
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DragParams {
    /// Starting X coordinate
    #[serde(alias = "startX")]
    pub from_x:      i32,
    /// Starting Y coordinate
    #[serde(alias = "startY")]
    pub from_y:      i32,
    /// Ending X coordinate
    #[serde(alias = "endX")]
    pub to_x:        i32,
    /// Ending Y coordinate
    #[serde(alias = "endY")]
    pub to_y:        i32,
    /// Mouse button to hold during the drag (default: left)
    #[serde(default)]
    pub button:      MouseButton,
    /// Duration of the drag in milliseconds (minimum 100; instant drags are
    /// ignored by macOS)
    #[serde(default = "default_drag_duration")]
    pub duration_ms: u64,
}

/// Parameters for the desktop_type_text tool
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TypeTextParams {
    /// Text to type
    pub text:        String,
    /// Milliseconds between keystrokes for ASCII text (default: 20)
    #[serde(default = "default_type_interval")]
    pub interval_ms: u64,
}

impl Default for TypeTextParams {
    fn default() -> Self {
        Self {
            text:        String::new(),
            interval_ms: DEFAULT_TYPE_INTERVAL_MS,
        }
    }
}

/// Parameters for the desktop_press_key tool
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PressKeyParams {
    /// Key to press. Examples: "enter", "tab", "escape", "space",
    /// "backspace", "delete", "up", "down", "left", "right", "home", "end",
    /// "pageup", "pagedown", "f1"-"f20", "a"-"z", "0"-"9"
    pub key:     String,
    /// Number of times to press the key (1-100, default: 1)
    #[serde(default = "default_one")]
    pub presses: u32,
}

/// Parameters for the desktop_hotkey tool
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HotkeyParams {
    /// Keys to press together, e.g. ["cmd", "c"] or ["ctrl", "shift", "t"].
    /// Pressed in order, released in reverse order
    pub keys: Vec<String>,
}

/// Parameters for the desktop_screenshot tool
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotParams {
    /// Region to capture in logical pixels. If omitted, captures the full
    /// primary screen
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region:            Option<ScreenRegion>,
    /// Halve the image dimensions to save tokens (default: true). On a 2x
    /// display the halved image maps 1:1 to logical coordinates
    #[serde(default = "default_true")]
    pub reduce_resolution: bool,
}

impl Default for ScreenshotParams {
    fn default() -> Self {
        Self {
            region:            None,
            reduce_resolution: true,
        }
    }
}

fn default_one() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_drag_duration() -> u64 {
    DEFAULT_DRAG_DURATION_MS
}

fn default_move_duration() -> u64 {
    DEFAULT_MOVE_DURATION_MS
}

fn default_type_interval() -> u64 {
    DEFAULT_TYPE_INTERVAL_MS
}

/// Converts an AutomationError to an MCP ErrorData
///
/// Invalid arguments map to JSON-RPC "invalid params"; everything else is an
/// internal error. The error data carries the machine-readable kind, the
/// failed operation and a remediation hint.
pub fn convert_automation_error_to_mcp(error: AutomationError) -> McpError {
    let data = serde_json::json!({
        "kind": error.kind(),
        "operation": error.operation(),
        "hint": error.remediation_hint(),
    });
    let message = error.to_string();

    match error.kind() {
        ErrorKind::InvalidArgument => McpError::invalid_params(message, Some(data)),
        ErrorKind::BackendUnavailable | ErrorKind::FailsafeTriggered | ErrorKind::ExecutionFailed => {
            McpError::internal_error(message, Some(data))
        }
    }
}

/// Desktop control MCP server
///
/// # Tools
///
/// - `desktop_get_screen_size`, `desktop_get_mouse_position`: queries
/// - `desktop_move_mouse`, `desktop_click`, `desktop_scroll`, `desktop_drag`:
///   mouse
/// - `desktop_type_text`, `desktop_press_key`, `desktop_hotkey`: keyboard
/// - `desktop_screenshot`: screen capture
/// - `health_check`: platform and backend status
#[derive(Clone)]
pub struct DesktopMcpServer {
    /// Tool router for dispatching tool calls
    pub tool_router: ToolRouter<Self>,
    /// Validates and executes every operation
    dispatcher:  Arc<Dispatcher>,
}

#[tool_router]
impl DesktopMcpServer {
    /// Creates a new DesktopMcpServer driving `dispatcher`
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    ///
    /// use desktop_mcp::{
    ///     backend::{MockBackend, composite_from_mock},
    ///     config::AutomationConfig,
    ///     dispatcher::Dispatcher,
    ///     mcp::DesktopMcpServer,
    /// };
    ///
    /// let backend = Arc::new(composite_from_mock(Arc::new(MockBackend::new())));
    /// let dispatcher = Arc::new(Dispatcher::new(backend, AutomationConfig::default()));
    /// let server = DesktopMcpServer::new(dispatcher);
    /// ```
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            dispatcher,
        }
    }

    /// Creates a server over `mock` with the given configuration
    pub fn with_mock(mock: Arc<MockBackend>, config: AutomationConfig) -> Self {
        let backend = Arc::new(composite_from_mock(mock));
        Self::new(Arc::new(Dispatcher::new(backend, config)))
    }

    /// Creates a server over a fresh MockBackend with default configuration
    ///
    /// Nothing reaches the OS; useful for tests and dry runs.
    ///
    /// # Examples
    ///
    /// ```
    /// use desktop_mcp::mcp::DesktopMcpServer;
    ///
    /// let server = DesktopMcpServer::new_with_mock();
    /// ```
    pub fn new_with_mock() -> Self {
        Self::with_mock(Arc::new(MockBackend::new()), AutomationConfig::default())
    }

    /// Returns the dispatcher behind this server
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Health check tool - reports platform, backend and safety settings
    ///
    /// Response:
    /// ```json
    /// {"platform":"linux","display":"x11","backend":"os","clipboard":"xclip","failsafe":true,"ok":true}
    /// ```
    #[tool(description = "Check server health: platform, display server, backend, clipboard tool \
                          and failsafe state")]
    pub async fn health_check(&self) -> Result<CallToolResult, McpError> {
        let platform = detect_platform();
        let backend = self.dispatcher.backend();

        let response = HealthCheckResponse {
            platform:  platform.os,
            display:   platform.display.to_string(),
            backend:   backend.name.to_string(),
            clipboard: backend.clipboard.name().to_string(),
            failsafe:  self.dispatcher.config().failsafe,
            ok:        true,
        };
        json_result(&response)
    }

    #[tool(
        name = "desktop_get_screen_size",
        description = "Get the screen dimensions. Returns the logical resolution (not physical \
                       pixels on Retina/HiDPI displays); all coordinate-based tools use this \
                       coordinate space."
    )]
    pub async fn get_screen_size(&self) -> Result<CallToolResult, McpError> {
        let size = self
            .dispatcher
            .get_screen_size()
            .await
            .map_err(convert_automation_error_to_mcp)?;
        json_result(&size)
    }

    #[tool(
        name = "desktop_get_mouse_position",
        description = "Get the current mouse cursor position in logical screen coordinates."
    )]
    pub async fn get_mouse_position(&self) -> Result<CallToolResult, McpError> {
        let position = self
            .dispatcher
            .get_mouse_position()
            .await
            .map_err(convert_automation_error_to_mcp)?;
        json_result(&position)
    }

    #[tool(
        name = "desktop_move_mouse",
        description = "Move the mouse cursor to a position, or by an offset when relative is \
                       true. Coordinates are logical pixels; screenshot pixels map 1:1 to them \
                       when reduceResolution is true on a 2x display."
    )]
    pub async fn move_mouse(
        &self,
        Parameters(params): Parameters<MoveMouseParams>,
    ) -> Result<CallToolResult, McpError> {
        let at = self
            .dispatcher
            .move_mouse(params.x, params.y, params.relative, params.duration_ms)
            .await
            .map_err(convert_automation_error_to_mcp)?;
        Ok(text_result(format!("Moved mouse to {}", at)))
    }

    #[tool(
        name = "desktop_click",
        description = "Click the mouse. If x/y are omitted, clicks at the current cursor \
                       position. clicks = 2 double-clicks."
    )]
    pub async fn click(
        &self,
        Parameters(params): Parameters<ClickParams>,
    ) -> Result<CallToolResult, McpError> {
        let at = self
            .dispatcher
            .click(params.x, params.y, params.button, params.clicks)
            .await
            .map_err(convert_automation_error_to_mcp)?;

        let message = match params.clicks {
            1 => format!("Clicked {} button at {}", params.button, at),
            2 => format!("Double-clicked {} button at {}", params.button, at),
            n => format!("Clicked {} button {} times at {}", params.button, n, at),
        };
        Ok(text_result(message))
    }

    #[tool(
        name = "desktop_scroll",
        description = "Scroll the mouse wheel. Positive amount scrolls up, negative scrolls \
                       down. If x/y are omitted, scrolls at the current cursor position."
    )]
    pub async fn scroll(
        &self,
        Parameters(params): Parameters<ScrollParams>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatcher
            .scroll(params.amount, params.x, params.y)
            .await
            .map_err(convert_automation_error_to_mcp)?;

        let direction = if params.amount > 0 { "up" } else { "down" };
        let position = match (params.x, params.y) {
            (Some(x), Some(y)) => Point::new(x, y).to_string(),
            _ => "current position".to_string(),
        };
        Ok(text_result(format!(
            "Scrolled {} {} clicks at {}",
            direction,
            params.amount.unsigned_abs(),
            position
        )))
    }

    #[tool(
        name = "desktop_drag",
        description = "Drag the mouse from one position to another: moves to the start, holds \
                       the button, moves to the end and releases. durationMs must be at least \
                       100 because instant drags fail on macOS."
    )]
    pub async fn drag(
        &self,
        Parameters(params): Parameters<DragParams>,
    ) -> Result<CallToolResult, McpError> {
        let from = Point::new(params.from_x, params.from_y);
        let to = Point::new(params.to_x, params.to_y);
        self.dispatcher
            .drag(from, to, params.button, params.duration_ms)
            .await
            .map_err(convert_automation_error_to_mcp)?;
        Ok(text_result(format!("Dragged from {} to {}", from, to)))
    }

    #[tool(
        name = "desktop_type_text",
        description = "Type a text string. ASCII text is typed key by key; text with non-ASCII \
                       characters (accents, emoji) is pasted through the clipboard, which \
                       replaces the clipboard contents unless the server restores them."
    )]
    pub async fn type_text(
        &self,
        Parameters(params): Parameters<TypeTextParams>,
    ) -> Result<CallToolResult, McpError> {
        let typed = self
            .dispatcher
            .type_text(&params.text, params.interval_ms)
            .await
            .map_err(convert_automation_error_to_mcp)?;
        Ok(text_result(format!("Typed {} characters", typed)))
    }

    #[tool(
        name = "desktop_press_key",
        description = "Press a key one or more times. Use for special keys (enter, tab, \
                       arrows, function keys); use desktop_type_text for regular text."
    )]
    pub async fn press_key(
        &self,
        Parameters(params): Parameters<PressKeyParams>,
    ) -> Result<CallToolResult, McpError> {
        let key = self
            .dispatcher
            .press_key(&params.key, params.presses)
            .await
            .map_err(convert_automation_error_to_mcp)?;

        let times = if params.presses > 1 {
            format!(" {} times", params.presses)
        } else {
            String::new()
        };
        Ok(text_result(format!("Pressed '{}'{}", key, times)))
    }

    #[tool(
        name = "desktop_hotkey",
        description = "Press a keyboard shortcut. Keys are pressed in order and released in \
                       reverse order, e.g. [\"cmd\", \"c\"] for Cmd+C on macOS or [\"ctrl\", \
                       \"shift\", \"t\"] elsewhere."
    )]
    pub async fn hotkey(
        &self,
        Parameters(params): Parameters<HotkeyParams>,
    ) -> Result<CallToolResult, McpError> {
        let combo = self
            .dispatcher
            .hotkey(&params.keys)
            .await
            .map_err(convert_automation_error_to_mcp)?;
        Ok(text_result(format!("Pressed hotkey: {}", combo)))
    }

    #[tool(
        name = "desktop_screenshot",
        description = "Take a PNG screenshot of the primary screen or a region of it. By \
                       default the resolution is halved to save tokens; the halved image maps \
                       1:1 to logical coordinates on Retina/HiDPI displays."
    )]
    pub async fn screenshot(
        &self,
        Parameters(params): Parameters<ScreenshotParams>,
    ) -> Result<CallToolResult, McpError> {
        let shot = self
            .dispatcher
            .screenshot(params.region, params.reduce_resolution)
            .await
            .map_err(convert_automation_error_to_mcp)?;
        Ok(build_screenshot_result(&shot))
    }
}

impl Default for DesktopMcpServer {
    fn default() -> Self {
        Self::new_with_mock()
    }
}

#[tool_handler]
impl ServerHandler for DesktopMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        backend::InputEvent,
        keys::Key,
        model::{Direction, ScreenSize},
    };

    fn fast_server() -> (Arc<MockBackend>, DesktopMcpServer) {
        let mock = Arc::new(MockBackend::new().with_scale_factor(1));
        let config = AutomationConfig::default()
            .with_pause(Duration::ZERO)
            .with_paste_modifier(Key::Control);
        (Arc::clone(&mock), DesktopMcpServer::with_mock(mock, config))
    }

    fn text_of(result: &CallToolResult, index: usize) -> String {
        result.content[index].as_text().unwrap().text.clone()
    }

    #[test]
    fn test_server_creation_with_mock() {
        let server = DesktopMcpServer::new_with_mock();
        assert_eq!(server.dispatcher().backend().name, "mock");
    }

    #[test]
    fn test_get_info_advertises_tools() {
        let info = DesktopMcpServer::default().get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.instructions.unwrap().contains("Full desktop control"));
    }

    #[test]
    fn test_tool_router_lists_every_tool() {
        let server = DesktopMcpServer::new_with_mock();
        let names: Vec<String> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();

        for expected in [
            "health_check",
            "desktop_get_screen_size",
            "desktop_get_mouse_position",
            "desktop_move_mouse",
            "desktop_click",
            "desktop_scroll",
            "desktop_drag",
            "desktop_type_text",
            "desktop_press_key",
            "desktop_hotkey",
            "desktop_screenshot",
        ] {
            assert!(names.contains(&expected.to_string()), "missing tool {}", expected);
        }
    }

    #[tokio::test]
    async fn test_health_check_structure() {
        let (_mock, server) = fast_server();
        let result = server.health_check().await.unwrap();
        assert!(!result.is_error.unwrap_or(false));

        let response: HealthCheckResponse = serde_json::from_str(&text_of(&result, 0)).unwrap();
        assert_eq!(response.backend, "mock");
        assert_eq!(response.clipboard, "mock");
        assert!(response.failsafe);
        assert!(response.ok);
    }

    #[tokio::test]
    async fn test_queries_return_json() {
        let (_mock, server) = fast_server();

        let size = server.get_screen_size().await.unwrap();
        let size: ScreenSize = serde_json::from_str(&text_of(&size, 0)).unwrap();
        assert_eq!(size, ScreenSize::new(1920, 1080));

        let position = server.get_mouse_position().await.unwrap();
        let position: Point = serde_json::from_str(&text_of(&position, 0)).unwrap();
        assert_eq!(position, Point::new(960, 540));
    }

    #[tokio::test]
    async fn test_action_messages() {
        let (_mock, server) = fast_server();

        let result = server
            .move_mouse(Parameters(MoveMouseParams {
                x: 10,
                y: 20,
                ..Default::default()
            }))
            .await
            .unwrap();
        assert_eq!(text_of(&result, 0), "Moved mouse to (10, 20)");

        let result = server
            .click(Parameters(ClickParams {
                clicks: 2,
                ..Default::default()
            }))
            .await
            .unwrap();
        assert_eq!(text_of(&result, 0), "Double-clicked left button at (10, 20)");

        let result = server
            .scroll(Parameters(ScrollParams {
                amount: -3,
                ..Default::default()
            }))
            .await
            .unwrap();
        assert_eq!(text_of(&result, 0), "Scrolled down 3 clicks at current position");

        let result = server
            .press_key(Parameters(PressKeyParams {
                key:     "enter".to_string(),
                presses: 3,
            }))
            .await
            .unwrap();
        assert_eq!(text_of(&result, 0), "Pressed 'enter' 3 times");

        let result = server
            .hotkey(Parameters(HotkeyParams {
                keys: vec!["ctrl".to_string(), "c".to_string()],
            }))
            .await
            .unwrap();
        assert_eq!(text_of(&result, 0), "Pressed hotkey: ctrl+c");

        let result = server
            .type_text(Parameters(TypeTextParams {
                text:        "héllo".to_string(),
                interval_ms: 0,
            }))
            .await
            .unwrap();
        assert_eq!(text_of(&result, 0), "Typed 5 characters");
    }

    #[tokio::test]
    async fn test_drag_tool() {
        let (mock, server) = fast_server();
        let result = server
            .drag(Parameters(DragParams {
                from_x:      1,
                from_y:      2,
                to_x:        30,
                to_y:        40,
                button:      MouseButton::Left,
                duration_ms: 100,
            }))
            .await
            .unwrap();
        assert_eq!(text_of(&result, 0), "Dragged from (1, 2) to (30, 40)");
        assert_eq!(
            mock.events().last(),
            Some(&InputEvent::Button(MouseButton::Left, Direction::Release))
        );
    }

    #[tokio::test]
    async fn test_screenshot_tool() {
        let (_mock, server) = fast_server();
        let result = server
            .screenshot(Parameters(ScreenshotParams {
                region:            Some(ScreenRegion::new(0, 0, 200, 100)),
                reduce_resolution: true,
            }))
            .await
            .unwrap();

        assert_eq!(result.content.len(), 2);
        assert_eq!(result.content[0].as_image().unwrap().mime_type, "image/png");
        let metadata: serde_json::Value = serde_json::from_str(&text_of(&result, 1)).unwrap();
        assert_eq!(metadata["dimensions"], serde_json::json!([100, 50]));
    }

    #[test]
    fn test_param_defaults_and_aliases() {
        let click: ClickParams = serde_json::from_str("{}").unwrap();
        assert_eq!(click.clicks, 1);
        assert_eq!(click.button, MouseButton::Left);

        let scroll: ScrollParams = serde_json::from_str(r#"{"clicks": 4}"#).unwrap();
        assert_eq!(scroll.amount, 4);

        let drag: DragParams =
            serde_json::from_str(r#"{"startX": 1, "startY": 2, "toX": 3, "toY": 4}"#).unwrap();
        assert_eq!(drag.from_x, 1);
        assert_eq!(drag.duration_ms, DEFAULT_DRAG_DURATION_MS);

        let shot: ScreenshotParams = serde_json::from_str("{}").unwrap();
        assert!(shot.reduce_resolution);
        assert!(shot.region.is_none());

        let press: PressKeyParams = serde_json::from_str(r#"{"key": "tab"}"#).unwrap();
        assert_eq!(press.presses, 1);

        let mv: MoveMouseParams = serde_json::from_str(r#"{"x": 5, "y": 6}"#).unwrap();
        assert!(!mv.relative);
        assert_eq!(mv.duration_ms, 250);

        let typed: TypeTextParams = serde_json::from_str(r#"{"text": "hi"}"#).unwrap();
        assert_eq!(typed.interval_ms, 20);
        assert_eq!(TypeTextParams::default().interval_ms, 20);
    }

    #[test]
    fn test_param_schemas_generate() {
        let _ = schemars::schema_for!(ClickParams);
        let _ = schemars::schema_for!(ScreenshotParams);
        let _ = schemars::schema_for!(DragParams);
    }

    mod error_mapping_tests {
        use rmcp::model::ErrorCode;

        use super::*;
        use crate::model::Point;

        #[test]
        fn test_invalid_argument_maps_to_invalid_params() {
            let error = AutomationError::invalid_argument("click", "clicks", "must be at least 1");
            let mcp = convert_automation_error_to_mcp(error);

            assert_eq!(mcp.code, ErrorCode(-32602));
            assert!(mcp.message.contains("clicks"));
            let data = mcp.data.unwrap();
            assert_eq!(data["kind"], "invalid_argument");
            assert_eq!(data["operation"], "click");
        }

        #[test]
        fn test_failsafe_maps_to_internal_error_with_hint() {
            let error = AutomationError::FailsafeTriggered {
                operation: "type_text".to_string(),
                position:  Point::new(0, 0),
            };
            let mcp = convert_automation_error_to_mcp(error);

            assert_eq!(mcp.code, ErrorCode(-32603));
            assert!(mcp.message.contains("failsafe"));
            let data = mcp.data.unwrap();
            assert_eq!(data["kind"], "failsafe_triggered");
            assert!(data["hint"].as_str().unwrap().contains("corner"));
        }

        #[test]
        fn test_backend_unavailable_maps_to_internal_error() {
            let error = AutomationError::backend_unavailable("type_text", "xclip", "not found");
            let mcp = convert_automation_error_to_mcp(error);
            assert_eq!(mcp.code, ErrorCode(-32603));
            assert!(mcp.data.unwrap()["hint"].as_str().unwrap().contains("xclip"));
        }

        #[tokio::test]
        async fn test_tool_surfaces_invalid_params() {
            let (_mock, server) = fast_server();
            let err = server
                .click(Parameters(ClickParams {
                    x: Some(5),
                    ..Default::default()
                }))
                .await
                .unwrap_err();
            assert_eq!(err.code, ErrorCode(-32602));
        }

        #[tokio::test]
        async fn test_tool_surfaces_failsafe() {
            let (mock, server) = fast_server();
            mock.set_cursor(Point::new(0, 0));
            let err = server
                .press_key(Parameters(PressKeyParams {
                    key:     "a".to_string(),
                    presses: 1,
                }))
                .await
                .unwrap_err();
            assert_eq!(err.code, ErrorCode(-32603));
            assert_eq!(err.data.unwrap()["kind"], "failsafe_triggered");
        }
    }
}
