//! MCP Server Test Harness
//!
//! Provides reusable fixtures for exercising the desktop MCP server against
//! the recording mock backend (and, for ignored live tests, the OS backend).
//!
//! # Usage
//!
//! ```rust
//! use common::mcp_harness::{ContentValidator, McpTestContext};
//!
//! #[tokio::test]
//! async fn test_capture() {
//!     let ctx = McpTestContext::new_with_mock();
//!     let result = ctx.screenshot(None, true).await.unwrap();
//!     let parts = ContentValidator::validate_screenshot_result(&result).unwrap();
//!     assert!(parts.image_bytes.starts_with(&[0x89, 0x50, 0x4e, 0x47])); // PNG
//! }
//! ```

#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use base64::{Engine, engine::general_purpose::STANDARD};
use desktop_mcp::{
    backend::{InputEvent, MockBackend},
    config::AutomationConfig,
    keys::Key,
    mcp::{
        ClickParams, DesktopMcpServer, DragParams, HotkeyParams, MoveMouseParams, PressKeyParams,
        ScreenshotParams, ScrollParams, TypeTextParams,
    },
    model::{HealthCheckResponse, MouseButton, Point, ScreenRegion, ScreenSize},
};
use rmcp::{
    handler::server::wrapper::Parameters,
    model::{CallToolResult, ErrorData},
};

pub type ToolResult = Result<CallToolResult, ErrorData>;

/// Configuration used by the harness: no pause, ctrl+v paste
pub fn test_config() -> AutomationConfig {
    AutomationConfig::default()
        .with_pause(Duration::ZERO)
        .with_paste_modifier(Key::Control)
}

/// Server plus a handle on the mock behind it
pub struct McpTestContext {
    pub server: DesktopMcpServer,
    pub mock:   Arc<MockBackend>,
}

impl McpTestContext {
    /// Mock with a 1x display so screenshots stay small
    pub fn new_with_mock() -> Self {
        Self::new_with_configured_mock(MockBackend::new().with_scale_factor(1), test_config())
    }

    pub fn new_with_configured_mock(mock: MockBackend, config: AutomationConfig) -> Self {
        let mock = Arc::new(mock);
        let server = DesktopMcpServer::with_mock(Arc::clone(&mock), config);
        Self { server, mock }
    }

    #[cfg(feature = "os-backend")]
    pub fn new_with_os_backend() -> Self {
        use desktop_mcp::{
            backend::create_default_backend, dispatcher::Dispatcher, util::detect::detect_platform,
        };

        let backend = create_default_backend(&detect_platform())
            .expect("OS backend should initialize inside a desktop session");
        let dispatcher = Arc::new(Dispatcher::new(Arc::new(backend), test_config()));
        Self {
            server: DesktopMcpServer::new(dispatcher),
            mock:   Arc::new(MockBackend::new()),
        }
    }

    // --- Tool invocation helpers ---

    pub async fn health_check(&self) -> ToolResult {
        self.server.health_check().await
    }

    pub async fn get_screen_size(&self) -> ToolResult {
        self.server.get_screen_size().await
    }

    pub async fn get_mouse_position(&self) -> ToolResult {
        self.server.get_mouse_position().await
    }

    pub async fn move_mouse(&self, x: i32, y: i32) -> ToolResult {
        self.server
            .move_mouse(Parameters(MoveMouseParams {
                x,
                y,
                ..Default::default()
            }))
            .await
    }

    pub async fn click_at(&self, x: i32, y: i32) -> ToolResult {
        self.server
            .click(Parameters(ClickParams {
                x: Some(x),
                y: Some(y),
                ..Default::default()
            }))
            .await
    }

    pub async fn click(&self, params: ClickParams) -> ToolResult {
        self.server.click(Parameters(params)).await
    }

    pub async fn scroll(&self, amount: i32) -> ToolResult {
        self.server
            .scroll(Parameters(ScrollParams {
                amount,
                ..Default::default()
            }))
            .await
    }

    pub async fn drag(&self, from: Point, to: Point) -> ToolResult {
        self.server
            .drag(Parameters(DragParams {
                from_x:      from.x,
                from_y:      from.y,
                to_x:        to.x,
                to_y:        to.y,
                button:      MouseButton::Left,
                duration_ms: 100,
            }))
            .await
    }

    pub async fn type_text(&self, text: &str) -> ToolResult {
        self.server
            .type_text(Parameters(TypeTextParams {
                text:        text.to_string(),
                interval_ms: 0,
            }))
            .await
    }

    pub async fn press_key(&self, key: &str) -> ToolResult {
        self.server
            .press_key(Parameters(PressKeyParams {
                key:     key.to_string(),
                presses: 1,
            }))
            .await
    }

    pub async fn hotkey(&self, keys: &[&str]) -> ToolResult {
        self.server
            .hotkey(Parameters(HotkeyParams {
                keys: keys.iter().map(|k| k.to_string()).collect(),
            }))
            .await
    }

    pub async fn screenshot(&self, region: Option<ScreenRegion>, reduce_resolution: bool) -> ToolResult {
        self.server
            .screenshot(Parameters(ScreenshotParams {
                region,
                reduce_resolution,
            }))
            .await
    }

    // --- Utility methods ---

    pub fn events(&self) -> Vec<InputEvent> {
        self.mock.events()
    }

    pub fn clear_events(&self) {
        self.mock.clear_events();
    }
}

// ============================================================================
// Content Validators
// ============================================================================

#[derive(Debug)]
pub struct ScreenshotResultParts {
    pub image_bytes: Vec<u8>,
    pub metadata:    serde_json::Value,
}

pub struct ContentValidator;

impl ContentValidator {
    pub fn validate_base64_image(
        result: &CallToolResult,
        expected_mime: &str,
    ) -> Result<Vec<u8>, String> {
        let image = result
            .content
            .first()
            .ok_or("Missing image content")?
            .as_image()
            .ok_or("First content is not an image")?;

        if image.mime_type != expected_mime {
            return Err(format!(
                "Expected MIME type '{}', got '{}'",
                expected_mime, image.mime_type
            ));
        }

        STANDARD
            .decode(&image.data)
            .map_err(|e| format!("Invalid base64: {}", e))
    }

    pub fn validate_metadata(
        result: &CallToolResult,
        expected_width: Option<u32>,
        expected_height: Option<u32>,
    ) -> Result<serde_json::Value, String> {
        let text = result
            .content
            .get(1)
            .ok_or("Missing metadata content")?
            .as_text()
            .ok_or("Second content is not text")?;

        let metadata: serde_json::Value =
            serde_json::from_str(&text.text).map_err(|e| format!("Invalid metadata JSON: {}", e))?;

        let dims = metadata["dimensions"]
            .as_array()
            .ok_or("Metadata missing dimensions")?;
        if let Some(width) = expected_width {
            if dims.first().and_then(|v| v.as_u64()) != Some(width as u64) {
                return Err(format!("Expected width {}, got {:?}", width, dims.first()));
            }
        }
        if let Some(height) = expected_height {
            if dims.get(1).and_then(|v| v.as_u64()) != Some(height as u64) {
                return Err(format!("Expected height {}, got {:?}", height, dims.get(1)));
            }
        }
        if metadata["format"] != "png" {
            return Err(format!("Expected png format, got {}", metadata["format"]));
        }
        Ok(metadata)
    }

    pub fn validate_screenshot_result(result: &CallToolResult) -> Result<ScreenshotResultParts, String> {
        if result.is_error.unwrap_or(false) {
            return Err("Result is an error".to_string());
        }
        if result.content.len() != 2 {
            return Err(format!("Expected 2 content items, got {}", result.content.len()));
        }
        let image_bytes = Self::validate_base64_image(result, "image/png")?;
        let metadata = Self::validate_metadata(result, None, None)?;

        let size = metadata["size_bytes"].as_u64().ok_or("Metadata missing size_bytes")?;
        if size != image_bytes.len() as u64 {
            return Err(format!("size_bytes {} != image length {}", size, image_bytes.len()));
        }
        Ok(ScreenshotResultParts {
            image_bytes,
            metadata,
        })
    }

    pub fn text(result: &CallToolResult) -> Result<String, String> {
        result
            .content
            .first()
            .and_then(|c| c.as_text())
            .map(|t| t.text.clone())
            .ok_or_else(|| "First content is not text".to_string())
    }
}

// ============================================================================
// Parsers
// ============================================================================

pub fn parse_health_check(result: &CallToolResult) -> Result<HealthCheckResponse, String> {
    let text = ContentValidator::text(result)?;
    serde_json::from_str(&text).map_err(|e| format!("Invalid health check JSON: {}", e))
}

pub fn parse_screen_size(result: &CallToolResult) -> Result<ScreenSize, String> {
    let text = ContentValidator::text(result)?;
    serde_json::from_str(&text).map_err(|e| format!("Invalid screen size JSON: {}", e))
}

pub fn parse_position(result: &CallToolResult) -> Result<Point, String> {
    let text = ContentValidator::text(result)?;
    serde_json::from_str(&text).map_err(|e| format!("Invalid position JSON: {}", e))
}

/// Returns the `data.kind` tag of an MCP error
pub fn error_kind(error: &ErrorData) -> Option<String> {
    error
        .data
        .as_ref()
        .and_then(|d| d["kind"].as_str())
        .map(str::to_string)
}
