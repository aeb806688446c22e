//! MCP content builders for tool results
//!
//! Tools answer in one of three shapes:
//!
//! - queries: a single JSON text block ([`json_result`])
//! - actions: a short human-readable sentence ([`text_result`])
//! - screenshots: inline image content followed by a JSON metadata block
//!   ([`build_screenshot_result`])
//!
//! # Examples
//!
//! ```
//! use desktop_mcp::{mcp_content::build_screenshot_result, model::ScreenshotResult};
//!
//! let shot = ScreenshotResult {
//!     data:        vec![137, 80, 78, 71, 13, 10, 26, 10],
//!     width:       960,
//!     height:      540,
//!     downscaled:  true,
//!     region:      None,
//!     captured_at: "2025-01-01T00:00:00+00:00".to_string(),
//! };
//!
//! let result = build_screenshot_result(&shot);
//! assert_eq!(result.content.len(), 2); // Image + Metadata
//! ```

use base64::{Engine, engine::general_purpose::STANDARD};
use rmcp::model::{CallToolResult, Content, ErrorData as McpError};
use serde::Serialize;

use crate::model::ScreenshotResult;

/// Builds MCP image content from raw image bytes
///
/// # Examples
///
/// ```
/// use desktop_mcp::mcp_content::build_image_content;
///
/// let png_data = vec![137, 80, 78, 71, 13, 10, 26, 10, 0, 0, 0, 13];
/// let content = build_image_content(&png_data, "image/png");
/// assert!(content.as_image().is_some());
/// ```
pub fn build_image_content(data: &[u8], mime_type: &str) -> Content {
    Content::image(STANDARD.encode(data), mime_type)
}

/// Builds the metadata JSON describing a screenshot
pub fn screenshot_metadata(shot: &ScreenshotResult) -> serde_json::Value {
    serde_json::json!({
        "dimensions": [shot.width, shot.height],
        "format": ScreenshotResult::FORMAT,
        "downscaled": shot.downscaled,
        "region": shot.region,
        "size_bytes": shot.data.len(),
        "captured_at": shot.captured_at,
    })
}

/// Builds the screenshot tool result: inline PNG, then metadata
pub fn build_screenshot_result(shot: &ScreenshotResult) -> CallToolResult {
    let image_content = build_image_content(&shot.data, ScreenshotResult::MIME_TYPE);

    let metadata_str = serde_json::to_string_pretty(&screenshot_metadata(shot))
        .unwrap_or_else(|_| r#"{"error": "Failed to serialize metadata"}"#.to_string());

    CallToolResult::success(vec![image_content, Content::text(metadata_str)])
}

/// Wraps a sentence as a successful tool result
pub fn text_result(message: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(message.into())])
}

/// Serializes `value` as a JSON text tool result
pub fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json_str = serde_json::to_string(value).map_err(|e| {
        McpError::internal_error(format!("Failed to serialize tool result: {}", e), None)
    })?;
    Ok(CallToolResult::success(vec![Content::text(json_str)]))
}
