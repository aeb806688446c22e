//! Error types for desktop automation operations
//!
//! Every failure a tool call can produce is an [`AutomationError`]. Each
//! variant names the operation that failed, and [`AutomationError::remediation_hint`]
//! gives the caller an actionable next step. None of these errors are fatal
//! to the server process.

use serde::Serialize;

use crate::model::Point;

/// Result type alias for automation operations
pub type AutomationResult<T> = Result<T, AutomationError>;

/// Coarse classification of an [`AutomationError`]
///
/// Serialized in snake_case into the `data.kind` field of MCP errors so
/// clients can branch on it without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or out-of-range parameter
    InvalidArgument,
    /// Missing platform dependency (display, clipboard utility, ...)
    BackendUnavailable,
    /// Cursor sits on a failsafe point
    FailsafeTriggered,
    /// The automation call itself failed
    ExecutionFailed,
}

impl ErrorKind {
    /// Returns the kind as a snake_case string
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::BackendUnavailable => "backend_unavailable",
            ErrorKind::FailsafeTriggered => "failsafe_triggered",
            ErrorKind::ExecutionFailed => "execution_failed",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error type for desktop automation operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum AutomationError {
    /// A parameter was malformed or out of range
    #[error("{operation}: invalid argument '{parameter}': {reason}")]
    InvalidArgument {
        /// Operation that rejected the argument
        operation: String,
        /// Name of the offending parameter
        parameter: String,
        /// Why it was rejected
        reason:    String,
    },

    /// A platform dependency needed by the operation is missing
    #[error("{operation}: {dependency} is unavailable: {reason}")]
    BackendUnavailable {
        /// Operation that needed the dependency
        operation:  String,
        /// Missing dependency (e.g. "xclip", "display")
        dependency: String,
        /// Underlying reason
        reason:     String,
    },

    /// The cursor is on a failsafe point; automation is suspended
    #[error(
        "{operation}: aborted by failsafe, cursor is at {position}. Move the mouse away from the \
         corner to resume"
    )]
    FailsafeTriggered {
        /// Operation that was aborted
        operation: String,
        /// Cursor position that tripped the failsafe
        position:  Point,
    },

    /// The backend call failed
    #[error("{operation} failed: {reason}")]
    ExecutionFailed {
        /// Operation that failed
        operation: String,
        /// Backend error message
        reason:    String,
    },
}

impl AutomationError {
    /// Builds an [`AutomationError::InvalidArgument`]
    pub fn invalid_argument(
        operation: impl Into<String>,
        parameter: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidArgument {
            operation: operation.into(),
            parameter: parameter.into(),
            reason:    reason.into(),
        }
    }

    /// Builds an [`AutomationError::BackendUnavailable`]
    pub fn backend_unavailable(
        operation: impl Into<String>,
        dependency: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::BackendUnavailable {
            operation:  operation.into(),
            dependency: dependency.into(),
            reason:     reason.into(),
        }
    }

    /// Builds an [`AutomationError::ExecutionFailed`]
    pub fn execution_failed(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            operation: operation.into(),
            reason:    reason.into(),
        }
    }

    /// Returns the coarse kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AutomationError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            AutomationError::BackendUnavailable { .. } => ErrorKind::BackendUnavailable,
            AutomationError::FailsafeTriggered { .. } => ErrorKind::FailsafeTriggered,
            AutomationError::ExecutionFailed { .. } => ErrorKind::ExecutionFailed,
        }
    }

    /// Returns the name of the operation that failed
    pub fn operation(&self) -> &str {
        match self {
            AutomationError::InvalidArgument { operation, .. }
            | AutomationError::BackendUnavailable { operation, .. }
            | AutomationError::FailsafeTriggered { operation, .. }
            | AutomationError::ExecutionFailed { operation, .. } => operation,
        }
    }

    /// Re-labels the error with the operation that surfaced it
    ///
    /// Backends report errors under their own primitive names ("key",
    /// "move_cursor"); the dispatcher re-labels them with the tool-level
    /// operation before handing them to the caller. An execution failure
    /// keeps the primitive name at the front of its reason.
    pub fn in_operation(mut self, name: &str) -> Self {
        match &mut self {
            AutomationError::ExecutionFailed { operation, reason } => {
                if operation.as_str() != name {
                    *reason = format!("{}: {}", operation, reason);
                    *operation = name.to_string();
                }
            }
            AutomationError::InvalidArgument { operation, .. }
            | AutomationError::BackendUnavailable { operation, .. }
            | AutomationError::FailsafeTriggered { operation, .. } => {
                *operation = name.to_string();
            }
        }
        self
    }

    /// Returns an actionable remediation hint for this error
    ///
    /// # Examples
    ///
    /// ```
    /// use desktop_mcp::error::AutomationError;
    ///
    /// let error = AutomationError::backend_unavailable("type_text", "xclip", "not found");
    /// assert!(error.remediation_hint().contains("apt install xclip"));
    /// ```
    pub fn remediation_hint(&self) -> &str {
        match self {
            AutomationError::InvalidArgument { parameter, .. } => match parameter.as_str() {
                "x" | "y" | "position" => {
                    "Use desktop_get_screen_size to find the logical screen bounds and keep \
                     coordinates inside them."
                }
                "key" | "keys" => {
                    "Use canonical key names such as 'enter', 'tab', 'escape', 'up', 'f5', \
                     'ctrl', 'shift', 'cmd', or a single character."
                }
                "region" => "Region width and height must be greater than 0.",
                _ => "Check the parameter value against the tool's input schema.",
            },
            AutomationError::BackendUnavailable { dependency, .. } => match dependency.as_str() {
                "xclip" => {
                    "Install xclip (e.g. 'sudo apt install xclip') to type non-ASCII text on \
                     Linux."
                }
                "pbcopy" | "pbpaste" => "pbcopy/pbpaste ship with macOS; check your PATH.",
                "clip" | "powershell" => "clip.exe ships with Windows; check your PATH.",
                "display" => {
                    "No usable display connection. Ensure the server runs inside a desktop \
                     session (DISPLAY or WAYLAND_DISPLAY set on Linux)."
                }
                "screen-capture" => {
                    "Screen capture is unavailable. On macOS grant Screen Recording permission \
                     in System Settings > Privacy & Security, then restart."
                }
                _ => "A required platform component is missing.",
            },
            AutomationError::FailsafeTriggered { .. } => {
                "The mouse is parked on the failsafe corner. A human operator moved it there to \
                 stop automation; wait until it is moved away."
            }
            AutomationError::ExecutionFailed { .. } => {
                "The OS rejected the input event. On macOS grant Accessibility permission in \
                 System Settings > Privacy & Security > Accessibility."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_message() {
        let error = AutomationError::invalid_argument("click", "clicks", "must be at least 1");

        let msg = error.to_string();
        assert!(msg.contains("click"));
        assert!(msg.contains("clicks"));
        assert!(msg.contains("must be at least 1"));
        assert_eq!(error.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_failsafe_message_names_position() {
        let error = AutomationError::FailsafeTriggered {
            operation: "click".to_string(),
            position:  Point::new(0, 0),
        };

        let msg = error.to_string();
        assert!(msg.contains("aborted by failsafe"));
        assert!(msg.contains("(0, 0)"));
        assert_eq!(error.kind(), ErrorKind::FailsafeTriggered);
    }

    #[test]
    fn test_backend_unavailable_xclip_hint() {
        let error = AutomationError::backend_unavailable("type_text", "xclip", "not found");

        assert_eq!(error.kind(), ErrorKind::BackendUnavailable);
        assert!(error.to_string().contains("xclip is unavailable"));
        assert!(error.remediation_hint().contains("xclip"));
    }

    #[test]
    fn test_key_hint_lists_names() {
        let error = AutomationError::invalid_argument("press_key", "key", "unknown key 'foo'");
        assert!(error.remediation_hint().contains("'enter'"));
    }

    #[test]
    fn test_in_operation_relabels() {
        let error = AutomationError::execution_failed("key", "press 's': boom").in_operation("hotkey");
        assert_eq!(error.operation(), "hotkey");
        assert_eq!(error.to_string(), "hotkey failed: key: press 's': boom");

        // Relabeling with the same name leaves the reason alone
        let error = AutomationError::execution_failed("screenshot", "boom").in_operation("screenshot");
        assert_eq!(error.to_string(), "screenshot failed: boom");
    }

    #[test]
    fn test_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&ErrorKind::FailsafeTriggered).unwrap(),
            r#""failsafe_triggered""#
        );
        assert_eq!(ErrorKind::BackendUnavailable.to_string(), "backend_unavailable");
    }
}
