//! desktop-mcp: desktop control over the Model Context Protocol
//!
//! This library exposes mouse, keyboard and screen capture primitives as MCP
//! tools. The [`dispatcher::Dispatcher`] validates arguments, enforces the
//! failsafe corner and the inter-action pause, and drives a pluggable
//! [`backend::DesktopBackend`]. The [`mcp`] module is the thin protocol layer
//! on top.

pub mod backend;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod keys;
pub mod mcp;
pub mod mcp_content;
pub mod model;
pub mod util;
