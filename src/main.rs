//! desktop-mcp: MCP server for desktop control over stdio
//!
//! Stdout carries the MCP protocol; all logs go to stderr.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use desktop_mcp::{
    backend::{DesktopBackend, MockBackend, composite_from_mock, create_default_backend},
    config::{BackendKind, Cli, LogFormat},
    dispatcher::Dispatcher,
    mcp::DesktopMcpServer,
    util::detect::detect_platform,
};
use rmcp::{ServiceExt, transport::stdio};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

fn init_logging(format: LogFormat) {
    // Respects RUST_LOG; default level: info
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("desktop_mcp=info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(false);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Prints where to grant the permissions macOS requires
fn print_macos_permission_hint() {
    if cfg!(target_os = "macos") {
        eprintln!(
            "desktop-mcp needs Accessibility permission (System Settings > Privacy & Security > \
             Accessibility) for mouse and keyboard control.\nIf screenshots fail, grant Screen \
             Recording permission (System Settings > Privacy & Security > Screen & System Audio \
             Recording), then restart."
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format);
    print_macos_permission_hint();

    info!("desktop-mcp server starting...");
    info!("Protocol: Model Context Protocol (MCP)");
    info!("Transport: stdio");

    let platform = detect_platform();
    info!("Platform: {} ({})", platform.os, platform.display);

    let backend: DesktopBackend = match cli.backend {
        BackendKind::Os => create_default_backend(&platform)
            .context("failed to initialize the OS automation backend")?,
        BackendKind::Mock => {
            warn!("Using mock backend: no input reaches the OS");
            composite_from_mock(Arc::new(MockBackend::new()))
        }
    };
    info!("Backend initialized: {:?}", backend);

    let config = cli.to_config();
    if !config.failsafe {
        warn!("Failsafe disabled: moving the mouse to a corner will not abort automation");
    }
    info!(
        "Pause: {}ms, clipboard restore: {}",
        config.pause.as_millis(),
        config.restore_clipboard
    );

    let dispatcher = Arc::new(Dispatcher::new(Arc::new(backend), config));
    let server = DesktopMcpServer::new(dispatcher);

    info!("Initializing stdio transport...");
    let service = server.serve(stdio()).await?;

    info!("desktop-mcp server initialized successfully");
    info!("Server info: {:?}", service.peer_info());
    info!("Waiting for MCP requests...");

    // Blocks until the client closes stdin
    service.waiting().await?;

    info!("desktop-mcp server shutting down");
    Ok(())
}
