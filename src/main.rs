//! PDF Tools MCP Server entry point.
//!
//! This binary starts the MCP server using STDIO transport.

use pdf_tools_mcp_server::PdfToolsServer;
use rmcp::ServiceExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging to stderr (important for STDIO transport)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_tools_mcp_server=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting PDF Tools MCP Server v{}", env!("CARGO_PKG_VERSION"));

    let server = PdfToolsServer::new();
    tracing::debug!(
        max_scale = server.config().max_scale,
        max_pixels = server.config().max_pixels,
        "server limits"
    );

    let service = server.serve(rmcp::transport::stdio()).await?;
    service.waiting().await?;

    tracing::info!("PDF Tools MCP Server stopped");
    Ok(())
}
