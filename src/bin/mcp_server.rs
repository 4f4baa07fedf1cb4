use anyhow::Result;
use tracing::info;

use ember::config::Config;
use ember::mcp::McpServer;

#[tokio::main]
async fn main() -> Result<()> {
    ember::logging::init();

    let config = Config::new(None)?;

    info!(
        data_dir = %config.data_dir.display(),
        provider = %config.provider,
        model = %config.model(),
        strict_mode = config.strict_mode,
        "ember MCP server starting"
    );

    let server = McpServer::new(&config);
    server.run().await?;

    Ok(())
}
