//! Skirmish server binary.

use skirmish::network::{GameServer, ServerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("skirmish server v{}", skirmish::VERSION);

    let config = ServerConfig::from_env();
    let server = GameServer::new(config);
    server.run().await?;
    Ok(())
}
