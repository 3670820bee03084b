//! Contacts API server entry point
use anyhow::Result;
use clap::Parser;
use contacts_api::{api::server::AppServer, config::AppConfig};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "contacts_api")]
#[command(about = "User accounts and contact books over HTTP")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Address to bind, overrides HOST
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, overrides PORT
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // a missing .env file is fine
    dotenv::dotenv().ok();

    init_logging()?;

    info!("Starting contacts API v{}", env!("CARGO_PKG_VERSION"));

    let mut config = AppConfig::from_env()?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let server = AppServer::new(config).await?;
    server.start().await
}

const DEFAULT_LOG_FILTER: &str = "info,tower_http=info";

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing::subscriber::set_global_default(build_subscriber(filter))?;
    Ok(())
}

/// The filter alone decides which levels are enabled
fn build_subscriber(filter: EnvFilter) -> impl tracing::Subscriber + Send + Sync + 'static {
    FmtSubscriber::builder().with_env_filter(filter).finish()
}
