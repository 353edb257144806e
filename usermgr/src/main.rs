//! usermgr Server Entry Point

use clap::Parser;
use tracing::info;
use usermgr::cli::{Cli, Commands};
use usermgr::config::ServerConfig;
use usermgr::{db, logging, server, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init()?;

    let config = match cli.command {
        Some(Commands::Serve(args)) => args.apply(ServerConfig::from_env()),
        None => ServerConfig::from_env(),
    };

    info!(
        database_url = %config.database_url,
        max_connections = config.max_connections,
        "Initializing database"
    );
    let db_pool = db::migrations::initialize_database(&config.database_url, config.max_connections)
        .await?;

    let state = AppState::new(db_pool);
    server::run(state, &config.bind_addr()).await
}
