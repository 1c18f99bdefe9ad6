use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use users_core::{ReqwestTransport, UserStore, UsersClient};

mod cli;
mod logging;
mod shell;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    logging::init(cli.verbose)?;

    let config = cli.http_config();
    tracing::info!(base_url = %config.base_url, timeout = ?config.timeout, "starting");
    let transport = ReqwestTransport::from_config(&config)?;
    let store = Arc::new(UserStore::new(UsersClient::new(config, transport)));

    shell::Shell::new(store).run_stdio().await?;

    Ok(())
}
