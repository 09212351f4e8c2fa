mod cli;

use clap::Parser;
use cli::Cli;
use mashup::{api, config::Config, observability};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    observability::init_tracing();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config)?;
    if let Some(address) = cli.address {
        config.server.bind_addr = address;
    }
    let credentials = config.credentials()?;

    api::run(config, credentials).await?;

    Ok(())
}
