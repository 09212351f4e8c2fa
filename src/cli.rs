use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mashup")]
#[command(about = "Mashup web service", long_about = None)]
pub struct Cli {
    /// Address to bind the HTTP server to (overrides server.bind_addr)
    #[arg(long)]
    pub address: Option<SocketAddr>,

    /// Configuration file (defaults to $MASHUP_CONFIG, then config/mashup.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}
