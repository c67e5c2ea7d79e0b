//! vpcinv - locally cached inventory of the EC2 instances in a VPC

use clap::Parser;

mod cli;
mod config;
mod error;
mod fetch;
mod inventory;
mod lock;
mod output;
mod provider;
mod rpc;
mod serial;

use cli::{Cli, CommandContext, Commands};
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if cli.debug {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    let ctx = CommandContext::new(&cli)?;

    match cli.command {
        Commands::List => cli::inventory::list(&ctx, cli.format).await,
        Commands::Get { ref instance_id } => {
            cli::inventory::get(&ctx, cli.format, instance_id).await
        }
        Commands::Refresh => cli::maintenance::refresh(&ctx).await,
        Commands::Status => cli::maintenance::status(&ctx, cli.format),
        Commands::Name { ref kind } => cli::maintenance::name(&ctx, kind),
        Commands::Nodes => cli::inventory::nodes(&ctx, cli.format).await,
    }
}
