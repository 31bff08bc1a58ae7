// Import and re-export the `error` module
pub use self::error::{Error, Result};
mod error;

use clap::Parser;
use cli::{Cli, Commands};
use clubledger_core::config::ClubConfig;

mod cli;
mod commands;
mod logging;

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = run().await {
        log::error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<()> {
    logging::init()?;

    let args = Cli::parse();

    let mut config = ClubConfig::from_env();
    if let Some(dir) = &args.data_dir {
        config = config.with_data_dir(dir);
    }
    if let Some(roster) = &args.roster {
        config = config.with_roster(roster);
    }
    log::debug!("using config {config:?}");

    match args.command {
        Commands::Login { email, password } => commands::login(&config, email, password).await?,
        Commands::Status => commands::status(&config),
        Commands::Logout => commands::logout(&config),
        Commands::Open { path, capability } => commands::open(&config, &path, capability),
        Commands::Members => commands::members(&config).await,
        Commands::HashPassword { password } => commands::hash_password(&password)?,
        Commands::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
