//! linkvault library root.
//! Exposes the CLI parser, the high-level run() function, and the capture
//! and persistence modules behind them.

pub mod capture;
pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod export;
pub mod gateway;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Central command dispatcher
pub async fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Init => cli::commands::init::handle(cli),
        Commands::Config { .. } => cli::commands::config::handle(&cli.command, cfg),
        Commands::Capture { .. } => cli::commands::capture::handle(&cli.command, cfg).await,
        Commands::List => cli::commands::list::handle(&cli.command, cfg).await,
        Commands::Del { .. } => cli::commands::del::handle(&cli.command, cfg).await,
        Commands::Clear { .. } => cli::commands::clear::handle(&cli.command, cfg).await,
        Commands::Export { .. } => cli::commands::export::handle(&cli.command, cfg).await,
        Commands::Watch { .. } => cli::commands::watch::handle(&cli.command, cfg).await,
        Commands::Log { .. } => cli::commands::log::handle(&cli.command, cfg),
    }
}

/// Entry point usato da main.rs
pub async fn run() -> AppResult<()> {
    // 1️⃣ logging di diagnostica (RUST_LOG, default warn)
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .try_init();

    // 2️⃣ parse CLI
    let cli = Cli::parse();

    // 3️⃣ carica config UNA sola volta
    let mut cfg = Config::load()?;

    // 4️⃣ applica eventuale override del DB da riga di comando
    if let Some(custom_db) = &cli.db {
        cfg.database = utils::path::expand_tilde(custom_db)
            .to_string_lossy()
            .to_string();
    }

    // 5️⃣ passa tutto al dispatcher
    dispatch(&cli, &cfg).await
}
