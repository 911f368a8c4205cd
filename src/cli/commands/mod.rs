//! One handler per subcommand. Every handler receives the parsed command and
//! the effective configuration.

pub mod capture;
pub mod clear;
pub mod config;
pub mod del;
pub mod export;
pub mod init;
pub mod list;
pub mod log;
pub mod watch;

use crate::config::Config;
use crate::core::Controller;
use crate::db::initialize::init_db;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::gateway::Gateway;
use crate::ui::messages::warning;
use std::io::{self, Write};

/// Ask a yes/no confirmation from the user
pub(crate) fn ask_confirmation(prompt: &str) -> bool {
    warning(prompt);
    print!("Confirm [y/N]: ");
    let _ = io::stdout().flush();

    let mut s = String::new();
    if io::stdin().read_line(&mut s).is_ok() {
        matches!(s.trim().to_lowercase().as_str(), "y" | "yes")
    } else {
        false
    }
}

/// Controller over the backend selected by `cfg`.
pub(crate) fn controller(cfg: &Config) -> AppResult<Controller> {
    let gateway = Gateway::from_config(cfg)?;
    Ok(Controller::new(gateway, cfg.fallback_name.clone()))
}

fn write_log(cfg: &Config, operation: &str, target: &str, message: &str) -> AppResult<()> {
    let pool = DbPool::open(&cfg.database)?;
    init_db(&pool.conn)?;
    ttlog(&pool.conn, operation, target, message)
}

/// Write a line to the internal log table of the configured database.
/// Never fails: problems are reported as warnings.
pub(crate) fn log_operation(cfg: &Config, operation: &str, target: &str, message: &str) {
    if let Err(e) = write_log(cfg, operation, target, message) {
        warning(format!("Failed to write internal log: {e}"));
    }
}
