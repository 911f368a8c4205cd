use super::{ask_confirmation, controller, log_operation};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};

pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Clear { yes } = cmd {
        let mut ctl = controller(cfg)?;

        if !*yes && !ask_confirmation("Delete ALL saved estimates? This action is irreversible.") {
            info("Operation cancelled.");
            return Ok(());
        }

        ctl.clear_all().await?;
        success("All saved estimates deleted.");
        log_operation(
            cfg,
            "clear",
            "",
            &format!("Cleared all estimates ({})", ctl.view().mode_label()),
        );
    }

    Ok(())
}
