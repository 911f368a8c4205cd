use super::{ask_confirmation, controller, log_operation};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::{info, success, warning};

pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Del { id, yes } = cmd {
        let mut ctl = controller(cfg)?;

        //
        // Lookup, so the prompt can name what goes away
        //
        let known = ctl
            .refresh()
            .await?
            .records
            .iter()
            .find(|r| &r.id == id)
            .map(|r| r.name.clone());

        let Some(name) = known else {
            warning(format!("No saved estimate with id {id}."));
            return Ok(());
        };

        //
        // Confirmation prompt
        //
        if !*yes && !ask_confirmation(&format!("Delete '{name}' ({id})? This action is irreversible."))
        {
            info("Operation cancelled.");
            return Ok(());
        }

        //
        // Execute deletion
        //
        let remaining = ctl.delete(id).await?.rows.len();
        success(format!("Estimate '{name}' deleted ({remaining} left)."));
        log_operation(cfg, "del", id, &format!("Deleted '{name}'"));
    }

    Ok(())
}
