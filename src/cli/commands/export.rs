use super::{controller, log_operation};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::export::{NOTHING_TO_EXPORT, ensure_writable, export_to_file, notify_export_success};
use crate::ui::messages::info;
use std::path::Path;

pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        format,
        file,
        force,
    } = cmd
    {
        let mut ctl = controller(cfg)?;
        let view = ctl.refresh().await?;

        if view.is_empty() {
            info(NOTHING_TO_EXPORT);
            return Ok(());
        }

        let path = Path::new(file);
        ensure_writable(path, *force)?;
        export_to_file(&view.records, *format, path)?;

        notify_export_success(format.label(), path, view.records.len());
        log_operation(
            cfg,
            "export",
            file,
            &format!("{} record(s) as {}", view.records.len(), format.as_str()),
        );
    }
    Ok(())
}
