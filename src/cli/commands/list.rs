use super::controller;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::ViewModel;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{error, header, info};
use crate::utils::table::{Column, Table};

pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::List = cmd {
        let mut ctl = controller(cfg)?;

        if let Err(e) = ctl.refresh().await {
            let msg = ctl.view().error.as_deref().unwrap_or_default();
            error(format!("{msg} ({e})"));
            return Err(AppError::Reported);
        }
        print_view(ctl.view());
    }
    Ok(())
}

fn print_view(view: &ViewModel) {
    header("💾 Saved estimates");

    if view.is_empty() {
        info("No estimates saved yet.");
    } else {
        let mut table = Table::new(vec![
            Column::new("ID", 24),
            Column::new("Captured", 19),
            Column::new("Name", 40),
            Column::new("URL", 80),
        ]);
        for row in &view.rows {
            table.add_row(vec![
                row.id.clone(),
                row.captured_at.clone(),
                row.name.clone(),
                row.url.clone(),
            ]);
        }
        print!("{}", table.render());
    }

    println!("\nMode: {}", view.mode_label());
}
