use super::capture::record_outcome;
use crate::capture::PageSelectors;
use crate::capture::script::{parse_script, run_script};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::gateway::Gateway;
use crate::ui::messages::{info, notify};
use std::fs;

/// Replay a page script: every click on an attached control goes through the
/// same capture path as `capture`.
pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Watch { script } = cmd {
        let content = fs::read_to_string(script)?;
        let steps = parse_script(&content)?;
        let selectors = PageSelectors::try_from(&cfg.selectors)?;
        let gateway = Gateway::from_config(cfg)?;

        let report = run_script(&gateway, &cfg.fallback_name, selectors, &steps, notify).await?;

        for capture in &report.captures {
            record_outcome(cfg, &capture.outcome, capture.url.as_deref().unwrap_or_default());
        }

        info(format!(
            "Replayed {} step(s): {} control(s) attached, {} click(s), {} saved.",
            report.steps,
            report.attached,
            report.clicks,
            report.saved()
        ));
    }
    Ok(())
}
