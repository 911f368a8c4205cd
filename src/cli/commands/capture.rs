use super::{controller, log_operation};
use crate::capture::CaptureOutcome;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::notify;

/// Handle `capture <URL> [--name]`: same path as a click on the page.
pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Capture { url, name } = cmd {
        let mut ctl = controller(cfg)?;
        let outcome = ctl.capture(url, name.as_deref()).await;

        notify(&outcome);
        record_outcome(cfg, &outcome, url);

        match outcome {
            CaptureOutcome::Failed(_) => return Err(AppError::Reported),
            CaptureOutcome::Empty => {
                return Err(AppError::Other("nothing to capture: empty link".to_string()));
            }
            CaptureOutcome::Saved(rec) => println!("🆔 {}", rec.id),
            CaptureOutcome::Duplicate => {}
        }
    }
    Ok(())
}

/// Diagnostic log line for a capture outcome (empty captures are not logged).
pub(crate) fn record_outcome(cfg: &Config, outcome: &CaptureOutcome, url: &str) {
    let message = match outcome {
        CaptureOutcome::Saved(rec) => format!("Saved '{}' as {}", rec.name, rec.id),
        CaptureOutcome::Duplicate => "Link already saved".to_string(),
        CaptureOutcome::Failed(e) => format!("Save failed: {e}"),
        CaptureOutcome::Empty => return,
    };
    log_operation(cfg, outcome.operation(), url, &message);
}
