use crate::capture::{CaptureOutcome, CaptureTrigger, HostAdapter, PageSelectors, RecordBuilder};
use crate::gateway::{BackendMode, Gateway, GatewayError, GatewayResult};
use crate::models::{Record, sort_for_display};
use log::debug;

/// Message shown when the saved-links list cannot be loaded.
pub fn load_error_message(err: &GatewayError) -> &'static str {
    match err.status() {
        Some(403) => "Access Denied (403). Please check your API Key.",
        Some(429) => "Too many requests (429). Please wait and try again.",
        _ => "Failed to load estimates. Is the API Key correct?",
    }
}

/// One line of the saved-links table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRow {
    pub id: String,
    /// Local time, `YYYY-MM-DD HH:MM:SS`.
    pub captured_at: String,
    pub name: String,
    pub url: String,
}

impl From<&Record> for RecordRow {
    fn from(r: &Record) -> Self {
        Self {
            id: r.id.clone(),
            captured_at: r.display_timestamp(),
            name: r.name.clone(),
            url: r.url.clone(),
        }
    }
}

/// Everything the presentation layer needs to draw the saved-links view.
/// Rebuilt from scratch on every refresh.
#[derive(Debug, Clone)]
pub struct ViewModel {
    pub mode: BackendMode,
    /// Newest first.
    pub records: Vec<Record>,
    pub rows: Vec<RecordRow>,
    pub error: Option<String>,
}

impl ViewModel {
    fn empty(mode: BackendMode) -> Self {
        Self {
            mode,
            records: Vec::new(),
            rows: Vec::new(),
            error: None,
        }
    }

    pub fn mode_label(&self) -> &'static str {
        self.mode.label()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Owns the gateway and the current view-model; every user action goes
/// through here and leaves a fresh snapshot behind.
pub struct Controller {
    gateway: Gateway,
    fallback_name: String,
    view: ViewModel,
}

impl Controller {
    pub fn new(gateway: Gateway, fallback_name: impl Into<String>) -> Self {
        let view = ViewModel::empty(gateway.mode());
        Self {
            gateway,
            fallback_name: fallback_name.into(),
            view,
        }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn fallback_name(&self) -> &str {
        &self.fallback_name
    }

    pub fn view(&self) -> &ViewModel {
        &self.view
    }

    /// Reload the snapshot. On failure the view keeps no rows and carries the
    /// user-facing error text; the error itself is returned as well.
    pub async fn refresh(&mut self) -> GatewayResult<&ViewModel> {
        let mut view = ViewModel::empty(self.gateway.mode());

        match self.gateway.list().await {
            Ok(mut records) => {
                sort_for_display(&mut records);
                view.rows = records.iter().map(RecordRow::from).collect();
                view.records = records;
                debug!("view refreshed: {} rows", view.rows.len());
                self.view = view;
                Ok(&self.view)
            }
            Err(e) => {
                view.error = Some(load_error_message(&e).to_string());
                self.view = view;
                Err(e)
            }
        }
    }

    /// Delete one record, then refresh.
    pub async fn delete(&mut self, id: &str) -> GatewayResult<&ViewModel> {
        self.gateway.delete(id).await?;
        self.refresh().await
    }

    /// Delete every record, then refresh.
    pub async fn clear_all(&mut self) -> GatewayResult<&ViewModel> {
        self.gateway.clear().await?;
        self.refresh().await
    }

    pub async fn capture(&mut self, url: &str, heading: Option<&str>) -> CaptureOutcome {
        let outcome = RecordBuilder::new(&self.gateway, &self.fallback_name)
            .capture(url, heading)
            .await;
        self.after_capture(&outcome).await;
        outcome
    }

    pub async fn on_trigger<H: HostAdapter>(
        &mut self,
        host: &H,
        selectors: &PageSelectors,
        trigger: CaptureTrigger,
    ) -> CaptureOutcome {
        let outcome = RecordBuilder::new(&self.gateway, &self.fallback_name)
            .on_trigger(host, selectors, trigger)
            .await;
        self.after_capture(&outcome).await;
        outcome
    }

    async fn after_capture(&mut self, outcome: &CaptureOutcome) {
        if matches!(outcome, CaptureOutcome::Saved(_)) {
            // the capture already succeeded; a failed reload only shows in the view
            let _ = self.refresh().await;
        }
    }
}
