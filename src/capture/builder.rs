use super::PageSelectors;
use super::host::HostAdapter;
use super::watcher::CaptureTrigger;
use crate::gateway::{Gateway, GatewayError};
use crate::models::Record;
use crate::utils::text::collapse_whitespace;
use chrono::{DateTime, Utc};
use log::{debug, warn};

/// Result of one capture attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// A new record was stored.
    Saved(Record),
    /// The link is already stored; nothing was written.
    Duplicate,
    /// The captured field had no value; ignored silently.
    Empty,
    /// The store failed; nothing is retried.
    Failed(GatewayError),
}

impl CaptureOutcome {
    /// User notification for this outcome (`Empty` shows nothing).
    pub fn message(&self) -> Option<&'static str> {
        match self {
            CaptureOutcome::Saved(_) => Some("Estimate Saved!"),
            CaptureOutcome::Duplicate => Some("Link Already Saved"),
            CaptureOutcome::Failed(_) => Some("Save Failed!"),
            CaptureOutcome::Empty => None,
        }
    }

    /// Operation name written to the diagnostic log.
    pub fn operation(&self) -> &'static str {
        match self {
            CaptureOutcome::Saved(_) => "capture",
            CaptureOutcome::Duplicate => "capture_duplicate",
            CaptureOutcome::Failed(_) => "capture_failed",
            CaptureOutcome::Empty => "capture_empty",
        }
    }
}

/// Turns a captured link into a stored record, unless it is already stored.
pub struct RecordBuilder<'a> {
    gateway: &'a Gateway,
    fallback_name: &'a str,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(gateway: &'a Gateway, fallback_name: &'a str) -> Self {
        Self {
            gateway,
            fallback_name,
        }
    }

    /// Heading text on a single line, or the fallback label when it is missing or blank.
    pub fn resolve_name(&self, heading: Option<&str>) -> String {
        heading
            .map(collapse_whitespace)
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| self.fallback_name.to_string())
    }

    pub async fn capture(&self, url: &str, heading: Option<&str>) -> CaptureOutcome {
        self.capture_at(url, heading, Utc::now()).await
    }

    /// `list()` is fully awaited before `create()`; two captures running side by
    /// side can still both pass the duplicate check.
    pub async fn capture_at(
        &self,
        url: &str,
        heading: Option<&str>,
        now: DateTime<Utc>,
    ) -> CaptureOutcome {
        let url = url.trim();
        if url.is_empty() {
            return CaptureOutcome::Empty;
        }

        let existing = match self.gateway.list().await {
            Ok(records) => records,
            Err(e) => {
                warn!("capture aborted, cannot read saved links: {e}");
                return CaptureOutcome::Failed(e);
            }
        };

        if existing.iter().any(|r| r.url == url) {
            debug!("link already saved: {url}");
            return CaptureOutcome::Duplicate;
        }

        let record = Record::captured_at(self.resolve_name(heading), url, now);
        match self.gateway.create(&record).await {
            Ok(()) => CaptureOutcome::Saved(record),
            Err(e) => {
                warn!("capture of {url} failed: {e}");
                CaptureOutcome::Failed(e)
            }
        }
    }

    /// Capture from a click on an attached control: read the link field in the
    /// enclosing wrapper and the page heading, then run the guard.
    pub async fn on_trigger<H: HostAdapter>(
        &self,
        host: &H,
        selectors: &PageSelectors,
        trigger: CaptureTrigger,
    ) -> CaptureOutcome {
        match read_page(host, selectors, trigger) {
            Some(page) => self.capture_page(&page).await,
            None => CaptureOutcome::Empty,
        }
    }

    pub async fn capture_page(&self, page: &PageCapture) -> CaptureOutcome {
        self.capture(&page.url, page.heading.as_deref()).await
    }
}

/// What a click makes available: the link field value and the page heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCapture {
    pub url: String,
    pub heading: Option<String>,
}

/// `None` when the clicked control has no wrapper, or the wrapper no link field.
pub fn read_page<H: HostAdapter>(
    host: &H,
    selectors: &PageSelectors,
    trigger: CaptureTrigger,
) -> Option<PageCapture> {
    let wrapper = host
        .closest(trigger.target, &selectors.wrapper)
        .or_else(|| host.closest(trigger.control, &selectors.wrapper))?;
    let field = host.query(wrapper, &selectors.field)?;
    let url = host.value(field)?;

    let heading = host
        .query(host.document_root(), &selectors.heading)
        .map(|h| host.text_content(h));

    Some(PageCapture { url, heading })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::host::SyntheticDocument;
    use crate::config::{DEFAULT_FALLBACK_NAME, SelectorConfig};
    use crate::gateway::{MemoryStore, TransportError};
    use chrono::TimeZone;

    const URL_A: &str = "https://calculator.aws/#/estimate?id=abc";

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[tokio::test]
    async fn saves_new_link_with_heading_as_name() {
        let store = MemoryStore::new();
        let gw = Gateway::new(store.clone());
        let b = RecordBuilder::new(&gw, DEFAULT_FALLBACK_NAME);

        let out = b.capture_at(URL_A, Some("  Estimate A \n"), at(1_000)).await;

        let CaptureOutcome::Saved(rec) = out else {
            panic!("expected Saved, got {out:?}");
        };
        assert_eq!(rec.name, "Estimate A");
        assert_eq!(rec.url, URL_A);
        assert_eq!(rec.timestamp, "1970-01-01T00:16:40.000Z");
        assert_eq!(store.snapshot(), vec![rec]);
    }

    #[tokio::test]
    async fn same_url_twice_is_stored_once() {
        let store = MemoryStore::new();
        let gw = Gateway::new(store.clone());
        let b = RecordBuilder::new(&gw, DEFAULT_FALLBACK_NAME);

        assert!(matches!(b.capture(URL_A, None).await, CaptureOutcome::Saved(_)));
        assert_eq!(b.capture(URL_A, None).await, CaptureOutcome::Duplicate);

        assert_eq!(store.snapshot().len(), 1);
        assert_eq!(store.create_calls(), 1);
    }

    #[tokio::test]
    async fn empty_value_does_nothing() {
        let store = MemoryStore::new();
        let gw = Gateway::new(store.clone());
        let b = RecordBuilder::new(&gw, DEFAULT_FALLBACK_NAME);

        let out = b.capture("   ", Some("Estimate")).await;
        assert_eq!(out, CaptureOutcome::Empty);
        assert_eq!(out.message(), None);
        assert_eq!(store.create_calls(), 0);
    }

    #[tokio::test]
    async fn missing_heading_uses_fallback() {
        let gw = Gateway::new(MemoryStore::new());
        let b = RecordBuilder::new(&gw, DEFAULT_FALLBACK_NAME);

        for heading in [None, Some(""), Some("   ")] {
            assert_eq!(b.resolve_name(heading), "Untitled Estimate");
        }
    }

    #[tokio::test]
    async fn store_failure_is_reported_not_retried() {
        let store = MemoryStore::new();
        let gw = Gateway::new(store.clone());
        let b = RecordBuilder::new(&gw, DEFAULT_FALLBACK_NAME);

        let err = GatewayError::from(TransportError::Status {
            status: 500,
            body: "boom".into(),
        });
        store.fail_with(Some(err.clone()));

        let out = b.capture(URL_A, None).await;
        assert_eq!(out, CaptureOutcome::Failed(err));
        assert_eq!(out.message(), Some("Save Failed!"));
        assert_eq!(store.create_calls(), 0);
    }

    #[tokio::test]
    async fn trigger_reads_field_in_enclosing_wrapper() {
        let doc = SyntheticDocument::new();
        let selectors = PageSelectors::try_from(&SelectorConfig::default()).unwrap();

        let h1 = doc.create_element("h1", &[("class", "awsui_h1-variant_1 other")]);
        doc.set_text(h1, "Team budget").unwrap();
        doc.append(doc.document_root(), h1).unwrap();

        let wrapper = doc.create_element("div", &[("class", "save-share-clipboard-wrapper")]);
        let input = doc.create_element("input", &[("type", "text"), ("readonly", "")]);
        doc.set_value(input, URL_A).unwrap();
        let button = doc.create_element("button", &[("class", "clipboard-button")]);
        doc.append(wrapper, input).unwrap();
        doc.append(wrapper, button).unwrap();
        doc.append(doc.document_root(), wrapper).unwrap();

        let store = MemoryStore::new();
        let gw = Gateway::new(store.clone());
        let b = RecordBuilder::new(&gw, DEFAULT_FALLBACK_NAME);

        let trigger = CaptureTrigger {
            control: button,
            target: button,
        };
        let out = b.on_trigger(&doc, &selectors, trigger).await;

        let CaptureOutcome::Saved(rec) = out else {
            panic!("expected Saved, got {out:?}");
        };
        assert_eq!(rec.name, "Team budget");
        assert_eq!(rec.url, URL_A);
    }

    #[tokio::test]
    async fn heading_split_over_lines_is_stored_on_one_line() {
        let doc = SyntheticDocument::new();
        let selectors = PageSelectors::try_from(&SelectorConfig::default()).unwrap();

        let h1 = doc.create_element("h1", &[("class", "awsui_h1-variant_1")]);
        let first = doc.create_text("Prod\n");
        let second = doc.create_text("  budget");
        doc.append(h1, first).unwrap();
        doc.append(h1, second).unwrap();
        doc.append(doc.document_root(), h1).unwrap();

        let wrapper = doc.create_element("div", &[("class", "save-share-clipboard-wrapper")]);
        let input = doc.create_element("input", &[("type", "text"), ("readonly", "")]);
        doc.set_value(input, URL_A).unwrap();
        let button = doc.create_element("button", &[("class", "clipboard-button")]);
        doc.append(wrapper, input).unwrap();
        doc.append(wrapper, button).unwrap();
        doc.append(doc.document_root(), wrapper).unwrap();

        let gw = Gateway::new(MemoryStore::new());
        let b = RecordBuilder::new(&gw, DEFAULT_FALLBACK_NAME);
        let trigger = CaptureTrigger {
            control: button,
            target: button,
        };

        let page = read_page(&doc, &selectors, trigger).unwrap();
        assert_eq!(page.url, URL_A);

        let out = b.capture_page(&page).await;
        let CaptureOutcome::Saved(rec) = out else {
            panic!("expected Saved, got {out:?}");
        };
        assert_eq!(rec.name, "Prod budget");
        assert_eq!(b.resolve_name(Some("Team\r\n\tEU ")), "Team EU");
    }

    #[tokio::test]
    async fn trigger_without_field_is_empty() {
        let doc = SyntheticDocument::new();
        let selectors = PageSelectors::try_from(&SelectorConfig::default()).unwrap();

        let wrapper = doc.create_element("div", &[("class", "save-share-clipboard-wrapper")]);
        let button = doc.create_element("button", &[("class", "clipboard-button")]);
        doc.append(wrapper, button).unwrap();
        doc.append(doc.document_root(), wrapper).unwrap();

        let gw = Gateway::new(MemoryStore::new());
        let b = RecordBuilder::new(&gw, DEFAULT_FALLBACK_NAME);
        let trigger = CaptureTrigger {
            control: button,
            target: button,
        };

        assert_eq!(b.on_trigger(&doc, &selectors, trigger).await, CaptureOutcome::Empty);
    }
}
