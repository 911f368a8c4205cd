//! Page scripts: JSON lines describing how a host page changes over time.
//! Replaying one through a [`SyntheticDocument`] drives the watcher and the
//! builder exactly as a live page would.
//!
//! ```text
//! {"op":"insert","parent":"body","id":"w","tag":"div","attrs":{"class":"save-share-clipboard-wrapper"}}
//! {"op":"insert","parent":"w","id":"f","tag":"input","attrs":{"type":"text","readonly":""},"value":"https://..."}
//! {"op":"click","target":"b"}
//! ```

use super::host::{HostAdapter, NodeId, SyntheticDocument};
use super::watcher::CaptureWatcher;
use super::builder::read_page;
use super::{CaptureOutcome, PageSelectors, RecordBuilder};
use crate::errors::{AppError, AppResult};
use crate::gateway::Gateway;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Label that always refers to the document root.
pub const BODY: &str = "body";

fn default_parent() -> String {
    BODY.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case", deny_unknown_fields)]
pub enum PageStep {
    Insert {
        #[serde(default = "default_parent")]
        parent: String,
        id: String,
        tag: String,
        #[serde(default)]
        attrs: BTreeMap<String, String>,
        #[serde(default)]
        value: Option<String>,
        #[serde(default)]
        text: Option<String>,
    },
    Remove {
        target: String,
    },
    SetValue {
        target: String,
        value: String,
    },
    SetText {
        target: String,
        text: String,
    },
    Click {
        target: String,
    },
}

/// Parse a script; blank lines and lines starting with `#` are skipped.
/// Each step keeps its 1-based line number for error reporting.
pub fn parse_script(content: &str) -> AppResult<Vec<(usize, PageStep)>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, l)| {
            let t = l.trim();
            !t.is_empty() && !t.starts_with('#')
        })
        .map(|(i, l)| {
            serde_json::from_str(l)
                .map(|step| (i + 1, step))
                .map_err(|e| AppError::Script {
                    line: i + 1,
                    message: e.to_string(),
                })
        })
        .collect()
}

/// One capture attempt during a replay, with the link that was read (if any).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayedCapture {
    pub url: Option<String>,
    pub outcome: CaptureOutcome,
}

#[derive(Debug, Default)]
pub struct ScriptReport {
    pub steps: usize,
    pub attached: usize,
    pub clicks: usize,
    pub captures: Vec<ReplayedCapture>,
}

impl ScriptReport {
    pub fn saved(&self) -> usize {
        self.captures
            .iter()
            .filter(|c| matches!(c.outcome, CaptureOutcome::Saved(_)))
            .count()
    }
}

struct Page {
    doc: Arc<SyntheticDocument>,
    labels: HashMap<String, NodeId>,
}

impl Page {
    fn resolve(&self, label: &str, line: usize) -> AppResult<NodeId> {
        if label == BODY {
            return Ok(self.doc.document_root());
        }
        self.labels.get(label).copied().ok_or_else(|| AppError::Script {
            line,
            message: format!("unknown node '{label}'"),
        })
    }

    /// Apply one step. Returns the clicked node for `click` steps.
    fn apply(&mut self, line: usize, step: &PageStep) -> AppResult<Option<NodeId>> {
        let at_line = |e: AppError| AppError::Script {
            line,
            message: e.to_string(),
        };

        match step {
            PageStep::Insert {
                parent,
                id,
                tag,
                attrs,
                value,
                text,
            } => {
                if id == BODY || self.labels.contains_key(id) {
                    return Err(AppError::Script {
                        line,
                        message: format!("node '{id}' already exists"),
                    });
                }
                let parent = self.resolve(parent, line)?;

                let attrs: Vec<(&str, &str)> =
                    attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
                let node = self.doc.create_element(tag, &attrs);
                // filled while detached: the insertion below is the only change observed
                if let Some(v) = value {
                    self.doc.set_value(node, v).map_err(at_line)?;
                }
                if let Some(t) = text {
                    self.doc.set_text(node, t).map_err(at_line)?;
                }
                self.doc.append(parent, node).map_err(at_line)?;
                self.labels.insert(id.clone(), node);
                Ok(None)
            }
            PageStep::Remove { target } => {
                let node = self.resolve(target, line)?;
                self.doc.remove(node).map_err(at_line)?;
                Ok(None)
            }
            PageStep::SetValue { target, value } => {
                let node = self.resolve(target, line)?;
                self.doc.set_value(node, value).map_err(at_line)?;
                Ok(None)
            }
            PageStep::SetText { target, text } => {
                let node = self.resolve(target, line)?;
                self.doc.set_text(node, text).map_err(at_line)?;
                Ok(None)
            }
            PageStep::Click { target } => {
                let node = self.resolve(target, line)?;
                self.doc.click(node).map_err(at_line)?;
                Ok(Some(node))
            }
        }
    }
}

/// Replay `steps` against a fresh synthetic page. After every step pending
/// change notifications are handled first, then pending captures, one at a
/// time; `on_outcome` sees each capture result as it completes.
pub async fn run_script<F>(
    gateway: &Gateway,
    fallback_name: &str,
    selectors: PageSelectors,
    steps: &[(usize, PageStep)],
    mut on_outcome: F,
) -> AppResult<ScriptReport>
where
    F: FnMut(&CaptureOutcome),
{
    let doc = Arc::new(SyntheticDocument::new());
    let selectors = Arc::new(selectors);
    let (mut watcher, mut triggers) = CaptureWatcher::new(doc.clone(), selectors.clone());
    let builder = RecordBuilder::new(gateway, fallback_name);

    let mut page = Page {
        doc: doc.clone(),
        labels: HashMap::new(),
    };
    let mut report = ScriptReport::default();

    for (line, step) in steps {
        if page.apply(*line, step)?.is_some() {
            report.clicks += 1;
        }
        report.steps += 1;
        report.attached += watcher.pump();

        while let Ok(trigger) = triggers.try_recv() {
            let page = read_page(doc.as_ref(), &selectors, trigger);
            let outcome = match &page {
                Some(p) => builder.capture_page(p).await,
                None => CaptureOutcome::Empty,
            };
            on_outcome(&outcome);
            report.captures.push(ReplayedCapture {
                url: page.map(|p| p.url),
                outcome,
            });
        }
    }

    Ok(report)
}
