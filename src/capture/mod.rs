//! Capture side: host document abstraction, change watcher, and the record
//! builder with its duplicate guard.

pub mod builder;
pub mod host;
pub mod script;
pub mod selector;
pub mod watcher;

pub use builder::{CaptureOutcome, PageCapture, RecordBuilder, read_page};
pub use host::{HostAdapter, SyntheticDocument};
pub use selector::Selector;
pub use watcher::{CaptureTrigger, CaptureWatcher};

use crate::config::SelectorConfig;
use crate::errors::AppError;

/// Parsed form of [`SelectorConfig`].
#[derive(Debug, Clone)]
pub struct PageSelectors {
    pub wrapper: Selector,
    pub trigger: Selector,
    pub field: Selector,
    pub heading: Selector,
}

impl TryFrom<&SelectorConfig> for PageSelectors {
    type Error = AppError;

    fn try_from(cfg: &SelectorConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            wrapper: cfg.wrapper.parse()?,
            trigger: cfg.trigger.parse()?,
            field: cfg.field.parse()?,
            heading: cfg.heading.parse()?,
        })
    }
}
