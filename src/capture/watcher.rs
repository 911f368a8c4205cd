use super::PageSelectors;
use super::host::{HostAdapter, Mutation, NodeId};
use log::{debug, trace};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Attribute set on a control once its capture handler is bound.
pub const ATTACHED_MARKER: &str = "data-linkvault-attached";

/// A click on an attached control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureTrigger {
    /// The control the handler is bound to.
    pub control: NodeId,
    /// What was actually clicked (the control or one of its descendants).
    pub target: NodeId,
}

/// Watches structural changes on the host and binds one capture handler per
/// trigger control. Clicks come out of the receiver returned by [`CaptureWatcher::new`].
pub struct CaptureWatcher<H: HostAdapter> {
    host: Arc<H>,
    selectors: Arc<PageSelectors>,
    changes: UnboundedReceiver<Vec<Mutation>>,
    triggers: UnboundedSender<CaptureTrigger>,
    attached: usize,
}

impl<H: HostAdapter> CaptureWatcher<H> {
    pub fn new(
        host: Arc<H>,
        selectors: Arc<PageSelectors>,
    ) -> (Self, UnboundedReceiver<CaptureTrigger>) {
        let changes = host.subscribe();
        let (triggers, rx) = mpsc::unbounded_channel();

        let watcher = Self {
            host,
            selectors,
            changes,
            triggers,
            attached: 0,
        };
        (watcher, rx)
    }

    /// Number of handlers bound so far.
    pub fn attached(&self) -> usize {
        self.attached
    }

    /// Attach to controls already present in the document.
    pub fn scan_document(&mut self) -> usize {
        let root = self.host.document_root();
        self.attach_within(root)
    }

    /// Process one notification batch. Returns the number of new attachments.
    pub fn handle_batch(&mut self, batch: &[Mutation]) -> usize {
        let mut count = 0;
        for m in batch {
            for node in &m.added {
                // text nodes and other non-elements never contain controls
                if !self.host.is_element(*node) {
                    continue;
                }
                count += self.attach_within(*node);
            }
        }
        count
    }

    /// Handle every batch already queued, without waiting.
    pub fn pump(&mut self) -> usize {
        let mut count = 0;
        while let Ok(batch) = self.changes.try_recv() {
            count += self.handle_batch(&batch);
        }
        count
    }

    /// Wait for the next batch and handle it. `None` once the host is gone.
    pub async fn next_batch(&mut self) -> Option<usize> {
        let batch = self.changes.recv().await?;
        Some(self.handle_batch(&batch))
    }

    fn attach_within(&mut self, node: NodeId) -> usize {
        let mut count = 0;

        for control in self.host.query_all(node, &self.selectors.trigger) {
            if self.host.has_marker(control, ATTACHED_MARKER) {
                trace!("control {control} already attached");
                continue;
            }
            if self
                .host
                .closest(control, &self.selectors.wrapper)
                .is_none()
            {
                continue;
            }

            let tx = self.triggers.clone();
            self.host.add_click_listener(
                control,
                Arc::new(move |target: NodeId| {
                    // receiver dropped: nobody is capturing anymore
                    let _ = tx.send(CaptureTrigger { control, target });
                }),
            );
            self.host.set_marker(control, ATTACHED_MARKER);

            debug!("capture handler attached to control {control}");
            count += 1;
        }

        self.attached += count;
        count
    }
}
