//! In-process store with the same contract as the real adapters.

use super::{BackendMode, GatewayError, GatewayResult, RecordStore};
use crate::models::Record;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<Vec<Record>>>,
    failure: Arc<Mutex<Option<GatewayError>>>,
    creates: Arc<Mutex<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Record>) -> Self {
        let store = Self::default();
        *store.records.lock() = records;
        store
    }

    /// Make every following call fail with `err` (`None` restores normal behavior).
    pub fn fail_with(&self, err: Option<GatewayError>) {
        *self.failure.lock() = err;
    }

    /// Number of successful `create` calls so far.
    pub fn create_calls(&self) -> usize {
        *self.creates.lock()
    }

    pub fn snapshot(&self) -> Vec<Record> {
        self.records.lock().clone()
    }

    fn check(&self) -> GatewayResult<()> {
        match self.failure.lock().as_ref() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn mode(&self) -> BackendMode {
        BackendMode::Memory
    }

    async fn list(&self) -> GatewayResult<Vec<Record>> {
        self.check()?;
        Ok(self.snapshot())
    }

    async fn create(&self, record: &Record) -> GatewayResult<()> {
        self.check()?;
        self.records.lock().push(record.clone());
        *self.creates.lock() += 1;
        Ok(())
    }

    async fn delete(&self, id: &str) -> GatewayResult<()> {
        self.check()?;
        self.records.lock().retain(|r| r.id != id);
        Ok(())
    }

    async fn clear(&self) -> GatewayResult<()> {
        self.check()?;
        self.records.lock().clear();
        Ok(())
    }
}
