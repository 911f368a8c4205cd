//! Local adapter: the whole collection lives as one JSON array in a named
//! slot of the SQLite key-value table.

use super::{BackendMode, GatewayError, GatewayResult, RecordStore};
use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::db::slots::{read_slot, write_slot};
use crate::errors::AppResult;
use crate::models::Record;
use async_trait::async_trait;
use log::{debug, warn};
use parking_lot::Mutex;

pub struct LocalStore {
    pool: Mutex<DbPool>,
    slot: String,
}

impl LocalStore {
    /// Open (or create) the database at `path` and make sure the schema exists.
    /// Works before `init`: missing parent directories are created.
    pub fn open(path: &str, slot: &str) -> AppResult<Self> {
        let pool = DbPool::open(path)?;
        init_db(&pool.conn)?;
        Ok(Self::with_pool(pool, slot))
    }

    /// Throwaway store, used by tests.
    pub fn in_memory(slot: &str) -> AppResult<Self> {
        let pool = DbPool::in_memory()?;
        init_db(&pool.conn)?;
        Ok(Self::with_pool(pool, slot))
    }

    fn with_pool(pool: DbPool, slot: &str) -> Self {
        Self {
            pool: Mutex::new(pool),
            slot: slot.to_string(),
        }
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// Stored collection; an absent slot or a payload that is not a record list
    /// reads as empty. A failing read is an error.
    fn load(&self) -> GatewayResult<Vec<Record>> {
        let raw = {
            let pool = self.pool.lock();
            read_slot(&pool.conn, &self.slot)
        };

        match raw {
            Ok(Some(json)) => Ok(serde_json::from_str(&json).unwrap_or_else(|e| {
                warn!("slot '{}' is not a record list, reading as empty: {}", self.slot, e);
                Vec::new()
            })),
            Ok(None) => Ok(Vec::new()),
            Err(e) => Err(GatewayError::Storage(e.to_string())),
        }
    }

    fn write_all(&self, records: &[Record]) -> GatewayResult<()> {
        let json =
            serde_json::to_string(records).map_err(|e| GatewayError::Storage(e.to_string()))?;

        let pool = self.pool.lock();
        write_slot(&pool.conn, &self.slot, &json).map_err(|e| GatewayError::Storage(e.to_string()))
    }
}

#[async_trait]
impl RecordStore for LocalStore {
    fn mode(&self) -> BackendMode {
        BackendMode::Local
    }

    async fn list(&self) -> GatewayResult<Vec<Record>> {
        Ok(self.load().unwrap_or_else(|e| {
            warn!("slot '{}' unreadable, reading as empty: {}", self.slot, e);
            Vec::new()
        }))
    }

    // read-modify-write: no lock is held between the read and the write.
    // A failed read aborts, otherwise the write would replace the whole slot.
    async fn create(&self, record: &Record) -> GatewayResult<()> {
        let mut records = self.load()?;
        records.push(record.clone());
        self.write_all(&records)?;
        debug!("slot '{}' now holds {} records", self.slot, records.len());
        Ok(())
    }

    async fn delete(&self, id: &str) -> GatewayResult<()> {
        let mut records = self.load()?;
        records.retain(|r| r.id != id);
        self.write_all(&records)
    }

    async fn clear(&self) -> GatewayResult<()> {
        self.write_all(&[])
    }
}
