//! Persistence gateway: one CRUD contract over interchangeable record stores.
//!
//! The adapter is chosen once, when the [`Gateway`] is built, and never
//! changes afterwards. Callers only see the [`RecordStore`] contract.

mod local;
mod memory;
mod remote;

pub use local::LocalStore;
pub use memory::MemoryStore;
pub use remote::RemoteStore;

use crate::config::Config;
use crate::errors::AppResult;
use crate::models::Record;
use async_trait::async_trait;
use log::debug;
use thiserror::Error;

/// Failure raised by the remote adapter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The backend answered with a non-2xx status. `body` is the raw response text.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The request never produced a response.
    #[error("network failure: {0}")]
    Network(String),

    /// A 2xx response whose body is not a JSON array of records.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("local store failed: {0}")]
    Storage(String),

    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

impl GatewayError {
    /// HTTP status carried by the failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Transport(TransportError::Status { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    Local,
    Remote,
    Memory,
}

impl BackendMode {
    /// Status line text shown under the saved-links table.
    pub fn label(&self) -> &'static str {
        match self {
            BackendMode::Local => "Local Storage",
            BackendMode::Remote => "AWS Backend (Secure)",
            BackendMode::Memory => "In-Memory",
        }
    }
}

/// Storage strategy behind the gateway.
///
/// `list` returns records in no particular order; callers sort.
#[async_trait]
pub trait RecordStore: Send + Sync {
    fn mode(&self) -> BackendMode;

    async fn list(&self) -> GatewayResult<Vec<Record>>;

    async fn create(&self, record: &Record) -> GatewayResult<()>;

    /// Deleting an id that is not stored is not an error.
    async fn delete(&self, id: &str) -> GatewayResult<()>;

    async fn clear(&self) -> GatewayResult<()>;
}

pub struct Gateway {
    store: Box<dyn RecordStore>,
}

impl Gateway {
    pub fn new(store: impl RecordStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Pick the adapter from configuration: an endpoint together with an
    /// API key selects the remote backend, anything else the local slot.
    pub fn from_config(cfg: &Config) -> AppResult<Self> {
        let gateway = if cfg.backend.is_remote() {
            Self::new(RemoteStore::new(&cfg.backend.endpoint, &cfg.backend.api_key)?)
        } else {
            Self::new(LocalStore::open(&cfg.database, &cfg.slot)?)
        };

        debug!("gateway ready: {}", gateway.mode().label());
        Ok(gateway)
    }

    pub fn mode(&self) -> BackendMode {
        self.store.mode()
    }

    pub async fn list(&self) -> GatewayResult<Vec<Record>> {
        debug!("gateway list ({:?})", self.mode());
        self.store.list().await
    }

    pub async fn create(&self, record: &Record) -> GatewayResult<()> {
        if !record.is_valid() {
            return Err(GatewayError::InvalidRecord(
                "id and url must not be empty".to_string(),
            ));
        }
        debug!("gateway create {} ({:?})", record.id, self.mode());
        self.store.create(record).await
    }

    pub async fn delete(&self, id: &str) -> GatewayResult<()> {
        debug!("gateway delete {} ({:?})", id, self.mode());
        self.store.delete(id).await
    }

    pub async fn clear(&self) -> GatewayResult<()> {
        debug!("gateway clear ({:?})", self.mode());
        self.store.clear().await
    }
}
