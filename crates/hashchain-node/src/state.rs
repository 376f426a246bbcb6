use hashchain_core::{mine_payload, Block, Ledger, Solution};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::ApiError;

/// Request-handling context. Owns one ledger behind a single lock; appends
/// hold the write guard for the whole proof search.
#[derive(Clone)]
pub struct AppState {
    ledger: Arc<RwLock<Ledger>>,
    allow_tamper: bool,
}

impl AppState {
    pub fn new(ledger: Ledger, allow_tamper: bool) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(ledger)),
            allow_tamper,
        }
    }

    pub fn ledger(&self) -> &Arc<RwLock<Ledger>> {
        &self.ledger
    }

    pub fn allow_tamper(&self) -> bool {
        self.allow_tamper
    }

    /// Appends `payload` on the blocking pool, holding the write guard for
    /// the whole proof search.
    pub async fn append(&self, payload: Value) -> Result<(Block, Solution), ApiError> {
        let ledger = Arc::clone(&self.ledger);
        let appended = tokio::task::spawn_blocking(move || {
            let mut guard = ledger.blocking_write();
            guard.append_solved(payload)
        })
        .await??;
        Ok(appended)
    }

    pub async fn mine(&self) -> Result<(Block, Solution), ApiError> {
        self.append(mine_payload()).await
    }

    pub async fn add_data(&self, payload: Value) -> Result<(Block, Solution), ApiError> {
        self.append(payload).await
    }
}
