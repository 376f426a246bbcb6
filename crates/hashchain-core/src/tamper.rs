//! Diagnostic tampering. Nothing here is part of the trusted ledger API: it
//! exists to show that validation catches edited blocks.

use crate::block::Block;
use crate::error::{LedgerError, Result};
use serde_json::Value;
use tracing::warn;

/// Exclusive handle over a ledger's blocks, obtained via `Ledger::tamper`.
pub struct Tamper<'a> {
    blocks: &'a mut [Block],
}

impl<'a> Tamper<'a> {
    pub(crate) fn new(blocks: &'a mut [Block]) -> Self {
        Self { blocks }
    }

    /// Replaces the payload of block `index` and leaves its stored hash as is.
    pub fn overwrite_payload(&mut self, index: u64, payload: Value) -> Result<()> {
        let block = usize::try_from(index)
            .ok()
            .and_then(|i| self.blocks.get_mut(i))
            .ok_or(LedgerError::BlockNotFound { index })?;
        warn!(index, "overwriting block payload without rehashing");
        block.overwrite_payload(payload);
        Ok(())
    }
}
