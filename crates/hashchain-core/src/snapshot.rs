//! Serializable views of blocks and chains handed to the outside world.

use crate::block::Block;
use crate::error::LedgerError;
use crate::hash::{from_hex, to_hex};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockSnapshot {
    pub index: u64,
    pub timestamp: u64,
    pub payload: Value,
    pub previous_hash: String,
    pub proof: Option<u64>,
    pub hash: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub chain: Vec<BlockSnapshot>,
    pub length: usize,
    pub difficulty: u32,
}

impl From<&Block> for BlockSnapshot {
    fn from(block: &Block) -> Self {
        Self {
            index: block.index(),
            timestamp: block.timestamp(),
            payload: block.payload().clone(),
            previous_hash: to_hex(block.previous_hash()),
            proof: block.proof(),
            hash: to_hex(block.hash()),
        }
    }
}

impl Block {
    pub fn snapshot(&self) -> BlockSnapshot {
        BlockSnapshot::from(self)
    }
}

/// Keeps the snapshot's hash as stored so a fetched chain can be checked
/// with the same validation the ledger runs.
impl TryFrom<BlockSnapshot> for Block {
    type Error = LedgerError;

    fn try_from(s: BlockSnapshot) -> Result<Self, Self::Error> {
        let previous_hash = from_hex(&s.previous_hash)?;
        let hash = from_hex(&s.hash)?;
        Ok(Block::from_stored(
            s.index,
            s.timestamp,
            s.payload,
            previous_hash,
            s.proof,
            hash,
        ))
    }
}

impl ChainSnapshot {
    pub fn into_blocks(self) -> Result<Vec<Block>, LedgerError> {
        self.chain.into_iter().map(Block::try_from).collect()
    }
}
