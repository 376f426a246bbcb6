use crate::hash::{sha256, Hash};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

/// One record of the chain. Fields are fixed at construction; the hash is
/// computed once and never rewritten.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    index: u64,
    timestamp: u64,
    payload: Value,
    previous_hash: Hash,
    proof: Option<u64>,
    hash: Hash,
}

impl Block {
    /// Builds a block stamped with the current time.
    pub fn new(index: u64, payload: Value, previous_hash: Hash, proof: Option<u64>) -> Self {
        Self::with_timestamp(index, now_millis(), payload, previous_hash, proof)
    }

    pub fn with_timestamp(
        index: u64,
        timestamp: u64,
        payload: Value,
        previous_hash: Hash,
        proof: Option<u64>,
    ) -> Self {
        let mut block = Self {
            index,
            timestamp,
            payload,
            previous_hash,
            proof,
            hash: [0u8; 32],
        };
        block.hash = block.recompute_hash();
        block
    }

    /// Rebuilds a block around a hash that was stored elsewhere, without
    /// recomputing it.
    pub(crate) fn from_stored(
        index: u64,
        timestamp: u64,
        payload: Value,
        previous_hash: Hash,
        proof: Option<u64>,
        hash: Hash,
    ) -> Self {
        Self {
            index,
            timestamp,
            payload,
            previous_hash,
            proof,
            hash,
        }
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    /// Milliseconds since the Unix epoch.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn previous_hash(&self) -> &Hash {
        &self.previous_hash
    }

    pub fn proof(&self) -> Option<u64> {
        self.proof
    }

    pub fn hash(&self) -> &Hash {
        &self.hash
    }

    /// Canonical encoding fed to the hasher:
    /// index, timestamp, payload length (all u64 LE), compact payload JSON,
    /// previous hash, proof tag byte, proof u64 LE.
    pub fn hash_bytes(&self) -> Vec<u8> {
        // serde_json's default map is ordered, so object keys come out sorted.
        let payload = self.payload.to_string().into_bytes();
        let mut bytes = Vec::with_capacity(8 + 8 + 8 + payload.len() + 32 + 1 + 8);
        bytes.extend_from_slice(&self.index.to_le_bytes());
        bytes.extend_from_slice(&self.timestamp.to_le_bytes());
        bytes.extend_from_slice(&(payload.len() as u64).to_le_bytes());
        bytes.extend_from_slice(&payload);
        bytes.extend_from_slice(&self.previous_hash);
        match self.proof {
            Some(proof) => {
                bytes.push(1);
                bytes.extend_from_slice(&proof.to_le_bytes());
            }
            None => {
                bytes.push(0);
                bytes.extend_from_slice(&0u64.to_le_bytes());
            }
        }
        bytes
    }

    pub fn recompute_hash(&self) -> Hash {
        sha256(&self.hash_bytes())
    }

    /// Stored hash still matches the current fields.
    pub fn is_intact(&self) -> bool {
        self.recompute_hash() == self.hash
    }

    pub(crate) fn overwrite_payload(&mut self, payload: Value) {
        self.payload = payload;
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
