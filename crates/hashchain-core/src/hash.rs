//! SHA-256 hashing helpers shared by blocks and the proof-of-work engine.

use crate::constants::HASH_SIZE;
use crate::error::{LedgerError, Result};
use sha2::{Digest, Sha256};

pub type Hash = [u8; HASH_SIZE];

/// Previous-hash sentinel carried by the genesis block.
pub const ZERO_HASH: Hash = [0u8; HASH_SIZE];

pub fn sha256(bytes: &[u8]) -> Hash {
    let digest = Sha256::digest(bytes);
    let mut out = [0u8; HASH_SIZE];
    out.copy_from_slice(&digest[..]);
    out
}

pub fn to_hex(hash: &Hash) -> String {
    hex::encode(hash)
}

pub fn from_hex(s: &str) -> Result<Hash> {
    let bytes = hex::decode(s)?;
    if bytes.len() != HASH_SIZE {
        return Err(LedgerError::InvalidHashLength {
            expected: HASH_SIZE,
            len: bytes.len(),
        });
    }
    let mut out = [0u8; HASH_SIZE];
    out.copy_from_slice(&bytes);
    Ok(out)
}
