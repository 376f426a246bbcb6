//! Full-chain validation. A broken chain is reported as a [`Violation`]
//! value, never as an error.

use crate::block::Block;
use crate::constants::GENESIS_PROOF;
use crate::hash::{to_hex, ZERO_HASH};
use crate::pow::ProofOfWork;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The first broken invariant found while walking a chain.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    #[error("chain has no blocks")]
    EmptyChain,

    /// Genesis must sit at index 0 with the zero previous hash and no proof.
    #[error("genesis block is malformed")]
    MalformedGenesis,

    #[error("block at position {expected} carries index {index}")]
    IndexGap { index: u64, expected: u64 },

    #[error("block {index} does not link to its predecessor's hash")]
    BrokenLink { index: u64 },

    #[error("block {index} hash mismatch: stored {stored}, computed {computed}")]
    HashMismatch {
        index: u64,
        stored: String,
        computed: String,
    },

    #[error("block {index} carries an invalid proof of work")]
    InvalidProof { index: u64 },
}

impl Violation {
    /// Index of the offending block, if the violation is tied to one.
    pub fn index(&self) -> Option<u64> {
        match self {
            Violation::EmptyChain => None,
            Violation::MalformedGenesis => Some(0),
            Violation::IndexGap { index, .. }
            | Violation::BrokenLink { index }
            | Violation::HashMismatch { index, .. }
            | Violation::InvalidProof { index } => Some(*index),
        }
    }
}

/// Walks `blocks` from genesis to tip and returns the first violation.
/// Never mutates the blocks.
pub fn validate_chain(blocks: &[Block], pow: &ProofOfWork) -> Result<(), Violation> {
    let Some(genesis) = blocks.first() else {
        return Err(Violation::EmptyChain);
    };
    if genesis.index() != 0 || genesis.previous_hash() != &ZERO_HASH || genesis.proof().is_some()
    {
        return Err(Violation::MalformedGenesis);
    }
    check_hash(genesis)?;

    for (position, pair) in blocks.windows(2).enumerate() {
        let (prev, curr) = (&pair[0], &pair[1]);
        let expected = position as u64 + 1;
        if curr.index() != prev.index() + 1 {
            return Err(Violation::IndexGap {
                index: curr.index(),
                expected,
            });
        }
        if curr.previous_hash() != prev.hash() {
            return Err(Violation::BrokenLink {
                index: curr.index(),
            });
        }
        check_hash(curr)?;
        let previous_proof = prev.proof().unwrap_or(GENESIS_PROOF);
        match curr.proof() {
            Some(proof) if pow.is_valid(previous_proof, proof) => {}
            _ => {
                return Err(Violation::InvalidProof {
                    index: curr.index(),
                })
            }
        }
    }
    Ok(())
}

fn check_hash(block: &Block) -> Result<(), Violation> {
    let computed = block.recompute_hash();
    if &computed != block.hash() {
        return Err(Violation::HashMismatch {
            index: block.index(),
            stored: to_hex(block.hash()),
            computed: to_hex(&computed),
        });
    }
    Ok(())
}
