use crate::block::Block;
use crate::constants::{GENESIS_PAYLOAD, GENESIS_PROOF, MINE_MESSAGE};
use crate::error::{LedgerError, Result};
use crate::hash::{to_hex, ZERO_HASH};
use crate::pow::{ProofOfWork, Solution};
use crate::snapshot::ChainSnapshot;
use crate::tamper::Tamper;
use crate::validation::{validate_chain, Violation};
use serde_json::{json, Value};
use tracing::{info, warn};

/// Append-only in-memory chain. Genesis is created by the constructor, so a
/// constructed ledger always holds at least one block.
#[derive(Clone, Debug)]
pub struct Ledger {
    chain: Vec<Block>,
    pow: ProofOfWork,
}

impl Ledger {
    pub fn new(difficulty: u32) -> Result<Self> {
        Ok(Self::with_pow(ProofOfWork::new(difficulty)?))
    }

    pub fn with_pow(pow: ProofOfWork) -> Self {
        let mut ledger = Self {
            chain: Vec::new(),
            pow,
        };
        ledger.create_genesis();
        ledger
    }

    fn create_genesis(&mut self) {
        debug_assert!(self.chain.is_empty());
        let genesis = Block::new(0, json!(GENESIS_PAYLOAD), ZERO_HASH, None);
        info!(hash = %to_hex(genesis.hash()), "genesis block created");
        self.chain.push(genesis);
    }

    /// Solves a proof against the last block and links a new block carrying
    /// `payload` after it.
    pub fn append(&mut self, payload: Value) -> Result<Block> {
        self.append_solved(payload).map(|(block, _)| block)
    }

    /// Like [`Ledger::append`], also returning the proof-of-work solution
    /// that admitted the block.
    pub fn append_solved(&mut self, payload: Value) -> Result<(Block, Solution)> {
        let last = self.last_block()?;
        let previous_proof = last.proof().unwrap_or(GENESIS_PROOF);
        let index = last.index() + 1;
        let previous_hash = *last.hash();

        let solution = self.pow.solve(previous_proof)?;
        let block = Block::new(index, payload, previous_hash, Some(solution.proof));
        info!(
            index,
            proof = solution.proof,
            attempts = solution.attempts,
            hash = %to_hex(block.hash()),
            "block appended"
        );
        self.chain.push(block.clone());
        Ok((block, solution))
    }

    /// Appends a block carrying caller-supplied data.
    pub fn add_data(&mut self, payload: Value) -> Result<Block> {
        self.append(payload)
    }

    /// Appends a block carrying the fixed mining marker.
    pub fn mine(&mut self) -> Result<Block> {
        self.append(mine_payload())
    }

    pub fn last_block(&self) -> Result<&Block> {
        self.chain.last().ok_or(LedgerError::EmptyChain)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    pub fn block(&self, index: u64) -> Option<&Block> {
        usize::try_from(index).ok().and_then(|i| self.chain.get(i))
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn difficulty(&self) -> u32 {
        self.pow.difficulty()
    }

    pub fn pow(&self) -> &ProofOfWork {
        &self.pow
    }

    pub fn validate(&self) -> Result<(), Violation> {
        let result = validate_chain(&self.chain, &self.pow);
        if let Err(violation) = &result {
            warn!(index = ?violation.index(), %violation, "chain validation failed");
        }
        result
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn snapshot(&self) -> ChainSnapshot {
        ChainSnapshot {
            chain: self.chain.iter().map(Block::snapshot).collect(),
            length: self.chain.len(),
            difficulty: self.difficulty(),
        }
    }

    /// Diagnostic-only access for simulating tampering.
    pub fn tamper(&mut self) -> Tamper<'_> {
        Tamper::new(&mut self.chain)
    }
}

/// Payload carried by blocks appended through [`Ledger::mine`].
pub fn mine_payload() -> Value {
    json!({ "message": MINE_MESSAGE })
}
