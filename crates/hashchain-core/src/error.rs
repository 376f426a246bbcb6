use thiserror::Error;

pub type Result<T, E = LedgerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// A last block was requested before genesis existed. Indicates a bug.
    #[error("chain has no blocks")]
    EmptyChain,

    #[error("difficulty {difficulty} is out of range (0..={max})")]
    DifficultyOutOfRange { difficulty: u32, max: u32 },

    #[error("no proof found for previous proof {previous_proof} below the proof ceiling")]
    ProofSpaceExhausted { previous_proof: u64 },

    #[error("block {index} not found")]
    BlockNotFound { index: u64 },

    #[error("invalid hex hash: {0}")]
    InvalidHash(#[from] hex::FromHexError),

    #[error("hash must be {expected} bytes, got {len}")]
    InvalidHashLength { expected: usize, len: usize },
}
