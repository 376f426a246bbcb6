pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
pub const HEX_DIGIT_BITS: u32 = 4;
pub const MAX_DIFFICULTY: u32 = HASH_HEX_SIZE as u32;
pub const DEFAULT_DIFFICULTY: u32 = 4;
/// Previous-proof input used when the predecessor is genesis, which carries no proof.
pub const GENESIS_PROOF: u64 = 1;
pub const INITIAL_CANDIDATE: u64 = 1;
/// Upper bound for proofs; keeps `proof * proof` inside an `i128`.
pub const MAX_PROOF: u64 = i64::MAX as u64;
pub const GENESIS_PAYLOAD: &str = "Genesis Block";
pub const MINE_MESSAGE: &str = "block mined";
