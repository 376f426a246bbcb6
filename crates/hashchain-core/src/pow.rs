//! Proof-of-work search and verification.
//!
//! A candidate proof is combined with the previous block's proof as the
//! decimal string of `candidate² - previous²`. The candidate is valid when the
//! hex SHA-256 digest of that string starts with `difficulty` zero digits.

use crate::constants::{HEX_DIGIT_BITS, INITIAL_CANDIDATE, MAX_DIFFICULTY, MAX_PROOF};
use crate::error::{LedgerError, Result};
use crate::hash::{sha256, Hash};
use rayon::prelude::*;
use tracing::debug;

/// Candidates handed to the thread pool per round of a parallel search.
const SEARCH_WINDOW: u64 = 1 << 16;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchStrategy {
    #[default]
    Sequential,
    /// Splits each window of candidates across rayon's pool and keeps the
    /// lowest hit, so it finds the same proof as `Sequential`.
    Parallel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Solution {
    pub proof: u64,
    pub digest: Hash,
    /// Candidates tried up to and including `proof`.
    pub attempts: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProofOfWork {
    difficulty: u32,
    strategy: SearchStrategy,
}

impl ProofOfWork {
    pub fn new(difficulty: u32) -> Result<Self> {
        if difficulty > MAX_DIFFICULTY {
            return Err(LedgerError::DifficultyOutOfRange {
                difficulty,
                max: MAX_DIFFICULTY,
            });
        }
        Ok(Self {
            difficulty,
            strategy: SearchStrategy::default(),
        })
    }

    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn strategy(&self) -> SearchStrategy {
        self.strategy
    }

    /// Returns the first candidate, counting up from 1, that satisfies the
    /// difficulty predicate against `previous_proof`.
    pub fn solve(&self, previous_proof: u64) -> Result<Solution> {
        if previous_proof > MAX_PROOF {
            return Err(LedgerError::ProofSpaceExhausted { previous_proof });
        }
        let found = match self.strategy {
            SearchStrategy::Sequential => self.solve_sequential(previous_proof),
            SearchStrategy::Parallel => self.solve_parallel(previous_proof),
        };
        let Some((proof, digest)) = found else {
            return Err(LedgerError::ProofSpaceExhausted { previous_proof });
        };
        let attempts = proof - INITIAL_CANDIDATE + 1;
        debug!(
            previous_proof,
            proof,
            attempts,
            difficulty = self.difficulty,
            "proof of work solved"
        );
        Ok(Solution {
            proof,
            digest,
            attempts,
        })
    }

    fn solve_sequential(&self, previous_proof: u64) -> Option<(u64, Hash)> {
        (INITIAL_CANDIDATE..=MAX_PROOF).find_map(|candidate| {
            self.check(previous_proof, candidate)
                .map(|digest| (candidate, digest))
        })
    }

    fn solve_parallel(&self, previous_proof: u64) -> Option<(u64, Hash)> {
        let mut start = INITIAL_CANDIDATE;
        loop {
            let end = start.saturating_add(SEARCH_WINDOW).min(MAX_PROOF);
            let hit = (start..=end)
                .into_par_iter()
                .filter_map(|candidate| {
                    self.check(previous_proof, candidate)
                        .map(|digest| (candidate, digest))
                })
                .find_first(|_| true);
            if hit.is_some() || end == MAX_PROOF {
                return hit;
            }
            start = end + 1;
        }
    }

    fn check(&self, previous_proof: u64, candidate: u64) -> Option<Hash> {
        work_digest(previous_proof, candidate)
            .filter(|digest| meets_difficulty(digest, self.difficulty))
    }

    /// Same combining function and predicate as `solve`.
    pub fn is_valid(&self, previous_proof: u64, candidate: u64) -> bool {
        self.check(previous_proof, candidate).is_some()
    }
}

/// Decimal string of `candidate² - previous²`, or `None` when either value is
/// above `MAX_PROOF`.
pub fn combine(previous_proof: u64, candidate: u64) -> Option<String> {
    if previous_proof > MAX_PROOF || candidate > MAX_PROOF {
        return None;
    }
    let p = previous_proof as i128;
    let c = candidate as i128;
    Some((c * c - p * p).to_string())
}

pub fn work_digest(previous_proof: u64, candidate: u64) -> Option<Hash> {
    combine(previous_proof, candidate).map(|s| sha256(s.as_bytes()))
}

/// Hex rendering of `hash` starts with at least `difficulty` zero digits.
pub fn meets_difficulty(hash: &Hash, difficulty: u32) -> bool {
    count_leading_zero_bits(hash) >= difficulty.saturating_mul(HEX_DIGIT_BITS)
}

pub fn count_leading_zero_bits(hash: &Hash) -> u32 {
    let mut total = 0u32;
    for b in hash {
        if *b == 0 {
            total += 8;
        } else {
            total += b.leading_zeros();
            break;
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::to_hex;

    #[test]
    fn leading_zero_bits_examples() {
        let mut h = [0u8; 32];
        assert_eq!(count_leading_zero_bits(&h), 256);
        h[0] = 0x0F; // 00001111
        assert_eq!(count_leading_zero_bits(&h), 4);
        h = [0u8; 32];
        h[1] = 0x80; // 00000000 10000000
        assert_eq!(count_leading_zero_bits(&h), 8);
        h[1] = 0x40; // 01000000
        assert_eq!(count_leading_zero_bits(&h), 9);
    }

    #[test]
    fn difficulty_counts_hex_digits() {
        let mut h = [0xFFu8; 32];
        h[0] = 0x00;
        h[1] = 0x0A; // "000a..."
        assert!(meets_difficulty(&h, 3));
        assert!(!meets_difficulty(&h, 4));
        assert!(meets_difficulty(&[0u8; 32], 64));
    }

    #[test]
    fn combine_is_difference_of_squares() {
        assert_eq!(combine(1, 3).as_deref(), Some("8"));
        assert_eq!(combine(5, 2).as_deref(), Some("-21"));
        assert_eq!(combine(0, 0).as_deref(), Some("0"));
        assert!(combine(u64::MAX, 1).is_none());
        assert!(combine(1, MAX_PROOF).is_some());
    }

    #[test]
    fn zero_difficulty_accepts_first_candidate() {
        let pow = ProofOfWork::new(0).unwrap();
        let solution = pow.solve(12_345).unwrap();
        assert_eq!(solution.proof, INITIAL_CANDIDATE);
        assert_eq!(solution.attempts, 1);
    }

    #[test]
    fn solved_proof_validates_and_digest_has_zeros() {
        let pow = ProofOfWork::new(3).unwrap();
        let solution = pow.solve(1).unwrap();
        assert!(pow.is_valid(1, solution.proof));
        assert!(to_hex(&solution.digest).starts_with("000"));
        assert_eq!(Some(solution.digest), work_digest(1, solution.proof));
    }

    #[test]
    fn solve_returns_first_valid_candidate() {
        let pow = ProofOfWork::new(2).unwrap();
        let solution = pow.solve(7).unwrap();
        for candidate in INITIAL_CANDIDATE..solution.proof {
            assert!(!pow.is_valid(7, candidate));
        }
    }

    #[test]
    fn parallel_search_matches_sequential() {
        let sequential = ProofOfWork::new(3).unwrap();
        let parallel = sequential.with_strategy(SearchStrategy::Parallel);
        for previous in [1u64, 2, 99, 4_096] {
            assert_eq!(
                sequential.solve(previous).unwrap(),
                parallel.solve(previous).unwrap()
            );
        }
    }

    #[test]
    fn difficulty_above_digest_width_is_rejected() {
        assert!(matches!(
            ProofOfWork::new(65),
            Err(LedgerError::DifficultyOutOfRange { difficulty: 65, .. })
        ));
        assert!(ProofOfWork::new(64).is_ok());
    }

    #[test]
    fn out_of_range_previous_proof_never_validates() {
        let pow = ProofOfWork::new(0).unwrap();
        assert!(!pow.is_valid(u64::MAX, 1));
        assert!(matches!(
            pow.solve(u64::MAX),
            Err(LedgerError::ProofSpaceExhausted { .. })
        ));
    }
}
