//! In-memory, append-only hash chain gated by proof of work.
//!
//! ```
//! use hashchain_core::Ledger;
//! use serde_json::json;
//!
//! let mut ledger = Ledger::new(2)?;
//! ledger.append(json!({"msg": "a"}))?;
//! assert_eq!(ledger.len(), 2);
//! assert!(ledger.is_valid());
//! # Ok::<(), hashchain_core::LedgerError>(())
//! ```

pub mod block;
pub mod constants;
pub mod error;
pub mod hash;
pub mod ledger;
pub mod pow;
pub mod snapshot;
pub mod tamper;
pub mod validation;

pub use block::Block;
pub use error::{LedgerError, Result};
pub use hash::Hash;
pub use ledger::{mine_payload, Ledger};
pub use pow::{ProofOfWork, SearchStrategy, Solution};
pub use snapshot::{BlockSnapshot, ChainSnapshot};
pub use tamper::Tamper;
pub use validation::{validate_chain, Violation};
