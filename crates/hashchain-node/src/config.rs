use clap::Parser;
use hashchain_core::constants::{DEFAULT_DIFFICULTY, MAX_DIFFICULTY};
use hashchain_core::{ProofOfWork, SearchStrategy};

#[derive(Parser, Debug, Clone)]
#[command(name = "hashchain-node", about = "HTTP node serving an in-memory proof-of-work ledger")]
pub struct Args {
    /// Address to listen on, e.g. 127.0.0.1:8080
    #[arg(long, env = "HASHCHAIN_LISTEN", default_value = "127.0.0.1:8080")]
    pub listen: String,

    /// Leading zero hex digits required of a proof-of-work digest
    #[arg(
        long,
        env = "HASHCHAIN_DIFFICULTY",
        default_value_t = DEFAULT_DIFFICULTY,
        value_parser = clap::value_parser!(u32).range(0..=MAX_DIFFICULTY as i64),
    )]
    pub difficulty: u32,

    /// Spread the proof search over all cores
    #[arg(long, env = "HASHCHAIN_PARALLEL")]
    pub parallel: bool,

    /// Expose the diagnostic tamper route
    #[arg(long, env = "HASHCHAIN_ALLOW_TAMPER")]
    pub allow_tamper: bool,
}

impl Args {
    pub fn proof_of_work(&self) -> hashchain_core::Result<ProofOfWork> {
        let strategy = if self.parallel {
            SearchStrategy::Parallel
        } else {
            SearchStrategy::Sequential
        };
        Ok(ProofOfWork::new(self.difficulty)?.with_strategy(strategy))
    }
}
