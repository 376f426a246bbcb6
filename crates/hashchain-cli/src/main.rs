use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use hashchain_core::constants::DEFAULT_DIFFICULTY;
use hashchain_core::{validate_chain, ChainSnapshot, ProofOfWork};
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "hashchain-cli")]
#[command(about = "CLI client for the hashchain node")]
struct Cli {
    /// Node base URL (e.g. http://127.0.0.1:8080)
    #[arg(long, global = true, env = "HASHCHAIN_NODE", default_value = "http://127.0.0.1:8080")]
    node: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the full chain
    Chain,
    /// Print the tip height and hash
    Head,
    /// Print one block
    Block { index: u64 },
    /// Append a block with the mining marker payload
    Mine,
    /// Append a block carrying DATA (JSON, or a plain string)
    Add { data: String },
    /// Ask the node whether its chain is valid
    Validate,
    /// Fetch the chain and re-verify every block locally
    Verify {
        /// Difficulty to check proofs against instead of the one the node reports
        #[arg(long)]
        difficulty: Option<u32>,
    },
    /// Overwrite a block's payload without rehashing (node must allow it)
    Tamper { index: u64, data: String },
}

#[derive(Serialize)]
struct DataIn {
    data: Value,
}

#[derive(Serialize)]
struct TamperIn {
    index: u64,
    data: Value,
}

/// Parses `raw` as JSON, falling back to a JSON string.
fn parse_payload(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

async fn print_response(res: Response) -> Result<()> {
    let status = res.status();
    let body = res.text().await?;
    println!("status: {}", status);
    match serde_json::from_str::<Value>(&body) {
        Ok(v) => println!("{}", serde_json::to_string_pretty(&v)?),
        Err(_) => println!("{body}"),
    }
    Ok(())
}

/// Difficulty proofs are checked against: the override when given, else the
/// node's own figure.
fn verification_difficulty(reported: u32, required: Option<u32>) -> u32 {
    match required {
        Some(difficulty) => {
            if difficulty != reported {
                warn!(reported, difficulty, "ignoring difficulty reported by node");
            }
            difficulty
        }
        None => {
            if reported < DEFAULT_DIFFICULTY {
                warn!(
                    reported,
                    default = DEFAULT_DIFFICULTY,
                    "node reports a difficulty below the default; pass --difficulty to enforce one"
                );
            }
            reported
        }
    }
}

async fn verify(client: &Client, node: &str, required: Option<u32>) -> Result<()> {
    let snapshot: ChainSnapshot = client
        .get(format!("{node}/chain"))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    debug!(length = snapshot.length, "fetched chain");
    if snapshot.length != snapshot.chain.len() {
        bail!(
            "node reported length {} but sent {} blocks",
            snapshot.length,
            snapshot.chain.len()
        );
    }
    let difficulty = verification_difficulty(snapshot.difficulty, required);
    let pow = ProofOfWork::new(difficulty)?;
    let length = snapshot.length;
    let blocks = snapshot.into_blocks()?;
    match validate_chain(&blocks, &pow) {
        Ok(()) => println!("{}", json!({ "valid": true, "length": length, "difficulty": difficulty })),
        Err(violation) => println!(
            "{}",
            json!({
                "valid": false,
                "length": length,
                "difficulty": difficulty,
                "violation": violation
            })
        ),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .pretty()
        .init();

    let cli = Cli::parse();
    let node = cli.node.trim_end_matches('/').to_string();
    let client = Client::new();
    match cli.cmd {
        Command::Chain => print_response(client.get(format!("{node}/chain")).send().await?).await?,
        Command::Head => {
            print_response(client.get(format!("{node}/chain/head")).send().await?).await?
        }
        Command::Block { index } => {
            print_response(
                client
                    .get(format!("{node}/chain/blocks/{index}"))
                    .send()
                    .await?,
            )
            .await?
        }
        Command::Mine => print_response(client.post(format!("{node}/mine")).send().await?).await?,
        Command::Add { data } => {
            let body = DataIn {
                data: parse_payload(&data),
            };
            let res = client.post(format!("{node}/blocks")).json(&body).send().await?;
            print_response(res).await?
        }
        Command::Validate => {
            print_response(client.get(format!("{node}/validate")).send().await?).await?
        }
        Command::Verify { difficulty } => verify(&client, &node, difficulty).await?,
        Command::Tamper { index, data } => {
            let body = TamperIn {
                index,
                data: parse_payload(&data),
            };
            let res = client
                .post(format!("{node}/diagnostics/tamper"))
                .json(&body)
                .send()
                .await?;
            print_response(res).await?
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_parses_json_or_falls_back_to_string() {
        assert_eq!(parse_payload(r#"{"msg":"a"}"#), json!({"msg": "a"}));
        assert_eq!(parse_payload("42"), json!(42));
        assert_eq!(parse_payload("hello there"), json!("hello there"));
    }

    #[test]
    fn override_wins_over_reported_difficulty() {
        assert_eq!(verification_difficulty(0, Some(4)), 4);
        assert_eq!(verification_difficulty(6, Some(4)), 4);
        assert_eq!(verification_difficulty(0, None), 0);
        assert_eq!(verification_difficulty(5, None), 5);
    }

    #[test]
    fn trivial_proofs_fail_under_enforced_difficulty() {
        let mut ledger = hashchain_core::Ledger::new(0).unwrap();
        ledger.mine().unwrap();
        let blocks = ledger.snapshot().into_blocks().unwrap();
        let reported = ProofOfWork::new(verification_difficulty(0, None)).unwrap();
        assert_eq!(validate_chain(&blocks, &reported), Ok(()));
        // Proof 1 against seed 1 hashes "0", whose digest starts with "5f".
        let enforced = ProofOfWork::new(verification_difficulty(0, Some(2))).unwrap();
        assert!(matches!(
            validate_chain(&blocks, &enforced),
            Err(hashchain_core::Violation::InvalidProof { index: 1 })
        ));
    }

    #[test]
    fn verify_takes_difficulty_override() {
        let cli = Cli::parse_from(["hashchain-cli", "verify", "--difficulty", "5"]);
        assert!(matches!(cli.cmd, Command::Verify { difficulty: Some(5) }));
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::parse_from(["hashchain-cli", "--node", "http://x:1", "tamper", "2", "bad"]);
        assert_eq!(cli.node, "http://x:1");
        assert!(matches!(cli.cmd, Command::Tamper { index: 2, .. }));
    }
}
