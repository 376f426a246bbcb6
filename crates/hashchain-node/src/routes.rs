use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use hashchain_core::hash::to_hex;
use hashchain_core::{Block, BlockSnapshot, ChainSnapshot, Solution, Violation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

const APPENDED_MESSAGE: &str = "block appended to the chain";

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

#[derive(Serialize, Deserialize)]
pub struct Head {
    pub height: u64,
    pub hash: String,
}

#[derive(Serialize, Deserialize)]
pub struct Appended {
    pub message: String,
    pub block: BlockSnapshot,
    /// Proof-of-work digest for the new block's proof, hex encoded.
    pub work: String,
}

#[derive(Deserialize)]
pub struct DataIn {
    pub data: Option<Value>,
}

#[derive(Serialize, Deserialize)]
pub struct ValidityOut {
    pub valid: bool,
    /// Block at which the first violation was found.
    pub index: Option<u64>,
    pub violation: Option<Violation>,
}

#[derive(Deserialize)]
pub struct TamperIn {
    pub index: u64,
    pub data: Value,
}

#[derive(Serialize, Deserialize)]
pub struct TamperOut {
    pub index: u64,
    pub tampered: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/chain", get(chain))
        .route("/chain/head", get(head))
        .route("/chain/blocks/{index}", get(block))
        .route("/mine", post(mine))
        .route("/blocks", post(add_data))
        .route("/validate", get(validate))
        .route("/diagnostics/tamper", post(tamper))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn chain(State(state): State<AppState>) -> Json<ChainSnapshot> {
    Json(state.ledger().read().await.snapshot())
}

async fn head(State(state): State<AppState>) -> Result<Json<Head>, ApiError> {
    let ledger = state.ledger().read().await;
    let tip = ledger.last_block()?;
    Ok(Json(Head {
        height: tip.index(),
        hash: to_hex(tip.hash()),
    }))
}

async fn block(
    State(state): State<AppState>,
    Path(index): Path<u64>,
) -> Result<Json<BlockSnapshot>, ApiError> {
    let ledger = state.ledger().read().await;
    ledger
        .block(index)
        .map(|b| Json(b.snapshot()))
        .ok_or(ApiError::BlockNotFound(index))
}

async fn mine(State(state): State<AppState>) -> Result<Json<Appended>, ApiError> {
    let (block, solution) = state.mine().await?;
    Ok(Json(appended(block, solution)))
}

async fn add_data(
    State(state): State<AppState>,
    Json(body): Json<DataIn>,
) -> Result<Json<Appended>, ApiError> {
    let payload = match body.data {
        Some(Value::Null) | None => {
            return Err(ApiError::InvalidPayload("missing `data` field".into()))
        }
        Some(v) => v,
    };
    let (block, solution) = state.add_data(payload).await?;
    Ok(Json(appended(block, solution)))
}

fn appended(block: Block, solution: Solution) -> Appended {
    Appended {
        message: APPENDED_MESSAGE.to_string(),
        block: block.snapshot(),
        work: to_hex(&solution.digest),
    }
}

async fn validate(State(state): State<AppState>) -> Json<ValidityOut> {
    let violation = state.ledger().read().await.validate().err();
    Json(ValidityOut {
        valid: violation.is_none(),
        index: violation.as_ref().and_then(Violation::index),
        violation,
    })
}

async fn tamper(
    State(state): State<AppState>,
    Json(body): Json<TamperIn>,
) -> Result<Json<TamperOut>, ApiError> {
    if !state.allow_tamper() {
        return Err(ApiError::TamperDisabled);
    }
    state
        .ledger()
        .write()
        .await
        .tamper()
        .overwrite_payload(body.index, body.data)?;
    info!(index = body.index, "tamper simulation applied");
    Ok(Json(TamperOut {
        index: body.index,
        tampered: true,
    }))
}
