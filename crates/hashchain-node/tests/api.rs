//! In-process tests for the HTTP routes.

use axum_test::TestServer;
use hashchain_core::constants::GENESIS_PROOF;
use hashchain_core::hash::to_hex;
use hashchain_core::pow::work_digest;
use hashchain_core::{ChainSnapshot, Ledger};
use hashchain_node::routes::{Appended, Head, TamperOut, ValidityOut};
use hashchain_node::{router, AppState};
use serde_json::{json, Value};

fn server(difficulty: u32, allow_tamper: bool) -> (TestServer, AppState) {
    let ledger = Ledger::new(difficulty).expect("ledger");
    let state = AppState::new(ledger, allow_tamper);
    let server = TestServer::new(router(state.clone())).expect("Failed to create test server");
    (server, state)
}

#[tokio::test]
async fn health_and_genesis() {
    let (server, _) = server(2, false);

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["status"], "ok");

    let response = server.get("/chain").await;
    assert_eq!(response.status_code(), 200);
    let chain: ChainSnapshot = response.json();
    assert_eq!(chain.length, 1);
    assert_eq!(chain.chain[0].index, 0);
    assert_eq!(chain.chain[0].previous_hash, "0".repeat(64));
    assert_eq!(chain.difficulty, 2);

    let head: Head = server.get("/chain/head").await.json();
    assert_eq!(head.height, 0);
    assert_eq!(head.hash, chain.chain[0].hash);

    let validity: ValidityOut = server.get("/validate").await.json();
    assert!(validity.valid);
    assert!(validity.index.is_none());
    assert!(validity.violation.is_none());
}

#[tokio::test]
async fn mine_and_add_data_extend_the_chain() {
    let (server, _) = server(2, false);

    let response = server.post("/mine").await;
    assert_eq!(response.status_code(), 200);
    let mined: Appended = response.json();
    assert_eq!(mined.block.index, 1);
    assert_eq!(mined.block.payload, json!({"message": "block mined"}));
    assert!(mined.work.starts_with("00"));
    let digest = work_digest(GENESIS_PROOF, mined.block.proof.expect("proof")).expect("digest");
    assert_eq!(mined.work, to_hex(&digest));

    let response = server
        .post("/blocks")
        .json(&json!({"data": {"msg": "a"}}))
        .await;
    assert_eq!(response.status_code(), 200);
    let added: Appended = response.json();
    assert_eq!(added.block.index, 2);
    assert_eq!(added.block.previous_hash, mined.block.hash);
    assert_eq!(added.block.payload, json!({"msg": "a"}));
    let digest = work_digest(mined.block.proof.expect("proof"), added.block.proof.expect("proof"))
        .expect("digest");
    assert_eq!(added.work, to_hex(&digest));

    let chain: ChainSnapshot = server.get("/chain").await.json();
    assert_eq!(chain.length, 3);

    let response = server.get("/chain/blocks/2").await;
    assert_eq!(response.status_code(), 200);
    let block: Value = response.json();
    assert_eq!(block["hash"], added.block.hash.as_str());

    let validity: ValidityOut = server.get("/validate").await.json();
    assert!(validity.valid);
}

#[tokio::test]
async fn missing_data_is_rejected_without_touching_chain() {
    let (server, state) = server(1, false);

    let response = server.post("/blocks").json(&json!({"other": 1})).await;
    assert_eq!(response.status_code(), 422);
    let json: Value = response.json();
    assert!(json["error"].as_str().unwrap().contains("data"));

    let response = server.post("/blocks").json(&json!({"data": null})).await;
    assert_eq!(response.status_code(), 422);

    assert_eq!(state.ledger().read().await.len(), 1);
}

#[tokio::test]
async fn unknown_block_is_not_found() {
    let (server, _) = server(1, false);
    let response = server.get("/chain/blocks/7").await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn tamper_route_is_disabled_by_default() {
    let (server, state) = server(1, false);
    server.post("/mine").await;
    let response = server
        .post("/diagnostics/tamper")
        .json(&json!({"index": 1, "data": "corrupted"}))
        .await;
    assert_eq!(response.status_code(), 403);
    assert!(state.ledger().read().await.is_valid());
}

#[tokio::test]
async fn tampering_invalidates_the_chain() {
    let (server, _) = server(2, true);
    server.post("/blocks").json(&json!({"data": {"msg": "a"}})).await;
    server.post("/blocks").json(&json!({"data": {"msg": "b"}})).await;

    let response = server
        .post("/diagnostics/tamper")
        .json(&json!({"index": 2, "data": "corrupted"}))
        .await;
    assert_eq!(response.status_code(), 200);
    let out: TamperOut = response.json();
    assert!(out.tampered);

    let validity: Value = server.get("/validate").await.json();
    assert_eq!(validity["valid"], false);
    assert_eq!(validity["violation"]["kind"], "hash_mismatch");
    assert_eq!(validity["violation"]["index"], 2);
    assert_eq!(validity["index"], 2);

    let response = server
        .post("/diagnostics/tamper")
        .json(&json!({"index": 99, "data": "x"}))
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_appends_are_serialized() {
    let state = AppState::new(Ledger::new(2).expect("ledger"), false);
    let mut handles = Vec::new();
    for i in 0..8 {
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            state.add_data(json!({ "n": i })).await
        }));
    }
    for handle in handles {
        handle.await.expect("join").expect("append");
    }
    let ledger = state.ledger().read().await;
    assert_eq!(ledger.len(), 9);
    assert!(ledger.is_valid());
}
