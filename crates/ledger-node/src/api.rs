use crate::consensus::{resolve_conflicts, PeerFailure};
use crate::error::ApiError;
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use ledger_core::{Block, Ledger, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

#[derive(Deserialize)]
pub struct TxIn {
    pub sender: String,
    pub recipient: String,
    pub amount: f64,
}

#[derive(Serialize, Deserialize)]
pub struct TxAccepted {
    pub block_index: u64,
    pub pending_transactions: Vec<Transaction>,
}

#[derive(Serialize, Deserialize)]
pub struct Mined {
    pub block: Block,
    pub chain: Vec<Block>,
}

#[derive(Deserialize)]
pub struct RegisterIn {
    #[serde(default)]
    pub nodes: Vec<String>,
}

#[derive(Serialize, Deserialize)]
pub struct Registered {
    pub peers: BTreeSet<String>,
}

#[derive(Serialize)]
pub struct Resolved {
    pub replaced: bool,
    pub chain: Vec<Block>,
    pub failures: Vec<PeerFailure>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(Health { status: "ok" }) }))
        .route("/chain", get(full_chain))
        .route("/transactions/new", post(new_transaction))
        .route("/mine", get(mine).post(mine))
        .route("/nodes/register", post(register_nodes))
        .route("/nodes/resolve", get(resolve))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn full_chain(State(state): State<AppState>) -> Json<Ledger> {
    Json(state.ledger.lock().await.clone())
}

async fn new_transaction(
    State(state): State<AppState>,
    payload: Result<Json<TxIn>, JsonRejection>,
) -> Result<(StatusCode, Json<TxAccepted>), ApiError> {
    let Json(tx) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    if !tx.amount.is_finite() {
        return Err(ApiError::BadRequest(format!(
            "amount {} is not a finite number",
            tx.amount
        )));
    }

    let mut ledger = state.ledger.lock().await;
    let block_index = ledger.submit_transaction(tx.sender, tx.recipient, tx.amount);
    Ok((
        StatusCode::CREATED,
        Json(TxAccepted {
            block_index,
            pending_transactions: ledger.pending_transactions().to_vec(),
        }),
    ))
}

/// Holds the ledger lock for the whole proof-of-work search, off the async workers.
async fn mine(State(state): State<AppState>) -> Result<Json<Mined>, ApiError> {
    let mut ledger = state.ledger.clone().lock_owned().await;
    let (ledger, block) = tokio::task::spawn_blocking(move || {
        let block = ledger.mine_block()?.clone();
        Ok::<_, ledger_core::LedgerError>((ledger, block))
    })
    .await??;

    Ok(Json(Mined {
        block,
        chain: ledger.chain().to_vec(),
    }))
}

async fn register_nodes(
    State(state): State<AppState>,
    payload: Result<Json<RegisterIn>, JsonRejection>,
) -> Result<Json<Registered>, ApiError> {
    let Json(body) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let nodes: Vec<String> = body
        .nodes
        .into_iter()
        .map(|n| n.trim().to_string())
        .collect();
    if nodes.is_empty() || nodes.iter().any(String::is_empty) {
        return Err(ApiError::BadRequest(
            "expected a non-empty list of node addresses".into(),
        ));
    }

    let mut ledger = state.ledger.lock().await;
    for node in nodes {
        if ledger.register_peer(node.clone()) {
            info!(peer = %node, "registered peer");
        }
    }
    Ok(Json(Registered {
        peers: ledger.peers().clone(),
    }))
}

async fn resolve(State(state): State<AppState>) -> Json<Resolved> {
    let outcome = resolve_conflicts(&state).await;
    let chain = state.ledger.lock().await.chain().to_vec();
    Json(Resolved {
        replaced: outcome.replaced,
        chain,
        failures: outcome.failures,
    })
}
