use crate::error::NodeError;
use crate::AppState;
use ledger_core::VerifiedChain;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct PeerFailure {
    pub peer: String,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct ResolveOutcome {
    pub replaced: bool,
    pub failures: Vec<PeerFailure>,
}

/// Pulls every known peer's ledger in turn and adopts any strictly longer valid chain.
///
/// A failing peer is recorded and skipped. The ledger lock is only taken to read the
/// peer list and to swap in a verified chain.
pub async fn resolve_conflicts(state: &AppState) -> ResolveOutcome {
    let (peers, pow) = {
        let ledger = state.ledger.lock().await;
        (
            ledger.peers().iter().cloned().collect::<Vec<_>>(),
            ledger.proof_of_work(),
        )
    };

    let mut outcome = ResolveOutcome::default();
    for peer in peers {
        match reconcile_with(state, &peer, pow).await {
            Ok(true) => {
                info!(%peer, "adopted chain from peer");
                outcome.replaced = true;
            }
            Ok(false) => {}
            Err(err) => {
                warn!(%peer, error = %err, "skipping peer");
                outcome.failures.push(PeerFailure {
                    peer,
                    error: err.to_string(),
                });
            }
        }
    }
    outcome
}

async fn reconcile_with(
    state: &AppState,
    peer: &str,
    pow: ledger_core::ProofOfWork,
) -> Result<bool, NodeError> {
    let candidate = state.peers.fetch_ledger(peer).await?;
    let blocks = candidate.into_chain();
    let verified =
        tokio::task::spawn_blocking(move || VerifiedChain::verify(blocks, &pow)).await??;

    match verified {
        Some(chain) => Ok(state.ledger.lock().await.adopt(chain)),
        None => {
            info!(%peer, "peer chain failed validation");
            Ok(false)
        }
    }
}
