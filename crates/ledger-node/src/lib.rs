pub mod api;
pub mod config;
pub mod consensus;
mod constants;
pub mod error;
pub mod peers;

use anyhow::Result;
use config::NodeConfig;
use ledger_core::Ledger;
use peers::PeerClient;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared handler state: the node's single ledger behind one lock, plus the peer client.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Mutex<Ledger>>,
    pub peers: PeerClient,
}

impl AppState {
    pub fn new(config: &NodeConfig) -> Result<Self> {
        let mut ledger = Ledger::new(config.pow)?;
        for peer in &config.bootstrap_peers {
            ledger.register_peer(peer.clone());
        }
        Ok(Self {
            ledger: Arc::new(Mutex::new(ledger)),
            peers: PeerClient::new(config.peer_timeout, config.max_chain_bytes)?,
        })
    }
}
