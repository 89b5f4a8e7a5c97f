use crate::constants::{DEFAULT_LISTEN, DEFAULT_MAX_CHAIN_BYTES, DEFAULT_PEER_TIMEOUT_SECS};
use clap::Parser;
use ledger_core::{constants::POW_DIFFICULTY, ProofOfWork};
use std::{net::SocketAddr, time::Duration};

#[derive(Parser, Debug, Clone)]
#[command(name = "ledger-node")]
#[command(about = "HTTP node holding one copy of the proof-of-work ledger")]
pub struct Args {
    /// Address to listen on, e.g. 127.0.0.1:6060
    #[arg(long, default_value = DEFAULT_LISTEN)]
    pub listen: SocketAddr,

    /// Leading zero hex digits every block hash must carry
    #[arg(long, default_value_t = POW_DIFFICULTY as u8, value_parser = clap::value_parser!(u8).range(0..=64))]
    pub difficulty: u8,

    /// Timeout for fetching a peer's chain, in seconds
    #[arg(long, default_value_t = DEFAULT_PEER_TIMEOUT_SECS)]
    pub peer_timeout_secs: u64,

    /// Largest peer chain response accepted, in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_CHAIN_BYTES)]
    pub max_chain_bytes: usize,

    /// Peer base URL to register at startup (repeatable)
    #[arg(long = "peer")]
    pub peers: Vec<String>,
}

/// Runtime settings for a node, independent of how they were parsed.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub pow: ProofOfWork,
    pub peer_timeout: Duration,
    pub max_chain_bytes: usize,
    pub bootstrap_peers: Vec<String>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            pow: ProofOfWork::default(),
            peer_timeout: Duration::from_secs(DEFAULT_PEER_TIMEOUT_SECS),
            max_chain_bytes: DEFAULT_MAX_CHAIN_BYTES,
            bootstrap_peers: Vec::new(),
        }
    }
}

impl Args {
    pub fn node_config(&self) -> ledger_core::Result<NodeConfig> {
        Ok(NodeConfig {
            pow: ProofOfWork::new(self.difficulty as usize)?,
            peer_timeout: Duration::from_secs(self.peer_timeout_secs),
            max_chain_bytes: self.max_chain_bytes,
            bootstrap_peers: self.peers.clone(),
        })
    }
}
