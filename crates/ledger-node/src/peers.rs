use crate::constants::CHAIN_PATH;
use crate::error::NodeError;
use ledger_core::Ledger;
use std::time::Duration;
use tracing::debug;

/// HTTP client used to pull other nodes' ledgers.
///
/// Peer bodies are untrusted: anything larger than `max_body_bytes` is dropped
/// before decoding.
#[derive(Clone, Debug)]
pub struct PeerClient {
    http: reqwest::Client,
    max_body_bytes: usize,
}

impl PeerClient {
    pub fn new(timeout: Duration, max_body_bytes: usize) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            max_body_bytes,
        })
    }

    /// Fetches and decodes the full ledger snapshot served by `peer`.
    pub async fn fetch_ledger(&self, peer: &str) -> Result<Ledger, NodeError> {
        let url = chain_url(peer);
        debug!(%url, "fetching peer chain");
        let mut res = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| NodeError::Fetch {
                peer: peer.to_string(),
                source,
            })?;

        let status = res.status();
        if !status.is_success() {
            return Err(NodeError::Status {
                peer: peer.to_string(),
                status,
            });
        }

        let too_large = || NodeError::TooLarge {
            peer: peer.to_string(),
            limit: self.max_body_bytes,
        };
        if res
            .content_length()
            .is_some_and(|len| len > self.max_body_bytes as u64)
        {
            return Err(too_large());
        }

        let mut body = Vec::new();
        while let Some(chunk) = res.chunk().await.map_err(|source| NodeError::Fetch {
            peer: peer.to_string(),
            source,
        })? {
            if body.len() + chunk.len() > self.max_body_bytes {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }

        serde_json::from_slice::<Ledger>(&body).map_err(|source| NodeError::Decode {
            peer: peer.to_string(),
            source,
        })
    }
}

pub fn chain_url(peer: &str) -> String {
    format!("{}{CHAIN_PATH}", peer.trim_end_matches('/'))
}
