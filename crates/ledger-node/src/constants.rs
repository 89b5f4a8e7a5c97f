pub(crate) const DEFAULT_LISTEN: &str = "127.0.0.1:6060";
pub(crate) const DEFAULT_PEER_TIMEOUT_SECS: u64 = 10;
pub(crate) const CHAIN_PATH: &str = "/chain";
pub(crate) const DEFAULT_MAX_CHAIN_BYTES: usize = 64 * 1024 * 1024;
