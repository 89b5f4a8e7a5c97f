use crate::constants::HASH_HEX_SIZE;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// A block could not be turned into its canonical bytes. The data model is fixed,
    /// so this is a defect rather than a condition callers are expected to recover from.
    #[error("block serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("difficulty {0} exceeds the {max} hex digits of a block hash", max = HASH_HEX_SIZE)]
    InvalidDifficulty(usize),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
