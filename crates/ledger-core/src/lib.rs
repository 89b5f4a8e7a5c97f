pub mod chain;
pub mod constants;
pub mod error;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub use chain::{validate_chain, Ledger, VerifiedChain};
pub use error::{LedgerError, Result};
pub use pow::ProofOfWork;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: f64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: f64) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
        }
    }
}

/// A committed unit of the ledger. Field order is the canonical hashing order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: DateTime<Utc>,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

impl Block {
    /// Unsolved block stamped with the current time.
    pub fn new(index: u64, transactions: Vec<Transaction>, previous_hash: String) -> Self {
        Self {
            index,
            timestamp: Utc::now(),
            transactions,
            proof: 0,
            previous_hash,
        }
    }

    /// SHA-256 over the canonical JSON encoding of the whole block, as lowercase hex.
    pub fn hash(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(hex::encode(hasher.finalize()))
    }
}

pub mod pow {
    use super::Block;
    use crate::constants::{HASH_HEX_SIZE, POW_DIFFICULTY};
    use crate::error::{LedgerError, Result};
    use tracing::debug;

    /// Admission rule for new blocks: the block hash must start with `difficulty`
    /// zero hex digits.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ProofOfWork {
        difficulty: usize,
    }

    impl Default for ProofOfWork {
        fn default() -> Self {
            Self {
                difficulty: POW_DIFFICULTY,
            }
        }
    }

    impl ProofOfWork {
        pub fn new(difficulty: usize) -> Result<Self> {
            if difficulty > HASH_HEX_SIZE {
                return Err(LedgerError::InvalidDifficulty(difficulty));
            }
            Ok(Self { difficulty })
        }

        pub fn difficulty(&self) -> usize {
            self.difficulty
        }

        pub fn meets_target(&self, hash: &str) -> bool {
            count_leading_zero_nibbles(hash) >= self.difficulty
        }

        /// Checks the block's current proof; no search.
        pub fn is_valid_proof(&self, block: &Block) -> Result<bool> {
            Ok(self.meets_target(&block.hash()?))
        }

        /// Smallest proof, counting up from zero, that makes `block` meet the target.
        /// The caller assigns it.
        pub fn solve_proof(&self, block: &Block) -> Result<u64> {
            let mut candidate = block.clone();
            candidate.proof = 0;
            loop {
                if self.is_valid_proof(&candidate)? {
                    debug!(
                        index = candidate.index,
                        proof = candidate.proof,
                        "proof of work found"
                    );
                    return Ok(candidate.proof);
                }
                candidate.proof = candidate.proof.wrapping_add(1);
            }
        }
    }

    /// Solves the proof for `block` and returns it with the proof set.
    pub fn mine_block(mut block: Block, pow: &ProofOfWork) -> Result<Block> {
        block.proof = pow.solve_proof(&block)?;
        Ok(block)
    }

    pub fn count_leading_zero_nibbles(hash: &str) -> usize {
        hash.chars().take_while(|c| *c == '0').count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_block(index: u64, proof: u64, previous_hash: &str) -> Block {
        Block {
            index,
            timestamp: Utc.with_ymd_and_hms(2009, 11, 10, 23, 0, 0).unwrap(),
            transactions: vec![
                Transaction::new("Alice", "Bob", 10.0),
                Transaction::new("Bob", "Charlie", 5.5),
            ],
            proof,
            previous_hash: previous_hash.to_string(),
        }
    }

    #[test]
    fn leading_zero_nibbles_examples() {
        assert_eq!(pow::count_leading_zero_nibbles("ffff"), 0);
        assert_eq!(pow::count_leading_zero_nibbles("0fff"), 1);
        assert_eq!(pow::count_leading_zero_nibbles("000a"), 3);
        assert_eq!(pow::count_leading_zero_nibbles("0000"), 4);
        assert_eq!(pow::count_leading_zero_nibbles(""), 0);
    }

    #[test]
    fn block_hash_is_sha256_of_json() {
        let block = fixed_block(1, 0, "123");
        let mut hasher = Sha256::new();
        hasher.update(serde_json::to_vec(&block).unwrap());
        let expected = hex::encode(hasher.finalize());
        assert_eq!(block.hash().unwrap(), expected);
        assert_eq!(expected.len(), constants::HASH_HEX_SIZE);
        assert!(expected.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
    }

    #[test]
    fn block_hash_consistency() {
        let block = fixed_block(1, 7, "123");
        assert_eq!(block.hash().unwrap(), block.clone().hash().unwrap());
    }

    #[test]
    fn block_hash_changes_with_each_field() {
        let base = fixed_block(1, 0, "123");
        let h = base.hash().unwrap();

        let mut b = base.clone();
        b.proof += 1;
        assert_ne!(b.hash().unwrap(), h);

        let mut b = base.clone();
        b.index = 2;
        assert_ne!(b.hash().unwrap(), h);

        let mut b = base.clone();
        b.previous_hash = "124".into();
        assert_ne!(b.hash().unwrap(), h);

        let mut b = base.clone();
        b.timestamp = b.timestamp + chrono::Duration::nanoseconds(1);
        assert_ne!(b.hash().unwrap(), h);

        let mut b = base;
        b.transactions[1].amount = 5.25;
        assert_ne!(b.hash().unwrap(), h);
    }

    #[test]
    fn solve_proof_finds_smallest_proof() {
        let pow = ProofOfWork::default();
        for (index, prev) in [(1, "123"), (2, "123365544")] {
            let block = fixed_block(index, 1, prev);
            let proof = pow.solve_proof(&block).unwrap();

            let mut solved = block.clone();
            solved.proof = proof;
            assert!(pow.is_valid_proof(&solved).unwrap());
            assert!(solved.hash().unwrap().starts_with('0'));

            for smaller in 0..proof {
                let mut b = block.clone();
                b.proof = smaller;
                assert!(!pow.is_valid_proof(&b).unwrap());
            }
        }
    }

    #[test]
    fn mine_block_example() {
        let pow = ProofOfWork::new(2).unwrap();
        let mined = pow::mine_block(fixed_block(1, 0, "1"), &pow).unwrap();
        assert!(mined.hash().unwrap().starts_with("00"));
    }

    #[test]
    fn zero_difficulty_accepts_proof_zero() {
        let pow = ProofOfWork::new(0).unwrap();
        assert_eq!(pow.solve_proof(&fixed_block(1, 99, "1")).unwrap(), 0);
    }

    #[test]
    fn difficulty_beyond_hash_width_is_rejected() {
        assert!(ProofOfWork::new(constants::HASH_HEX_SIZE).is_ok());
        let err = ProofOfWork::new(constants::HASH_HEX_SIZE + 1).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidDifficulty(65)));
    }

    #[test]
    fn transaction_serialization_example() {
        let tx = Transaction::new("sender", "recipient", 123.0);
        let json = serde_json::to_string(&tx).unwrap();
        assert_eq!(
            json,
            r#"{"sender":"sender","recipient":"recipient","amount":123.0}"#
        );
        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(tx, back);
    }

    #[test]
    fn transaction_accepts_negative_and_zero_amounts() {
        let neg = Transaction::new("a", "b", -123.0);
        let zero = Transaction::new("a", "b", 0.0);
        assert_eq!(neg.amount, -123.0);
        assert_eq!(zero.amount, 0.0);
        assert_ne!(neg, zero);
    }

    #[test]
    fn block_json_round_trip_rehashes_identically() {
        let mut block = Block::new(
            3,
            vec![Transaction::new("x", "y", 0.1 + 0.2)],
            "abc".into(),
        );
        block.proof = 42;
        let json = serde_json::to_string(&block).unwrap();
        let back: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(block, back);
        assert_eq!(block.hash().unwrap(), back.hash().unwrap());
    }

    #[test]
    fn block_field_order_is_canonical() {
        let json = serde_json::to_string(&fixed_block(1, 0, "1")).unwrap();
        let keys = ["index", "timestamp", "transactions", "proof", "previous_hash"];
        let positions: Vec<usize> = keys
            .iter()
            .map(|k| json.find(&format!("\"{k}\"")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}
