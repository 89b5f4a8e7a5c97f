use crate::constants::GENESIS_PREVIOUS_HASH;
use crate::error::Result;
use crate::pow::ProofOfWork;
use crate::{Block, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;

/// One node's copy of the chain, its pending pool and its known peers.
///
/// The serialized form (`chain`, `peers`, `pending_transactions`) is what nodes exchange;
/// the proof-of-work configuration stays local.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ledger {
    chain: Vec<Block>,
    #[serde(default)]
    peers: BTreeSet<String>,
    #[serde(default)]
    pending_transactions: Vec<Transaction>,
    #[serde(skip)]
    pow: ProofOfWork,
}

impl Ledger {
    /// Creates a ledger holding only the mined genesis block.
    pub fn new(pow: ProofOfWork) -> Result<Self> {
        let mut ledger = Self {
            chain: Vec::new(),
            peers: BTreeSet::new(),
            pending_transactions: Vec::new(),
            pow,
        };
        ledger.mine_block()?;
        Ok(ledger)
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn into_chain(self) -> Vec<Block> {
        self.chain
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn last_block(&self) -> Option<&Block> {
        self.chain.last()
    }

    pub fn pending_transactions(&self) -> &[Transaction] {
        &self.pending_transactions
    }

    pub fn peers(&self) -> &BTreeSet<String> {
        &self.peers
    }

    pub fn proof_of_work(&self) -> ProofOfWork {
        self.pow
    }

    /// Queues a transaction and returns the index of the block that will commit it.
    pub fn submit_transaction(
        &mut self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: f64,
    ) -> u64 {
        self.pending_transactions
            .push(Transaction::new(sender, recipient, amount));
        self.chain.len() as u64 + 1
    }

    /// Moves the whole pending pool into a new block, solves its proof and appends it.
    ///
    /// On error the pool is restored and the chain is left as it was.
    pub fn mine_block(&mut self) -> Result<&Block> {
        let previous_hash = match self.last_block() {
            Some(tip) => tip.hash()?,
            None => GENESIS_PREVIOUS_HASH.to_string(),
        };
        let transactions = std::mem::take(&mut self.pending_transactions);
        let mut block = Block::new(self.chain.len() as u64 + 1, transactions, previous_hash);

        match self.pow.solve_proof(&block) {
            Ok(proof) => block.proof = proof,
            Err(err) => {
                self.pending_transactions = block.transactions;
                return Err(err);
            }
        }

        info!(
            index = block.index,
            proof = block.proof,
            transactions = block.transactions.len(),
            "mined block"
        );
        self.chain.push(block);
        Ok(&self.chain[self.chain.len() - 1])
    }

    /// Returns `true` when the address was not known before.
    pub fn register_peer(&mut self, address: impl Into<String>) -> bool {
        self.peers.insert(address.into())
    }

    pub fn is_chain_valid(&self) -> Result<bool> {
        validate_chain(&self.chain, &self.pow)
    }

    /// Adopts the candidate's chain when it is valid under this ledger's proof-of-work
    /// rule and strictly longer. Pending transactions and peers are kept.
    pub fn reconcile(&mut self, candidate: &Ledger) -> Result<bool> {
        if candidate.chain.len() <= self.chain.len() {
            return Ok(false);
        }
        match VerifiedChain::verify(candidate.chain.clone(), &self.pow)? {
            Some(verified) => Ok(self.adopt(verified)),
            None => Ok(false),
        }
    }

    /// Swaps in an already verified chain if it is strictly longer than ours.
    pub fn adopt(&mut self, verified: VerifiedChain) -> bool {
        if verified.len() <= self.chain.len() {
            return false;
        }
        info!(
            from = self.chain.len(),
            to = verified.len(),
            "replacing chain with longer valid chain"
        );
        self.chain = verified.blocks;
        true
    }
}

/// A chain whose proofs and hash links all checked out.
#[derive(Clone, Debug)]
pub struct VerifiedChain {
    blocks: Vec<Block>,
}

impl VerifiedChain {
    /// Returns `None` when the chain fails validation.
    pub fn verify(blocks: Vec<Block>, pow: &ProofOfWork) -> Result<Option<Self>> {
        if validate_chain(&blocks, pow)? {
            Ok(Some(Self { blocks }))
        } else {
            Ok(None)
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Walks genesis to tip and stops at the first block with a failing proof or a
/// `previous_hash` that does not match its predecessor.
///
/// Only proofs and hash links are checked: the genesis sentinel and the `index`
/// numbering are not, so a well-linked chain with a foreign genesis is accepted.
pub fn validate_chain(chain: &[Block], pow: &ProofOfWork) -> Result<bool> {
    let mut previous_hash: Option<String> = None;
    for block in chain {
        let hash = block.hash()?;
        if !pow.meets_target(&hash) {
            return Ok(false);
        }
        if let Some(expected) = &previous_hash {
            if block.previous_hash != *expected {
                return Ok(false);
            }
        }
        previous_hash = Some(hash);
    }
    Ok(true)
}
