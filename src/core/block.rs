use crate::core::clock::Clock;
use crate::core::Transaction;
use crate::crypto::hash::Hash256;
use crate::mining::difficulty::{meets_difficulty, validate_difficulty};
use crate::{ChainError, Result};
use std::sync::atomic::{AtomicBool, Ordering};

/// Previous hash recorded by the genesis block.
pub const GENESIS_PREVIOUS_HASH: Hash256 = Hash256::zero();

const PROGRESS_LOG_INTERVAL: u64 = 1 << 20;

/// The immutable pre-image of a block: everything except the nonce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTemplate {
    previous_hash: Hash256,
    timestamp: i64,
    transaction: Transaction,
}

/// A sealed block. Its hash is always the hash of its own fields, so the only
/// way to obtain one is through a [`BlockTemplate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    previous_hash: Hash256,
    timestamp: i64,
    nonce: u64,
    transaction: Transaction,
    hash: Hash256,
}

impl BlockTemplate {
    pub fn new(previous_hash: Hash256, timestamp: i64, transaction: Transaction) -> Self {
        Self {
            previous_hash,
            timestamp,
            transaction,
        }
    }

    /// A template extending `previous`, stamped with the current time of `clock`.
    pub fn following(previous: &Block, transaction: Transaction, clock: &dyn Clock) -> Self {
        Self::new(previous.hash, clock.now_millis(), transaction)
    }

    pub fn previous_hash(&self) -> Hash256 {
        self.previous_hash
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    fn hash_with_nonce(&self, nonce: u64) -> Hash256 {
        Hash256::hash_parts([
            self.previous_hash.as_bytes().as_slice(),
            self.timestamp.to_be_bytes().as_slice(),
            nonce.to_be_bytes().as_slice(),
            self.transaction.id().as_bytes().as_slice(),
        ])
    }

    /// Seals the template at `nonce`, whether or not the result is mined.
    pub fn seal(self, nonce: u64) -> Block {
        let hash = self.hash_with_nonce(nonce);

        Block {
            previous_hash: self.previous_hash,
            timestamp: self.timestamp,
            nonce,
            transaction: self.transaction,
            hash,
        }
    }

    /// Searches nonces from zero until the hash meets `difficulty`. Blocks the
    /// calling thread for as long as that takes.
    pub fn mine(self, difficulty: u32) -> Result<Block> {
        self.mine_until(difficulty, &AtomicBool::new(false))
    }

    /// Like [`BlockTemplate::mine`], but gives up with `MiningCancelled` once
    /// `cancel` is set. The flag is checked before every nonce.
    pub fn mine_until(self, difficulty: u32, cancel: &AtomicBool) -> Result<Block> {
        validate_difficulty(difficulty)?;

        let mut nonce = 0u64;
        loop {
            if cancel.load(Ordering::Relaxed) {
                log::debug!("Mining cancelled after {} nonces", nonce);
                return Err(ChainError::MiningCancelled);
            }

            let hash = self.hash_with_nonce(nonce);
            if meets_difficulty(&hash, difficulty) {
                log::debug!("Found nonce {} for hash {}", nonce, hash);
                return Ok(self.seal(nonce));
            }

            nonce = nonce.wrapping_add(1);
            if nonce % PROGRESS_LOG_INTERVAL == 0 {
                log::debug!("Mining at difficulty {}: {} nonces tried", difficulty, nonce);
            }
        }
    }
}

impl Block {
    pub fn previous_hash(&self) -> Hash256 {
        self.previous_hash
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    pub fn hash(&self) -> Hash256 {
        self.hash
    }

    pub fn is_mined(&self, difficulty: u32) -> bool {
        meets_difficulty(&self.hash, difficulty)
    }

    /// Structural linkage only; says nothing about the block's contents.
    pub fn follows(&self, previous: &Block) -> bool {
        self.previous_hash == previous.hash
    }
}
