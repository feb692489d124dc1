use crate::core::block::{Block, BlockTemplate, GENESIS_PREVIOUS_HASH};
use crate::core::clock::{Clock, SystemClock};
use crate::core::transaction::{OutputPoint, Transaction, TransactionOutput};
use crate::core::utxo::{CoinSelector, FirstFit, UnspentOutput, UtxoSet};
use crate::crypto::keys::PublicKey;
use crate::mining::difficulty::validate_difficulty;
use crate::{ChainError, Result};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Blocks and the unspent output index they produce. Only ever touched under
/// the lock in [`Blockchain`], so the two always agree.
#[derive(Debug)]
struct ChainState {
    blocks: Vec<Block>,
    utxo_set: UtxoSet,
}

/// An in-memory, append-only ledger.
///
/// [`Blockchain::add`] is the only writer and validates each block in full
/// while holding an exclusive lock; readers share the lock and never observe
/// a block without its effect on the unspent output index.
pub struct Blockchain {
    state: RwLock<ChainState>,
    difficulty: u32,
    clock: Arc<dyn Clock>,
    coin_selector: Arc<dyn CoinSelector>,
}

impl Blockchain {
    /// Creates a ledger whose genesis block credits `recipient` with `amount`.
    pub fn new(recipient: PublicKey, amount: u64, difficulty: u32) -> Result<Self> {
        Self::with_clock(recipient, amount, difficulty, Arc::new(SystemClock))
    }

    pub fn with_clock(recipient: PublicKey, amount: u64, difficulty: u32, clock: Arc<dyn Clock>) -> Result<Self> {
        let difficulty = validate_difficulty(difficulty)?;

        let genesis_transaction = Transaction::genesis(TransactionOutput::new(recipient, amount));
        let genesis = BlockTemplate::new(GENESIS_PREVIOUS_HASH, clock.now_millis(), genesis_transaction).seal(0);

        let mut utxo_set = UtxoSet::new();
        utxo_set.apply_transaction(genesis.transaction());

        log::info!("Created genesis block {} crediting {} units", genesis.hash(), amount);

        Ok(Self {
            state: RwLock::new(ChainState {
                blocks: vec![genesis],
                utxo_set,
            }),
            difficulty,
            clock,
            coin_selector: Arc::new(FirstFit),
        })
    }

    /// Replaces the policy used by [`Blockchain::unspent_outputs`].
    pub fn with_coin_selector(mut self, coin_selector: Arc<dyn CoinSelector>) -> Self {
        self.coin_selector = coin_selector;
        self
    }

    fn read(&self) -> RwLockReadGuard<'_, ChainState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ChainState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// Number of blocks, genesis included.
    pub fn height(&self) -> usize {
        self.read().blocks.len()
    }

    pub fn tail(&self) -> Block {
        let state = self.read();
        // The genesis block is pushed at construction and blocks are never removed.
        state.blocks[state.blocks.len() - 1].clone()
    }

    pub fn block(&self, index: usize) -> Option<Block> {
        self.read().blocks.get(index).cloned()
    }

    /// Every block in chain order, taken under a single read lock.
    pub fn blocks(&self) -> Vec<Block> {
        self.read().blocks.clone()
    }

    pub fn find_unspent(&self, output_point: &OutputPoint) -> Option<UnspentOutput> {
        self.read().utxo_set.find(output_point).cloned()
    }

    pub fn unspent_outputs(&self, owner: &PublicKey, minimum_amount: u64) -> Vec<UnspentOutput> {
        self.unspent_outputs_with(owner, minimum_amount, self.coin_selector.as_ref())
    }

    pub fn unspent_outputs_with(
        &self,
        owner: &PublicKey,
        minimum_amount: u64,
        coin_selector: &dyn CoinSelector,
    ) -> Vec<UnspentOutput> {
        self.read().utxo_set.unspent_outputs(owner, minimum_amount, coin_selector)
    }

    pub fn balance(&self, owner: &PublicKey) -> u64 {
        self.read().utxo_set.balance(owner)
    }

    /// A copy of the unspent output index as of the last accepted block.
    pub fn utxo_snapshot(&self) -> UtxoSet {
        self.read().utxo_set.clone()
    }

    /// A template for the next block: linked to the current tail and stamped
    /// by this ledger's clock. Mine it before calling [`Blockchain::add`].
    pub fn prepare_block(&self, transaction: Transaction) -> BlockTemplate {
        let state = self.read();
        let tail = &state.blocks[state.blocks.len() - 1];
        BlockTemplate::following(tail, transaction, self.clock.as_ref())
    }

    /// Appends `block` if it extends the tail, meets the difficulty and carries
    /// a transaction that spends only signed, unspent outputs of matching value.
    /// On any error the ledger is left exactly as it was.
    pub fn add(&self, block: Block) -> Result<()> {
        let mut state = self.write();

        if let Err(e) = self.validate_block(&state, &block) {
            log::warn!("Rejected block {}: {}", block.hash(), e);
            return Err(e);
        }

        state.utxo_set.apply_transaction(block.transaction());
        let hash = block.hash();
        state.blocks.push(block);

        log::info!("Block {} added to blockchain at height {}", hash, state.blocks.len());
        Ok(())
    }

    fn validate_block(&self, state: &ChainState, block: &Block) -> Result<()> {
        let tail = &state.blocks[state.blocks.len() - 1];

        if !block.follows(tail) {
            return Err(ChainError::ChainLinkage {
                expected: tail.hash().to_hex(),
                found: block.previous_hash().to_hex(),
            });
        }

        if !block.is_mined(self.difficulty) {
            return Err(ChainError::UnminedBlock {
                hash: block.hash().to_hex(),
                difficulty: self.difficulty,
            });
        }

        if block.timestamp() < tail.timestamp() {
            return Err(ChainError::TimestampBeforeTail {
                tail: tail.timestamp(),
                block: block.timestamp(),
            });
        }

        Self::validate_transaction(&state.utxo_set, block.transaction())
    }

    fn validate_transaction(utxo_set: &UtxoSet, transaction: &Transaction) -> Result<()> {
        let mut claimed = BTreeSet::new();
        let mut input_total = 0u128;

        for (index, input) in transaction.inputs().iter().enumerate() {
            let point = input.output_point();

            // An output claimed twice in one transaction is as spent as one claimed by an earlier block.
            let unspent = match utxo_set.find(point) {
                Some(unspent) if !claimed.contains(point) => unspent,
                _ => {
                    return Err(ChainError::SpentOrUnknownInput {
                        index,
                        point: point.clone(),
                    })
                }
            };
            claimed.insert(point);

            if !input.is_signed() {
                return Err(ChainError::UnsignedInput {
                    index,
                    point: point.clone(),
                });
            }

            if !input.verify(&unspent.recipient) {
                return Err(ChainError::UnverifiedSignature {
                    index,
                    point: point.clone(),
                });
            }

            input_total += unspent.amount as u128;
        }

        let output_total = transaction.total_output_amount();
        if input_total != output_total {
            return Err(ChainError::UnbalancedTransaction {
                inputs: input_total,
                outputs: output_total,
            });
        }

        Ok(())
    }
}

impl fmt::Debug for Blockchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        f.debug_struct("Blockchain")
            .field("height", &state.blocks.len())
            .field("unspent_outputs", &state.utxo_set.len())
            .field("difficulty", &self.difficulty)
            .finish()
    }
}
