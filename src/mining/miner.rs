use crate::config::MiningConfig;
use crate::core::{Block, BlockTemplate, Blockchain};
use crate::mining::difficulty::expected_attempts;
use crate::{ChainError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Runs proof-of-work searches on the blocking thread pool so that they never
/// hold up ledger readers or the async runtime.
#[derive(Debug, Clone)]
pub struct Miner {
    difficulty: u32,
    timeout: Option<Duration>,
}

/// A search in progress. Dropping the job, or the future waiting on it,
/// raises the cancel flag so the worker stops at its next nonce.
#[derive(Debug)]
pub struct MiningJob {
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<Result<Block>>,
}

impl Miner {
    pub fn new(difficulty: u32) -> Self {
        Self {
            difficulty,
            timeout: None,
        }
    }

    pub fn for_chain(blockchain: &Blockchain, config: &MiningConfig) -> Self {
        let miner = Self::new(blockchain.difficulty());
        match config.timeout_seconds {
            Some(seconds) => miner.with_timeout(Duration::from_secs(seconds)),
            None => miner,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn spawn(&self, template: BlockTemplate) -> MiningJob {
        let cancel = Arc::new(AtomicBool::new(false));
        let difficulty = self.difficulty;

        log::debug!(
            "Mining transaction {} at difficulty {} (~{} attempts expected)",
            template.transaction().id(),
            difficulty,
            expected_attempts(difficulty)
        );

        let flag = cancel.clone();
        let handle = tokio::task::spawn_blocking(move || template.mine_until(difficulty, &flag));

        MiningJob { cancel, handle }
    }

    /// Mines `template` to completion, or until the configured timeout elapses.
    pub async fn mine(&self, template: BlockTemplate) -> Result<Block> {
        let job = self.spawn(template);

        let timeout = match self.timeout {
            Some(timeout) => timeout,
            None => return job.wait().await,
        };

        match tokio::time::timeout(timeout, job.wait()).await {
            Ok(result) => result,
            Err(_) => {
                log::warn!("Mining timed out after {:?}", timeout);
                Err(ChainError::MiningCancelled)
            }
        }
    }
}

impl MiningJob {
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    pub async fn wait(mut self) -> Result<Block> {
        let joined = (&mut self.handle).await;
        joined.map_err(|e| ChainError::Mining(format!("Mining task failed: {}", e)))?
    }
}

impl Drop for MiningJob {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FixedClock, GENESIS_PREVIOUS_HASH};
    use crate::wallet::Wallet;
    use std::time::Instant;

    fn unreachable_template() -> Result<BlockTemplate> {
        let wallet = Wallet::new()?;
        let blockchain = Blockchain::with_clock(wallet.address().clone(), 1, 0, Arc::new(FixedClock::new(0)))?;
        let transaction = blockchain.tail().transaction().clone();
        Ok(BlockTemplate::new(GENESIS_PREVIOUS_HASH, 0, transaction))
    }

    #[tokio::test]
    async fn test_mine_and_add() -> Result<()> {
        let alice = Wallet::new()?;
        let bob = Wallet::new()?;
        let blockchain = Blockchain::with_clock(alice.address().clone(), 50, 2, Arc::new(FixedClock::new(0)))?;
        let miner = Miner::for_chain(&blockchain, &MiningConfig::default());
        assert_eq!(miner.difficulty(), 2);

        let transaction = alice.transfer(&blockchain, bob.address(), 20)?;
        let block = miner.mine(blockchain.prepare_block(transaction)).await?;
        blockchain.add(block)?;

        assert_eq!(blockchain.height(), 2);
        assert_eq!(bob.balance(&blockchain), 20);
        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_job() -> Result<()> {
        let wallet = Wallet::new()?;
        let blockchain = Blockchain::with_clock(wallet.address().clone(), 1, 0, Arc::new(FixedClock::new(0)))?;
        let transaction = blockchain.tail().transaction().clone();
        // Difficulty 40 will not be met before the flag is seen.
        let job = Miner::new(40).spawn(BlockTemplate::new(GENESIS_PREVIOUS_HASH, 0, transaction));

        job.cancel();

        assert!(job.is_cancelled());
        assert!(matches!(job.wait().await, Err(ChainError::MiningCancelled)));
        Ok(())
    }

    #[tokio::test]
    async fn test_timeout_cancels_search() -> Result<()> {
        let wallet = Wallet::new()?;
        let blockchain = Blockchain::with_clock(wallet.address().clone(), 1, 0, Arc::new(FixedClock::new(0)))?;
        let transaction = blockchain.tail().transaction().clone();
        let miner = Miner::new(40).with_timeout(Duration::from_millis(50));

        let result = miner.mine(BlockTemplate::new(GENESIS_PREVIOUS_HASH, 0, transaction)).await;

        assert!(matches!(result, Err(ChainError::MiningCancelled)));
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_difficulty_surfaces_from_worker() -> Result<()> {
        let wallet = Wallet::new()?;
        let blockchain = Blockchain::with_clock(wallet.address().clone(), 1, 0, Arc::new(FixedClock::new(0)))?;
        let transaction = blockchain.tail().transaction().clone();

        let result = Miner::new(99).mine(BlockTemplate::new(GENESIS_PREVIOUS_HASH, 0, transaction)).await;

        assert!(matches!(result, Err(ChainError::InvalidDifficulty(99))));
        Ok(())
    }

    #[tokio::test]
    async fn test_dropping_job_cancels_search() -> Result<()> {
        let job = Miner::new(40).spawn(unreachable_template()?);
        let flag = job.cancel.clone();

        drop(job);

        assert!(flag.load(Ordering::Relaxed));
        Ok(())
    }

    #[test]
    fn test_abandoned_mine_future_releases_worker() -> Result<()> {
        let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
        let miner = Miner::new(40);
        let template = unreachable_template()?;

        let outcome = runtime.block_on(async {
            tokio::time::timeout(Duration::from_millis(50), miner.mine(template)).await
        });
        assert!(outcome.is_err());

        let started = Instant::now();
        runtime.shutdown_timeout(Duration::from_secs(3));
        assert!(started.elapsed() < Duration::from_secs(1));
        Ok(())
    }
}
