//! Core ledger components

pub mod blockchain;
pub mod block;
pub mod clock;
pub mod transaction;
pub mod utxo;

pub use blockchain::Blockchain;
pub use block::{Block, BlockTemplate, GENESIS_PREVIOUS_HASH};
pub use clock::{Clock, FixedClock, SystemClock};
pub use transaction::{OutputPoint, Transaction, TransactionInput, TransactionOutput};
pub use utxo::{CoinSelector, FirstFit, LargestFirst, UnspentOutput, UtxoSet};
