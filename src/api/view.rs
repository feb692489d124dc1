//! Serializable snapshots of the ledger for read-only consumers.

use crate::core::{Block, Blockchain, Transaction, TransactionInput, TransactionOutput};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainView {
    pub height: usize,
    pub difficulty: u32,
    pub blocks: Vec<BlockView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockView {
    pub previous_hash: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub nonce: u64,
    pub hash: String,
    pub transaction: TransactionView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionView {
    pub id: String,
    pub inputs: Vec<InputView>,
    pub outputs: Vec<OutputView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputView {
    pub transaction_id: String,
    pub output_index: u32,
    pub signature: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputView {
    pub recipient: String,
    pub amount: u64,
}

impl ChainView {
    pub fn of(blockchain: &Blockchain) -> Self {
        let blocks: Vec<BlockView> = blockchain.blocks().iter().map(BlockView::from).collect();

        Self {
            height: blocks.len(),
            difficulty: blockchain.difficulty(),
            blocks,
        }
    }
}

impl From<&Block> for BlockView {
    fn from(block: &Block) -> Self {
        Self {
            previous_hash: block.previous_hash().to_hex(),
            timestamp: block.timestamp(),
            nonce: block.nonce(),
            hash: block.hash().to_hex(),
            transaction: TransactionView::from(block.transaction()),
        }
    }
}

impl From<&Transaction> for TransactionView {
    fn from(transaction: &Transaction) -> Self {
        Self {
            id: transaction.id().to_hex(),
            inputs: transaction.inputs().iter().map(InputView::from).collect(),
            outputs: transaction.outputs().iter().map(OutputView::from).collect(),
        }
    }
}

impl From<&TransactionInput> for InputView {
    fn from(input: &TransactionInput) -> Self {
        Self {
            transaction_id: input.output_point().transaction_id.to_hex(),
            output_index: input.output_point().output_index,
            signature: input.signature().map(|signature| signature.to_string()),
        }
    }
}

impl From<&TransactionOutput> for OutputView {
    fn from(output: &TransactionOutput) -> Self {
        Self {
            recipient: output.recipient().to_address(),
            amount: output.amount(),
        }
    }
}
