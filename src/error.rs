use crate::core::OutputPoint;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChainError>;

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("Previous hash {found} does not match tail block {expected}")]
    ChainLinkage { expected: String, found: String },

    #[error("Unmined block {hash} at difficulty {difficulty}")]
    UnminedBlock { hash: String, difficulty: u32 },

    #[error("Timestamp {block} precedes tail block timestamp {tail}")]
    TimestampBeforeTail { tail: i64, block: i64 },

    #[error("Spent or unknown transaction input {index}: {point}")]
    SpentOrUnknownInput { index: usize, point: OutputPoint },

    #[error("Unsigned transaction input {index}: {point}")]
    UnsignedInput { index: usize, point: OutputPoint },

    #[error("Unverified signature on transaction input {index}: {point}")]
    UnverifiedSignature { index: usize, point: OutputPoint },

    #[error("Unbalanced transaction: inputs {inputs}, outputs {outputs}")]
    UnbalancedTransaction { inputs: u128, outputs: u128 },

    #[error("Error signing transaction input: {0}")]
    Signing(String),

    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: u64, available: u64 },

    #[error("Invalid difficulty: {0}")]
    InvalidDifficulty(u32),

    #[error("Mining cancelled")]
    MiningCancelled,

    #[error("Mining error: {0}")]
    Mining(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
