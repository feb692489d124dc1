//! Minichain - a single-node proof-of-work UTXO ledger
//!
//! This library implements an in-memory blockchain with:
//! - One transaction per block, sealed by character-based proof-of-work
//! - An unspent transaction output index with pluggable coin selection
//! - secp256k1 signatures authorizing every spend
//! - Wallets that build and sign transfers
//! - A cancellable background miner and JSON views of the chain

pub mod core;
pub mod crypto;
pub mod wallet;
pub mod mining;
pub mod api;
pub mod cli;
pub mod error;
pub mod config;

pub use error::{ChainError, Result};
