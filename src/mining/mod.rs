//! Proof-of-work mining

pub mod miner;
pub mod difficulty;

pub use miner::{Miner, MiningJob};
pub use difficulty::{meets_difficulty, MAX_DIFFICULTY};
