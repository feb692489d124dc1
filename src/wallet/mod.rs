//! Wallets: keypairs that build and sign transfers against a ledger

pub mod wallet;

pub use wallet::Wallet;
