//! Cryptographic primitives: SHA-256 hashing and secp256k1 ECDSA

pub mod keys;
pub mod signatures;
pub mod hash;

pub use keys::{PrivateKey, PublicKey, KeyPair};
pub use signatures::Signature;
pub use hash::Hash256;
