use crate::crypto::hash::Hash256;
use crate::crypto::signatures::{Signature, SignatureUtils};
use crate::{ChainError, Result};
use secp256k1::{PublicKey as Secp256k1PublicKey, Secp256k1, SecretKey};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone)]
pub struct PrivateKey {
    key: SecretKey,
}

/// A compressed secp256k1 public key. Doubles as an address on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PublicKey {
    key: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct KeyPair {
    pub private_key: PrivateKey,
    pub public_key: PublicKey,
}

impl PrivateKey {
    pub fn new() -> Result<Self> {
        let mut rng = OsRng;
        let mut secret_bytes = [0u8; 32];
        rng.fill_bytes(&mut secret_bytes);

        let secret_key = SecretKey::from_slice(&secret_bytes)
            .map_err(|e| ChainError::Crypto(format!("Failed to create private key: {}", e)))?;

        Ok(Self { key: secret_key })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 32 {
            return Err(ChainError::Crypto("Private key must be 32 bytes".to_string()));
        }

        let secret_key = SecretKey::from_slice(bytes)
            .map_err(|e| ChainError::Crypto(format!("Invalid private key: {}", e)))?;

        Ok(Self { key: secret_key })
    }

    pub fn public_key(&self) -> PublicKey {
        let secp = Secp256k1::signing_only();
        let public_key = Secp256k1PublicKey::from_secret_key(&secp, &self.key);

        PublicKey {
            key: public_key.serialize().to_vec(),
        }
    }

    pub fn sign(&self, message: &Hash256) -> Result<Signature> {
        SignatureUtils::sign(&self.key, message)
    }
}

impl PublicKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let public_key = Secp256k1PublicKey::from_slice(bytes)
            .map_err(|e| ChainError::Crypto(format!("Invalid public key: {}", e)))?;

        Ok(Self {
            key: public_key.serialize().to_vec(),
        })
    }

    pub fn to_bytes(&self) -> &[u8] {
        &self.key
    }

    /// Base58 rendering used in logs and the CLI.
    pub fn to_address(&self) -> String {
        bs58::encode(&self.key).into_string()
    }

    pub fn verify(&self, message: &Hash256, signature: &Signature) -> bool {
        match Secp256k1PublicKey::from_slice(&self.key) {
            Ok(public_key) => SignatureUtils::verify(&public_key, message, signature),
            Err(_) => false,
        }
    }
}

impl KeyPair {
    pub fn new() -> Result<Self> {
        let private_key = PrivateKey::new()?;
        Ok(Self::from_private_key(private_key))
    }

    pub fn from_private_key(private_key: PrivateKey) -> Self {
        let public_key = private_key.public_key();

        Self {
            private_key,
            public_key,
        }
    }

    pub fn address(&self) -> &PublicKey {
        &self.public_key
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_address())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_generation() -> Result<()> {
        let keypair = KeyPair::new()?;

        assert_eq!(keypair.public_key.to_bytes().len(), 33);
        assert_ne!(KeyPair::new()?.public_key, keypair.public_key);
        Ok(())
    }

    #[test]
    fn test_private_key_bytes() -> Result<()> {
        let private_key = PrivateKey::from_bytes(&[7u8; 32])?;
        let again = PrivateKey::from_bytes(&[7u8; 32])?;

        assert_eq!(private_key.public_key(), again.public_key());
        assert!(PrivateKey::from_bytes(&[1u8; 16]).is_err());
        Ok(())
    }

    #[test]
    fn test_public_key_parsing() -> Result<()> {
        let keypair = KeyPair::new()?;
        let parsed = PublicKey::from_bytes(keypair.public_key.to_bytes())?;

        assert_eq!(parsed, keypair.public_key);
        assert!(PublicKey::from_bytes(&[2u8; 10]).is_err());
        Ok(())
    }

    #[test]
    fn test_address_is_base58() -> Result<()> {
        let keypair = KeyPair::new()?;
        let decoded = bs58::decode(keypair.address().to_address()).into_vec().unwrap();

        assert_eq!(decoded, keypair.public_key.to_bytes());
        Ok(())
    }
}
