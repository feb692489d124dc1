use crate::crypto::hash::Hash256;
use crate::{ChainError, Result};
use secp256k1::{ecdsa::Signature as Secp256k1Signature, Message, PublicKey as Secp256k1PublicKey, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A DER-encoded ECDSA signature.
///
/// The bytes are kept as received so that a malformed signature can still be
/// carried by an input and rejected at verification time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    der: Vec<u8>,
}

impl Signature {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self { der: bytes.to_vec() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.der
    }

    pub fn from_secp256k1(signature: Secp256k1Signature) -> Self {
        Self {
            der: signature.serialize_der().to_vec(),
        }
    }

    pub fn to_secp256k1(&self) -> Result<Secp256k1Signature> {
        Secp256k1Signature::from_der(&self.der)
            .map_err(|e| ChainError::Crypto(format!("Invalid DER signature: {}", e)))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.der))
    }
}

pub struct SignatureUtils;

impl SignatureUtils {
    pub fn sign(secret_key: &SecretKey, message_hash: &Hash256) -> Result<Signature> {
        let secp = Secp256k1::signing_only();
        let message = Message::from_digest_slice(message_hash.as_bytes())
            .map_err(|e| ChainError::Signing(format!("Invalid message: {}", e)))?;

        let signature = secp.sign_ecdsa(&message, secret_key);
        Ok(Signature::from_secp256k1(signature))
    }

    /// Fails closed: any decoding problem counts as a failed verification.
    pub fn verify(public_key: &Secp256k1PublicKey, message_hash: &Hash256, signature: &Signature) -> bool {
        let secp = Secp256k1::verification_only();
        let message = match Message::from_digest_slice(message_hash.as_bytes()) {
            Ok(message) => message,
            Err(_) => return false,
        };

        let secp_signature = match signature.to_secp256k1() {
            Ok(signature) => signature,
            Err(e) => {
                log::debug!("Rejecting malformed signature: {}", e);
                return false;
            }
        };

        secp.verify_ecdsa(&message, &secp_signature, public_key).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::KeyPair;

    #[test]
    fn test_signature_roundtrip() -> Result<()> {
        let keypair = KeyPair::new()?;
        let message = Hash256::hash(b"test message");

        let signature = keypair.private_key.sign(&message)?;
        let reparsed = Signature::from_bytes(signature.as_bytes());

        assert!(keypair.public_key.verify(&message, &signature));
        assert!(keypair.public_key.verify(&message, &reparsed));
        Ok(())
    }

    #[test]
    fn test_signature_rejects_other_message() -> Result<()> {
        let keypair = KeyPair::new()?;
        let signature = keypair.private_key.sign(&Hash256::hash(b"one"))?;

        assert!(!keypair.public_key.verify(&Hash256::hash(b"two"), &signature));
        Ok(())
    }

    #[test]
    fn test_malformed_signature_fails_closed() -> Result<()> {
        let keypair = KeyPair::new()?;
        let signature = Signature::from_bytes(&[0x30, 0x01, 0x02]);

        assert!(signature.to_secp256k1().is_err());
        assert!(!keypair.public_key.verify(&Hash256::hash(b"test"), &signature));
        Ok(())
    }
}
