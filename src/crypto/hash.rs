use sha2::{Digest, Sha256};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hash256([u8; 32]);

impl Hash256 {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn zero() -> Self {
        Self([0u8; 32])
    }

    pub fn hash(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Hashes the concatenation of `parts` without building an intermediate buffer.
    pub fn hash_parts<I, T>(parts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part.as_ref());
        }
        Self(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(hex_str)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }

        let mut array = [0u8; 32];
        array.copy_from_slice(&bytes);
        Ok(Self(array))
    }

    /// Number of leading `'0'` characters in the hex rendering of this hash.
    pub fn leading_zero_chars(&self) -> u32 {
        let mut count = 0;
        for byte in self.0 {
            if byte == 0 {
                count += 2;
                continue;
            }
            if byte >> 4 == 0 {
                count += 1;
            }
            break;
        }
        count
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash256() {
        let data = b"hello world";
        let hash1 = Hash256::hash(data);
        let hash2 = Hash256::hash(data);

        assert_eq!(hash1, hash2);
        assert_ne!(hash1, Hash256::zero());
    }

    #[test]
    fn test_hash_parts_matches_concatenation() {
        let joined = Hash256::hash(b"helloworld");
        let parts = Hash256::hash_parts([b"hello".as_slice(), b"world".as_slice()]);

        assert_eq!(joined, parts);
    }

    #[test]
    fn test_hash256_hex() {
        let hash = Hash256::hash(b"test");
        let parsed_hash = Hash256::from_hex(&hash.to_hex()).unwrap();

        assert_eq!(hash, parsed_hash);
        assert!(Hash256::from_hex("abcd").is_err());
    }

    #[test]
    fn test_leading_zero_chars() {
        assert_eq!(Hash256::zero().leading_zero_chars(), 64);

        let mut bytes = [0xffu8; 32];
        assert_eq!(Hash256::new(bytes).leading_zero_chars(), 0);

        bytes[0] = 0x00;
        bytes[1] = 0x0f;
        let hash = Hash256::new(bytes);
        assert_eq!(hash.leading_zero_chars(), 3);
        assert!(hash.to_hex().starts_with("000f"));
    }
}
