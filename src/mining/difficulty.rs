//! Proof-of-work predicate.
//!
//! Difficulty counts leading `'0'` characters in the hex rendering of a block
//! hash, so each step makes a block sixteen times harder to find.

use crate::crypto::hash::Hash256;
use crate::{ChainError, Result};

/// A SHA-256 hash renders as 64 hex characters.
pub const MAX_DIFFICULTY: u32 = 64;

pub fn meets_difficulty(hash: &Hash256, difficulty: u32) -> bool {
    hash.leading_zero_chars() >= difficulty
}

pub fn validate_difficulty(difficulty: u32) -> Result<u32> {
    if difficulty > MAX_DIFFICULTY {
        return Err(ChainError::InvalidDifficulty(difficulty));
    }
    Ok(difficulty)
}

/// Expected number of hashes before a block meets `difficulty`.
pub fn expected_attempts(difficulty: u32) -> f64 {
    16f64.powi(difficulty as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meets_difficulty() {
        let mut bytes = [0xabu8; 32];
        bytes[0] = 0x00;
        let hash = Hash256::new(bytes);

        assert!(meets_difficulty(&hash, 0));
        assert!(meets_difficulty(&hash, 2));
        assert!(!meets_difficulty(&hash, 3));
        assert!(meets_difficulty(&Hash256::zero(), MAX_DIFFICULTY));
    }

    #[test]
    fn test_validate_difficulty() {
        assert_eq!(validate_difficulty(0).unwrap(), 0);
        assert_eq!(validate_difficulty(MAX_DIFFICULTY).unwrap(), MAX_DIFFICULTY);
        assert!(matches!(validate_difficulty(65), Err(ChainError::InvalidDifficulty(65))));
    }

    #[test]
    fn test_expected_attempts() {
        assert_eq!(expected_attempts(0), 1.0);
        assert_eq!(expected_attempts(2), 256.0);
    }
}
