//! Minimal Solidity ABI codec for static `uint256`/`bool` calls.
//!
//! Calldata is a 4-byte selector (first four bytes of
//! `keccak256(signature)`) followed by one 32-byte big-endian word per
//! argument. Return data is read back as a sequence of 32-byte words.

use alloy_primitives::{keccak256, Bytes, U256};

/// Size of one ABI word.
pub const WORD: usize = 32;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AbiError {
    #[error("return data too short: expected {expected} bytes, got {got}")]
    ShortReturn { expected: usize, got: usize },

    #[error("return word is not a bool: {0}")]
    InvalidBool(U256),
}

/// First four bytes of `keccak256(signature)`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash.0[..4]);
    out
}

/// Encode a call whose arguments are all `uint256`.
pub fn encode_call(signature: &str, args: &[U256]) -> Bytes {
    let mut out = Vec::with_capacity(4 + WORD * args.len());
    out.extend_from_slice(&selector(signature));
    for arg in args {
        out.extend_from_slice(&arg.to_be_bytes::<WORD>());
    }
    Bytes::from(out)
}

/// Split return data into `count` leading words. Trailing bytes are ignored.
pub fn decode_words(data: &[u8], count: usize) -> Result<Vec<U256>, AbiError> {
    let expected = WORD * count;
    if data.len() < expected {
        return Err(AbiError::ShortReturn {
            expected,
            got: data.len(),
        });
    }
    Ok(data[..expected]
        .chunks_exact(WORD)
        .map(U256::from_be_slice)
        .collect())
}

pub fn decode_uint(data: &[u8]) -> Result<U256, AbiError> {
    Ok(decode_words(data, 1)?[0])
}

/// A `bool` word must be exactly 0 or 1.
pub fn decode_bool(data: &[u8]) -> Result<bool, AbiError> {
    let word = decode_uint(data)?;
    if word == U256::ZERO {
        Ok(false)
    } else if word == U256::from(1) {
        Ok(true)
    } else {
        Err(AbiError::InvalidBool(word))
    }
}
