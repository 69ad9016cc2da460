//! Ledger addresses, blockhashes, and signatures.
//!
//! Addresses are Base58-encoded 32-byte values. An owner address is an
//! Ed25519 public key; a program-derived address is a 32-byte value that
//! deliberately lies OFF the curve so no private key can ever exist for it.

use std::fmt;
use std::str::FromStr;

use crate::error::TokenError;

/// A 32-byte ledger address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Pubkey([u8; 32]);

impl Pubkey {
    pub const fn new_from_array(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Build a key from a byte slice, rejecting anything that is not 32 bytes.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, TokenError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| {
            TokenError::InvalidPublicKey(format!("expected 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(arr))
    }

    pub fn to_bytes(self) -> [u8; 32] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Whether these bytes decompress to a valid Ed25519 point.
    ///
    /// Signing keys are always on the curve; program-derived addresses never are.
    pub fn is_on_curve(&self) -> bool {
        curve25519_dalek::edwards::CompressedEdwardsY(self.0)
            .decompress()
            .is_some()
    }
}

impl From<[u8; 32]> for Pubkey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Pubkey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for Pubkey {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        address_to_bytes(s).map(Self)
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bytes_to_address(&self.0))
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pubkey({self})")
    }
}

/// Recent blockhash: the freshness token every transaction must carry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Blockhash([u8; 32]);

impl Blockhash {
    pub const fn new_from_array(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn to_bytes(self) -> [u8; 32] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for Blockhash {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        address_to_bytes(s).map(Self)
    }
}

impl fmt::Display for Blockhash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Blockhash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Blockhash({self})")
    }
}

/// A 64-byte Ed25519 signature.
///
/// The first signature of a submitted transaction identifies it on the
/// ledger, so this doubles as the confirmation handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; 64]);

impl Signature {
    pub const fn new_from_array(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub fn to_bytes(self) -> [u8; 64] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// The all-zero placeholder used for signature slots not yet filled.
    pub fn is_default(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

impl Default for Signature {
    fn default() -> Self {
        Self([0u8; 64])
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({self})")
    }
}

/// Validate a Base58 address string.
///
/// Returns `Ok(true)` if it decodes to exactly 32 bytes, an error otherwise.
pub fn validate_address(address: &str) -> Result<bool, TokenError> {
    address_to_bytes(address).map(|_| true)
}

/// Decode a Base58 address string to its 32-byte representation.
pub fn address_to_bytes(address: &str) -> Result<[u8; 32], TokenError> {
    let bytes = bs58::decode(address)
        .into_vec()
        .map_err(|e| TokenError::InvalidAddress(format!("base58 decode failed: {e}")))?;

    let arr: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
        TokenError::InvalidAddress(format!("expected 32 bytes, got {}", v.len()))
    })?;

    Ok(arr)
}

/// Encode 32 bytes as a Base58 address string.
pub fn bytes_to_address(bytes: &[u8; 32]) -> String {
    bs58::encode(bytes).into_string()
}
