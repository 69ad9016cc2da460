//! Ed25519 keypairs.
//!
//! The 64-byte secret key form is the ledger's usual export format:
//! 32-byte seed followed by the 32-byte public key.

use ed25519_dalek::Signer as _;
use rand_core::OsRng;
use zeroize::Zeroize;

use crate::address::{Pubkey, Signature};
use crate::error::TokenError;
use crate::signer::Signer;

/// An Ed25519 signing key plus its public address.
///
/// The inner `SigningKey` zeroizes itself on drop.
pub struct Keypair {
    signing_key: ed25519_dalek::SigningKey,
}

impl Keypair {
    /// Generate a fresh keypair from the OS RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::generate(&mut OsRng),
        }
    }

    /// Build a keypair from a 32-byte Ed25519 seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(seed),
        }
    }

    /// Build a keypair from either a 32-byte seed or a 64-byte
    /// seed-plus-public-key secret.
    ///
    /// For the 64-byte form the trailing public key must match the seed.
    pub fn from_secret_key(secret_key: &[u8]) -> Result<Self, TokenError> {
        match secret_key.len() {
            32 | 64 => {}
            len => {
                return Err(TokenError::InvalidPrivateKey(format!(
                    "secret key must be 32 or 64 bytes, got {len}"
                )))
            }
        }

        let mut seed = [0u8; 32];
        seed.copy_from_slice(&secret_key[..32]);
        let keypair = Self::from_seed(&seed);
        seed.zeroize();

        if secret_key.len() == 64 && keypair.pubkey().as_bytes()[..] != secret_key[32..] {
            return Err(TokenError::InvalidPrivateKey(
                "public key half does not match seed".into(),
            ));
        }

        Ok(keypair)
    }

    pub fn pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.signing_key.verifying_key().to_bytes())
    }

    /// Export in the 64-byte seed-plus-public-key form.
    pub fn to_bytes(&self) -> [u8; 64] {
        self.signing_key.to_keypair_bytes()
    }
}

impl Signer for Keypair {
    fn pubkey(&self) -> Pubkey {
        Keypair::pubkey(self)
    }

    fn sign_message(&self, message: &[u8]) -> Result<Signature, TokenError> {
        let signature = self.signing_key.sign(message);
        Ok(Signature::new_from_array(signature.to_bytes()))
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair")
            .field("pubkey", &self.pubkey())
            .finish_non_exhaustive()
    }
}
