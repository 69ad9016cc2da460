//! The signing capability.
//!
//! Anything that owns exactly one key and can sign a message is a
//! [`Signer`]: a local [`Keypair`](crate::Keypair), a hardware device, or a
//! wallet facade forwarding to either.

use crate::address::{Pubkey, Signature};
use crate::error::TokenError;
use crate::transaction::Transaction;

pub trait Signer {
    /// The address this signer signs for.
    fn pubkey(&self) -> Pubkey;

    /// Sign raw message bytes.
    fn sign_message(&self, message: &[u8]) -> Result<Signature, TokenError>;

    /// Add this signer's signature to `tx`.
    ///
    /// Fails if the signer is not one of the transaction's required signers.
    fn sign_transaction(&self, mut tx: Transaction) -> Result<Transaction, TokenError> {
        let signature = self.sign_message(&tx.message_data()?)?;
        tx.add_signature(&self.pubkey(), signature)?;
        Ok(tx)
    }

    /// Sign each transaction in turn, stopping at the first failure.
    fn sign_all_transactions(
        &self,
        txs: Vec<Transaction>,
    ) -> Result<Vec<Transaction>, TokenError> {
        txs.into_iter()
            .map(|tx| self.sign_transaction(tx))
            .collect()
    }
}

impl<T: Signer + ?Sized> Signer for &T {
    fn pubkey(&self) -> Pubkey {
        (**self).pubkey()
    }

    fn sign_message(&self, message: &[u8]) -> Result<Signature, TokenError> {
        (**self).sign_message(message)
    }
}

impl<T: Signer + ?Sized> Signer for Box<T> {
    fn pubkey(&self) -> Pubkey {
        (**self).pubkey()
    }

    fn sign_message(&self, message: &[u8]) -> Result<Signature, TokenError> {
        (**self).sign_message(message)
    }
}
