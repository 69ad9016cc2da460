//! The ledger collaborator.
//!
//! Everything in this crate that needs the network goes through [`Ledger`].
//! Implementations own transport, retry, and confirmation-wait policy; the
//! callers here never retry.

use spl_core::{Blockhash, Pubkey, Signature};

use crate::config::Commitment;
use crate::error::Result;

/// An account as stored on the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountState {
    pub lamports: u64,
    /// Program that owns the account's data.
    pub owner: Pubkey,
    pub data: Vec<u8>,
}

/// Queries and submission against a ledger.
///
/// Query failures are reported as
/// [`ClientError::LedgerUnavailable`](crate::ClientError::LedgerUnavailable);
/// rejected transactions as
/// [`ClientError::SubmissionFailed`](crate::ClientError::SubmissionFailed).
#[allow(async_fn_in_trait)]
pub trait Ledger {
    /// Lamports an account of `space` bytes needs to be rent exempt.
    async fn minimum_balance_for_rent_exemption(&self, space: usize) -> Result<u64>;

    /// A recent blockhash to stamp new transactions with.
    async fn latest_blockhash(&self) -> Result<Blockhash>;

    async fn account_exists(&self, address: &Pubkey) -> Result<bool>;

    /// `None` when no account lives at `address`.
    async fn account_state(&self, address: &Pubkey) -> Result<Option<AccountState>>;

    /// Submit a fully signed wire transaction and wait for `commitment`.
    async fn submit_transaction(&self, wire: &[u8], commitment: Commitment) -> Result<Signature>;
}

impl<L: Ledger> Ledger for &L {
    async fn minimum_balance_for_rent_exemption(&self, space: usize) -> Result<u64> {
        (**self).minimum_balance_for_rent_exemption(space).await
    }

    async fn latest_blockhash(&self) -> Result<Blockhash> {
        (**self).latest_blockhash().await
    }

    async fn account_exists(&self, address: &Pubkey) -> Result<bool> {
        (**self).account_exists(address).await
    }

    async fn account_state(&self, address: &Pubkey) -> Result<Option<AccountState>> {
        (**self).account_state(address).await
    }

    async fn submit_transaction(&self, wire: &[u8], commitment: Commitment) -> Result<Signature> {
        (**self).submit_transaction(wire, commitment).await
    }
}
