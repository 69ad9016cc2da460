//! Account existence and state lookups.

use spl_core::{MintState, Pubkey, TokenAccountState, TokenError, TOKEN_PROGRAM_ID};
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::ledger::{AccountState, Ledger};

/// Whether any account lives at `address`.
///
/// Ledger failures propagate as-is; retrying is the caller's call.
pub async fn exists<L: Ledger>(ledger: &L, address: &Pubkey) -> Result<bool> {
    let present = ledger.account_exists(address).await?;
    debug!(address = %address, present, "checked account existence");
    Ok(present)
}

/// Fetch and decode a mint. A missing mint is an error.
pub async fn mint_state<L: Ledger>(ledger: &L, mint: &Pubkey) -> Result<MintState> {
    let account = ledger
        .account_state(mint)
        .await?
        .ok_or_else(|| ClientError::AccountNotFound(format!("mint {mint}")))?;
    Ok(MintState::unpack(token_data(&account, mint)?)?)
}

/// Fetch and decode a token account; `None` if it does not exist.
pub async fn token_account_state<L: Ledger>(
    ledger: &L,
    address: &Pubkey,
) -> Result<Option<TokenAccountState>> {
    match ledger.account_state(address).await? {
        Some(account) => {
            let data = token_data(&account, address)?;
            Ok(Some(TokenAccountState::unpack(data)?))
        }
        None => Ok(None),
    }
}

fn token_data<'a>(account: &'a AccountState, address: &Pubkey) -> Result<&'a [u8]> {
    if account.owner != TOKEN_PROGRAM_ID {
        return Err(TokenError::InvalidAccountData(format!(
            "{address} is owned by {}, not the token program",
            account.owner
        ))
        .into());
    }
    Ok(&account.data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryLedger;

    #[tokio::test]
    async fn exists_reflects_ledger() {
        let ledger = MemoryLedger::new();
        let address = Pubkey::new_from_array([5; 32]);
        assert!(!exists(&ledger, &address).await.unwrap());

        ledger.airdrop(&address, 1);
        assert!(exists(&ledger, &address).await.unwrap());
    }

    #[tokio::test]
    async fn exists_propagates_unavailability() {
        let ledger = MemoryLedger::new();
        ledger.set_available(false);
        let err = exists(&ledger, &Pubkey::default()).await.unwrap_err();
        assert!(matches!(err, ClientError::LedgerUnavailable(_)));
        assert_eq!(ledger.call_count(), 1);
    }

    #[tokio::test]
    async fn missing_mint_is_not_found() {
        let ledger = MemoryLedger::new();
        let err = mint_state(&ledger, &Pubkey::new_from_array([1; 32]))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::AccountNotFound(_)));
    }

    #[tokio::test]
    async fn system_account_is_not_a_mint() {
        let ledger = MemoryLedger::new();
        let address = Pubkey::new_from_array([1; 32]);
        ledger.airdrop(&address, 10);

        let err = mint_state(&ledger, &address).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Token(TokenError::InvalidAccountData(_))
        ));
    }

    #[tokio::test]
    async fn missing_token_account_is_none() {
        let ledger = MemoryLedger::new();
        let state = token_account_state(&ledger, &Pubkey::new_from_array([1; 32]))
            .await
            .unwrap();
        assert!(state.is_none());
    }
}
