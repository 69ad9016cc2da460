//! A handle on one mint.

use std::sync::OnceLock;

use spl_core::{amount, MintState, Pubkey, Signature, Signer};

use crate::associated;
use crate::builder::build_transaction;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::ledger::Ledger;
use crate::mint;
use crate::pipeline::sign_and_submit_with;
use crate::token;

/// Operations on a single mint through a ledger handle.
///
/// With [`ClientConfig::cache_mint_decimals`] set, decimals are fetched once
/// and reused for every later conversion.
#[derive(Debug)]
pub struct Mint<L> {
    ledger: L,
    address: Pubkey,
    config: ClientConfig,
    decimals: OnceLock<u8>,
}

impl<L: Ledger> Mint<L> {
    pub fn new(ledger: L, address: Pubkey) -> Self {
        Self {
            ledger,
            address,
            config: ClientConfig::default(),
            decimals: OnceLock::new(),
        }
    }

    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Create a new mint and return a handle on it.
    pub async fn create<S: Signer + ?Sized>(
        ledger: L,
        decimals: u8,
        mint_authority: &Pubkey,
        payer: &S,
    ) -> Result<Self> {
        let address = mint::create(&ledger, decimals, mint_authority, payer).await?;
        Ok(Self::new(ledger, address).with_known_decimals(decimals))
    }

    pub(crate) fn with_known_decimals(self, decimals: u8) -> Self {
        if self.config.cache_mint_decimals {
            let _ = self.decimals.set(decimals);
        }
        self
    }

    pub fn address(&self) -> &Pubkey {
        &self.address
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub async fn decimals(&self) -> Result<u8> {
        if let Some(decimals) = self.decimals.get() {
            return Ok(*decimals);
        }
        let decimals = mint::decimals(&self.ledger, &self.address).await?;
        Ok(self.remember(decimals))
    }

    fn remember(&self, decimals: u8) -> u8 {
        if self.config.cache_mint_decimals {
            let _ = self.decimals.set(decimals);
        }
        decimals
    }

    pub async fn info(&self) -> Result<MintState> {
        let state = mint::info(&self.ledger, &self.address).await?;
        self.remember(state.decimals);
        Ok(state)
    }

    pub async fn supply(&self) -> Result<f64> {
        let state = self.info().await?;
        Ok(amount::to_decimal(state.supply, state.decimals))
    }

    pub fn token_account_address(&self, owner: &Pubkey) -> Result<Pubkey> {
        associated::address(&self.address, owner)
    }

    pub async fn balance(&self, owner: &Pubkey) -> Result<f64> {
        let raw = mint::balance_raw(&self.ledger, &self.address, owner).await?;
        if raw == 0 {
            return Ok(0.0);
        }
        Ok(amount::to_decimal(raw, self.decimals().await?))
    }

    /// Mint `amount` (decimal) to `destination_owner`, creating their
    /// associated account if needed.
    pub async fn mint_to<S: Signer + ?Sized>(
        &self,
        destination_owner: &Pubkey,
        amount: f64,
        authority: &S,
    ) -> Result<Signature> {
        let raw = amount::to_raw(amount, self.decimals().await?)?;
        let authority_key = authority.pubkey();
        let instructions = mint::mint_to_raw_instructions(
            &self.ledger,
            &self.address,
            destination_owner,
            &authority_key,
            raw,
        )
        .await?;
        let tx = build_transaction(&self.ledger, &instructions, &authority_key).await?;
        sign_and_submit_with(&self.ledger, tx, authority, &[], self.config.commitment).await
    }

    /// Transfer `amount` (decimal) from `signer` to `to_owner`.
    pub async fn transfer<S: Signer + ?Sized>(
        &self,
        to_owner: &Pubkey,
        amount: f64,
        signer: &S,
    ) -> Result<Signature> {
        let decimals = self.decimals().await?;
        let raw = amount::to_raw(amount, decimals)?;
        let from = signer.pubkey();
        let instructions = token::transfer_raw_instructions(
            &self.ledger,
            &self.address,
            &from,
            to_owner,
            raw,
            decimals,
        )
        .await?;
        let tx = build_transaction(&self.ledger, &instructions, &from).await?;
        sign_and_submit_with(&self.ledger, tx, signer, &[], self.config.commitment).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryLedger;
    use spl_core::Keypair;

    async fn setup() -> (MemoryLedger, Keypair, Pubkey) {
        let ledger = MemoryLedger::new();
        let authority = Keypair::from_seed(&[1; 32]);
        ledger.airdrop(&authority.pubkey(), 1_000_000_000);
        let address = mint::create(&ledger, 4, &authority.pubkey(), &authority)
            .await
            .unwrap();
        (ledger, authority, address)
    }

    #[tokio::test]
    async fn decimals_fetched_once_when_cached() {
        let (ledger, _authority, address) = setup().await;
        let handle = Mint::new(&ledger, address);

        assert_eq!(handle.decimals().await.unwrap(), 4);
        let calls = ledger.call_count();
        assert_eq!(handle.decimals().await.unwrap(), 4);
        assert_eq!(ledger.call_count(), calls);
    }

    #[tokio::test]
    async fn decimals_refetched_when_caching_disabled() {
        let (ledger, _authority, address) = setup().await;
        let config = ClientConfig {
            cache_mint_decimals: false,
            ..ClientConfig::default()
        };
        let handle = Mint::new(&ledger, address).with_config(config);

        handle.decimals().await.unwrap();
        let calls = ledger.call_count();
        handle.decimals().await.unwrap();
        assert_eq!(ledger.call_count(), calls + 1);
    }

    #[tokio::test]
    async fn created_handle_knows_decimals() {
        let ledger = MemoryLedger::new();
        let authority = Keypair::from_seed(&[1; 32]);
        ledger.airdrop(&authority.pubkey(), 1_000_000_000);

        let handle = Mint::create(&ledger, 9, &authority.pubkey(), &authority)
            .await
            .unwrap();
        let calls = ledger.call_count();
        assert_eq!(handle.decimals().await.unwrap(), 9);
        assert_eq!(ledger.call_count(), calls);
    }

    #[tokio::test]
    async fn mint_transfer_and_balances() {
        let (ledger, authority, address) = setup().await;
        let handle = Mint::new(&ledger, address);
        let friend = Pubkey::new_from_array([7; 32]);

        handle
            .mint_to(&authority.pubkey(), 3.5, &authority)
            .await
            .unwrap();
        handle.transfer(&friend, 1.25, &authority).await.unwrap();

        assert_eq!(handle.balance(&authority.pubkey()).await.unwrap(), 2.25);
        assert_eq!(handle.balance(&friend).await.unwrap(), 1.25);
        assert_eq!(handle.supply().await.unwrap(), 3.5);
        assert_eq!(
            handle.token_account_address(&friend).unwrap(),
            associated::address(&address, &friend).unwrap()
        );
    }
}
