//! A ledger handle composed with a signer.

use spl_core::{Instruction, Keypair, Pubkey, Signature, Signer, TokenError};
use tracing::debug;

use crate::associated;
use crate::builder::build_transaction;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::ledger::Ledger;
use crate::mint;
use crate::mint_handle::Mint;
use crate::pipeline::sign_and_submit_with;
use crate::sol;
use crate::token;

/// Everything an owner does with their own key: balances, transfers,
/// account provisioning, and mint creation. The wallet pays every fee.
pub struct Wallet<L, S = Keypair> {
    ledger: L,
    signer: S,
    config: ClientConfig,
}

impl<L: Ledger> Wallet<L, Keypair> {
    pub fn from_keypair(ledger: L, keypair: Keypair) -> Self {
        Self::new(ledger, keypair)
    }

    /// Accepts a 32-byte seed or a 64-byte secret key.
    pub fn from_secret_key(ledger: L, secret_key: &[u8]) -> Result<Self> {
        Ok(Self::new(ledger, Keypair::from_secret_key(secret_key)?))
    }
}

impl<L: Ledger, S: Signer> Wallet<L, S> {
    pub fn new(ledger: L, signer: S) -> Self {
        Self {
            ledger,
            signer,
            config: ClientConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn signer(&self) -> &S {
        &self.signer
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn pubkey(&self) -> Pubkey {
        self.signer.pubkey()
    }

    async fn submit(
        &self,
        instructions: &[Instruction],
        extra_signers: &[&dyn Signer],
    ) -> Result<Signature> {
        let tx = build_transaction(&self.ledger, instructions, &self.pubkey()).await?;
        sign_and_submit_with(
            &self.ledger,
            tx,
            &self.signer,
            extra_signers,
            self.config.commitment,
        )
        .await
    }

    // -- Tokens ------------------------------------------------------------

    /// This wallet's balance of `mint`.
    pub async fn balance(&self, mint: &Pubkey) -> Result<f64> {
        mint::balance(&self.ledger, mint, &self.pubkey()).await
    }

    pub async fn transfer_token(
        &self,
        mint: &Pubkey,
        to_owner: &Pubkey,
        amount: f64,
    ) -> Result<Signature> {
        let instructions =
            token::transfer_instructions(&self.ledger, mint, &self.pubkey(), to_owner, amount)
                .await?;
        self.submit(&instructions, &[]).await
    }

    pub fn associated_token_account(&self, mint: &Pubkey) -> Result<Pubkey> {
        associated::address(mint, &self.pubkey())
    }

    pub async fn exists_associated_token_account(&self, mint: &Pubkey) -> Result<bool> {
        associated::exists(&self.ledger, mint, &self.pubkey()).await
    }

    /// Ensure `owner`'s associated account for `mint` exists, paid for by
    /// this wallet. Safe to call repeatedly.
    pub async fn create_associated_token_account(
        &self,
        mint: &Pubkey,
        owner: &Pubkey,
    ) -> Result<Pubkey> {
        let address = associated::address(mint, owner)?;
        let instructions =
            associated::maybe_create_instructions(&self.ledger, mint, owner, &self.pubkey()).await?;
        if instructions.is_empty() {
            return Ok(address);
        }

        match self.submit(&instructions, &[]).await {
            Ok(_) => Ok(address),
            Err(e) if e.is_account_already_exists() => {
                debug!(%address, "associated account created concurrently");
                Ok(address)
            }
            Err(e) => Err(e),
        }
    }

    /// Create a mint with this wallet as authority and payer.
    pub async fn create_mint(&self, decimals: u8) -> Result<Mint<&L>> {
        let mint_keypair = Keypair::generate();
        let address = mint_keypair.pubkey();
        let me = self.pubkey();

        let instructions =
            mint::create_instructions(&self.ledger, &address, &me, &me, decimals).await?;
        self.submit(&instructions, &[&mint_keypair]).await?;

        Ok(self.mint(address).with_known_decimals(decimals))
    }

    /// A handle on an existing mint sharing this wallet's ledger and config.
    pub fn mint(&self, address: Pubkey) -> Mint<&L> {
        Mint::new(&self.ledger, address).with_config(self.config.clone())
    }

    // -- SOL ---------------------------------------------------------------

    pub async fn sol_balance(&self) -> Result<f64> {
        sol::balance(&self.ledger, &self.pubkey()).await
    }

    pub async fn transfer_sol(&self, to: &Pubkey, sol: f64) -> Result<Signature> {
        let instructions = sol::transfer_instructions(&self.pubkey(), to, sol)?;
        self.submit(&instructions, &[]).await
    }
}

impl<L, S: Signer> Signer for Wallet<L, S> {
    fn pubkey(&self) -> Pubkey {
        self.signer.pubkey()
    }

    fn sign_message(&self, message: &[u8]) -> std::result::Result<Signature, TokenError> {
        self.signer.sign_message(message)
    }
}

impl<L, S: Signer> std::fmt::Debug for Wallet<L, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("pubkey", &self.signer.pubkey())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
