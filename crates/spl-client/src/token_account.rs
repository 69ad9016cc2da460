//! Token accounts at explicit (non-associated) addresses.
//!
//! The account's own keypair co-signs its creation, so these can hold any
//! number of balances of one mint for the same owner.

use spl_core::{instruction, Instruction, Keypair, Pubkey, Signer, TOKEN_ACCOUNT_LEN};
use tracing::info;

use crate::builder::build_transaction;
use crate::error::Result;
use crate::ledger::Ledger;
use crate::pipeline::sign_and_submit;

pub async fn create_instructions<L: Ledger>(
    ledger: &L,
    account: &Pubkey,
    mint: &Pubkey,
    owner: &Pubkey,
    payer: &Pubkey,
) -> Result<Vec<Instruction>> {
    let rent = ledger
        .minimum_balance_for_rent_exemption(TOKEN_ACCOUNT_LEN)
        .await?;
    Ok(instruction::create_token_account_instructions(
        payer,
        account,
        mint,
        owner,
        rent,
    ))
}

/// Create a token account at a fresh address and return it.
pub async fn create<L, S>(ledger: &L, mint: &Pubkey, owner: &Pubkey, payer: &S) -> Result<Pubkey>
where
    L: Ledger,
    S: Signer + ?Sized,
{
    create_with_keypair(ledger, &Keypair::generate(), mint, owner, payer).await
}

pub async fn create_with_keypair<L, S>(
    ledger: &L,
    account: &Keypair,
    mint: &Pubkey,
    owner: &Pubkey,
    payer: &S,
) -> Result<Pubkey>
where
    L: Ledger,
    S: Signer + ?Sized,
{
    let address = account.pubkey();
    let payer_key = payer.pubkey();
    let instructions = create_instructions(ledger, &address, mint, owner, &payer_key).await?;
    let tx = build_transaction(ledger, &instructions, &payer_key).await?;
    sign_and_submit(ledger, tx, payer, &[account]).await?;

    info!(account = %address, mint = %mint, owner = %owner, "created token account");
    Ok(address)
}
