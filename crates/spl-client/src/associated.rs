//! Associated token accounts and the idempotent provisioning planner.
//!
//! [`maybe_create_instructions`] is safe to call before every mint-to or
//! transfer: it returns nothing when the account is already there. Two
//! callers can still race between the check and the submission; the ledger
//! rejects the second creation with
//! [`Rejection::AccountAlreadyExists`](crate::Rejection::AccountAlreadyExists),
//! which [`create`] treats as success.
//!
//! Creation bundled with a mint-to or transfer goes through
//! [`maybe_create_idempotent_instructions`] instead, so losing that race
//! cannot reject the operation riding in the same transaction.

use spl_core::{instruction, Instruction, Pubkey, Signer};
use tracing::debug;

use crate::account;
use crate::builder::build_transaction;
use crate::error::Result;
use crate::ledger::Ledger;
use crate::pipeline::sign_and_submit;

/// The associated token account of `owner` for `mint`. No ledger access.
pub fn address(mint: &Pubkey, owner: &Pubkey) -> Result<Pubkey> {
    Ok(spl_core::derive_associated_token_address(mint, owner)?)
}

pub async fn exists<L: Ledger>(ledger: &L, mint: &Pubkey, owner: &Pubkey) -> Result<bool> {
    account::exists(ledger, &address(mint, owner)?).await
}

/// Instructions creating the associated account, funded by `payer`.
pub fn create_instructions(
    mint: &Pubkey,
    owner: &Pubkey,
    payer: &Pubkey,
) -> Result<Vec<Instruction>> {
    let instructions =
        instruction::create_associated_token_account_instructions(payer, owner, mint)?;
    Ok(instructions)
}

/// Creation instructions if the associated account is missing, otherwise
/// an empty list.
pub async fn maybe_create_instructions<L: Ledger>(
    ledger: &L,
    mint: &Pubkey,
    owner: &Pubkey,
    payer: &Pubkey,
) -> Result<Vec<Instruction>> {
    if !is_missing(ledger, mint, owner).await? {
        return Ok(Vec::new());
    }
    debug!(%owner, %payer, "associated account missing, planning creation");
    create_instructions(mint, owner, payer)
}

/// [`maybe_create_instructions`] emitting `CreateIdempotent`, which the
/// program accepts without effect if the account appeared in the meantime.
pub async fn maybe_create_idempotent_instructions<L: Ledger>(
    ledger: &L,
    mint: &Pubkey,
    owner: &Pubkey,
    payer: &Pubkey,
) -> Result<Vec<Instruction>> {
    if !is_missing(ledger, mint, owner).await? {
        return Ok(Vec::new());
    }
    debug!(%owner, %payer, "associated account missing, planning idempotent creation");
    let create = instruction::create_associated_token_account_idempotent(payer, owner, mint)?;
    Ok(vec![create])
}

async fn is_missing<L: Ledger>(ledger: &L, mint: &Pubkey, owner: &Pubkey) -> Result<bool> {
    let address = address(mint, owner)?;
    let present = account::exists(ledger, &address).await?;
    if present {
        debug!(%address, %owner, "associated account present, nothing to create");
    }
    Ok(!present)
}

/// Make sure the associated account exists and return its address.
///
/// `signer` pays for the account.
pub async fn create<L, S>(ledger: &L, mint: &Pubkey, owner: &Pubkey, signer: &S) -> Result<Pubkey>
where
    L: Ledger,
    S: Signer + ?Sized,
{
    let address = address(mint, owner)?;
    let payer = signer.pubkey();

    let instructions = maybe_create_instructions(ledger, mint, owner, &payer).await?;
    if instructions.is_empty() {
        return Ok(address);
    }

    let tx = build_transaction(ledger, &instructions, &payer).await?;
    match sign_and_submit(ledger, tx, signer, &[]).await {
        Ok(_) => Ok(address),
        Err(e) if e.is_account_already_exists() => {
            debug!(%address, "associated account created concurrently");
            Ok(address)
        }
        Err(e) => Err(e),
    }
}
