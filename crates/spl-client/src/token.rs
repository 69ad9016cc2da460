//! Token transfers between owners' associated accounts.

use spl_core::{amount, instruction, Instruction, Pubkey, Signature, Signer, Transaction};
use tracing::debug;

use crate::associated;
use crate::builder::build_transaction;
use crate::error::Result;
use crate::ledger::Ledger;
use crate::mint;
use crate::pipeline::sign_and_submit;

/// Plan a transfer of `amount` (decimal) from `from_owner` to `to_owner`.
///
/// If the recipient has no associated account yet, the sender pays to
/// create it ahead of the transfer.
pub async fn transfer_instructions<L: Ledger>(
    ledger: &L,
    mint: &Pubkey,
    from_owner: &Pubkey,
    to_owner: &Pubkey,
    amount: f64,
) -> Result<Vec<Instruction>> {
    let decimals = mint::decimals(ledger, mint).await?;
    let raw = amount::to_raw(amount, decimals)?;
    transfer_raw_instructions(ledger, mint, from_owner, to_owner, raw, decimals).await
}

/// [`transfer_instructions`] with the amount in raw units and the mint's
/// decimals already known.
pub async fn transfer_raw_instructions<L: Ledger>(
    ledger: &L,
    mint: &Pubkey,
    from_owner: &Pubkey,
    to_owner: &Pubkey,
    raw_amount: u64,
    decimals: u8,
) -> Result<Vec<Instruction>> {
    let source = associated::address(mint, from_owner)?;
    let destination = associated::address(mint, to_owner)?;

    let mut instructions =
        associated::maybe_create_idempotent_instructions(ledger, mint, to_owner, from_owner).await?;
    instructions.extend(instruction::transfer_checked_instructions(
        &source,
        mint,
        &destination,
        from_owner,
        raw_amount,
        decimals,
    ));

    debug!(
        mint = %mint,
        source = %source,
        destination = %destination,
        raw_amount,
        instructions = instructions.len(),
        "planned transfer"
    );
    Ok(instructions)
}

/// Unsigned transfer, paid for by `from_owner`.
pub async fn transfer_transaction<L: Ledger>(
    ledger: &L,
    mint: &Pubkey,
    from_owner: &Pubkey,
    to_owner: &Pubkey,
    amount: f64,
) -> Result<Transaction> {
    let instructions = transfer_instructions(ledger, mint, from_owner, to_owner, amount).await?;
    build_transaction(ledger, &instructions, from_owner).await
}

/// Transfer `amount` (decimal) of `mint` from `signer` to `to_owner`.
pub async fn transfer<L, S>(
    ledger: &L,
    mint: &Pubkey,
    to_owner: &Pubkey,
    amount: f64,
    signer: &S,
) -> Result<Signature>
where
    L: Ledger,
    S: Signer + ?Sized,
{
    let tx = transfer_transaction(ledger, mint, &signer.pubkey(), to_owner, amount).await?;
    sign_and_submit(ledger, tx, signer, &[]).await
}
