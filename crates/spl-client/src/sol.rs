//! Native SOL transfers and balances.

use spl_core::{amount, instruction, Instruction, Pubkey, Signature, Signer};

use crate::builder::build_transaction;
use crate::error::Result;
use crate::ledger::Ledger;
use crate::pipeline::sign_and_submit;

pub fn transfer_instructions(from: &Pubkey, to: &Pubkey, sol: f64) -> Result<Vec<Instruction>> {
    let lamports = amount::sol_to_lamports(sol)?;
    Ok(vec![instruction::transfer(from, to, lamports)])
}

pub async fn transfer<L, S>(ledger: &L, to: &Pubkey, sol: f64, signer: &S) -> Result<Signature>
where
    L: Ledger,
    S: Signer + ?Sized,
{
    let from = signer.pubkey();
    let instructions = transfer_instructions(&from, to, sol)?;
    let tx = build_transaction(ledger, &instructions, &from).await?;
    sign_and_submit(ledger, tx, signer, &[]).await
}

/// Lamports held at `address`; 0 when no account exists.
pub async fn balance_lamports<L: Ledger>(ledger: &L, address: &Pubkey) -> Result<u64> {
    Ok(ledger
        .account_state(address)
        .await?
        .map_or(0, |account| account.lamports))
}

pub async fn balance<L: Ledger>(ledger: &L, address: &Pubkey) -> Result<f64> {
    let lamports = balance_lamports(ledger, address).await?;
    Ok(amount::lamports_to_sol(lamports))
}
