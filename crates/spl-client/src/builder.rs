use spl_core::{Instruction, Message, Pubkey, TokenError, Transaction};
use tracing::debug;

use crate::error::Result;
use crate::ledger::Ledger;

/// Stamp `instructions` with a fresh blockhash and `fee_payer`.
///
/// Instructions keep exactly the order given. Callers put provisioning
/// instructions ahead of the instructions that use the new accounts.
pub async fn build_transaction<L: Ledger>(
    ledger: &L,
    instructions: &[Instruction],
    fee_payer: &Pubkey,
) -> Result<Transaction> {
    if instructions.is_empty() {
        let err = TokenError::TransactionBuild("no instructions to send".into());
        return Err(err.into());
    }

    let blockhash = ledger.latest_blockhash().await?;
    let message = Message::compile(instructions, fee_payer, blockhash)?;

    debug!(
        fee_payer = %fee_payer,
        instructions = instructions.len(),
        signers = message.num_required_signatures,
        "built transaction"
    );
    Ok(Transaction::new_unsigned(message))
}
