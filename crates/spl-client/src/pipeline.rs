//! Sign-and-submit pipeline.
//!
//! Extra signers (freshly generated account keys) sign first, then the
//! primary signer, then the wire bytes go to the ledger. Rejections are
//! returned with their reason intact and never retried.

use spl_core::{Signature, Signer, TokenError, Transaction};
use tracing::{info, warn};

use crate::config::Commitment;
use crate::error::Result;
use crate::ledger::Ledger;

/// Sign with `extra_signers` then `primary`, and submit at
/// [`Commitment::Confirmed`].
pub async fn sign_and_submit<L, S>(
    ledger: &L,
    tx: Transaction,
    primary: &S,
    extra_signers: &[&dyn Signer],
) -> Result<Signature>
where
    L: Ledger,
    S: Signer + ?Sized,
{
    sign_and_submit_with(ledger, tx, primary, extra_signers, Commitment::Confirmed).await
}

pub async fn sign_and_submit_with<L, S>(
    ledger: &L,
    mut tx: Transaction,
    primary: &S,
    extra_signers: &[&dyn Signer],
    commitment: Commitment,
) -> Result<Signature>
where
    L: Ledger,
    S: Signer + ?Sized,
{
    if !extra_signers.is_empty() {
        tx.partial_sign(extra_signers)?;
    }
    let tx = primary.sign_transaction(tx)?;
    send_and_confirm_with(ledger, &tx, commitment).await
}

/// Submit an already signed transaction at [`Commitment::Confirmed`].
pub async fn send_and_confirm<L: Ledger>(ledger: &L, tx: &Transaction) -> Result<Signature> {
    send_and_confirm_with(ledger, tx, Commitment::Confirmed).await
}

pub async fn send_and_confirm_with<L: Ledger>(
    ledger: &L,
    tx: &Transaction,
    commitment: Commitment,
) -> Result<Signature> {
    let missing = tx.missing_signers();
    if !missing.is_empty() {
        let names: Vec<String> = missing.iter().map(ToString::to_string).collect();
        return Err(TokenError::Signing(format!(
            "missing signatures from {}",
            names.join(", ")
        ))
        .into());
    }

    let wire = tx.serialize()?;
    match ledger.submit_transaction(&wire, commitment).await {
        Ok(signature) => {
            info!(signature = %signature, %commitment, bytes = wire.len(), "transaction confirmed");
            Ok(signature)
        }
        Err(e) => {
            warn!(error = %e, "transaction submission failed");
            Err(e)
        }
    }
}
