//! Mint creation, issuance, and supply/balance queries.
//!
//! Each operation comes in tiers: `*_instructions` plans, `*_transaction`
//! builds an unsigned transaction, and the bare name signs and submits.

use spl_core::{
    amount, instruction, Instruction, Keypair, MintState, Pubkey, Signature, Signer,
    Transaction, MINT_LEN,
};
use tracing::{debug, info};

use crate::account;
use crate::associated;
use crate::builder::build_transaction;
use crate::error::Result;
use crate::ledger::Ledger;
use crate::pipeline::sign_and_submit;

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// `[create_account, initialize_mint]` for a mint at `mint`, rent fetched
/// from the ledger.
pub async fn create_instructions<L: Ledger>(
    ledger: &L,
    mint: &Pubkey,
    mint_authority: &Pubkey,
    payer: &Pubkey,
    decimals: u8,
) -> Result<Vec<Instruction>> {
    let rent = ledger.minimum_balance_for_rent_exemption(MINT_LEN).await?;
    Ok(instruction::create_mint_instructions(
        payer,
        mint,
        mint_authority,
        decimals,
        rent,
    ))
}

/// Unsigned mint creation. Needs signatures from `payer` and `mint`.
pub async fn create_transaction<L: Ledger>(
    ledger: &L,
    mint: &Pubkey,
    mint_authority: &Pubkey,
    payer: &Pubkey,
    decimals: u8,
) -> Result<Transaction> {
    let instructions = create_instructions(ledger, mint, mint_authority, payer, decimals).await?;
    build_transaction(ledger, &instructions, payer).await
}

/// Create a mint at a freshly generated address and return that address.
pub async fn create<L, S>(
    ledger: &L,
    decimals: u8,
    mint_authority: &Pubkey,
    payer: &S,
) -> Result<Pubkey>
where
    L: Ledger,
    S: Signer + ?Sized,
{
    let mint = Keypair::generate();
    create_with_keypair(ledger, &mint, decimals, mint_authority, payer).await
}

/// Create a mint at `mint`'s address. `mint` co-signs.
pub async fn create_with_keypair<L, S>(
    ledger: &L,
    mint: &Keypair,
    decimals: u8,
    mint_authority: &Pubkey,
    payer: &S,
) -> Result<Pubkey>
where
    L: Ledger,
    S: Signer + ?Sized,
{
    let address = mint.pubkey();
    let tx = create_transaction(ledger, &address, mint_authority, &payer.pubkey(), decimals).await?;
    sign_and_submit(ledger, tx, payer, &[mint]).await?;

    info!(mint = %address, decimals, authority = %mint_authority, "created mint");
    Ok(address)
}

// ---------------------------------------------------------------------------
// Issuance
// ---------------------------------------------------------------------------

/// Plan minting `amount` (decimal) to `destination_owner`'s associated
/// account, creating that account first when it is missing. `authority`
/// also pays for the account.
pub async fn mint_to_instructions<L: Ledger>(
    ledger: &L,
    mint: &Pubkey,
    destination_owner: &Pubkey,
    authority: &Pubkey,
    amount: f64,
) -> Result<Vec<Instruction>> {
    let decimals = decimals(ledger, mint).await?;
    let raw = amount::to_raw(amount, decimals)?;
    mint_to_raw_instructions(ledger, mint, destination_owner, authority, raw).await
}

/// [`mint_to_instructions`] with the amount already in raw units.
pub async fn mint_to_raw_instructions<L: Ledger>(
    ledger: &L,
    mint: &Pubkey,
    destination_owner: &Pubkey,
    authority: &Pubkey,
    raw_amount: u64,
) -> Result<Vec<Instruction>> {
    let destination = associated::address(mint, destination_owner)?;
    let mut instructions = associated::maybe_create_idempotent_instructions(
        ledger,
        mint,
        destination_owner,
        authority,
    )
    .await?;
    instructions.extend(instruction::mint_to_instructions(
        mint,
        &destination,
        authority,
        raw_amount,
    ));

    debug!(
        mint = %mint,
        destination = %destination,
        raw_amount,
        instructions = instructions.len(),
        "planned mint-to"
    );
    Ok(instructions)
}

pub async fn mint_to_transaction<L: Ledger>(
    ledger: &L,
    mint: &Pubkey,
    destination_owner: &Pubkey,
    authority: &Pubkey,
    amount: f64,
) -> Result<Transaction> {
    let instructions =
        mint_to_instructions(ledger, mint, destination_owner, authority, amount).await?;
    build_transaction(ledger, &instructions, authority).await
}

/// Mint `amount` (decimal) to `destination_owner`, signed by the mint
/// authority.
pub async fn mint_to<L, S>(
    ledger: &L,
    mint: &Pubkey,
    destination_owner: &Pubkey,
    authority: &S,
    amount: f64,
) -> Result<Signature>
where
    L: Ledger,
    S: Signer + ?Sized,
{
    let tx = mint_to_transaction(ledger, mint, destination_owner, &authority.pubkey(), amount)
        .await?;
    sign_and_submit(ledger, tx, authority, &[]).await
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

pub async fn info<L: Ledger>(ledger: &L, mint: &Pubkey) -> Result<MintState> {
    account::mint_state(ledger, mint).await
}

/// A mint's decimals. One ledger round trip per call.
pub async fn decimals<L: Ledger>(ledger: &L, mint: &Pubkey) -> Result<u8> {
    Ok(info(ledger, mint).await?.decimals)
}

pub async fn supply_raw<L: Ledger>(ledger: &L, mint: &Pubkey) -> Result<u64> {
    Ok(info(ledger, mint).await?.supply)
}

pub async fn supply<L: Ledger>(ledger: &L, mint: &Pubkey) -> Result<f64> {
    let state = info(ledger, mint).await?;
    Ok(amount::to_decimal(state.supply, state.decimals))
}

/// Raw balance of `owner`'s associated account. A missing account holds 0.
pub async fn balance_raw<L: Ledger>(ledger: &L, mint: &Pubkey, owner: &Pubkey) -> Result<u64> {
    let address = associated::address(mint, owner)?;
    Ok(account::token_account_state(ledger, &address)
        .await?
        .map_or(0, |state| state.amount))
}

/// Decimal balance of `owner`'s associated account.
pub async fn balance<L: Ledger>(ledger: &L, mint: &Pubkey, owner: &Pubkey) -> Result<f64> {
    let raw = balance_raw(ledger, mint, owner).await?;
    if raw == 0 {
        return Ok(0.0);
    }
    Ok(amount::to_decimal(raw, decimals(ledger, mint).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ClientError, Rejection};
    use crate::memory::MemoryLedger;
    use spl_core::{TokenError, ASSOCIATED_TOKEN_PROGRAM_ID, TOKEN_PROGRAM_ID};

    fn funded(seed: u8, ledger: &MemoryLedger) -> Keypair {
        let keypair = Keypair::from_seed(&[seed; 32]);
        ledger.airdrop(&keypair.pubkey(), 1_000_000_000);
        keypair
    }

    #[tokio::test]
    async fn create_records_decimals_and_authority() {
        let ledger = MemoryLedger::new();
        let payer = funded(1, &ledger);

        let mint = create(&ledger, 6, &payer.pubkey(), &payer).await.unwrap();
        let state = info(&ledger, &mint).await.unwrap();

        assert_eq!(state.decimals, 6);
        assert_eq!(state.supply, 0);
        assert_eq!(state.mint_authority, Some(payer.pubkey()));
        assert_eq!(state.freeze_authority, None);
    }

    #[tokio::test]
    async fn create_with_keypair_uses_given_address() {
        let ledger = MemoryLedger::new();
        let payer = funded(1, &ledger);
        let mint = Keypair::from_seed(&[2; 32]);

        let address = create_with_keypair(&ledger, &mint, 2, &payer.pubkey(), &payer)
            .await
            .unwrap();
        assert_eq!(address, mint.pubkey());
        assert_eq!(decimals(&ledger, &address).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn creating_same_mint_twice_fails() {
        let ledger = MemoryLedger::new();
        let payer = funded(1, &ledger);
        let mint = Keypair::from_seed(&[2; 32]);

        create_with_keypair(&ledger, &mint, 2, &payer.pubkey(), &payer)
            .await
            .unwrap();
        ledger.expire_blockhash();
        let err = create_with_keypair(&ledger, &mint, 2, &payer.pubkey(), &payer)
            .await
            .unwrap_err();
        assert!(err.is_account_already_exists());
    }

    #[tokio::test]
    async fn create_instructions_use_ledger_rent() {
        let ledger = MemoryLedger::new();
        let (mint, payer) = (Pubkey::new_from_array([1; 32]), Pubkey::new_from_array([2; 32]));
        let ixs = create_instructions(&ledger, &mint, &payer, &payer, 9)
            .await
            .unwrap();

        let expected = instruction::create_mint_instructions(
            &payer,
            &mint,
            &payer,
            9,
            crate::memory::rent_exempt_minimum(MINT_LEN),
        );
        assert_eq!(ixs, expected);
    }

    #[tokio::test]
    async fn mint_to_fresh_owner_creates_account_first() {
        let ledger = MemoryLedger::new();
        let authority = funded(1, &ledger);
        let mint = create(&ledger, 6, &authority.pubkey(), &authority)
            .await
            .unwrap();
        let owner = Pubkey::new_from_array([9; 32]);

        let ixs = mint_to_instructions(&ledger, &mint, &owner, &authority.pubkey(), 15.0)
            .await
            .unwrap();
        assert_eq!(ixs.len(), 2);
        assert_eq!(ixs[0].program_id, ASSOCIATED_TOKEN_PROGRAM_ID);
        assert_eq!(ixs[1].program_id, TOKEN_PROGRAM_ID);
        assert_eq!(ixs[1].data[0], 7);
        assert_eq!(&ixs[1].data[1..], &15_000_000u64.to_le_bytes());
    }

    #[tokio::test]
    async fn mint_to_existing_account_is_single_instruction() {
        let ledger = MemoryLedger::new();
        let authority = funded(1, &ledger);
        let mint = create(&ledger, 0, &authority.pubkey(), &authority)
            .await
            .unwrap();
        let owner = Pubkey::new_from_array([9; 32]);
        associated::create(&ledger, &mint, &owner, &authority)
            .await
            .unwrap();

        let ixs = mint_to_instructions(&ledger, &mint, &owner, &authority.pubkey(), 3.0)
            .await
            .unwrap();
        assert_eq!(ixs.len(), 1);
    }

    #[tokio::test]
    async fn mint_to_lands_when_destination_appears_after_planning() {
        let ledger = MemoryLedger::new();
        let authority = funded(1, &ledger);
        let mint = create(&ledger, 0, &authority.pubkey(), &authority)
            .await
            .unwrap();
        let owner = Pubkey::new_from_array([9; 32]);

        let tx = mint_to_transaction(&ledger, &mint, &owner, &authority.pubkey(), 4.0)
            .await
            .unwrap();
        associated::create(&ledger, &mint, &owner, &authority)
            .await
            .unwrap();

        sign_and_submit(&ledger, tx, &authority, &[]).await.unwrap();
        assert_eq!(balance_raw(&ledger, &mint, &owner).await.unwrap(), 4);
        assert_eq!(supply_raw(&ledger, &mint).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn mint_to_updates_balance_and_supply() {
        let ledger = MemoryLedger::new();
        let authority = funded(1, &ledger);
        let mint = create(&ledger, 2, &authority.pubkey(), &authority)
            .await
            .unwrap();
        let owner = Pubkey::new_from_array([9; 32]);

        mint_to(&ledger, &mint, &owner, &authority, 1.25)
            .await
            .unwrap();
        mint_to(&ledger, &mint, &owner, &authority, 0.75)
            .await
            .unwrap();

        assert_eq!(balance_raw(&ledger, &mint, &owner).await.unwrap(), 200);
        assert_eq!(balance(&ledger, &mint, &owner).await.unwrap(), 2.0);
        assert_eq!(supply_raw(&ledger, &mint).await.unwrap(), 200);
        assert_eq!(supply(&ledger, &mint).await.unwrap(), 2.0);
    }

    #[tokio::test]
    async fn negative_amount_fails_before_submission() {
        let ledger = MemoryLedger::new();
        let authority = funded(1, &ledger);
        let mint = create(&ledger, 2, &authority.pubkey(), &authority)
            .await
            .unwrap();

        let err = mint_to(&ledger, &mint, &authority.pubkey(), &authority, -1.0)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Token(TokenError::InvalidAmount(_))
        ));
    }

    #[tokio::test]
    async fn only_the_authority_can_mint() {
        let ledger = MemoryLedger::new();
        let authority = funded(1, &ledger);
        let other = funded(2, &ledger);
        let mint = create(&ledger, 2, &authority.pubkey(), &authority)
            .await
            .unwrap();

        let err = mint_to(&ledger, &mint, &other.pubkey(), &other, 1.0)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::SubmissionFailed(Rejection::InvalidInstruction(_))
        ));
    }

    #[tokio::test]
    async fn missing_account_has_zero_balance() {
        let ledger = MemoryLedger::new();
        let authority = funded(1, &ledger);
        let mint = create(&ledger, 6, &authority.pubkey(), &authority)
            .await
            .unwrap();

        let owner = Pubkey::new_from_array([4; 32]);
        assert_eq!(balance_raw(&ledger, &mint, &owner).await.unwrap(), 0);
        assert_eq!(balance(&ledger, &mint, &owner).await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn unknown_mint_is_not_found() {
        let ledger = MemoryLedger::new();
        let err = decimals(&ledger, &Pubkey::new_from_array([3; 32]))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::AccountNotFound(_)));
    }
}
