//! An in-process [`Ledger`].
//!
//! `MemoryLedger` decodes submitted wire transactions, checks every
//! signature against the message, and executes the subset of the System,
//! Token, and Associated Token Account programs this crate emits. Each
//! transaction applies atomically: any failing instruction leaves the
//! ledger untouched. Every transaction is final as soon as it is accepted,
//! so the requested commitment is only logged.

use std::collections::{HashMap, HashSet};

use parking_lot::{Mutex, MutexGuard};
use spl_core::instruction::{
    AccountMeta, Instruction, SystemInstruction, TokenInstruction, ASSOCIATED_CREATE,
    ASSOCIATED_CREATE_IDEMPOTENT,
};
use spl_core::{
    derive_associated_token_address, Blockhash, MintState, Pubkey, Signature,
    TokenAccountState, Transaction, ASSOCIATED_TOKEN_PROGRAM_ID, SYSTEM_PROGRAM_ID,
    TOKEN_ACCOUNT_LEN, TOKEN_PROGRAM_ID,
};
use tracing::debug;

use crate::config::Commitment;
use crate::error::{ClientError, Rejection, Result};
use crate::ledger::{AccountState, Ledger};

/// Fee charged to the fee payer for each signature.
pub const LAMPORTS_PER_SIGNATURE: u64 = 5_000;

/// Outcome of running instructions against the account map.
type Execution<T = ()> = std::result::Result<T, Rejection>;

const ACCOUNT_STORAGE_OVERHEAD: u64 = 128;
const LAMPORTS_PER_BYTE_YEAR: u64 = 3_480;
const EXEMPTION_THRESHOLD_YEARS: u64 = 2;

/// Rent-exempt minimum for an account of `space` bytes.
pub fn rent_exempt_minimum(space: usize) -> u64 {
    (ACCOUNT_STORAGE_OVERHEAD + space as u64) * LAMPORTS_PER_BYTE_YEAR * EXEMPTION_THRESHOLD_YEARS
}

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<Pubkey, AccountState>,
    blockhash: Blockhash,
    processed: HashSet<Signature>,
    calls: usize,
    unavailable: bool,
}

#[derive(Debug)]
pub struct MemoryLedger {
    state: Mutex<State>,
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                blockhash: Blockhash::new_from_array(rand::random()),
                ..State::default()
            }),
        }
    }

    /// Credit `lamports` to `to`, creating a system account if needed.
    pub fn airdrop(&self, to: &Pubkey, lamports: u64) {
        let mut state = self.state.lock();
        let account = state.accounts.entry(*to).or_insert_with(|| AccountState {
            lamports: 0,
            owner: SYSTEM_PROGRAM_ID,
            data: Vec::new(),
        });
        account.lamports = account.lamports.saturating_add(lamports);
        debug!(address = %to, lamports, "airdrop");
    }

    /// Replace the current blockhash. Transactions built against the old
    /// one are rejected from now on.
    pub fn expire_blockhash(&self) {
        self.state.lock().blockhash = Blockhash::new_from_array(rand::random());
    }

    /// Number of [`Ledger`] calls made so far, failed ones included.
    pub fn call_count(&self) -> usize {
        self.state.lock().calls
    }

    /// While unavailable every [`Ledger`] call fails with
    /// [`ClientError::LedgerUnavailable`].
    pub fn set_available(&self, available: bool) {
        self.state.lock().unavailable = !available;
    }

    /// Read an account without counting as a ledger call.
    pub fn account(&self, address: &Pubkey) -> Option<AccountState> {
        self.state.lock().accounts.get(address).cloned()
    }

    fn enter(&self) -> Result<MutexGuard<'_, State>> {
        let mut state = self.state.lock();
        state.calls += 1;
        if state.unavailable {
            return Err(ClientError::LedgerUnavailable(
                "memory ledger is offline".into(),
            ));
        }
        Ok(state)
    }
}

impl Ledger for MemoryLedger {
    async fn minimum_balance_for_rent_exemption(&self, space: usize) -> Result<u64> {
        self.enter()?;
        Ok(rent_exempt_minimum(space))
    }

    async fn latest_blockhash(&self) -> Result<Blockhash> {
        Ok(self.enter()?.blockhash)
    }

    async fn account_exists(&self, address: &Pubkey) -> Result<bool> {
        Ok(self.enter()?.accounts.contains_key(address))
    }

    async fn account_state(&self, address: &Pubkey) -> Result<Option<AccountState>> {
        Ok(self.enter()?.accounts.get(address).cloned())
    }

    async fn submit_transaction(&self, wire: &[u8], commitment: Commitment) -> Result<Signature> {
        let mut state = self.enter()?;

        let tx = Transaction::deserialize(wire)
            .map_err(|e| Rejection::Other(format!("malformed transaction: {e}")))?;

        if tx.message.recent_blockhash != state.blockhash {
            return Err(Rejection::BlockhashNotFound.into());
        }
        tx.verify().map_err(|_| Rejection::SignatureMismatch)?;

        let signature = tx
            .signature()
            .copied()
            .ok_or(Rejection::SignatureMismatch)?;
        if state.processed.contains(&signature) {
            return Err(Rejection::AlreadyProcessed.into());
        }

        let mut accounts = state.accounts.clone();
        execute(&mut accounts, &tx)?;
        state.accounts = accounts;
        state.processed.insert(signature);

        debug!(signature = %signature, %commitment, "executed transaction");
        Ok(signature)
    }
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

type Accounts = HashMap<Pubkey, AccountState>;

fn execute(accounts: &mut Accounts, tx: &Transaction) -> Execution {
    let fee_payer = tx
        .message
        .fee_payer()
        .ok_or_else(|| Rejection::Other("transaction has no fee payer".into()))?;
    let fee = LAMPORTS_PER_SIGNATURE * tx.signatures.len() as u64;
    debit(accounts, fee_payer, fee)?;

    let instructions = tx
        .message
        .decompile_instructions()
        .map_err(|e| Rejection::InvalidInstruction(e.to_string()))?;

    for ix in &instructions {
        match ix.program_id {
            id if id == SYSTEM_PROGRAM_ID => execute_system(accounts, ix)?,
            id if id == TOKEN_PROGRAM_ID => execute_token(accounts, ix)?,
            id if id == ASSOCIATED_TOKEN_PROGRAM_ID => execute_associated(accounts, ix)?,
            other => {
                return Err(Rejection::InvalidInstruction(format!(
                    "unsupported program {other}"
                )))
            }
        }
    }
    Ok(())
}

fn execute_system(accounts: &mut Accounts, ix: &Instruction) -> Execution {
    let decoded = SystemInstruction::unpack(&ix.data)
        .map_err(|e| Rejection::InvalidInstruction(e.to_string()))?;

    match decoded {
        SystemInstruction::CreateAccount {
            lamports,
            space,
            owner,
        } => {
            let from = meta(ix, 0)?;
            let new_account = meta(ix, 1)?;
            require_signer(from)?;
            require_signer(new_account)?;

            if accounts.contains_key(&new_account.pubkey) {
                return Err(Rejection::AccountAlreadyExists(
                    new_account.pubkey.to_string(),
                ));
            }
            let space = usize::try_from(space)
                .map_err(|_| Rejection::InvalidInstruction(format!("space {space} too large")))?;

            debit(accounts, &from.pubkey, lamports)?;
            accounts.insert(
                new_account.pubkey,
                AccountState {
                    lamports,
                    owner,
                    data: vec![0; space],
                },
            );
        }
        SystemInstruction::Transfer { lamports } => {
            let from = meta(ix, 0)?;
            let to = meta(ix, 1)?;
            require_signer(from)?;

            debit(accounts, &from.pubkey, lamports)?;
            credit(accounts, &to.pubkey, lamports)?;
        }
    }
    Ok(())
}

fn execute_token(accounts: &mut Accounts, ix: &Instruction) -> Execution {
    let decoded = TokenInstruction::unpack(&ix.data)
        .map_err(|e| Rejection::InvalidInstruction(e.to_string()))?;

    match decoded {
        TokenInstruction::InitializeMint {
            decimals,
            mint_authority,
            freeze_authority,
        } => {
            let mint = meta(ix, 0)?.pubkey;
            let data = token_owned_data(accounts, &mint)?;
            if data.len() != MintState::LEN || MintState::unpack(data).is_ok() {
                return Err(Rejection::InvalidInstruction(format!(
                    "{mint} cannot be initialized as a mint"
                )));
            }

            let state = MintState {
                mint_authority: Some(mint_authority),
                supply: 0,
                decimals,
                is_initialized: true,
                freeze_authority,
            };
            store(accounts, &mint, state.pack());
        }
        TokenInstruction::InitializeAccount { owner } => {
            let account = meta(ix, 0)?.pubkey;
            let mint = meta(ix, 1)?.pubkey;

            let data = token_owned_data(accounts, &account)?;
            if data.len() != TokenAccountState::LEN || TokenAccountState::unpack(data).is_ok() {
                return Err(Rejection::InvalidInstruction(format!(
                    "{account} cannot be initialized as a token account"
                )));
            }
            load_mint(accounts, &mint)?;

            let state = TokenAccountState::new(mint, owner);
            store(accounts, &account, state.pack());
        }
        TokenInstruction::MintTo { amount } => {
            let mint = meta(ix, 0)?.pubkey;
            let destination = meta(ix, 1)?.pubkey;
            let authority = meta(ix, 2)?;
            require_signer(authority)?;

            let mut mint_state = load_mint(accounts, &mint)?;
            let mut dest_state = load_token_account(accounts, &destination)?;
            if dest_state.mint != mint {
                return Err(Rejection::InvalidInstruction(format!(
                    "{destination} holds a different mint"
                )));
            }
            if mint_state.mint_authority != Some(authority.pubkey) {
                return Err(Rejection::InvalidInstruction(format!(
                    "{} is not the mint authority",
                    authority.pubkey
                )));
            }

            mint_state.supply = checked_add(mint_state.supply, amount)?;
            dest_state.amount = checked_add(dest_state.amount, amount)?;
            store(accounts, &mint, mint_state.pack());
            store(accounts, &destination, dest_state.pack());
        }
        TokenInstruction::TransferChecked { amount, decimals } => {
            let source = meta(ix, 0)?.pubkey;
            let mint = meta(ix, 1)?.pubkey;
            let destination = meta(ix, 2)?.pubkey;
            let owner = meta(ix, 3)?;
            require_signer(owner)?;

            let mint_state = load_mint(accounts, &mint)?;
            if mint_state.decimals != decimals {
                return Err(Rejection::InvalidInstruction(format!(
                    "decimals mismatch: mint has {}, instruction has {decimals}",
                    mint_state.decimals
                )));
            }

            let mut source_state = load_token_account(accounts, &source)?;
            let mut dest_state = load_token_account(accounts, &destination)?;
            if source_state.mint != mint || dest_state.mint != mint {
                return Err(Rejection::InvalidInstruction(
                    "token account holds a different mint".into(),
                ));
            }
            if source_state.owner != owner.pubkey {
                return Err(Rejection::InvalidInstruction(format!(
                    "{} does not own {source}",
                    owner.pubkey
                )));
            }
            if source_state.is_frozen() || dest_state.is_frozen() {
                return Err(Rejection::InvalidInstruction("account is frozen".into()));
            }
            if source_state.amount < amount {
                return Err(Rejection::InsufficientFunds);
            }

            if source != destination {
                source_state.amount -= amount;
                dest_state.amount = checked_add(dest_state.amount, amount)?;
                store(accounts, &source, source_state.pack());
                store(accounts, &destination, dest_state.pack());
            }
        }
    }
    Ok(())
}

fn execute_associated(accounts: &mut Accounts, ix: &Instruction) -> Execution {
    let idempotent = match ix.data.as_slice() {
        [] | [ASSOCIATED_CREATE] => false,
        [ASSOCIATED_CREATE_IDEMPOTENT] => true,
        _ => {
            return Err(Rejection::InvalidInstruction(
                "unsupported associated account instruction".into(),
            ))
        }
    };

    let payer = meta(ix, 0)?;
    let address = meta(ix, 1)?.pubkey;
    let owner = meta(ix, 2)?.pubkey;
    let mint = meta(ix, 3)?.pubkey;
    require_signer(payer)?;

    let expected = derive_associated_token_address(&mint, &owner)
        .map_err(|e| Rejection::InvalidInstruction(e.to_string()))?;
    if address != expected {
        return Err(Rejection::InvalidInstruction(format!(
            "{address} is not the associated account of {owner} for {mint}"
        )));
    }
    if accounts.contains_key(&address) {
        if idempotent {
            let existing = load_token_account(accounts, &address)?;
            if existing.mint == mint && existing.owner == owner {
                return Ok(());
            }
        }
        return Err(Rejection::AccountAlreadyExists(address.to_string()));
    }
    load_mint(accounts, &mint)?;

    let rent = rent_exempt_minimum(TOKEN_ACCOUNT_LEN);
    debit(accounts, &payer.pubkey, rent)?;
    accounts.insert(
        address,
        AccountState {
            lamports: rent,
            owner: TOKEN_PROGRAM_ID,
            data: TokenAccountState::new(mint, owner).pack(),
        },
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn meta(ix: &Instruction, index: usize) -> Execution<&AccountMeta> {
    ix.accounts.get(index).ok_or_else(|| {
        Rejection::InvalidInstruction(format!("missing account at position {index}"))
    })
}

fn require_signer(meta: &AccountMeta) -> Execution {
    if meta.is_signer {
        Ok(())
    } else {
        Err(Rejection::InvalidInstruction(format!(
            "missing required signature from {}",
            meta.pubkey
        )))
    }
}

fn debit(accounts: &mut Accounts, from: &Pubkey, lamports: u64) -> Execution {
    let account = accounts.get_mut(from).ok_or(Rejection::InsufficientFunds)?;
    account.lamports = account
        .lamports
        .checked_sub(lamports)
        .ok_or(Rejection::InsufficientFunds)?;
    Ok(())
}

fn credit(accounts: &mut Accounts, to: &Pubkey, lamports: u64) -> Execution {
    let account = accounts.entry(*to).or_insert_with(|| AccountState {
        lamports: 0,
        owner: SYSTEM_PROGRAM_ID,
        data: Vec::new(),
    });
    account.lamports = checked_add(account.lamports, lamports)?;
    Ok(())
}

fn checked_add(a: u64, b: u64) -> Execution<u64> {
    a.checked_add(b)
        .ok_or_else(|| Rejection::InvalidInstruction("arithmetic overflow".into()))
}

fn token_owned_data<'a>(accounts: &'a Accounts, address: &Pubkey) -> Execution<&'a [u8]> {
    match accounts.get(address) {
        Some(account) if account.owner == TOKEN_PROGRAM_ID => Ok(&account.data),
        Some(_) => Err(Rejection::InvalidInstruction(format!(
            "{address} is not owned by the token program"
        ))),
        None => Err(Rejection::InvalidInstruction(format!(
            "account {address} does not exist"
        ))),
    }
}

fn load_mint(accounts: &Accounts, address: &Pubkey) -> Execution<MintState> {
    MintState::unpack(token_owned_data(accounts, address)?)
        .map_err(|e| Rejection::InvalidInstruction(format!("{address}: {e}")))
}

fn load_token_account(accounts: &Accounts, address: &Pubkey) -> Execution<TokenAccountState> {
    TokenAccountState::unpack(token_owned_data(accounts, address)?)
        .map_err(|e| Rejection::InvalidInstruction(format!("{address}: {e}")))
}

/// Callers have already loaded `address` through [`token_owned_data`].
fn store(accounts: &mut Accounts, address: &Pubkey, data: Vec<u8>) {
    if let Some(account) = accounts.get_mut(address) {
        account.data = data;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spl_core::{instruction, Keypair, Message, Signer, MINT_LEN};

    fn signed(ledger: &MemoryLedger, ixs: &[Instruction], signers: &[&Keypair]) -> Vec<u8> {
        let blockhash = ledger.state.lock().blockhash;
        let message = Message::compile(ixs, &signers[0].pubkey(), blockhash).unwrap();
        let mut tx = Transaction::new_unsigned(message);
        let signers: Vec<&dyn Signer> = signers.iter().map(|k| *k as &dyn Signer).collect();
        tx.partial_sign(&signers).unwrap();
        tx.serialize().unwrap()
    }

    #[test]
    fn rent_matches_ledger_constants() {
        assert_eq!(rent_exempt_minimum(MINT_LEN), 1_461_600);
        assert_eq!(rent_exempt_minimum(TOKEN_ACCOUNT_LEN), 2_039_280);
        assert_eq!(rent_exempt_minimum(0), 890_880);
    }

    #[tokio::test]
    async fn sol_transfer_moves_lamports_and_charges_fee() {
        let ledger = MemoryLedger::new();
        let payer = Keypair::from_seed(&[1; 32]);
        let to = Pubkey::new_from_array([9; 32]);
        ledger.airdrop(&payer.pubkey(), 1_000_000);

        let ix = instruction::transfer(&payer.pubkey(), &to, 400_000);
        let wire = signed(&ledger, &[ix], &[&payer]);
        ledger
            .submit_transaction(&wire, Commitment::Confirmed)
            .await
            .unwrap();

        assert_eq!(ledger.account(&to).unwrap().lamports, 400_000);
        assert_eq!(
            ledger.account(&payer.pubkey()).unwrap().lamports,
            1_000_000 - 400_000 - LAMPORTS_PER_SIGNATURE
        );
    }

    #[tokio::test]
    async fn overdraft_is_rejected_atomically() {
        let ledger = MemoryLedger::new();
        let payer = Keypair::from_seed(&[1; 32]);
        ledger.airdrop(&payer.pubkey(), 10_000);

        let to = Pubkey::new_from_array([9; 32]);
        let ix = instruction::transfer(&payer.pubkey(), &to, 1_000_000);
        let wire = signed(&ledger, &[ix], &[&payer]);
        let err = ledger
            .submit_transaction(&wire, Commitment::Confirmed)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ClientError::SubmissionFailed(Rejection::InsufficientFunds)
        );
        assert_eq!(ledger.account(&payer.pubkey()).unwrap().lamports, 10_000);
        assert!(ledger.account(&to).is_none());
    }

    #[tokio::test]
    async fn stale_blockhash_rejected() {
        let ledger = MemoryLedger::new();
        let payer = Keypair::from_seed(&[1; 32]);
        ledger.airdrop(&payer.pubkey(), 1_000_000);

        let ix = instruction::transfer(&payer.pubkey(), &payer.pubkey(), 1);
        let wire = signed(&ledger, &[ix], &[&payer]);
        ledger.expire_blockhash();

        let err = ledger
            .submit_transaction(&wire, Commitment::Confirmed)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ClientError::SubmissionFailed(Rejection::BlockhashNotFound)
        );
    }

    #[tokio::test]
    async fn tampered_signature_rejected() {
        let ledger = MemoryLedger::new();
        let payer = Keypair::from_seed(&[1; 32]);
        ledger.airdrop(&payer.pubkey(), 1_000_000);

        let ix = instruction::transfer(&payer.pubkey(), &payer.pubkey(), 1);
        let mut wire = signed(&ledger, &[ix], &[&payer]);
        wire[5] ^= 0xFF;

        let err = ledger
            .submit_transaction(&wire, Commitment::Confirmed)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ClientError::SubmissionFailed(Rejection::SignatureMismatch)
        );
    }

    #[tokio::test]
    async fn replay_rejected() {
        let ledger = MemoryLedger::new();
        let payer = Keypair::from_seed(&[1; 32]);
        ledger.airdrop(&payer.pubkey(), 1_000_000);

        let to = Pubkey::new_from_array([9; 32]);
        let ix = instruction::transfer(&payer.pubkey(), &to, 1);
        let wire = signed(&ledger, &[ix], &[&payer]);
        ledger
            .submit_transaction(&wire, Commitment::Confirmed)
            .await
            .unwrap();

        let err = ledger
            .submit_transaction(&wire, Commitment::Confirmed)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ClientError::SubmissionFailed(Rejection::AlreadyProcessed)
        );
    }

    #[tokio::test]
    async fn mint_lifecycle_and_duplicate_associated_create() {
        let ledger = MemoryLedger::new();
        let payer = Keypair::from_seed(&[1; 32]);
        let mint = Keypair::from_seed(&[2; 32]);
        let owner = Pubkey::new_from_array([7; 32]);
        ledger.airdrop(&payer.pubkey(), 100_000_000);

        let ixs = instruction::create_mint_instructions(
            &payer.pubkey(),
            &mint.pubkey(),
            &payer.pubkey(),
            6,
            rent_exempt_minimum(MINT_LEN),
        );
        let wire = signed(&ledger, &ixs, &[&payer, &mint]);
        ledger
            .submit_transaction(&wire, Commitment::Confirmed)
            .await
            .unwrap();

        let state = MintState::unpack(&ledger.account(&mint.pubkey()).unwrap().data).unwrap();
        assert_eq!(state.decimals, 6);
        assert_eq!(state.mint_authority, Some(payer.pubkey()));

        let ata = derive_associated_token_address(&mint.pubkey(), &owner).unwrap();
        let mut ixs = instruction::create_associated_token_account_instructions(
            &payer.pubkey(),
            &owner,
            &mint.pubkey(),
        )
        .unwrap();
        let mint_to = instruction::mint_to(&mint.pubkey(), &ata, &payer.pubkey(), 42);
        ixs.push(mint_to);
        let wire = signed(&ledger, &ixs, &[&payer]);
        ledger
            .submit_transaction(&wire, Commitment::Confirmed)
            .await
            .unwrap();

        let account = TokenAccountState::unpack(&ledger.account(&ata).unwrap().data).unwrap();
        assert_eq!(account.amount, 42);
        assert_eq!(account.owner, owner);

        ledger.expire_blockhash();
        let ixs = instruction::create_associated_token_account_instructions(
            &payer.pubkey(),
            &owner,
            &mint.pubkey(),
        )
        .unwrap();
        let wire = signed(&ledger, &ixs, &[&payer]);
        let err = ledger
            .submit_transaction(&wire, Commitment::Confirmed)
            .await
            .unwrap_err();
        assert!(err.is_account_already_exists());
    }

    #[tokio::test]
    async fn idempotent_associated_create_keeps_existing_account() {
        let ledger = MemoryLedger::new();
        let payer = Keypair::from_seed(&[1; 32]);
        let mint = Keypair::from_seed(&[2; 32]);
        let owner = Pubkey::new_from_array([7; 32]);
        ledger.airdrop(&payer.pubkey(), 100_000_000);

        let ata = derive_associated_token_address(&mint.pubkey(), &owner).unwrap();
        let mut ixs = instruction::create_mint_instructions(
            &payer.pubkey(),
            &mint.pubkey(),
            &payer.pubkey(),
            0,
            rent_exempt_minimum(MINT_LEN),
        );
        ixs.push(
            instruction::create_associated_token_account(&payer.pubkey(), &owner, &mint.pubkey())
                .unwrap(),
        );
        let mint_to = instruction::mint_to(&mint.pubkey(), &ata, &payer.pubkey(), 5);
        ixs.push(mint_to);
        let wire = signed(&ledger, &ixs, &[&payer, &mint]);
        ledger
            .submit_transaction(&wire, Commitment::Confirmed)
            .await
            .unwrap();

        let ixs = vec![
            instruction::create_associated_token_account_idempotent(
                &payer.pubkey(),
                &owner,
                &mint.pubkey(),
            )
            .unwrap(),
            instruction::mint_to(&mint.pubkey(), &ata, &payer.pubkey(), 3),
        ];
        let wire = signed(&ledger, &ixs, &[&payer]);
        ledger
            .submit_transaction(&wire, Commitment::Confirmed)
            .await
            .unwrap();

        let account = TokenAccountState::unpack(&ledger.account(&ata).unwrap().data).unwrap();
        assert_eq!(account.amount, 8);
        assert_eq!(
            ledger.account(&ata).unwrap().lamports,
            rent_exempt_minimum(TOKEN_ACCOUNT_LEN)
        );
    }

    #[tokio::test]
    async fn mint_to_requires_mint_authority() {
        let ledger = MemoryLedger::new();
        let payer = Keypair::from_seed(&[1; 32]);
        let mint = Keypair::from_seed(&[2; 32]);
        let impostor = Keypair::from_seed(&[3; 32]);
        ledger.airdrop(&payer.pubkey(), 100_000_000);
        ledger.airdrop(&impostor.pubkey(), 100_000_000);

        let mut ixs = instruction::create_mint_instructions(
            &payer.pubkey(),
            &mint.pubkey(),
            &payer.pubkey(),
            0,
            rent_exempt_minimum(MINT_LEN),
        );
        ixs.extend(
            instruction::create_associated_token_account_instructions(
                &payer.pubkey(),
                &payer.pubkey(),
                &mint.pubkey(),
            )
            .unwrap(),
        );
        let wire = signed(&ledger, &ixs, &[&payer, &mint]);
        ledger
            .submit_transaction(&wire, Commitment::Confirmed)
            .await
            .unwrap();

        let ata = derive_associated_token_address(&mint.pubkey(), &payer.pubkey()).unwrap();
        let wire = signed(
            &ledger,
            &[instruction::mint_to(&mint.pubkey(), &ata, &impostor.pubkey(), 1)],
            &[&impostor],
        );
        let err = ledger
            .submit_transaction(&wire, Commitment::Confirmed)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::SubmissionFailed(Rejection::InvalidInstruction(_))
        ));
    }

    #[tokio::test]
    async fn offline_ledger_counts_and_fails_calls() {
        let ledger = MemoryLedger::new();
        ledger.set_available(false);

        let err = ledger.latest_blockhash().await.unwrap_err();
        assert!(matches!(err, ClientError::LedgerUnavailable(_)));
        assert_eq!(ledger.call_count(), 1);

        ledger.set_available(true);
        assert!(!ledger.account_exists(&Pubkey::default()).await.unwrap());
        assert_eq!(ledger.call_count(), 2);
    }

    #[tokio::test]
    async fn garbage_wire_rejected() {
        let ledger = MemoryLedger::new();
        let err = ledger
            .submit_transaction(&[1, 2, 3], Commitment::Confirmed)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::SubmissionFailed(Rejection::Other(_))
        ));
    }
}
