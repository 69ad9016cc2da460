//! Instruction assemblers for the System, Token, and Associated Token
//! Account programs.
//!
//! Every assembler is pure: given resolved addresses and raw amounts it
//! returns instructions in the order they must execute. Nothing here talks
//! to the ledger; rent amounts are passed in by the caller.

use crate::address::Pubkey;
use crate::error::TokenError;
use crate::pda::derive_associated_token_address;
use crate::program::{ASSOCIATED_TOKEN_PROGRAM_ID, SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID};

/// Size of a mint account.
pub const MINT_LEN: usize = 82;

/// Size of a token account.
pub const TOKEN_ACCOUNT_LEN: usize = 165;

/// A single account reference in an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountMeta {
    pub pubkey: Pubkey,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    /// A writable account.
    pub fn new(pubkey: Pubkey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: true,
        }
    }

    pub fn new_readonly(pubkey: Pubkey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: false,
        }
    }
}

/// An instruction before it is compiled into a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub program_id: Pubkey,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

// ---------------------------------------------------------------------------
// System Program
// ---------------------------------------------------------------------------

/// System Program instructions this crate emits.
///
/// Wire format: u32 LE discriminant followed by the fields in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemInstruction {
    CreateAccount {
        lamports: u64,
        space: u64,
        owner: Pubkey,
    },
    Transfer {
        lamports: u64,
    },
}

impl SystemInstruction {
    const CREATE_ACCOUNT: u32 = 0;
    const TRANSFER: u32 = 2;

    pub fn pack(&self) -> Vec<u8> {
        match self {
            Self::CreateAccount {
                lamports,
                space,
                owner,
            } => {
                let mut data = Vec::with_capacity(52);
                data.extend_from_slice(&Self::CREATE_ACCOUNT.to_le_bytes());
                data.extend_from_slice(&lamports.to_le_bytes());
                data.extend_from_slice(&space.to_le_bytes());
                data.extend_from_slice(owner.as_bytes());
                data
            }
            Self::Transfer { lamports } => {
                let mut data = Vec::with_capacity(12);
                data.extend_from_slice(&Self::TRANSFER.to_le_bytes());
                data.extend_from_slice(&lamports.to_le_bytes());
                data
            }
        }
    }

    pub fn unpack(data: &[u8]) -> Result<Self, TokenError> {
        let mut reader = Reader::new(data);
        match reader.u32()? {
            Self::CREATE_ACCOUNT => Ok(Self::CreateAccount {
                lamports: reader.u64()?,
                space: reader.u64()?,
                owner: reader.pubkey()?,
            }),
            Self::TRANSFER => Ok(Self::Transfer {
                lamports: reader.u64()?,
            }),
            other => Err(TokenError::Serialization(format!(
                "unsupported system instruction {other}"
            ))),
        }
    }
}

/// Allocate `space` bytes at `new_account`, fund it with `lamports` from
/// `from`, and assign it to `owner`. Both `from` and `new_account` sign.
pub fn create_account(
    from: &Pubkey,
    new_account: &Pubkey,
    lamports: u64,
    space: u64,
    owner: &Pubkey,
) -> Instruction {
    Instruction {
        program_id: SYSTEM_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*from, true),
            AccountMeta::new(*new_account, true),
        ],
        data: SystemInstruction::CreateAccount {
            lamports,
            space,
            owner: *owner,
        }
        .pack(),
    }
}

/// Move `lamports` of SOL from `from` to `to`.
pub fn transfer(from: &Pubkey, to: &Pubkey, lamports: u64) -> Instruction {
    Instruction {
        program_id: SYSTEM_PROGRAM_ID,
        accounts: vec![AccountMeta::new(*from, true), AccountMeta::new(*to, false)],
        data: SystemInstruction::Transfer { lamports }.pack(),
    }
}

// ---------------------------------------------------------------------------
// Token Program
// ---------------------------------------------------------------------------

/// Token Program instructions this crate emits.
///
/// Wire format: one-byte tag followed by the fields in order. Optional keys
/// are a one-byte presence flag plus 32 bytes when present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenInstruction {
    /// `InitializeMint2`: no rent sysvar account needed.
    InitializeMint {
        decimals: u8,
        mint_authority: Pubkey,
        freeze_authority: Option<Pubkey>,
    },
    MintTo {
        amount: u64,
    },
    TransferChecked {
        amount: u64,
        decimals: u8,
    },
    /// `InitializeAccount3`: owner travels in the data, not the accounts.
    InitializeAccount {
        owner: Pubkey,
    },
}

impl TokenInstruction {
    const MINT_TO: u8 = 7;
    const TRANSFER_CHECKED: u8 = 12;
    const INITIALIZE_ACCOUNT3: u8 = 18;
    const INITIALIZE_MINT2: u8 = 20;

    pub fn pack(&self) -> Vec<u8> {
        match self {
            Self::InitializeMint {
                decimals,
                mint_authority,
                freeze_authority,
            } => {
                let mut data = Vec::with_capacity(67);
                data.push(Self::INITIALIZE_MINT2);
                data.push(*decimals);
                data.extend_from_slice(mint_authority.as_bytes());
                match freeze_authority {
                    Some(key) => {
                        data.push(1);
                        data.extend_from_slice(key.as_bytes());
                    }
                    None => data.push(0),
                }
                data
            }
            Self::MintTo { amount } => {
                let mut data = Vec::with_capacity(9);
                data.push(Self::MINT_TO);
                data.extend_from_slice(&amount.to_le_bytes());
                data
            }
            Self::TransferChecked { amount, decimals } => {
                let mut data = Vec::with_capacity(10);
                data.push(Self::TRANSFER_CHECKED);
                data.extend_from_slice(&amount.to_le_bytes());
                data.push(*decimals);
                data
            }
            Self::InitializeAccount { owner } => {
                let mut data = Vec::with_capacity(33);
                data.push(Self::INITIALIZE_ACCOUNT3);
                data.extend_from_slice(owner.as_bytes());
                data
            }
        }
    }

    pub fn unpack(data: &[u8]) -> Result<Self, TokenError> {
        let mut reader = Reader::new(data);
        match reader.u8()? {
            Self::INITIALIZE_MINT2 => {
                let decimals = reader.u8()?;
                let mint_authority = reader.pubkey()?;
                let freeze_authority = match reader.u8()? {
                    0 => None,
                    1 => Some(reader.pubkey()?),
                    flag => {
                        return Err(TokenError::Serialization(format!(
                            "invalid option flag {flag}"
                        )))
                    }
                };
                Ok(Self::InitializeMint {
                    decimals,
                    mint_authority,
                    freeze_authority,
                })
            }
            Self::MINT_TO => Ok(Self::MintTo {
                amount: reader.u64()?,
            }),
            Self::TRANSFER_CHECKED => Ok(Self::TransferChecked {
                amount: reader.u64()?,
                decimals: reader.u8()?,
            }),
            Self::INITIALIZE_ACCOUNT3 => Ok(Self::InitializeAccount {
                owner: reader.pubkey()?,
            }),
            other => Err(TokenError::Serialization(format!(
                "unsupported token instruction {other}"
            ))),
        }
    }
}

pub fn initialize_mint(
    mint: &Pubkey,
    mint_authority: &Pubkey,
    freeze_authority: Option<&Pubkey>,
    decimals: u8,
) -> Instruction {
    Instruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![AccountMeta::new(*mint, false)],
        data: TokenInstruction::InitializeMint {
            decimals,
            mint_authority: *mint_authority,
            freeze_authority: freeze_authority.copied(),
        }
        .pack(),
    }
}

pub fn initialize_account(account: &Pubkey, mint: &Pubkey, owner: &Pubkey) -> Instruction {
    Instruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*account, false),
            AccountMeta::new_readonly(*mint, false),
        ],
        data: TokenInstruction::InitializeAccount { owner: *owner }.pack(),
    }
}

/// Mint `amount` raw units into `destination`. `authority` signs.
pub fn mint_to(
    mint: &Pubkey,
    destination: &Pubkey,
    authority: &Pubkey,
    amount: u64,
) -> Instruction {
    Instruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*mint, false),
            AccountMeta::new(*destination, false),
            AccountMeta::new_readonly(*authority, true),
        ],
        data: TokenInstruction::MintTo { amount }.pack(),
    }
}

/// Move `amount` raw units between token accounts of the same mint.
///
/// `decimals` is checked against the mint by the program, so a caller that
/// scaled the amount for the wrong mint fails instead of moving the wrong
/// quantity.
pub fn transfer_checked(
    source: &Pubkey,
    mint: &Pubkey,
    destination: &Pubkey,
    owner: &Pubkey,
    amount: u64,
    decimals: u8,
) -> Instruction {
    Instruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*source, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new(*destination, false),
            AccountMeta::new_readonly(*owner, true),
        ],
        data: TokenInstruction::TransferChecked { amount, decimals }.pack(),
    }
}

// ---------------------------------------------------------------------------
// Associated Token Account Program
// ---------------------------------------------------------------------------

/// Tag of the associated program's `Create` instruction.
pub const ASSOCIATED_CREATE: u8 = 0;
/// Tag of `CreateIdempotent`: a no-op when the account already exists.
pub const ASSOCIATED_CREATE_IDEMPOTENT: u8 = 1;

/// Create and initialize the associated token account of `(mint, owner)`
/// in one instruction, funded by `payer`.
///
/// The program rejects this if the account already exists.
pub fn create_associated_token_account(
    payer: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
) -> Result<Instruction, TokenError> {
    associated_create(payer, owner, mint, ASSOCIATED_CREATE)
}

/// Like [`create_associated_token_account`], but succeeds without effect
/// when the associated account is already in place.
pub fn create_associated_token_account_idempotent(
    payer: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
) -> Result<Instruction, TokenError> {
    associated_create(payer, owner, mint, ASSOCIATED_CREATE_IDEMPOTENT)
}

fn associated_create(
    payer: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
    tag: u8,
) -> Result<Instruction, TokenError> {
    let address = derive_associated_token_address(mint, owner)?;
    Ok(Instruction {
        program_id: ASSOCIATED_TOKEN_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new(address, false),
            AccountMeta::new_readonly(*owner, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
        ],
        data: vec![tag],
    })
}

// ---------------------------------------------------------------------------
// Composite assemblers
// ---------------------------------------------------------------------------

/// `[create_account(82 bytes), initialize_mint]`.
///
/// `mint` must co-sign the transaction as a freshly allocated account.
pub fn create_mint_instructions(
    payer: &Pubkey,
    mint: &Pubkey,
    mint_authority: &Pubkey,
    decimals: u8,
    rent_lamports: u64,
) -> Vec<Instruction> {
    vec![
        create_account(
            payer,
            mint,
            rent_lamports,
            MINT_LEN as u64,
            &TOKEN_PROGRAM_ID,
        ),
        initialize_mint(mint, mint_authority, None, decimals),
    ]
}

/// `[create_account(165 bytes), initialize_account]` at an explicit address.
///
/// `account` must co-sign the transaction as a freshly allocated account.
pub fn create_token_account_instructions(
    payer: &Pubkey,
    account: &Pubkey,
    mint: &Pubkey,
    owner: &Pubkey,
    rent_lamports: u64,
) -> Vec<Instruction> {
    vec![
        create_account(
            payer,
            account,
            rent_lamports,
            TOKEN_ACCOUNT_LEN as u64,
            &TOKEN_PROGRAM_ID,
        ),
        initialize_account(account, mint, owner),
    ]
}

/// Associated form of token account creation: a single instruction.
pub fn create_associated_token_account_instructions(
    payer: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
) -> Result<Vec<Instruction>, TokenError> {
    Ok(vec![create_associated_token_account(payer, owner, mint)?])
}

pub fn mint_to_instructions(
    mint: &Pubkey,
    destination: &Pubkey,
    authority: &Pubkey,
    amount: u64,
) -> Vec<Instruction> {
    vec![mint_to(mint, destination, authority, amount)]
}

pub fn transfer_checked_instructions(
    source: &Pubkey,
    mint: &Pubkey,
    destination: &Pubkey,
    owner: &Pubkey,
    amount: u64,
    decimals: u8,
) -> Vec<Instruction> {
    vec![transfer_checked(
        source,
        mint,
        destination,
        owner,
        amount,
        decimals,
    )]
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Little-endian cursor over instruction data.
pub(crate) struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub(crate) fn take(&mut self, len: usize) -> Result<&'a [u8], TokenError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|&end| end <= self.data.len());
        let end = end.ok_or_else(|| {
            TokenError::Serialization(format!(
                "need {len} bytes at offset {}, have {}",
                self.offset,
                self.data.len()
            ))
        })?;
        let slice = &self.data[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    pub(crate) fn u8(&mut self) -> Result<u8, TokenError> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn u32(&mut self) -> Result<u32, TokenError> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(buf))
    }

    pub(crate) fn u64(&mut self) -> Result<u64, TokenError> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(buf))
    }

    pub(crate) fn pubkey(&mut self) -> Result<Pubkey, TokenError> {
        Pubkey::try_from_slice(self.take(32)?)
    }

    pub(crate) fn remaining(&self) -> &'a [u8] {
        &self.data[self.offset..]
    }
}
