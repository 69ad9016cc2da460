//! On-ledger layouts of mint and token accounts.
//!
//! Optional keys use the token program's `COption` layout: a u32 LE tag
//! (0 = none, 1 = some) followed by the value, which is zeroed when absent.

use crate::address::Pubkey;
use crate::error::TokenError;
use crate::instruction::{Reader, MINT_LEN, TOKEN_ACCOUNT_LEN};

/// A mint: defines a token's supply, precision, and issuing authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintState {
    pub mint_authority: Option<Pubkey>,
    /// Total raw units in circulation.
    pub supply: u64,
    pub decimals: u8,
    pub is_initialized: bool,
    pub freeze_authority: Option<Pubkey>,
}

impl MintState {
    pub const LEN: usize = MINT_LEN;

    pub fn pack(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(Self::LEN);
        pack_option_key(&mut data, self.mint_authority.as_ref());
        data.extend_from_slice(&self.supply.to_le_bytes());
        data.push(self.decimals);
        data.push(u8::from(self.is_initialized));
        pack_option_key(&mut data, self.freeze_authority.as_ref());
        data
    }

    /// Parse mint account data. Uninitialized mints are rejected.
    pub fn unpack(data: &[u8]) -> Result<Self, TokenError> {
        check_len(data, Self::LEN, "mint")?;
        let mut reader = Reader::new(data);

        let mint_authority = unpack_option_key(&mut reader)?;
        let supply = reader.u64()?;
        let decimals = reader.u8()?;
        let is_initialized = unpack_bool(&mut reader)?;
        let freeze_authority = unpack_option_key(&mut reader)?;

        if !is_initialized {
            return Err(TokenError::InvalidAccountData(
                "mint is not initialized".into(),
            ));
        }

        Ok(Self {
            mint_authority,
            supply,
            decimals,
            is_initialized,
            freeze_authority,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Uninitialized,
    Initialized,
    Frozen,
}

impl AccountStatus {
    fn to_byte(self) -> u8 {
        match self {
            Self::Uninitialized => 0,
            Self::Initialized => 1,
            Self::Frozen => 2,
        }
    }

    fn from_byte(byte: u8) -> Result<Self, TokenError> {
        match byte {
            0 => Ok(Self::Uninitialized),
            1 => Ok(Self::Initialized),
            2 => Ok(Self::Frozen),
            other => Err(TokenError::InvalidAccountData(format!(
                "unknown account state {other}"
            ))),
        }
    }
}

/// A token account: holds a balance of one mint on behalf of one owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAccountState {
    pub mint: Pubkey,
    pub owner: Pubkey,
    /// Balance in raw units.
    pub amount: u64,
    pub delegate: Option<Pubkey>,
    pub state: AccountStatus,
    /// Rent-exempt reserve when this account wraps native SOL.
    pub is_native: Option<u64>,
    pub delegated_amount: u64,
    pub close_authority: Option<Pubkey>,
}

impl TokenAccountState {
    pub const LEN: usize = TOKEN_ACCOUNT_LEN;

    /// A freshly initialized, empty account.
    pub fn new(mint: Pubkey, owner: Pubkey) -> Self {
        Self {
            mint,
            owner,
            amount: 0,
            delegate: None,
            state: AccountStatus::Initialized,
            is_native: None,
            delegated_amount: 0,
            close_authority: None,
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.state == AccountStatus::Frozen
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(Self::LEN);
        data.extend_from_slice(self.mint.as_bytes());
        data.extend_from_slice(self.owner.as_bytes());
        data.extend_from_slice(&self.amount.to_le_bytes());
        pack_option_key(&mut data, self.delegate.as_ref());
        data.push(self.state.to_byte());
        match self.is_native {
            Some(reserve) => {
                data.extend_from_slice(&1u32.to_le_bytes());
                data.extend_from_slice(&reserve.to_le_bytes());
            }
            None => data.extend_from_slice(&[0u8; 12]),
        }
        data.extend_from_slice(&self.delegated_amount.to_le_bytes());
        pack_option_key(&mut data, self.close_authority.as_ref());
        data
    }

    /// Parse token account data. Uninitialized accounts are rejected.
    pub fn unpack(data: &[u8]) -> Result<Self, TokenError> {
        check_len(data, Self::LEN, "token account")?;
        let mut reader = Reader::new(data);

        let mint = reader.pubkey()?;
        let owner = reader.pubkey()?;
        let amount = reader.u64()?;
        let delegate = unpack_option_key(&mut reader)?;
        let state = AccountStatus::from_byte(reader.u8()?)?;
        let is_native = match reader.u32()? {
            0 => {
                reader.u64()?;
                None
            }
            1 => Some(reader.u64()?),
            tag => return Err(invalid_tag(tag)),
        };
        let delegated_amount = reader.u64()?;
        let close_authority = unpack_option_key(&mut reader)?;

        if state == AccountStatus::Uninitialized {
            return Err(TokenError::InvalidAccountData(
                "token account is not initialized".into(),
            ));
        }

        Ok(Self {
            mint,
            owner,
            amount,
            delegate,
            state,
            is_native,
            delegated_amount,
            close_authority,
        })
    }
}

fn check_len(data: &[u8], expected: usize, what: &str) -> Result<(), TokenError> {
    if data.len() != expected {
        return Err(TokenError::InvalidAccountData(format!(
            "{what} data must be {expected} bytes, got {}",
            data.len()
        )));
    }
    Ok(())
}

fn pack_option_key(data: &mut Vec<u8>, key: Option<&Pubkey>) {
    match key {
        Some(key) => {
            data.extend_from_slice(&1u32.to_le_bytes());
            data.extend_from_slice(key.as_bytes());
        }
        None => data.extend_from_slice(&[0u8; 36]),
    }
}

fn unpack_option_key(reader: &mut Reader<'_>) -> Result<Option<Pubkey>, TokenError> {
    let tag = reader.u32()?;
    let key = reader.pubkey()?;
    match tag {
        0 => Ok(None),
        1 => Ok(Some(key)),
        other => Err(invalid_tag(other)),
    }
}

fn unpack_bool(reader: &mut Reader<'_>) -> Result<bool, TokenError> {
    match reader.u8()? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(TokenError::InvalidAccountData(format!(
            "invalid bool byte {other}"
        ))),
    }
}

fn invalid_tag(tag: u32) -> TokenError {
    TokenError::InvalidAccountData(format!("invalid option tag {tag}"))
}
