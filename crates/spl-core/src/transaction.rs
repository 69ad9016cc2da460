//! Transaction wire format and signing.
//!
//! Transactions are built by hand in the ledger's compact binary layout:
//!
//! ```text
//! Transaction:
//!   num_signatures          compact-u16
//!   signatures              64 bytes * num_signatures
//!   message:
//!     num_required_sigs     u8
//!     num_readonly_signed   u8
//!     num_readonly_unsigned u8
//!     num_accounts          compact-u16
//!     account_keys          32 bytes * num_accounts
//!     recent_blockhash      32 bytes
//!     num_instructions      compact-u16
//!     instructions[]        (see below)
//!
//! Instruction:
//!   program_id_index        u8
//!   num_accounts            compact-u16
//!   account_indices         u8 * num_accounts
//!   data_len                compact-u16
//!   data                    u8 * data_len
//! ```
//!
//! A [`Message`] is compiled once from an ordered instruction list and never
//! reordered afterwards. A [`Transaction`] pairs it with one signature slot
//! per required signer; slots are filled in any order by
//! [`Transaction::partial_sign`].

use crate::address::{Blockhash, Pubkey, Signature};
use crate::error::TokenError;
use crate::instruction::{AccountMeta, Instruction, Reader};
use crate::signer::Signer;

/// Most account keys a message can reference (indices are `u8`).
const MAX_ACCOUNT_KEYS: usize = 256;

// ---------------------------------------------------------------------------
// Compact-u16 encoding
// ---------------------------------------------------------------------------

/// Encode a `u16` value in the ledger's compact-u16 format.
///
/// - Values 0..0x7f       -> 1 byte
/// - Values 0x80..0x3fff  -> 2 bytes
/// - Values 0x4000..      -> 3 bytes
pub fn encode_compact_u16(value: u16) -> Vec<u8> {
    let mut val = value as u32;
    let mut out = Vec::with_capacity(3);

    loop {
        let mut byte = (val & 0x7f) as u8;
        val >>= 7;
        if val > 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if val == 0 {
            break;
        }
    }

    out
}

/// Decode a compact-u16 value from a byte slice.
///
/// Returns `(value, bytes_consumed)` or an error if the data is truncated.
pub fn decode_compact_u16(data: &[u8]) -> Result<(u16, usize), TokenError> {
    let mut value: u32 = 0;
    let mut shift = 0u32;
    let mut consumed = 0usize;

    loop {
        let byte = *data.get(consumed).ok_or_else(|| {
            TokenError::Serialization(
                "unexpected end of data while decoding compact-u16".into(),
            )
        })?;
        consumed += 1;

        value |= ((byte & 0x7f) as u32) << shift;
        shift += 7;

        if byte & 0x80 == 0 || consumed >= 3 {
            break;
        }
    }

    if value > u16::MAX as u32 {
        return Err(TokenError::Serialization(
            "compact-u16 value overflow".into(),
        ));
    }

    Ok((value as u16, consumed))
}

fn push_compact_len(buf: &mut Vec<u8>, len: usize, what: &str) -> Result<(), TokenError> {
    let len = u16::try_from(len)
        .map_err(|_| TokenError::Serialization(format!("too many {what}: {len}")))?;
    buf.extend_from_slice(&encode_compact_u16(len));
    Ok(())
}

fn read_compact_len(reader: &mut Reader<'_>) -> Result<usize, TokenError> {
    let (value, consumed) = decode_compact_u16(reader.remaining())?;
    reader.take(consumed)?;
    Ok(value as usize)
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A compiled instruction where account references are replaced by u8 indices
/// into the message's `account_keys`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub account_indices: Vec<u8>,
    pub data: Vec<u8>,
}

/// The signed portion of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// All account keys referenced by this message, in canonical order:
    ///   1. writable signers (fee payer first)
    ///   2. read-only signers
    ///   3. writable non-signers
    ///   4. read-only non-signers
    pub account_keys: Vec<Pubkey>,

    pub num_required_signatures: u8,
    pub num_readonly_signed: u8,
    pub num_readonly_unsigned: u8,

    pub recent_blockhash: Blockhash,

    /// Compiled instructions, in exactly the order they were supplied.
    pub instructions: Vec<CompiledInstruction>,
}

impl Message {
    /// Compile an ordered instruction list with a single fee payer.
    ///
    /// Accounts are deduplicated (permissions merged) and sorted into
    /// canonical order. Instructions are NOT reordered or deduplicated.
    pub fn compile(
        instructions: &[Instruction],
        fee_payer: &Pubkey,
        recent_blockhash: Blockhash,
    ) -> Result<Self, TokenError> {
        struct AccountEntry {
            pubkey: Pubkey,
            is_signer: bool,
            is_writable: bool,
        }

        // Account lists are tiny; a Vec beats a HashMap here.
        let mut entries: Vec<AccountEntry> = Vec::new();

        let mut upsert = |pubkey: Pubkey, signer: bool, writable: bool| {
            if let Some(entry) = entries.iter_mut().find(|e| e.pubkey == pubkey) {
                entry.is_signer |= signer;
                entry.is_writable |= writable;
            } else {
                entries.push(AccountEntry {
                    pubkey,
                    is_signer: signer,
                    is_writable: writable,
                });
            }
        };

        // Fee payer is always signer + writable, and inserted first.
        upsert(*fee_payer, true, true);

        for ix in instructions {
            for meta in &ix.accounts {
                upsert(meta.pubkey, meta.is_signer, meta.is_writable);
            }
            upsert(ix.program_id, false, false);
        }

        if entries.len() > MAX_ACCOUNT_KEYS {
            return Err(TokenError::TransactionBuild(format!(
                "{} account keys exceed the limit of {MAX_ACCOUNT_KEYS}",
                entries.len()
            )));
        }

        // Stable sort: within a category insertion order is kept, so the fee
        // payer stays at index 0.
        entries.sort_by_key(|e| match (e.is_signer, e.is_writable) {
            (true, true) => 0u8,
            (true, false) => 1,
            (false, true) => 2,
            (false, false) => 3,
        });

        let count = |pred: fn(&AccountEntry) -> bool| entries.iter().filter(|e| pred(e)).count();
        let num_signers = count(|e| e.is_signer);
        let num_readonly_signed = count(|e| e.is_signer && !e.is_writable);
        let num_readonly_unsigned = count(|e| !e.is_signer && !e.is_writable);

        let account_keys: Vec<Pubkey> = entries.iter().map(|e| e.pubkey).collect();

        let index_of = |key: &Pubkey| -> Result<u8, TokenError> {
            account_keys
                .iter()
                .position(|k| k == key)
                .map(|i| i as u8)
                .ok_or_else(|| {
                    TokenError::TransactionBuild(format!("{key} not in account keys"))
                })
        };

        let mut compiled = Vec::with_capacity(instructions.len());
        for ix in instructions {
            let program_id_index = index_of(&ix.program_id)?;
            let account_indices = ix
                .accounts
                .iter()
                .map(|meta| index_of(&meta.pubkey))
                .collect::<Result<Vec<u8>, _>>()?;

            compiled.push(CompiledInstruction {
                program_id_index,
                account_indices,
                data: ix.data.clone(),
            });
        }

        Ok(Self {
            account_keys,
            num_required_signatures: to_u8(num_signers, "signers")?,
            num_readonly_signed: to_u8(num_readonly_signed, "read-only signers")?,
            num_readonly_unsigned: to_u8(num_readonly_unsigned, "read-only accounts")?,
            recent_blockhash,
            instructions: compiled,
        })
    }

    pub fn fee_payer(&self) -> Option<&Pubkey> {
        self.account_keys.first()
    }

    /// The keys whose signatures this message requires, in slot order.
    pub fn signer_keys(&self) -> &[Pubkey] {
        let n = (self.num_required_signatures as usize).min(self.account_keys.len());
        &self.account_keys[..n]
    }

    pub fn is_signer(&self, index: usize) -> bool {
        index < self.num_required_signatures as usize
    }

    pub fn is_writable(&self, index: usize) -> bool {
        let signers = self.num_required_signatures as usize;
        if index < signers {
            index < signers - self.num_readonly_signed as usize
        } else {
            index < self.account_keys.len() - self.num_readonly_unsigned as usize
        }
    }

    /// Rebuild the instruction list with full account metas.
    pub fn decompile_instructions(&self) -> Result<Vec<Instruction>, TokenError> {
        let key_at = |index: u8| -> Result<Pubkey, TokenError> {
            self.account_keys
                .get(index as usize)
                .copied()
                .ok_or_else(|| {
                    TokenError::Serialization(format!("account index {index} out of range"))
                })
        };

        self.instructions
            .iter()
            .map(|ix| {
                let accounts = ix
                    .account_indices
                    .iter()
                    .map(|&i| {
                        Ok(AccountMeta {
                            pubkey: key_at(i)?,
                            is_signer: self.is_signer(i as usize),
                            is_writable: self.is_writable(i as usize),
                        })
                    })
                    .collect::<Result<Vec<_>, TokenError>>()?;
                Ok(Instruction {
                    program_id: key_at(ix.program_id_index)?,
                    accounts,
                    data: ix.data.clone(),
                })
            })
            .collect()
    }

    /// Serialize the message (the bytes that get signed).
    pub fn serialize(&self) -> Result<Vec<u8>, TokenError> {
        let mut buf = Vec::with_capacity(256);

        buf.push(self.num_required_signatures);
        buf.push(self.num_readonly_signed);
        buf.push(self.num_readonly_unsigned);

        push_compact_len(&mut buf, self.account_keys.len(), "account keys")?;
        for key in &self.account_keys {
            buf.extend_from_slice(key.as_bytes());
        }

        buf.extend_from_slice(self.recent_blockhash.as_bytes());

        push_compact_len(&mut buf, self.instructions.len(), "instructions")?;
        for ix in &self.instructions {
            buf.push(ix.program_id_index);

            push_compact_len(&mut buf, ix.account_indices.len(), "instruction accounts")?;
            buf.extend_from_slice(&ix.account_indices);

            push_compact_len(&mut buf, ix.data.len(), "instruction data bytes")?;
            buf.extend_from_slice(&ix.data);
        }

        Ok(buf)
    }

    /// Parse a serialized message. Trailing bytes are an error.
    pub fn deserialize(data: &[u8]) -> Result<Self, TokenError> {
        let mut reader = Reader::new(data);

        let num_required_signatures = reader.u8()?;
        let num_readonly_signed = reader.u8()?;
        let num_readonly_unsigned = reader.u8()?;

        let num_accounts = read_compact_len(&mut reader)?;
        let account_keys = (0..num_accounts)
            .map(|_| reader.pubkey())
            .collect::<Result<Vec<_>, _>>()?;

        if (num_required_signatures as usize) > account_keys.len()
            || (num_readonly_unsigned as usize)
                > account_keys.len() - num_required_signatures as usize
            || num_readonly_signed > num_required_signatures
        {
            return Err(TokenError::Serialization(
                "message header inconsistent with account keys".into(),
            ));
        }

        let mut hash = [0u8; 32];
        hash.copy_from_slice(reader.take(32)?);
        let recent_blockhash = Blockhash::new_from_array(hash);

        let num_instructions = read_compact_len(&mut reader)?;
        let mut instructions = Vec::with_capacity(num_instructions);
        for _ in 0..num_instructions {
            let program_id_index = reader.u8()?;
            let num_indices = read_compact_len(&mut reader)?;
            let account_indices = reader.take(num_indices)?.to_vec();
            let data_len = read_compact_len(&mut reader)?;
            let data = reader.take(data_len)?.to_vec();
            instructions.push(CompiledInstruction {
                program_id_index,
                account_indices,
                data,
            });
        }

        if !reader.remaining().is_empty() {
            return Err(TokenError::Serialization(format!(
                "{} trailing bytes after message",
                reader.remaining().len()
            )));
        }

        Ok(Self {
            account_keys,
            num_required_signatures,
            num_readonly_signed,
            num_readonly_unsigned,
            recent_blockhash,
            instructions,
        })
    }
}

fn to_u8(value: usize, what: &str) -> Result<u8, TokenError> {
    u8::try_from(value)
        .map_err(|_| TokenError::TransactionBuild(format!("too many {what}: {value}")))
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A message plus one signature slot per required signer.
///
/// Unfilled slots hold the all-zero placeholder signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub signatures: Vec<Signature>,
    pub message: Message,
}

impl Transaction {
    pub fn new_unsigned(message: Message) -> Self {
        let slots = message.num_required_signatures as usize;
        Self {
            signatures: vec![Signature::default(); slots],
            message,
        }
    }

    /// The bytes every signer signs.
    pub fn message_data(&self) -> Result<Vec<u8>, TokenError> {
        self.message.serialize()
    }

    /// Place `signature` in the slot belonging to `pubkey`.
    pub fn add_signature(
        &mut self,
        pubkey: &Pubkey,
        signature: Signature,
    ) -> Result<(), TokenError> {
        let slot = self
            .message
            .signer_keys()
            .iter()
            .position(|k| k == pubkey)
            .ok_or_else(|| {
                TokenError::Signing(format!("{pubkey} is not a required signer"))
            })?;

        match self.signatures.get_mut(slot) {
            Some(existing) => {
                *existing = signature;
                Ok(())
            }
            None => Err(TokenError::Signing(format!(
                "no signature slot {slot} for {pubkey}"
            ))),
        }
    }

    /// Sign with each of `signers`, leaving other slots untouched.
    pub fn partial_sign(&mut self, signers: &[&dyn Signer]) -> Result<(), TokenError> {
        let message = self.message_data()?;
        for signer in signers {
            let signature = signer.sign_message(&message)?;
            self.add_signature(&signer.pubkey(), signature)?;
        }
        Ok(())
    }

    /// Required signers whose slot is still empty.
    pub fn missing_signers(&self) -> Vec<Pubkey> {
        self.message
            .signer_keys()
            .iter()
            .zip(&self.signatures)
            .filter(|(_, sig)| sig.is_default())
            .map(|(key, _)| *key)
            .collect()
    }

    pub fn is_signed(&self) -> bool {
        self.signatures.len() == self.message.num_required_signatures as usize
            && self.signatures.iter().all(|s| !s.is_default())
    }

    /// Check every signature against its signer key.
    pub fn verify(&self) -> Result<(), TokenError> {
        use ed25519_dalek::VerifyingKey;

        let signers = self.message.signer_keys();
        if self.signatures.len() != signers.len() {
            return Err(TokenError::Signing(format!(
                "expected {} signatures, found {}",
                signers.len(),
                self.signatures.len()
            )));
        }

        let message = self.message_data()?;
        for (key, signature) in signers.iter().zip(&self.signatures) {
            let vk = VerifyingKey::from_bytes(key.as_bytes())
                .map_err(|e| TokenError::InvalidPublicKey(format!("{key}: {e}")))?;
            let sig = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
            vk.verify_strict(&message, &sig)
                .map_err(|_| TokenError::Signing(format!("invalid signature for {key}")))?;
        }
        Ok(())
    }

    /// The first signature: the transaction's id once submitted.
    pub fn signature(&self) -> Option<&Signature> {
        self.signatures.first()
    }

    /// Serialize into wire format, ready for submission.
    pub fn serialize(&self) -> Result<Vec<u8>, TokenError> {
        let message = self.message_data()?;
        let mut wire = Vec::with_capacity(3 + 64 * self.signatures.len() + message.len());

        push_compact_len(&mut wire, self.signatures.len(), "signatures")?;
        for sig in &self.signatures {
            wire.extend_from_slice(sig.as_bytes());
        }
        wire.extend_from_slice(&message);

        Ok(wire)
    }

    pub fn deserialize(wire: &[u8]) -> Result<Self, TokenError> {
        let mut reader = Reader::new(wire);

        let num_sigs = read_compact_len(&mut reader)?;
        let mut signatures = Vec::with_capacity(num_sigs);
        for _ in 0..num_sigs {
            let mut sig = [0u8; 64];
            sig.copy_from_slice(reader.take(64)?);
            signatures.push(Signature::new_from_array(sig));
        }

        let message = Message::deserialize(reader.remaining())?;
        if signatures.len() != message.num_required_signatures as usize {
            return Err(TokenError::Serialization(format!(
                "{} signatures for {} required signers",
                signatures.len(),
                message.num_required_signatures
            )));
        }

        Ok(Self {
            signatures,
            message,
        })
    }
}
