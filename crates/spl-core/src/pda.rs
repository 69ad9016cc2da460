//! Program-derived addresses (PDAs).
//!
//! A PDA is `SHA-256(seed_0 || ... || seed_n || program_id || "ProgramDerivedAddress")`
//! constrained to lie off the Ed25519 curve. The associated token account
//! of `(mint, owner)` is the PDA of the Associated Token Account program
//! with seeds `[owner, token_program_id, mint]`, so anyone holding the pair
//! can recompute (and create) it without a separate keypair.

use sha2::{Digest, Sha256};

use crate::address::Pubkey;
use crate::error::TokenError;
use crate::program::{ASSOCIATED_TOKEN_PROGRAM_ID, TOKEN_PROGRAM_ID};

/// Maximum length of a single seed.
pub const MAX_SEED_LEN: usize = 32;

/// Maximum number of seeds, bump included.
pub const MAX_SEEDS: usize = 16;

/// The string appended to PDA derivation: "ProgramDerivedAddress".
const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Derive the associated token account address for a `(mint, owner)` pair.
///
/// Pure: no ledger access, and the same inputs always give the same address.
pub fn derive_associated_token_address(
    mint: &Pubkey,
    owner: &Pubkey,
) -> Result<Pubkey, TokenError> {
    find_program_address(
        &[owner.as_ref(), TOKEN_PROGRAM_ID.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .map(|(address, _bump)| address)
}

/// Find a valid PDA for the given seeds and program.
///
/// Iterates bump seeds from 255 down to 0 and returns the first derived
/// address that is NOT a valid Ed25519 point, together with its bump.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), TokenError> {
    check_seeds(seeds, MAX_SEEDS - 1)?;

    for bump in (0u8..=255).rev() {
        if let Some(address) = try_create_program_address(seeds, &[bump], program_id) {
            return Ok((address, bump));
        }
    }

    Err(TokenError::AddressDerivation(
        "could not find valid PDA bump seed".into(),
    ))
}

/// Create a PDA from a full seed list (bump already included).
///
/// Fails if the seeds hash to an on-curve point.
pub fn create_program_address(
    seeds: &[&[u8]],
    program_id: &Pubkey,
) -> Result<Pubkey, TokenError> {
    check_seeds(seeds, MAX_SEEDS)?;

    try_create_program_address(seeds, &[], program_id).ok_or_else(|| {
        TokenError::AddressDerivation("seeds produce an on-curve address".into())
    })
}

fn check_seeds(seeds: &[&[u8]], max_seeds: usize) -> Result<(), TokenError> {
    if seeds.len() > max_seeds {
        return Err(TokenError::AddressDerivation(format!(
            "too many seeds: {} (max {max_seeds})",
            seeds.len()
        )));
    }
    if let Some(seed) = seeds.iter().find(|s| s.len() > MAX_SEED_LEN) {
        return Err(TokenError::AddressDerivation(format!(
            "seed of {} bytes exceeds {MAX_SEED_LEN}",
            seed.len()
        )));
    }
    Ok(())
}

/// Returns `Some(address)` if the derived point is OFF the Ed25519 curve,
/// `None` if it falls on the curve (try the next bump).
fn try_create_program_address(
    seeds: &[&[u8]],
    bump_seed: &[u8],
    program_id: &Pubkey,
) -> Option<Pubkey> {
    let mut hasher = Sha256::new();

    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(bump_seed);
    hasher.update(program_id.as_bytes());
    hasher.update(PDA_MARKER);

    let hash: [u8; 32] = hasher.finalize().into();
    let address = Pubkey::new_from_array(hash);

    if address.is_on_curve() {
        return None;
    }

    Some(address)
}
