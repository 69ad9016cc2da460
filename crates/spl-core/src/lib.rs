//! Offline building blocks for SPL tokens.
//!
//! Addresses, keypairs, amount scaling, associated-account derivation,
//! instruction encoding, and the transaction wire format. Nothing here
//! touches the network: every function is deterministic given its inputs,
//! apart from [`Keypair::generate`].
//!
//! The wire format is implemented by hand on top of `ed25519-dalek`,
//! `curve25519-dalek`, `sha2`, and `bs58` rather than depending on the full
//! ledger SDK.

pub mod address;
pub mod amount;
pub mod error;
pub mod instruction;
pub mod keypair;
pub mod pda;
pub mod program;
pub mod signer;
pub mod state;
pub mod transaction;

pub use address::{
    address_to_bytes, bytes_to_address, validate_address, Blockhash, Pubkey, Signature,
};
pub use amount::{lamports_to_sol, sol_to_lamports, to_decimal, to_raw, LAMPORTS_PER_SOL};
pub use error::TokenError;
pub use instruction::{AccountMeta, Instruction, MINT_LEN, TOKEN_ACCOUNT_LEN};
pub use keypair::Keypair;
pub use pda::{derive_associated_token_address, find_program_address};
pub use program::{ASSOCIATED_TOKEN_PROGRAM_ID, SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID};
pub use signer::Signer;
pub use state::{AccountStatus, MintState, TokenAccountState};
pub use transaction::{Message, Transaction};
