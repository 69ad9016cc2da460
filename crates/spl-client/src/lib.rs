//! Async SPL token operations against a pluggable ledger.
//!
//! Every operation takes its collaborators explicitly: a [`Ledger`] for
//! queries and submission, and a [`Signer`](spl_core::Signer) for
//! authorization. Nothing is global.
//!
//! ```no_run
//! use spl_client::{MemoryLedger, Wallet};
//! use spl_client::spl_core::Keypair;
//!
//! # async fn demo() -> spl_client::Result<()> {
//! let ledger = MemoryLedger::new();
//! let alice = Wallet::from_keypair(&ledger, Keypair::generate());
//! ledger.airdrop(&alice.pubkey(), 1_000_000_000);
//!
//! let mint = alice.create_mint(6).await?;
//! mint.mint_to(&alice.pubkey(), 15.0, &alice).await?;
//! assert_eq!(alice.balance(mint.address()).await?, 15.0);
//! # Ok(())
//! # }
//! ```

pub mod account;
pub mod associated;
pub mod builder;
pub mod config;
pub mod error;
pub mod ledger;
pub mod memory;
pub mod mint;
pub mod mint_handle;
pub mod pipeline;
pub mod sol;
pub mod token;
pub mod token_account;
pub mod wallet;

pub use spl_core;

pub use config::{ClientConfig, Commitment};
pub use error::{ClientError, Rejection, Result};
pub use ledger::{AccountState, Ledger};
pub use memory::MemoryLedger;
pub use mint_handle::Mint;
pub use wallet::Wallet;

pub use associated::address as get_token_account_address;
pub use mint::{balance as get_balance, create as create_mint, mint_to};
pub use token::transfer;
