use spl_core::TokenError;
use thiserror::Error;

/// Why the ledger refused a transaction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Another transaction created this account first.
    #[error("account already exists: {0}")]
    AccountAlreadyExists(String),

    #[error("insufficient funds")]
    InsufficientFunds,

    /// The recent blockhash expired before the transaction landed.
    #[error("blockhash not found")]
    BlockhashNotFound,

    #[error("signature verification failed")]
    SignatureMismatch,

    /// The same signed transaction was already processed.
    #[error("transaction already processed")]
    AlreadyProcessed,

    #[error("invalid instruction: {0}")]
    InvalidInstruction(String),

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Transport or query failure. Never retried here.
    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(String),

    #[error("transaction rejected: {0}")]
    SubmissionFailed(#[from] Rejection),

    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// True for the expected outcome of two callers racing to create the
    /// same account. Bundled mint-to and transfer provisioning never
    /// produces it, so callers may treat it as success.
    pub fn is_account_already_exists(&self) -> bool {
        matches!(
            self,
            Self::SubmissionFailed(Rejection::AccountAlreadyExists(_))
        )
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
