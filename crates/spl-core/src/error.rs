use thiserror::Error;

/// Errors raised while building, deriving, or encoding token transactions.
///
/// Everything here is local: no ledger was contacted, so none of these are
/// worth retrying.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("address derivation failed: {0}")]
    AddressDerivation(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("transaction build error: {0}")]
    TransactionBuild(String),

    #[error("signing error: {0}")]
    Signing(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid account data: {0}")]
    InvalidAccountData(String),
}

pub type Result<T> = std::result::Result<T, TokenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_amount() {
        let err = TokenError::InvalidAmount("negative amount -1".into());
        assert_eq!(err.to_string(), "invalid amount: negative amount -1");
    }

    #[test]
    fn display_address_derivation() {
        let err = TokenError::AddressDerivation("seed too long".into());
        assert_eq!(err.to_string(), "address derivation failed: seed too long");
    }

    #[test]
    fn display_transaction_build() {
        let err = TokenError::TransactionBuild("no instructions".into());
        assert_eq!(err.to_string(), "transaction build error: no instructions");
    }

    #[test]
    fn display_signing() {
        let err = TokenError::Signing("unknown signer".into());
        assert_eq!(err.to_string(), "signing error: unknown signer");
    }

    #[test]
    fn display_invalid_account_data() {
        let err = TokenError::InvalidAccountData("expected 82 bytes, got 3".into());
        assert_eq!(
            err.to_string(),
            "invalid account data: expected 82 bytes, got 3"
        );
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> = Box::new(TokenError::InvalidAddress("test".into()));
        assert!(err.to_string().contains("test"));
    }
}
