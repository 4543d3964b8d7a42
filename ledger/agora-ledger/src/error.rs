use thiserror::Error;

#[derive(Debug, Error)]
#[error("storage error: {0}")]
pub struct StoreError(pub String);

#[derive(Debug, Error)]
#[error("catalog error: {0}")]
pub struct CatalogError(pub String);

/// Ledger-side failures for purchase verification and recording.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The submitted signature did not satisfy verification against the
    /// item's canonical price and parties. Nothing was recorded.
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    /// The signature is already bound to a different buyer or item.
    #[error("transaction signature already recorded for a different purchase")]
    SignatureAlreadyRecorded,

    #[error("item not found: {0}")]
    ItemNotFound(String),

    /// Deployment misconfiguration, not user error.
    #[error("chain RPC endpoint is not configured")]
    RpcNotConfigured,

    /// Deployment misconfiguration, not user error.
    #[error("platform fee wallet is not configured")]
    PlatformWalletNotConfigured,

    #[error("chain query failed: {0}")]
    Chain(String),

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
