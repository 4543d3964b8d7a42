use agora_state::{CreateTransactionInput, ItemKind, PurchaseRecord};
use async_trait::async_trait;
use thiserror::Error;

/// Failures surfaced by the ledger procedure boundary.
#[derive(Debug, Error)]
pub enum LedgerApiError {
    /// The submitted signature did not verify against the item's expected
    /// parties and amounts; nothing was recorded and access stays locked.
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    /// The signature is already bound to a different purchase.
    #[error("transaction signature already recorded")]
    SignatureAlreadyRecorded,

    /// Transport or storage failure; safe to retry.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// The ledger surface the client orchestration drives.
///
/// Implemented by the server-side ledger service directly, by HTTP clients
/// in split deployments, and by mocks in tests.
#[async_trait]
pub trait LedgerApi: Send + Sync {
    /// Verify a submitted on-chain transaction and durably record the
    /// purchase. Idempotent: resubmitting the same signature for the same
    /// buyer and item returns the original record.
    async fn create_transaction(
        &self,
        input: CreateTransactionInput,
    ) -> Result<PurchaseRecord, LedgerApiError>;

    /// Whether a purchase record exists. Pure read, safe to poll.
    async fn check_user_purchase(
        &self,
        buyer_id: &str,
        item_id: &str,
        kind: ItemKind,
    ) -> Result<bool, LedgerApiError>;
}
