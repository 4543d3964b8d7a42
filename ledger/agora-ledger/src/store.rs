use crate::error::StoreError;
use agora_state::{ItemKind, PurchaseRecord};
use async_trait::async_trait;
use solana_sdk::signature::Signature;
use tokio::sync::Mutex;

/// What happened when a record was offered to the store.
///
/// Both uniqueness constraints are enforced inside the store's atomic
/// insert, never by a check-then-insert at the service layer: two
/// concurrent inserts for the same buyer and item must collapse into one
/// record.
#[derive(Debug, Clone)]
pub enum InsertOutcome {
    Inserted(PurchaseRecord),
    /// A record for this `(buyer, item, kind)` already existed; the
    /// original is returned and nothing was written.
    AlreadyPurchased(PurchaseRecord),
    /// The transaction signature is already bound to a different purchase.
    SignatureConflict(PurchaseRecord),
}

#[async_trait]
pub trait PurchaseStore: Send + Sync {
    async fn insert(&self, record: PurchaseRecord) -> Result<InsertOutcome, StoreError>;

    async fn find_by_signature(
        &self,
        signature: &Signature,
    ) -> Result<Option<PurchaseRecord>, StoreError>;

    async fn find_by_buyer_item(
        &self,
        buyer_id: &str,
        item_id: &str,
        kind: ItemKind,
    ) -> Result<Option<PurchaseRecord>, StoreError>;

    async fn exists(
        &self,
        buyer_id: &str,
        item_id: &str,
        kind: ItemKind,
    ) -> Result<bool, StoreError>;
}

/// In-memory store for tests and demos. A single lock makes the
/// constraint checks and the insert one atomic step.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<PurchaseRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

fn matches_buyer_item(record: &PurchaseRecord, buyer_id: &str, item_id: &str, kind: ItemKind) -> bool {
    record.buyer_id == buyer_id && record.item_id == item_id && record.item_kind == kind
}

#[async_trait]
impl PurchaseStore for MemoryStore {
    async fn insert(&self, record: PurchaseRecord) -> Result<InsertOutcome, StoreError> {
        let mut records = self.records.lock().await;

        if let Some(existing) = records
            .iter()
            .find(|r| r.transaction_signature == record.transaction_signature)
        {
            if matches_buyer_item(existing, &record.buyer_id, &record.item_id, record.item_kind) {
                return Ok(InsertOutcome::AlreadyPurchased(existing.clone()));
            }
            return Ok(InsertOutcome::SignatureConflict(existing.clone()));
        }

        if let Some(existing) = records
            .iter()
            .find(|r| matches_buyer_item(r, &record.buyer_id, &record.item_id, record.item_kind))
        {
            return Ok(InsertOutcome::AlreadyPurchased(existing.clone()));
        }

        records.push(record.clone());
        Ok(InsertOutcome::Inserted(record))
    }

    async fn find_by_signature(
        &self,
        signature: &Signature,
    ) -> Result<Option<PurchaseRecord>, StoreError> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .find(|r| r.transaction_signature == *signature)
            .cloned())
    }

    async fn find_by_buyer_item(
        &self,
        buyer_id: &str,
        item_id: &str,
        kind: ItemKind,
    ) -> Result<Option<PurchaseRecord>, StoreError> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .find(|r| matches_buyer_item(r, buyer_id, item_id, kind))
            .cloned())
    }

    async fn exists(
        &self,
        buyer_id: &str,
        item_id: &str,
        kind: ItemKind,
    ) -> Result<bool, StoreError> {
        Ok(self
            .find_by_buyer_item(buyer_id, item_id, kind)
            .await?
            .is_some())
    }
}
