use crate::catalog::ItemCatalog;
use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};
use crate::store::{InsertOutcome, PurchaseStore};
use crate::verify::{verify_on_chain, ExpectedTransfer};
use agora_sdk::{ChainConnection, LedgerApi, LedgerApiError};
use agora_state::{split_price, CreateTransactionInput, ItemKind, PurchaseRecord,
    ROUNDING_SLACK_LAMPORTS};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// The single source of truth for "has this buyer paid for this item".
///
/// Safe under concurrent and duplicate invocation: idempotency comes from
/// the signature check up front plus the store's uniqueness constraints at
/// insert time, never from trusting the client.
pub struct PurchaseLedger {
    store: Arc<dyn PurchaseStore>,
    catalog: Arc<dyn ItemCatalog>,
    chain: Arc<dyn ChainConnection>,
    config: LedgerConfig,
}

impl PurchaseLedger {
    pub fn new(
        store: Arc<dyn PurchaseStore>,
        catalog: Arc<dyn ItemCatalog>,
        chain: Arc<dyn ChainConnection>,
        config: LedgerConfig,
    ) -> Self {
        Self {
            store,
            catalog,
            chain,
            config,
        }
    }

    /// Verify a submitted on-chain payment and record it exactly once.
    ///
    /// The client-submitted amount is an assertion only; expected legs are
    /// re-derived from the item's canonical price. A resubmission of an
    /// already recorded signature for the same buyer and item returns the
    /// existing record so client retries after a network blip are no-ops.
    pub async fn create_transaction(&self, input: CreateTransactionInput) -> Result<PurchaseRecord> {
        if let Some(existing) = self.store.find_by_signature(&input.transaction_signature).await? {
            if existing.buyer_id == input.buyer_id
                && existing.item_id == input.item_id
                && existing.item_kind == input.item_kind
            {
                info!(signature = %input.transaction_signature, "purchase already recorded; returning existing record");
                return Ok(existing);
            }
            warn!(
                signature = %input.transaction_signature,
                buyer = %input.buyer_id,
                "signature replay across purchases rejected"
            );
            return Err(LedgerError::SignatureAlreadyRecorded);
        }

        let item = self
            .catalog
            .item(&input.item_id, input.item_kind)
            .await?
            .ok_or_else(|| LedgerError::ItemNotFound(input.item_id.clone()))?;
        if item.is_free {
            return Err(LedgerError::InvalidTransaction(
                "free items require no purchase".to_string(),
            ));
        }
        if item.seller_wallet != input.seller_wallet {
            return Err(LedgerError::InvalidTransaction(
                "seller wallet does not match the listing".to_string(),
            ));
        }

        let split = split_price(item.price_lamports);
        let claimed = input.amount_lamports;
        if claimed.abs_diff(split.total()) > ROUNDING_SLACK_LAMPORTS {
            return Err(LedgerError::InvalidTransaction(format!(
                "claimed amount {claimed} does not match the listed price {}",
                split.total()
            )));
        }

        let expected = ExpectedTransfer {
            buyer_wallet: input.buyer_wallet,
            seller_wallet: item.seller_wallet,
            platform_wallet: self.config.require_platform_wallet()?,
            split,
        };
        verify_on_chain(
            self.chain.as_ref(),
            &input.transaction_signature,
            &expected,
            self.config.max_transaction_age,
            Utc::now(),
        )
        .await?;

        let record = PurchaseRecord {
            id: Uuid::new_v4(),
            buyer_id: input.buyer_id,
            seller_id: item.seller_user_id.clone(),
            item_id: item.id.clone(),
            item_kind: item.kind,
            amount_lamports: split.total(),
            transaction_signature: input.transaction_signature,
            buyer_wallet: input.buyer_wallet,
            seller_wallet: item.seller_wallet,
            created_at: Utc::now(),
        };

        match self.store.insert(record).await? {
            InsertOutcome::Inserted(record) => {
                info!(
                    signature = %record.transaction_signature,
                    buyer = %record.buyer_id,
                    item = %record.item_id,
                    "purchase recorded"
                );
                Ok(record)
            }
            // A concurrent call won the race; their record is the record.
            InsertOutcome::AlreadyPurchased(existing) => Ok(existing),
            InsertOutcome::SignatureConflict(_) => Err(LedgerError::SignatureAlreadyRecorded),
        }
    }

    /// Whether a purchase record exists. Pure read with no side effects;
    /// safe to poll.
    pub async fn check_user_purchase(
        &self,
        buyer_id: &str,
        item_id: &str,
        kind: ItemKind,
    ) -> Result<bool> {
        Ok(self.store.exists(buyer_id, item_id, kind).await?)
    }
}

#[async_trait]
impl LedgerApi for PurchaseLedger {
    async fn create_transaction(
        &self,
        input: CreateTransactionInput,
    ) -> std::result::Result<PurchaseRecord, LedgerApiError> {
        PurchaseLedger::create_transaction(self, input)
            .await
            .map_err(LedgerApiError::from)
    }

    async fn check_user_purchase(
        &self,
        buyer_id: &str,
        item_id: &str,
        kind: ItemKind,
    ) -> std::result::Result<bool, LedgerApiError> {
        PurchaseLedger::check_user_purchase(self, buyer_id, item_id, kind)
            .await
            .map_err(LedgerApiError::from)
    }
}

impl From<LedgerError> for LedgerApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::SignatureAlreadyRecorded => LedgerApiError::SignatureAlreadyRecorded,
            LedgerError::InvalidTransaction(reason) => LedgerApiError::InvalidTransaction(reason),
            other => LedgerApiError::Unavailable(other.to_string()),
        }
    }
}
