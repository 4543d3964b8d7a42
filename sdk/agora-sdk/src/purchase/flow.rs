use crate::config::PurchaseConfig;
use crate::core::connection::ChainConnection;
use crate::error::{AgoraSdkError, Result};
use crate::ledger_api::LedgerApi;
use crate::purchase::transfer::PurchaseTransfer;
use crate::session::WalletSession;
use agora_state::{CreateTransactionInput, MarketplaceItem, PurchaseRecord};
use solana_sdk::signature::Signature;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Bounded re-check of the ledger read path after a recorded purchase.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            interval: Duration::from_secs(1),
        }
    }
}

/// Result of a completed purchase.
#[derive(Debug, Clone)]
pub struct PurchaseOutcome {
    pub record: PurchaseRecord,
    pub signature: Signature,
    /// Whether the ledger read path reflected the purchase before the
    /// retry budget ran out. When false the unlock rests on the durable
    /// write alone; the read lag is propagation delay, not data loss.
    pub read_path_confirmed: bool,
}

/// Drives a locked item through the end-to-end purchase: connect the
/// wallet if needed, execute the split payment, record it with the ledger,
/// then re-check the read path until it reflects the purchase.
///
/// Abandoning the caller's future before signing cancels the purchase with
/// no side effects. Once the transaction is submitted there is no
/// cancellation: the payment is live on-chain regardless of UI state, and
/// the remaining steps record and verify it.
pub struct PurchaseFlow {
    connection: Arc<dyn ChainConnection>,
    ledger: Arc<dyn LedgerApi>,
    config: PurchaseConfig,
    retry: RetryPolicy,
}

impl PurchaseFlow {
    pub fn new(
        connection: Arc<dyn ChainConnection>,
        ledger: Arc<dyn LedgerApi>,
        config: PurchaseConfig,
    ) -> Self {
        Self {
            connection,
            ledger,
            config,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Run one purchase attempt for `item` on behalf of `buyer_id`.
    ///
    /// Every error leaves the caller free to retry the whole flow; the
    /// ledger treats resubmission of an already recorded signature as a
    /// no-op. Errors after submission expose the signature via
    /// [`AgoraSdkError::submitted_signature`].
    pub async fn run(
        &self,
        session: &WalletSession,
        item: &MarketplaceItem,
        buyer_id: &str,
    ) -> Result<PurchaseOutcome> {
        if !session.is_connected() {
            session.connect().await?;
        }
        let buyer_wallet = session.address().ok_or(AgoraSdkError::WalletNotConnected)?;
        self.config.require_rpc_url()?;
        let platform_wallet = self.config.require_platform_wallet()?;

        let receipt = PurchaseTransfer::for_item(item)
            .with_buyer(buyer_wallet)
            .with_platform(platform_wallet)
            .execute(self.connection.as_ref(), session)
            .await?;

        let input = CreateTransactionInput {
            buyer_id: buyer_id.to_string(),
            seller_id: item.seller_user_id.clone(),
            item_id: item.id.clone(),
            item_kind: item.kind,
            amount_lamports: receipt.split.total(),
            transaction_signature: receipt.signature,
            buyer_wallet,
            seller_wallet: item.seller_wallet,
        };
        let record = self
            .ledger
            .create_transaction(input)
            .await
            .map_err(|err| AgoraSdkError::Ledger {
                signature: Some(receipt.signature),
                reason: err.to_string(),
            })?;
        info!(signature = %receipt.signature, item = %item.id, "purchase recorded");

        // The write is durable; this loop only warms the read path, which
        // can lag it.
        let mut read_path_confirmed = false;
        for attempt in 1..=self.retry.attempts {
            match self
                .ledger
                .check_user_purchase(buyer_id, &item.id, item.kind)
                .await
            {
                Ok(true) => {
                    read_path_confirmed = true;
                    break;
                }
                Ok(false) => {
                    debug!(attempt, item = %item.id, "purchase not visible on read path yet");
                }
                Err(err) => {
                    warn!(%err, attempt, item = %item.id, "purchase re-check failed");
                }
            }
            if attempt < self.retry.attempts {
                tokio::time::sleep(self.retry.interval).await;
            }
        }
        if !read_path_confirmed {
            info!(
                signature = %receipt.signature,
                item = %item.id,
                "read path did not reflect the purchase in time; unlocking on the durable write"
            );
        }

        Ok(PurchaseOutcome {
            record,
            signature: receipt.signature,
            read_path_confirmed,
        })
    }
}
