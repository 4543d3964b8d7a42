use crate::core::connection::{BlockhashInfo, ChainConnection, ConfirmationStatus};
use crate::error::{AgoraSdkError, Result};
use crate::session::WalletSession;
use agora_state::{split_price, FeeSplit, MarketplaceItem};
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::system_instruction;
use solana_sdk::transaction::Transaction;
use tracing::{debug, info};

/// Proof that the two-leg payment landed and verified.
#[derive(Debug, Clone, Copy)]
pub struct TransferReceipt {
    pub signature: Signature,
    pub split: FeeSplit,
}

/// Builds and executes the split payment for one item: seller leg first,
/// platform leg second (omitted when the fee floors to zero).
///
/// Failures before submission leave no on-chain footprint and are safe to
/// retry wholesale. Failures at or after submission carry the signature and
/// must not be silently retried with a fresh transaction: funds may have
/// already moved.
pub struct PurchaseTransfer {
    price_lamports: u64,
    seller: Pubkey,
    buyer: Option<Pubkey>,
    platform: Option<Pubkey>,
}

impl PurchaseTransfer {
    pub fn new(price_lamports: u64, seller: Pubkey) -> Self {
        Self {
            price_lamports,
            seller,
            buyer: None,
            platform: None,
        }
    }

    /// Price and seller leg prefilled from a listing.
    pub fn for_item(item: &MarketplaceItem) -> Self {
        Self::new(item.price_lamports, item.seller_wallet)
    }

    pub fn with_buyer(mut self, buyer: Pubkey) -> Self {
        self.buyer = Some(buyer);
        self
    }

    pub fn with_platform(mut self, platform: Pubkey) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn split(&self) -> FeeSplit {
        split_price(self.price_lamports)
    }

    /// Preflight: both parties must be known before any network call.
    fn resolve_parties(&self, session: Option<&WalletSession>) -> Result<(Pubkey, Pubkey)> {
        let buyer = self
            .buyer
            .or_else(|| session.and_then(|s| s.address()))
            .ok_or(AgoraSdkError::WalletNotConnected)?;
        let platform = self
            .platform
            .ok_or(AgoraSdkError::PlatformWalletNotConfigured)?;
        Ok((buyer, platform))
    }

    fn build_unsigned(&self, buyer: Pubkey, platform: Pubkey, blockhash: &BlockhashInfo) -> Transaction {
        let split = self.split();
        let mut instructions = vec![system_instruction::transfer(
            &buyer,
            &self.seller,
            split.seller_lamports,
        )];
        if split.platform_lamports > 0 {
            instructions.push(system_instruction::transfer(
                &buyer,
                &platform,
                split.platform_lamports,
            ));
        }
        let message = Message::new_with_blockhash(&instructions, Some(&buyer), &blockhash.blockhash);
        Transaction::new_unsigned(message)
    }

    /// Build the unsigned transaction with the latest blockhash attached.
    pub async fn build_transaction(
        &self,
        connection: &dyn ChainConnection,
        session: Option<&WalletSession>,
    ) -> Result<(Transaction, BlockhashInfo)> {
        let (buyer, platform) = self.resolve_parties(session)?;
        let blockhash = connection
            .get_latest_blockhash()
            .await
            .map_err(|err| AgoraSdkError::Connection(err.to_string()))?;
        Ok((self.build_unsigned(buyer, platform, &blockhash), blockhash))
    }

    /// Run the whole payment: build, sign, submit, confirm, and
    /// independently re-verify by signature.
    ///
    /// Confirmation alone is not trusted: a confirmation result and a
    /// re-fetch of the finalized transaction must both come back clean, so
    /// a single RPC node lying about status cannot produce a false
    /// receipt.
    pub async fn execute(
        &self,
        connection: &dyn ChainConnection,
        session: &WalletSession,
    ) -> Result<TransferReceipt> {
        let split = self.split();
        let (tx, blockhash) = self.build_transaction(connection, Some(session)).await?;
        debug!(
            seller_lamports = split.seller_lamports,
            platform_lamports = split.platform_lamports,
            "payment transaction built"
        );

        let signed = session.sign_transaction(tx).await?;

        // From here on the transaction may be live on-chain; every failure
        // carries the signature for manual follow-up.
        let signature = match connection.send_transaction(&signed).await {
            Ok(signature) => signature,
            Err(err) => {
                return Err(AgoraSdkError::TransactionFailed {
                    signature: signed.signatures.first().copied(),
                    reason: format!("submission failed: {err}"),
                })
            }
        };
        info!(%signature, "payment transaction submitted");

        match connection.confirm_transaction(&signature, &blockhash).await {
            Ok(ConfirmationStatus::Confirmed) => {}
            Ok(ConfirmationStatus::Failed(reason)) => {
                return Err(AgoraSdkError::TransactionFailed {
                    signature: Some(signature),
                    reason,
                })
            }
            Ok(ConfirmationStatus::Expired) => {
                return Err(AgoraSdkError::TransactionFailed {
                    signature: Some(signature),
                    reason: "block-validity window elapsed without confirmation".to_string(),
                })
            }
            Err(err) => {
                return Err(AgoraSdkError::TransactionFailed {
                    signature: Some(signature),
                    reason: format!("confirmation check failed: {err}"),
                })
            }
        }

        match connection.get_transaction(&signature).await {
            Ok(Some(details)) => {
                if let Some(err) = details.err {
                    return Err(AgoraSdkError::TransactionFailed {
                        signature: Some(signature),
                        reason: format!("execution error on re-fetch: {err}"),
                    });
                }
            }
            Ok(None) => {
                return Err(AgoraSdkError::TransactionFailed {
                    signature: Some(signature),
                    reason: "confirmed but not found on re-fetch".to_string(),
                })
            }
            Err(err) => {
                return Err(AgoraSdkError::TransactionFailed {
                    signature: Some(signature),
                    reason: format!("re-fetch failed: {err}"),
                })
            }
        }

        info!(%signature, "payment confirmed and verified");
        Ok(TransferReceipt { signature, split })
    }
}
