use crate::core::connection::{
    BalanceChange, BlockhashInfo, ChainConnection, ConfirmationStatus, ConnectionError,
    TransactionDetails,
};
use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcTransactionConfig;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use solana_transaction_status::{TransactionStatus, UiTransactionEncoding};
use std::time::Duration;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// `ChainConnection` over a JSON-RPC node at `confirmed` commitment.
pub struct RpcConnection {
    client: RpcClient,
    commitment: CommitmentConfig,
    poll_interval: Duration,
}

impl RpcConnection {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_commitment(url, CommitmentConfig::confirmed())
    }

    pub fn with_commitment(url: impl Into<String>, commitment: CommitmentConfig) -> Self {
        Self {
            client: RpcClient::new_with_commitment(url.into(), commitment),
            commitment,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    fn status_outcome(&self, status: &TransactionStatus) -> Option<ConfirmationStatus> {
        if !status.satisfies_commitment(self.commitment) {
            return None;
        }
        Some(match &status.err {
            Some(err) => ConfirmationStatus::Failed(err.to_string()),
            None => ConfirmationStatus::Confirmed,
        })
    }
}

#[async_trait]
impl ChainConnection for RpcConnection {
    async fn get_latest_blockhash(&self) -> Result<BlockhashInfo, ConnectionError> {
        let (blockhash, last_valid_block_height) = self
            .client
            .get_latest_blockhash_with_commitment(self.commitment)
            .await?;
        Ok(BlockhashInfo {
            blockhash,
            last_valid_block_height,
        })
    }

    async fn send_transaction(&self, tx: &Transaction) -> Result<Signature, ConnectionError> {
        Ok(self.client.send_transaction(tx).await?)
    }

    async fn confirm_transaction(
        &self,
        signature: &Signature,
        blockhash: &BlockhashInfo,
    ) -> Result<ConfirmationStatus, ConnectionError> {
        loop {
            let statuses = self.client.get_signature_statuses(&[*signature]).await?;
            if let Some(status) = statuses.value.first().and_then(|s| s.as_ref()) {
                if let Some(outcome) = self.status_outcome(status) {
                    return Ok(outcome);
                }
            }

            if !self
                .client
                .is_blockhash_valid(&blockhash.blockhash, self.commitment)
                .await?
            {
                // The transaction can land in the same slot the blockhash
                // expires; take one final look before declaring expiry.
                let statuses = self.client.get_signature_statuses(&[*signature]).await?;
                if let Some(status) = statuses.value.first().and_then(|s| s.as_ref()) {
                    if let Some(outcome) = self.status_outcome(status) {
                        return Ok(outcome);
                    }
                }
                return Ok(ConfirmationStatus::Expired);
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn get_transaction(
        &self,
        signature: &Signature,
    ) -> Result<Option<TransactionDetails>, ConnectionError> {
        // getTransaction errors on unknown signatures; probe the status
        // index (which answers null cleanly) before fetching the body.
        let statuses = self
            .client
            .get_signature_statuses_with_history(&[*signature])
            .await?;
        if statuses.value.first().and_then(|s| s.as_ref()).is_none() {
            return Ok(None);
        }

        let confirmed = self
            .client
            .get_transaction_with_config(
                signature,
                RpcTransactionConfig {
                    encoding: Some(UiTransactionEncoding::Base64),
                    commitment: Some(self.commitment),
                    max_supported_transaction_version: Some(0),
                },
            )
            .await?;

        let meta = confirmed
            .transaction
            .meta
            .ok_or_else(|| ConnectionError::from("transaction has no metadata"))?;
        let decoded = confirmed
            .transaction
            .transaction
            .decode()
            .ok_or_else(|| ConnectionError::from("transaction payload could not be decoded"))?;

        let balance_changes = decoded
            .message
            .static_account_keys()
            .iter()
            .zip(meta.pre_balances.iter().zip(meta.post_balances.iter()))
            .map(|(address, (pre, post))| BalanceChange {
                address: *address,
                delta_lamports: *post as i64 - *pre as i64,
            })
            .collect();

        Ok(Some(TransactionDetails {
            slot: confirmed.slot,
            block_time: confirmed.block_time,
            err: meta.err.map(|err| err.to_string()),
            balance_changes,
        }))
    }

    async fn get_balance(&self, address: &Pubkey) -> Result<u64, ConnectionError> {
        Ok(self.client.get_balance(address).await?)
    }
}
