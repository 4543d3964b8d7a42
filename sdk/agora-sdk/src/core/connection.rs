use async_trait::async_trait;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use std::error::Error;

pub type ConnectionError = Box<dyn Error + Send + Sync>;

/// A blockhash plus the height at which it stops being accepted.
/// Confirmation waits are bounded by this window, not by a wall-clock timer.
#[derive(Debug, Clone, Copy)]
pub struct BlockhashInfo {
    pub blockhash: Hash,
    pub last_valid_block_height: u64,
}

/// Outcome of waiting on a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationStatus {
    Confirmed,
    /// The chain reported an execution error; the payload is kept for
    /// diagnostics.
    Failed(String),
    /// The blockhash validity window elapsed without the transaction
    /// reaching the requested commitment.
    Expired,
}

/// Net lamport movement for one account within a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceChange {
    pub address: Pubkey,
    pub delta_lamports: i64,
}

/// A finalized transaction reduced to what purchase verification needs:
/// where it landed, whether it errored, and who gained or lost what.
#[derive(Debug, Clone)]
pub struct TransactionDetails {
    pub slot: u64,
    pub block_time: Option<i64>,
    pub err: Option<String>,
    pub balance_changes: Vec<BalanceChange>,
}

impl TransactionDetails {
    /// Net lamport delta for `address`; zero if the account was untouched.
    pub fn delta_for(&self, address: &Pubkey) -> i64 {
        self.balance_changes
            .iter()
            .find(|change| change.address == *address)
            .map(|change| change.delta_lamports)
            .unwrap_or(0)
    }
}

#[async_trait]
pub trait ChainConnection: Send + Sync {
    async fn get_latest_blockhash(&self) -> Result<BlockhashInfo, ConnectionError>;
    async fn send_transaction(&self, tx: &Transaction) -> Result<Signature, ConnectionError>;
    /// Wait for `signature` to reach commitment, bounded by the validity
    /// window of `blockhash`.
    async fn confirm_transaction(
        &self,
        signature: &Signature,
        blockhash: &BlockhashInfo,
    ) -> Result<ConfirmationStatus, ConnectionError>;
    /// Fetch a transaction by signature. `None` means the chain does not
    /// know it at the connection's commitment level.
    async fn get_transaction(
        &self,
        signature: &Signature,
    ) -> Result<Option<TransactionDetails>, ConnectionError>;
    async fn get_balance(&self, address: &Pubkey) -> Result<u64, ConnectionError>;
}
