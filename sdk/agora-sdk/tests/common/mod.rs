#![allow(dead_code)]

use agora_sdk::core::wallet::{AccountChangeListener, AccountSubscription};
use agora_sdk::{
    BlockhashInfo, ChainConnection, ConfirmationStatus, ConnectionError, LedgerApi,
    LedgerApiError, TransactionDetails, WalletAdapter, WalletError,
};
use agora_state::{CreateTransactionInput, ItemKind, MarketplaceItem, PurchaseRecord};
use async_trait::async_trait;
use chrono::Utc;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

pub fn test_item(price_lamports: u64) -> MarketplaceItem {
    MarketplaceItem {
        id: "item-1".to_string(),
        kind: ItemKind::Prompt,
        name: "Test prompt".to_string(),
        price_lamports,
        is_free: false,
        seller_wallet: Pubkey::new_unique(),
        seller_user_id: "seller-1".to_string(),
        owner_user_id: "seller-1".to_string(),
    }
}

pub fn free_item() -> MarketplaceItem {
    MarketplaceItem {
        is_free: true,
        ..test_item(0)
    }
}

/// Scripted chain connection; counts every network call so preflight
/// tests can assert none happened.
pub struct MockConnection {
    pub network_calls: AtomicU32,
    pub sent: Mutex<Vec<Transaction>>,
    confirm_result: Mutex<ConfirmationStatus>,
    fetch_result: Mutex<FetchBehavior>,
    balance: Mutex<Result<u64, String>>,
}

pub enum FetchBehavior {
    Clean,
    NotFound,
    ExecutionError(String),
}

impl MockConnection {
    pub fn new() -> Self {
        Self {
            network_calls: AtomicU32::new(0),
            sent: Mutex::new(Vec::new()),
            confirm_result: Mutex::new(ConfirmationStatus::Confirmed),
            fetch_result: Mutex::new(FetchBehavior::Clean),
            balance: Mutex::new(Ok(0)),
        }
    }

    pub fn set_confirm(&self, status: ConfirmationStatus) {
        *self.confirm_result.lock().unwrap() = status;
    }

    pub fn set_fetch(&self, behavior: FetchBehavior) {
        *self.fetch_result.lock().unwrap() = behavior;
    }

    pub fn set_balance(&self, balance: Result<u64, String>) {
        *self.balance.lock().unwrap() = balance;
    }

    pub fn network_calls(&self) -> u32 {
        self.network_calls.load(Ordering::SeqCst)
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn last_sent(&self) -> Option<Transaction> {
        self.sent.lock().unwrap().last().cloned()
    }

    fn bump(&self) {
        self.network_calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChainConnection for MockConnection {
    async fn get_latest_blockhash(&self) -> Result<BlockhashInfo, ConnectionError> {
        self.bump();
        Ok(BlockhashInfo {
            blockhash: Hash::new_unique(),
            last_valid_block_height: 100,
        })
    }

    async fn send_transaction(&self, tx: &Transaction) -> Result<Signature, ConnectionError> {
        self.bump();
        self.sent.lock().unwrap().push(tx.clone());
        Ok(tx.signatures[0])
    }

    async fn confirm_transaction(
        &self,
        _signature: &Signature,
        _blockhash: &BlockhashInfo,
    ) -> Result<ConfirmationStatus, ConnectionError> {
        self.bump();
        Ok(self.confirm_result.lock().unwrap().clone())
    }

    async fn get_transaction(
        &self,
        _signature: &Signature,
    ) -> Result<Option<TransactionDetails>, ConnectionError> {
        self.bump();
        Ok(match &*self.fetch_result.lock().unwrap() {
            FetchBehavior::Clean => Some(TransactionDetails {
                slot: 1,
                block_time: Some(Utc::now().timestamp()),
                err: None,
                balance_changes: Vec::new(),
            }),
            FetchBehavior::NotFound => None,
            FetchBehavior::ExecutionError(err) => Some(TransactionDetails {
                slot: 1,
                block_time: Some(Utc::now().timestamp()),
                err: Some(err.clone()),
                balance_changes: Vec::new(),
            }),
        })
    }

    async fn get_balance(&self, _address: &Pubkey) -> Result<u64, ConnectionError> {
        self.bump();
        self.balance
            .lock()
            .unwrap()
            .clone()
            .map_err(ConnectionError::from)
    }
}

pub enum ConnectBehavior {
    Accept,
    AcceptAfter(Duration),
    Reject,
    NotFound,
    Pending,
}

/// Keypair-backed wallet with scripted connect behavior and a real
/// account-change listener slot.
pub struct MockWallet {
    keypair: Keypair,
    pub connect_behavior: Mutex<ConnectBehavior>,
    pub reject_sign: AtomicBool,
    pub sign_calls: AtomicU32,
    listener: Arc<Mutex<Option<AccountChangeListener>>>,
}

impl MockWallet {
    pub fn new() -> Self {
        Self {
            keypair: Keypair::new(),
            connect_behavior: Mutex::new(ConnectBehavior::Accept),
            reject_sign: AtomicBool::new(false),
            sign_calls: AtomicU32::new(0),
            listener: Arc::new(Mutex::new(None)),
        }
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    pub fn set_connect(&self, behavior: ConnectBehavior) {
        *self.connect_behavior.lock().unwrap() = behavior;
    }

    pub fn has_listener(&self) -> bool {
        self.listener.lock().unwrap().is_some()
    }

    pub fn fire_account_change(&self, address: Option<Pubkey>) {
        if let Some(listener) = &*self.listener.lock().unwrap() {
            listener(address);
        }
    }
}

#[async_trait]
impl WalletAdapter for MockWallet {
    async fn connect(&self, _silent: bool) -> Result<Pubkey, WalletError> {
        let delay = match &*self.connect_behavior.lock().unwrap() {
            ConnectBehavior::Accept => None,
            ConnectBehavior::AcceptAfter(delay) => Some(*delay),
            ConnectBehavior::Reject => return Err(WalletError::Rejected),
            ConnectBehavior::NotFound => return Err(WalletError::NotFound),
            ConnectBehavior::Pending => return Err(WalletError::Pending),
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.keypair.pubkey())
    }

    async fn disconnect(&self) -> Result<(), WalletError> {
        Ok(())
    }

    async fn sign_transaction(&self, mut tx: Transaction) -> Result<Transaction, WalletError> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_sign.load(Ordering::SeqCst) {
            return Err(WalletError::Rejected);
        }
        let blockhash = tx.message.recent_blockhash;
        tx.try_sign(&[&self.keypair], blockhash)
            .map_err(|err| WalletError::Other(err.to_string()))?;
        Ok(tx)
    }

    fn subscribe_account_change(&self, listener: AccountChangeListener) -> AccountSubscription {
        *self.listener.lock().unwrap() = Some(listener);
        let slot = Arc::clone(&self.listener);
        AccountSubscription::new(move || {
            *slot.lock().unwrap() = None;
        })
    }
}

/// In-memory ledger double with call counters and a configurable
/// visibility lag on the read path.
pub struct MockLedger {
    purchases: Mutex<HashSet<(String, String, ItemKind)>>,
    pub create_calls: AtomicU32,
    pub check_calls: AtomicU32,
    hidden_checks: AtomicU32,
    reject_create: Mutex<Option<String>>,
    fail_checks: AtomicBool,
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            purchases: Mutex::new(HashSet::new()),
            create_calls: AtomicU32::new(0),
            check_calls: AtomicU32::new(0),
            hidden_checks: AtomicU32::new(0),
            reject_create: Mutex::new(None),
            fail_checks: AtomicBool::new(false),
        }
    }

    /// Record a pre-existing purchase.
    pub fn seed_purchase(&self, buyer_id: &str, item_id: &str, kind: ItemKind) {
        self.purchases
            .lock()
            .unwrap()
            .insert((buyer_id.to_string(), item_id.to_string(), kind));
    }

    /// The next `count` checks return false even for recorded purchases,
    /// simulating read-path lag.
    pub fn set_hidden_checks(&self, count: u32) {
        self.hidden_checks.store(count, Ordering::SeqCst);
    }

    pub fn set_reject_create(&self, reason: &str) {
        *self.reject_create.lock().unwrap() = Some(reason.to_string());
    }

    pub fn set_fail_checks(&self, fail: bool) {
        self.fail_checks.store(fail, Ordering::SeqCst);
    }

    pub fn create_calls(&self) -> u32 {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn check_calls(&self) -> u32 {
        self.check_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerApi for MockLedger {
    async fn create_transaction(
        &self,
        input: CreateTransactionInput,
    ) -> Result<PurchaseRecord, LedgerApiError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &*self.reject_create.lock().unwrap() {
            return Err(LedgerApiError::InvalidTransaction(reason.clone()));
        }
        self.purchases.lock().unwrap().insert((
            input.buyer_id.clone(),
            input.item_id.clone(),
            input.item_kind,
        ));
        Ok(PurchaseRecord {
            id: Uuid::new_v4(),
            buyer_id: input.buyer_id,
            seller_id: input.seller_id,
            item_id: input.item_id,
            item_kind: input.item_kind,
            amount_lamports: input.amount_lamports,
            transaction_signature: input.transaction_signature,
            buyer_wallet: input.buyer_wallet,
            seller_wallet: input.seller_wallet,
            created_at: Utc::now(),
        })
    }

    async fn check_user_purchase(
        &self,
        buyer_id: &str,
        item_id: &str,
        kind: ItemKind,
    ) -> Result<bool, LedgerApiError> {
        self.check_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_checks.load(Ordering::SeqCst) {
            return Err(LedgerApiError::Unavailable("read path down".to_string()));
        }
        if self.hidden_checks.load(Ordering::SeqCst) > 0 {
            self.hidden_checks.fetch_sub(1, Ordering::SeqCst);
            return Ok(false);
        }
        Ok(self.purchases.lock().unwrap().contains(&(
            buyer_id.to_string(),
            item_id.to_string(),
            kind,
        )))
    }
}
