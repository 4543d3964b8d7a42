#![allow(dead_code)]

use agora_ledger::{LedgerConfig, MemoryCatalog, MemoryStore, PurchaseLedger};
use agora_sdk::{
    BalanceChange, BlockhashInfo, ChainConnection, ConfirmationStatus, ConnectionError,
    TransactionDetails,
};
use agora_state::{CreateTransactionInput, FeeSplit, ItemKind, MarketplaceItem};
use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Chain double that answers `get_transaction` from a scripted map. The
/// ledger only ever reads; everything else is unreachable from these
/// tests.
pub struct MockChain {
    transactions: Mutex<HashMap<Signature, TransactionDetails>>,
    pub fetch_calls: AtomicU32,
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            transactions: Mutex::new(HashMap::new()),
            fetch_calls: AtomicU32::new(0),
        }
    }

    pub fn script(&self, signature: Signature, details: TransactionDetails) {
        self.transactions.lock().unwrap().insert(signature, details);
    }

    pub fn fetch_calls(&self) -> u32 {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainConnection for MockChain {
    async fn get_latest_blockhash(&self) -> Result<BlockhashInfo, ConnectionError> {
        Err(ConnectionError::from("not used by the ledger"))
    }

    async fn send_transaction(&self, _tx: &Transaction) -> Result<Signature, ConnectionError> {
        Err(ConnectionError::from("not used by the ledger"))
    }

    async fn confirm_transaction(
        &self,
        _signature: &Signature,
        _blockhash: &BlockhashInfo,
    ) -> Result<ConfirmationStatus, ConnectionError> {
        Err(ConnectionError::from("not used by the ledger"))
    }

    async fn get_transaction(
        &self,
        signature: &Signature,
    ) -> Result<Option<TransactionDetails>, ConnectionError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.transactions.lock().unwrap().get(signature).cloned())
    }

    async fn get_balance(&self, _address: &Pubkey) -> Result<u64, ConnectionError> {
        Err(ConnectionError::from("not used by the ledger"))
    }
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub catalog: Arc<MemoryCatalog>,
    pub chain: Arc<MockChain>,
    pub platform_wallet: Pubkey,
    pub ledger: PurchaseLedger,
    pub item: MarketplaceItem,
    pub buyer_wallet: Pubkey,
}

pub const TEST_MAX_AGE: Duration = Duration::from_secs(60);

pub fn harness_with_item(item: MarketplaceItem) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let catalog = Arc::new(MemoryCatalog::new(vec![item.clone()]));
    let chain = Arc::new(MockChain::new());
    let platform_wallet = Pubkey::new_unique();
    let config = LedgerConfig {
        rpc_url: Some("http://mock".to_string()),
        platform_wallet: Some(platform_wallet),
        max_transaction_age: TEST_MAX_AGE,
    };
    let ledger = PurchaseLedger::new(store.clone(), catalog.clone(), chain.clone(), config);
    Harness {
        store,
        catalog,
        chain,
        platform_wallet,
        ledger,
        item,
        buyer_wallet: Pubkey::new_unique(),
    }
}

pub fn harness() -> Harness {
    harness_with_item(paid_item(1_000_000_000))
}

pub fn paid_item(price_lamports: u64) -> MarketplaceItem {
    MarketplaceItem {
        id: "item-1".to_string(),
        kind: ItemKind::Agent,
        name: "Trading swarm".to_string(),
        price_lamports,
        is_free: false,
        seller_wallet: Pubkey::new_unique(),
        seller_user_id: "seller-1".to_string(),
        owner_user_id: "seller-1".to_string(),
    }
}

pub fn signature(byte: u8) -> Signature {
    Signature::from([byte; 64])
}

impl Harness {
    /// A well-formed input matching the harness item and buyer.
    pub fn input(&self, buyer_id: &str, sig: Signature) -> CreateTransactionInput {
        CreateTransactionInput {
            buyer_id: buyer_id.to_string(),
            seller_id: self.item.seller_user_id.clone(),
            item_id: self.item.id.clone(),
            item_kind: self.item.kind,
            amount_lamports: self.item.price_lamports,
            transaction_signature: sig,
            buyer_wallet: self.buyer_wallet,
            seller_wallet: self.item.seller_wallet,
        }
    }

    /// Script a clean on-chain transaction for `sig` whose transfers match
    /// the item's expected split, landed `age` ago.
    pub fn script_valid_tx(&self, sig: Signature, age: Duration) {
        let split = agora_state::split_price(self.item.price_lamports);
        self.chain
            .script(sig, self.details(split, age, None));
    }

    pub fn details(
        &self,
        split: FeeSplit,
        age: Duration,
        err: Option<String>,
    ) -> TransactionDetails {
        let block_time = chrono::Utc::now().timestamp() - age.as_secs() as i64;
        TransactionDetails {
            slot: 100,
            block_time: Some(block_time),
            err,
            balance_changes: vec![
                BalanceChange {
                    // The buyer pays both legs plus the network fee.
                    address: self.buyer_wallet,
                    delta_lamports: -(split.total() as i64) - 5_000,
                },
                BalanceChange {
                    address: self.item.seller_wallet,
                    delta_lamports: split.seller_lamports as i64,
                },
                BalanceChange {
                    address: self.platform_wallet,
                    delta_lamports: split.platform_lamports as i64,
                },
            ],
        }
    }
}
