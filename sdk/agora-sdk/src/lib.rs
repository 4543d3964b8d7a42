pub mod config;
pub mod core;
pub mod error;
pub mod gate;
pub mod ledger_api;
pub mod purchase;
pub mod session;

pub use crate::config::PurchaseConfig;
pub use crate::core::connection::{
    BalanceChange, BlockhashInfo, ChainConnection, ConfirmationStatus, ConnectionError,
    TransactionDetails,
};
pub use crate::core::rpc::RpcConnection;
pub use crate::core::wallet::{
    AccountChangeListener, AccountSubscription, KeypairWallet, WalletAdapter, WalletError,
};
pub use crate::error::{AgoraSdkError, Result};
pub use crate::gate::{AccessGate, GateState, UnlockReason};
pub use crate::ledger_api::{LedgerApi, LedgerApiError};
pub use crate::purchase::flow::{PurchaseFlow, PurchaseOutcome, RetryPolicy};
pub use crate::purchase::transfer::{PurchaseTransfer, TransferReceipt};
pub use crate::session::WalletSession;

pub mod state {
    pub use agora_state::{
        split_price, CreateTransactionInput, FeeSplit, ItemKind, MarketplaceItem, PurchaseRecord,
        PLATFORM_FEE_BPS, ROUNDING_SLACK_LAMPORTS,
    };
}
