use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;
use thiserror::Error;

/// Provider-level failures, one per user-facing outcome.
#[derive(Debug, Error)]
pub enum WalletError {
    /// No wallet provider is installed/injected
    #[error("wallet provider not found")]
    NotFound,

    /// The user declined the request
    #[error("request rejected by user")]
    Rejected,

    /// A connect request is already outstanding in the provider
    #[error("a request is already pending")]
    Pending,

    #[error("{0}")]
    Other(String),
}

pub type AccountChangeListener = Box<dyn Fn(Option<Pubkey>) + Send + Sync>;

/// Abstraction over an entity that can authorize payments.
/// This allows the flow to work with:
/// 1. Local Keypairs (backend/CLI)
/// 2. Injected wallet providers (interactive frontends)
#[async_trait]
pub trait WalletAdapter: Send + Sync {
    /// Request a connection. With `silent = true` the adapter must not
    /// prompt the user and should only succeed if it was previously
    /// trusted.
    async fn connect(&self, silent: bool) -> Result<Pubkey, WalletError>;

    async fn disconnect(&self) -> Result<(), WalletError>;

    /// Sign a fully built transaction (blockhash and fee payer attached).
    async fn sign_transaction(&self, tx: Transaction) -> Result<Transaction, WalletError>;

    /// Register for account-switch events. The returned handle owns the
    /// registration; dropping it unsubscribes.
    fn subscribe_account_change(&self, listener: AccountChangeListener) -> AccountSubscription;
}

/// Scoped registration for account-change events. Unsubscribes when
/// dropped or when `unsubscribe` is called explicitly.
pub struct AccountSubscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl AccountSubscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// For adapters that never emit account changes.
    pub fn none() -> Self {
        Self { cancel: None }
    }

    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for AccountSubscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

/// Local-keypair adapter for backend and CLI use. Always trusted, never
/// prompts, and never switches accounts.
pub struct KeypairWallet {
    keypair: Keypair,
}

impl KeypairWallet {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }
}

#[async_trait]
impl WalletAdapter for KeypairWallet {
    async fn connect(&self, _silent: bool) -> Result<Pubkey, WalletError> {
        Ok(self.keypair.pubkey())
    }

    async fn disconnect(&self) -> Result<(), WalletError> {
        Ok(())
    }

    async fn sign_transaction(&self, mut tx: Transaction) -> Result<Transaction, WalletError> {
        let blockhash = tx.message.recent_blockhash;
        tx.try_sign(&[&self.keypair], blockhash)
            .map_err(|err| WalletError::Other(err.to_string()))?;
        Ok(tx)
    }

    fn subscribe_account_change(&self, _listener: AccountChangeListener) -> AccountSubscription {
        AccountSubscription::none()
    }
}
