use crate::core::connection::ChainConnection;
use crate::core::wallet::{AccountSubscription, WalletAdapter};
use crate::error::{AgoraSdkError, Result};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::Transaction;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

#[derive(Debug, Default, Clone)]
struct SessionState {
    address: Option<Pubkey>,
    connecting: bool,
    balance_lamports: u64,
}

/// One browser tab's (or one process's) wallet session.
///
/// Explicitly constructed and passed to whatever needs it; nothing here is
/// global. The session subscribes to the provider's account-change events
/// for its whole lifetime and replaces its state wholesale when the active
/// account switches. Dropping the session (or calling [`detach`]) cancels
/// the subscription.
///
/// [`detach`]: WalletSession::detach
pub struct WalletSession {
    adapter: Arc<dyn WalletAdapter>,
    connection: Arc<dyn ChainConnection>,
    state: Arc<Mutex<SessionState>>,
    subscription: Option<AccountSubscription>,
}

impl WalletSession {
    pub fn attach(adapter: Arc<dyn WalletAdapter>, connection: Arc<dyn ChainConnection>) -> Self {
        let state = Arc::new(Mutex::new(SessionState::default()));
        let listener_state = Arc::clone(&state);
        let subscription = adapter.subscribe_account_change(Box::new(move |address| {
            // Replace, never merge: a switched account starts from a clean
            // slate and a zero (stale) balance until refreshed.
            let mut session = listener_state.lock().unwrap();
            *session = SessionState {
                address,
                connecting: false,
                balance_lamports: 0,
            };
        }));

        Self {
            adapter,
            connection,
            state,
            subscription: Some(subscription),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap()
    }

    pub fn address(&self) -> Option<Pubkey> {
        self.state().address
    }

    pub fn is_connected(&self) -> bool {
        self.state().address.is_some()
    }

    pub fn is_connecting(&self) -> bool {
        self.state().connecting
    }

    /// Last fetched balance. Zero until the first successful refresh.
    pub fn balance_lamports(&self) -> u64 {
        self.state().balance_lamports
    }

    /// Request an interactive connection from the provider.
    ///
    /// At most one connect may be in flight; a second call while one is
    /// outstanding fails with `ConnectionPending`. No automatic retry.
    pub async fn connect(&self) -> Result<Pubkey> {
        {
            let mut session = self.state();
            if session.connecting {
                return Err(AgoraSdkError::ConnectionPending);
            }
            session.connecting = true;
        }

        let result = self.adapter.connect(false).await;

        let mut session = self.state();
        session.connecting = false;
        match result {
            Ok(address) => {
                session.address = Some(address);
                Ok(address)
            }
            Err(err) => Err(AgoraSdkError::from_wallet(err)),
        }
    }

    /// Silent connect for providers that already trust this origin. Runs
    /// once on mount; failures are expected and swallowed.
    pub async fn auto_connect_if_trusted(&self) {
        match self.adapter.connect(true).await {
            Ok(address) => {
                self.state().address = Some(address);
            }
            Err(err) => {
                debug!(%err, "silent wallet connect declined");
            }
        }
    }

    /// Best-effort provider disconnect; local state is cleared regardless
    /// of what the provider says.
    pub async fn disconnect(&self) {
        if let Err(err) = self.adapter.disconnect().await {
            warn!(%err, "wallet disconnect reported an error; clearing session anyway");
        }
        *self.state() = SessionState::default();
    }

    /// Refresh the cached balance for the given address, or the active one.
    /// A failed query keeps the previous value: stale-but-available beats
    /// blocking the UI.
    pub async fn refresh_balance(&self, address: Option<Pubkey>) {
        let Some(address) = address.or_else(|| self.address()) else {
            return;
        };
        match self.connection.get_balance(&address).await {
            Ok(balance) => {
                self.state().balance_lamports = balance;
            }
            Err(err) => {
                warn!(%err, %address, "balance refresh failed; keeping previous value");
            }
        }
    }

    /// Sign a fully built transaction with the connected wallet.
    pub async fn sign_transaction(&self, tx: Transaction) -> Result<Transaction> {
        if !self.is_connected() {
            return Err(AgoraSdkError::WalletNotConnected);
        }
        self.adapter
            .sign_transaction(tx)
            .await
            .map_err(AgoraSdkError::from_wallet)
    }

    /// Explicit teardown: cancel the account-change subscription and clear
    /// the provider connection. Equivalent to dropping the session, plus
    /// the best-effort provider disconnect.
    pub async fn detach(mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.disconnect().await;
    }
}
