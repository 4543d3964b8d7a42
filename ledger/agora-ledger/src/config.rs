use crate::error::{LedgerError, Result};
use solana_sdk::pubkey::Pubkey;
use std::env;
use std::time::Duration;
use tracing::warn;

pub const RPC_URL_ENV: &str = "AGORA_RPC_URL";
pub const PLATFORM_WALLET_ENV: &str = "AGORA_PLATFORM_WALLET";
pub const MAX_TX_AGE_ENV: &str = "AGORA_MAX_TX_AGE_SECS";

const DEFAULT_MAX_TX_AGE: Duration = Duration::from_secs(300);

/// Server-side deployment configuration.
///
/// `max_transaction_age` bounds how old a submitted transaction may be and
/// still be accepted for recording; it exists to keep stale or unrelated
/// past transactions from being replayed into fresh purchase records, and
/// deployments tune it rather than relying on a magic constant.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub rpc_url: Option<String>,
    pub platform_wallet: Option<Pubkey>,
    pub max_transaction_age: Duration,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            platform_wallet: None,
            max_transaction_age: DEFAULT_MAX_TX_AGE,
        }
    }
}

impl LedgerConfig {
    /// Load from the environment (a `.env` file is honored if present).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let rpc_url = env::var(RPC_URL_ENV).ok().filter(|url| !url.is_empty());
        let platform_wallet = match env::var(PLATFORM_WALLET_ENV) {
            Ok(raw) if !raw.is_empty() => match raw.parse::<Pubkey>() {
                Ok(address) => Some(address),
                Err(err) => {
                    warn!(%err, "{PLATFORM_WALLET_ENV} is not a valid address");
                    None
                }
            },
            _ => None,
        };
        let max_transaction_age = env::var(MAX_TX_AGE_ENV)
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_MAX_TX_AGE);

        Self {
            rpc_url,
            platform_wallet,
            max_transaction_age,
        }
    }

    pub fn with_max_transaction_age(mut self, age: Duration) -> Self {
        self.max_transaction_age = age;
        self
    }

    pub fn require_rpc_url(&self) -> Result<&str> {
        self.rpc_url.as_deref().ok_or(LedgerError::RpcNotConfigured)
    }

    pub fn require_platform_wallet(&self) -> Result<Pubkey> {
        self.platform_wallet
            .ok_or(LedgerError::PlatformWalletNotConfigured)
    }
}
