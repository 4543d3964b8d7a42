use crate::error::{AgoraSdkError, Result};
use solana_sdk::pubkey::Pubkey;
use std::env;
use std::time::Duration;
use tracing::warn;

pub const RPC_URL_ENV: &str = "AGORA_RPC_URL";
pub const PLATFORM_WALLET_ENV: &str = "AGORA_PLATFORM_WALLET";
pub const CONFIRM_POLL_MS_ENV: &str = "AGORA_CONFIRM_POLL_MS";

const DEFAULT_CONFIRM_POLL: Duration = Duration::from_millis(500);

/// Deployment configuration consumed by the purchase flow.
///
/// The RPC endpoint and platform wallet are required for purchases to
/// work, but absence is reported at preflight (`RpcNotConfigured` /
/// `PlatformWalletNotConfigured`) rather than at load, so a misconfigured
/// deployment fails with a precise error the first time a purchase is
/// attempted.
#[derive(Debug, Clone)]
pub struct PurchaseConfig {
    pub rpc_url: Option<String>,
    pub platform_wallet: Option<Pubkey>,
    /// How often the confirmation loop re-asks the chain for a status.
    pub confirm_poll_interval: Duration,
}

impl Default for PurchaseConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            platform_wallet: None,
            confirm_poll_interval: DEFAULT_CONFIRM_POLL,
        }
    }
}

impl PurchaseConfig {
    pub fn new(rpc_url: Option<String>, platform_wallet: Option<Pubkey>) -> Self {
        Self {
            rpc_url,
            platform_wallet,
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
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
        let confirm_poll_interval = env::var(CONFIRM_POLL_MS_ENV)
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_CONFIRM_POLL);
        Self {
            rpc_url,
            platform_wallet,
            confirm_poll_interval,
        }
    }

    pub fn require_rpc_url(&self) -> Result<&str> {
        self.rpc_url
            .as_deref()
            .ok_or(AgoraSdkError::RpcNotConfigured)
    }

    pub fn require_platform_wallet(&self) -> Result<Pubkey> {
        self.platform_wallet
            .ok_or(AgoraSdkError::PlatformWalletNotConfigured)
    }
}
