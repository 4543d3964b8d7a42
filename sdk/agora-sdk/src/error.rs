use solana_sdk::signature::Signature;
use thiserror::Error;

use crate::core::wallet::WalletError;

/// SDK-specific error types for the purchase flow
#[derive(Debug, Error)]
pub enum AgoraSdkError {
    /// No wallet extension/provider is available to the caller
    #[error("no wallet provider detected")]
    ProviderNotFound,

    /// The user declined a connect or sign request
    #[error("wallet request rejected by user")]
    UserRejected,

    /// A connect request is already outstanding
    #[error("a wallet connection request is already pending")]
    ConnectionPending,

    /// A purchase was attempted without an established signer
    #[error("wallet not connected")]
    WalletNotConnected,

    /// No chain RPC endpoint configured (deployment misconfiguration)
    #[error("chain RPC endpoint is not configured")]
    RpcNotConfigured,

    /// No platform fee wallet configured (deployment misconfiguration)
    #[error("platform fee wallet is not configured")]
    PlatformWalletNotConfigured,

    /// The chain reported or implied an execution error. If the transaction
    /// was already submitted, `signature` identifies it so the user can
    /// follow up on a block explorer.
    #[error("transaction failed: {reason}")]
    TransactionFailed {
        signature: Option<Signature>,
        reason: String,
    },

    /// Connection or RPC error before anything was submitted
    #[error("connection error: {0}")]
    Connection(String),

    /// Wallet provider error outside the connect/sign taxonomy
    #[error("wallet error: {0}")]
    Wallet(String),

    /// The ledger declined or failed to record a purchase. `signature` is
    /// set when funds already moved on-chain.
    #[error("ledger error: {reason}")]
    Ledger {
        signature: Option<Signature>,
        reason: String,
    },
}

impl AgoraSdkError {
    pub(crate) fn from_wallet(err: WalletError) -> Self {
        match err {
            WalletError::NotFound => AgoraSdkError::ProviderNotFound,
            WalletError::Rejected => AgoraSdkError::UserRejected,
            WalletError::Pending => AgoraSdkError::ConnectionPending,
            WalletError::Other(msg) => AgoraSdkError::Wallet(msg),
        }
    }

    /// Whether re-running the whole purchase with a fresh transaction is
    /// safe. False once a transaction may already be live on-chain.
    pub fn is_retryable(&self) -> bool {
        self.submitted_signature().is_none()
    }

    /// The on-chain signature tied to this failure, when one was assigned.
    pub fn submitted_signature(&self) -> Option<Signature> {
        match self {
            AgoraSdkError::TransactionFailed { signature, .. }
            | AgoraSdkError::Ledger { signature, .. } => *signature,
            _ => None,
        }
    }

    /// User-facing message for the purchase UI. Every variant maps to a
    /// distinct, actionable string; failures tied to a submitted
    /// transaction include its signature for manual follow-up.
    pub fn user_message(&self) -> String {
        match self {
            AgoraSdkError::ProviderNotFound => {
                "No wallet found. Install a Solana wallet extension to continue.".to_string()
            }
            AgoraSdkError::UserRejected => {
                "Request cancelled in the wallet. You can try again.".to_string()
            }
            AgoraSdkError::ConnectionPending => {
                "A wallet connection is already in progress. Check your wallet popup.".to_string()
            }
            AgoraSdkError::WalletNotConnected => {
                "Connect your wallet before purchasing.".to_string()
            }
            AgoraSdkError::RpcNotConfigured | AgoraSdkError::PlatformWalletNotConfigured => {
                "Purchases are temporarily unavailable. Please contact support.".to_string()
            }
            AgoraSdkError::TransactionFailed { signature, .. } => match signature {
                Some(sig) => format!(
                    "The payment transaction failed. Check signature {sig} on a block explorer before retrying."
                ),
                None => "The payment transaction failed before it was submitted. You can retry."
                    .to_string(),
            },
            AgoraSdkError::Connection(_) => {
                "Could not reach the network. Check your connection and retry.".to_string()
            }
            AgoraSdkError::Wallet(msg) => format!("Wallet error: {msg}"),
            AgoraSdkError::Ledger { signature, .. } => match signature {
                Some(sig) => format!(
                    "Your payment went through but could not be recorded yet. Keep signature {sig} and contact support if access does not unlock."
                ),
                None => "The purchase could not be recorded. You can retry.".to_string(),
            },
        }
    }
}

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, AgoraSdkError>;
