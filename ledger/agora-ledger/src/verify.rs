use crate::error::{LedgerError, Result};
use agora_sdk::{ChainConnection, TransactionDetails};
use agora_state::{FeeSplit, ROUNDING_SLACK_LAMPORTS};
use chrono::{DateTime, Utc};
use serde_json::json;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use std::time::Duration;
use tracing::warn;

/// What the named transaction must have actually done on-chain.
#[derive(Debug, Clone, Copy)]
pub struct ExpectedTransfer {
    pub buyer_wallet: Pubkey,
    pub seller_wallet: Pubkey,
    pub platform_wallet: Pubkey,
    pub split: FeeSplit,
}

impl ExpectedTransfer {
    /// Expected credits accumulated per address. Seller and platform are
    /// normally distinct; when they coincide (a platform-owned listing)
    /// the legs merge into one expectation.
    fn expected_credits(&self) -> Vec<(Pubkey, u64)> {
        let mut credits: Vec<(Pubkey, u64)> = vec![(self.seller_wallet, self.split.seller_lamports)];
        if self.split.platform_lamports > 0 {
            match credits.iter_mut().find(|(addr, _)| *addr == self.platform_wallet) {
                Some((_, lamports)) => *lamports += self.split.platform_lamports,
                None => credits.push((self.platform_wallet, self.split.platform_lamports)),
            }
        }
        credits
    }
}

fn mismatch(signature: &Signature, expected: &ExpectedTransfer, details: &TransactionDetails) -> LedgerError {
    let diagnostics = json!({
        "expected": expected
            .expected_credits()
            .iter()
            .map(|(address, lamports)| json!({ "address": address.to_string(), "lamports": lamports }))
            .collect::<Vec<_>>(),
        "observed": details
            .balance_changes
            .iter()
            .map(|change| json!({ "address": change.address.to_string(), "delta": change.delta_lamports }))
            .collect::<Vec<_>>(),
    });
    warn!(%signature, %diagnostics, "on-chain transfers do not match the expected split");
    LedgerError::InvalidTransaction(format!("transfer amounts do not match: {diagnostics}"))
}

/// Check that `signature` names a live, recent transaction whose transfers
/// match the expected split. Nothing is recorded if any check fails.
pub async fn verify_on_chain(
    chain: &dyn ChainConnection,
    signature: &Signature,
    expected: &ExpectedTransfer,
    max_age: Duration,
    now: DateTime<Utc>,
) -> Result<()> {
    let details = chain
        .get_transaction(signature)
        .await
        .map_err(|err| LedgerError::Chain(err.to_string()))?
        .ok_or_else(|| LedgerError::InvalidTransaction("transaction not found on chain".to_string()))?;

    if let Some(err) = &details.err {
        return Err(LedgerError::InvalidTransaction(format!(
            "transaction failed on-chain: {err}"
        )));
    }

    let Some(block_time) = details.block_time else {
        return Err(LedgerError::InvalidTransaction(
            "transaction has no block time".to_string(),
        ));
    };
    let age_secs = (now.timestamp() - block_time).max(0);
    if age_secs as u64 > max_age.as_secs() {
        return Err(LedgerError::InvalidTransaction(format!(
            "transaction is {age_secs}s old, outside the {}s acceptance window",
            max_age.as_secs()
        )));
    }

    let slack = ROUNDING_SLACK_LAMPORTS as i64;
    for (address, lamports) in expected.expected_credits() {
        let delta = details.delta_for(&address);
        if (delta - lamports as i64).abs() > slack {
            return Err(mismatch(signature, expected, &details));
        }
    }

    // The buyer must be the account that actually paid. Their debit is at
    // least the item total (they also cover the network fee).
    let total = expected.split.total() as i64;
    if details.delta_for(&expected.buyer_wallet) > -(total - slack) {
        return Err(mismatch(signature, expected, &details));
    }

    Ok(())
}
