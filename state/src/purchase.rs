use crate::item::ItemKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use uuid::Uuid;

/// The authoritative record that a buyer has paid for an item.
///
/// Written exactly once by the ledger after on-chain verification, never
/// mutated or deleted. Two uniqueness constraints guard it:
/// `(buyer_id, item_id, item_kind)` and `transaction_signature`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub id: Uuid,
    pub buyer_id: String,
    pub seller_id: String,
    pub item_id: String,
    pub item_kind: ItemKind,
    pub amount_lamports: u64,
    pub transaction_signature: Signature,
    pub buyer_wallet: Pubkey,
    pub seller_wallet: Pubkey,
    pub created_at: DateTime<Utc>,
}

/// Client-submitted request to record a purchase.
///
/// `amount_lamports` is an assertion, not an instruction: the ledger
/// re-derives the expected legs from the item's canonical price and only
/// cross-checks this value against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransactionInput {
    pub buyer_id: String,
    pub seller_id: String,
    pub item_id: String,
    pub item_kind: ItemKind,
    pub amount_lamports: u64,
    pub transaction_signature: Signature,
    pub buyer_wallet: Pubkey,
    pub seller_wallet: Pubkey,
}
