use serde::{Deserialize, Serialize};
use solana_sdk::native_token::lamports_to_sol;
use solana_sdk::pubkey::Pubkey;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The two purchasable item categories in the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Prompt,
    Agent,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Prompt => "prompt",
            ItemKind::Agent => "agent",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown item kind: {0}")]
pub struct ParseItemKindError(pub String);

impl FromStr for ItemKind {
    type Err = ParseItemKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prompt" => Ok(ItemKind::Prompt),
            "agent" => Ok(ItemKind::Agent),
            other => Err(ParseItemKindError(other.to_string())),
        }
    }
}

/// A marketplace listing as this core sees it.
///
/// Items are created and edited elsewhere; the purchase flow only reads
/// them. The canonical price is integer lamports; decimal SOL is a display
/// concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketplaceItem {
    pub id: String,
    pub kind: ItemKind,
    pub name: String,
    pub price_lamports: u64,
    pub is_free: bool,
    /// Where the seller leg of a purchase is paid.
    pub seller_wallet: Pubkey,
    pub seller_user_id: String,
    pub owner_user_id: String,
}

impl MarketplaceItem {
    /// Display price in SOL.
    pub fn price_sol(&self) -> f64 {
        lamports_to_sol(self.price_lamports)
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_user_id == user_id
    }
}
