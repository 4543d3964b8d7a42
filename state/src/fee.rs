//! Platform fee arithmetic.
//!
//! All amounts are integer lamports. The platform takes a fixed 10% cut of
//! every paid item; the seller leg is derived as the remainder so the two
//! legs always sum to the full price.

use serde::{Deserialize, Serialize};

/// Platform cut in basis points (10%).
pub const PLATFORM_FEE_BPS: u64 = 1_000;

const BPS_DENOMINATOR: u64 = 10_000;

/// Tolerance applied when matching observed on-chain transfers against the
/// expected legs. Clients that floor each leg independently can come up one
/// lamport short on a leg; the shortfall is bounded by this constant.
pub const ROUNDING_SLACK_LAMPORTS: u64 = 1;

/// A price divided into its seller and platform legs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    pub seller_lamports: u64,
    pub platform_lamports: u64,
}

impl FeeSplit {
    pub fn total(&self) -> u64 {
        self.seller_lamports + self.platform_lamports
    }
}

/// Split a price into seller and platform legs.
///
/// The platform leg is `floor(price * fee_rate)`; the seller leg is the
/// remainder. `seller_lamports + platform_lamports == price_lamports` holds
/// for every input.
pub fn split_price(price_lamports: u64) -> FeeSplit {
    let platform_lamports =
        (price_lamports as u128 * PLATFORM_FEE_BPS as u128 / BPS_DENOMINATOR as u128) as u64;
    FeeSplit {
        seller_lamports: price_lamports - platform_lamports,
        platform_lamports,
    }
}
