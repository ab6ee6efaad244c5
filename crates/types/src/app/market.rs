// Path: crates/types/src/app/market.rs
//! Limit orders, buyback programs, and fee-backed-asset pools.

use crate::amount::ShareAmount;
use crate::ids::{AccountId, AssetId, BuybackId, FbaAccumulatorId, LimitOrderId};
use crate::time::TimePoint;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// An open limit order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct LimitOrder {
    /// This row's id.
    pub id: LimitOrderId,
    /// Account that placed the order.
    pub seller: AccountId,
    /// Satoshis still on the book.
    pub for_sale: ShareAmount,
    /// Asset being sold.
    pub sell_asset: AssetId,
    /// Asset being bought.
    pub receive_asset: AssetId,
    /// Minimum total to receive for the full sale amount.
    pub min_to_receive: ShareAmount,
    /// When the order leaves the book on its own.
    pub expiration: TimePoint,
}

/// Registry row marking an asset as running a buyback program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct Buyback {
    /// This row's id.
    pub id: BuybackId,
    /// The asset whose buyback account sells its holdings each pass.
    pub asset_to_buy: AssetId,
}

/// Accumulator of fees earmarked for split distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct FbaAccumulator {
    /// This row's id.
    pub id: FbaAccumulatorId,
    /// Core-asset fees collected into this pool since the last pass.
    pub accumulated_fba_fees: ShareAmount,
    /// The asset whose buyback account and issuer receive the split.
    pub designated_asset: Option<AssetId>,
}

impl FbaAccumulator {
    /// A pool is configured once a designated asset has been chosen.
    pub fn is_configured(&self) -> bool {
        self.designated_asset.is_some()
    }
}
