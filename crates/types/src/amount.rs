// Path: crates/types/src/amount.rs
//! Token amounts.

use crate::ids::AssetId;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// A signed satoshi amount of some asset.
///
/// Signed so that vote margins and supply deltas can be expressed directly;
/// balances themselves never go negative.
pub type ShareAmount = i64;

/// An amount tagged with the asset it denominates.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode,
)]
pub struct AssetAmount {
    /// The satoshi amount.
    pub amount: ShareAmount,
    /// The asset the amount is denominated in.
    pub asset_id: AssetId,
}

impl AssetAmount {
    /// Builds an amount of the given asset.
    pub const fn new(amount: ShareAmount, asset_id: AssetId) -> Self {
        AssetAmount { amount, asset_id }
    }
}
