// Path: crates/types/src/app/asset.rs
//! Asset definitions and their dynamic data.

use crate::amount::{AssetAmount, ShareAmount};
use crate::ids::{AccountId, AssetId, BitassetDataId};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Daily-bonus configuration of an asset.
#[derive(
    Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode,
)]
pub struct AssetBonusParams {
    /// Whether the asset pays a daily bonus to holders.
    pub daily_bonus: bool,
    /// Bonus rate in [`crate::constants::FULL_PERCENT`] scale.
    pub bonus_percent: u16,
    /// Whether bonuses mature through the pending-bonus ledger instead of
    /// being issued immediately.
    pub maturing_bonus_balance: bool,
}

/// An asset definition. Mostly static; supply-tracking lives in
/// [`AssetDynamicData`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct Asset {
    /// This row's id.
    pub id: AssetId,
    /// Ticker symbol, unique chain-wide.
    pub symbol: String,
    /// Number of decimal digits of precision.
    pub precision: u8,
    /// The account that created the asset and may issue it.
    pub issuer: AccountId,
    /// Hard cap on `current_supply`.
    pub max_supply: ShareAmount,
    /// Daily-bonus configuration.
    pub params: AssetBonusParams,
    /// Account receiving buyback credits for this asset, when configured.
    pub buyback_account: Option<AccountId>,
}

impl Asset {
    /// Tags a raw satoshi amount with this asset's id.
    pub fn amount(&self, amount: ShareAmount) -> AssetAmount {
        AssetAmount::new(amount, self.id)
    }
}

/// Supply-tracking data of an asset, split off the definition so hot writes
/// stay cheap.
#[derive(
    Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode,
)]
pub struct AssetDynamicData {
    /// The asset this row tracks.
    pub asset: AssetId,
    /// Satoshis currently in existence (including collected fees).
    pub current_supply: ShareAmount,
    /// Fees collected in this asset, awaiting the next maintenance pass.
    pub accumulated_fees: ShareAmount,
}

impl AssetDynamicData {
    /// Satoshis not yet in existence: the reserve the budget draws from.
    pub fn reserved(&self, max_supply: ShareAmount) -> ShareAmount {
        max_supply - self.current_supply
    }
}

/// Market-pegged asset data. The maintenance pass only touches the
/// force-settlement volume counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct BitassetData {
    /// This row's id.
    pub id: BitassetDataId,
    /// The asset this row belongs to.
    pub asset: AssetId,
    /// Volume force-settled during the current maintenance interval.
    pub force_settled_volume: ShareAmount,
}
