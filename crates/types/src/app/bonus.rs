// Path: crates/types/src/app/bonus.rs
//! Pending-bonus ledgers and referral payout records.

use crate::amount::ShareAmount;
use crate::ids::{AccountId, AssetId, BonusBalancesId};
use crate::time::{TimePoint, DAY_SECS};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One contributing referral in a payout's provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct ChildBalance {
    /// The referred account.
    pub account: AccountId,
    /// The balance it contributed to the payout.
    pub amount: u64,
}

/// A referral payout: quantity plus the provenance used to audit it.
#[derive(
    Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode,
)]
pub struct ReferralBalanceInfo {
    /// Satoshis earned through the referral tree.
    pub quantity: u64,
    /// Referral rank at payout time.
    pub rank: String,
    /// Contributing referrals.
    pub history: Vec<ChildBalance>,
}

/// One day's worth of pending bonuses for an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct BonusBalanceEntry {
    /// The instant the entry's bonuses were earned.
    pub bonus_time: TimePoint,
    /// Pending per-asset bonus amounts.
    pub balances: BTreeMap<AssetId, ShareAmount>,
    /// Pending referral earnings.
    pub referral: ReferralBalanceInfo,
}

/// Ledger of not-yet-released daily bonuses for one account, bucketed by day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct BonusBalances {
    /// This row's id.
    pub id: BonusBalancesId,
    /// Owning account.
    pub owner: AccountId,
    /// Asset in which referral earnings are denominated.
    pub referral_balance_asset: AssetId,
    /// Entries, oldest first; at most one per day bucket.
    pub balances_by_date: Vec<BonusBalanceEntry>,
}

/// Day bucket an instant falls into.
fn day_bucket(time: TimePoint) -> u64 {
    time.secs() / DAY_SECS
}

impl BonusBalances {
    /// Builds an empty ledger for `owner`.
    pub fn new(id: BonusBalancesId, owner: AccountId, referral_balance_asset: AssetId) -> Self {
        BonusBalances {
            id,
            owner,
            referral_balance_asset,
            balances_by_date: Vec::new(),
        }
    }

    /// The entry for `time`'s day bucket, created on demand.
    pub fn entry_for_mut(&mut self, time: TimePoint) -> &mut BonusBalanceEntry {
        let bucket = day_bucket(time);
        let pos = self
            .balances_by_date
            .iter()
            .position(|e| day_bucket(e.bonus_time) == bucket)
            .unwrap_or_else(|| {
                self.balances_by_date.push(BonusBalanceEntry {
                    bonus_time: time,
                    balances: BTreeMap::new(),
                    referral: ReferralBalanceInfo::default(),
                });
                self.balances_by_date.len() - 1
            });
        &mut self.balances_by_date[pos]
    }

    /// Adds a pending bonus amount to `time`'s day bucket.
    pub fn adjust_balance(&mut self, asset: AssetId, amount: ShareAmount, time: TimePoint) {
        let entry = self.entry_for_mut(time);
        *entry.balances.entry(asset).or_insert(0) += amount;
    }

    /// Records referral earnings in `time`'s day bucket.
    pub fn add_referral(&mut self, info: ReferralBalanceInfo, time: TimePoint) {
        let entry = self.entry_for_mut(time);
        entry.referral.quantity += info.quantity;
        entry.referral.rank = info.rank;
        entry.referral.history.extend(info.history);
    }

    /// Removes and returns every entry strictly older than `cutoff`'s day.
    pub fn drain_matured(&mut self, cutoff: TimePoint) -> Vec<BonusBalanceEntry> {
        let cutoff_bucket = day_bucket(cutoff);
        let (matured, pending): (Vec<_>, Vec<_>) = self
            .balances_by_date
            .drain(..)
            .partition(|e| day_bucket(e.bonus_time) < cutoff_bucket);
        self.balances_by_date = pending;
        matured
    }
}
