// Path: crates/types/src/authority.rs
//! Multi-signature authority: a weight threshold plus per-account weights.

use crate::ids::AccountId;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-account weight inside an authority. 16 bits wide by protocol.
pub type Weight = u16;

/// An m-of-n style authority over accounts.
///
/// The authority is satisfied when the weights of approving accounts sum to
/// at least `weight_threshold`. Account weights are kept in a `BTreeMap` so
/// iteration order is deterministic.
#[derive(
    Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode,
)]
pub struct Authority {
    /// Minimum total weight required to act.
    pub weight_threshold: u32,
    /// Approving accounts and their weights.
    pub account_auths: BTreeMap<AccountId, Weight>,
}

impl Authority {
    /// Removes every account weight and zeroes the threshold.
    pub fn clear(&mut self) {
        self.weight_threshold = 0;
        self.account_auths.clear();
    }

    /// Adds `weight` to `account`, creating the entry if absent.
    pub fn add_account_weight(&mut self, account: AccountId, weight: Weight) {
        *self.account_auths.entry(account).or_insert(0) += weight;
    }

    /// Sum of all account weights.
    pub fn total_weight(&self) -> u64 {
        self.account_auths.values().map(|w| u64::from(*w)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_accumulates_per_account() {
        let mut auth = Authority::default();
        auth.add_account_weight(AccountId(9), 3);
        auth.add_account_weight(AccountId(9), 4);
        assert_eq!(auth.account_auths[&AccountId(9)], 7);
        assert_eq!(auth.total_weight(), 7);
    }
}
