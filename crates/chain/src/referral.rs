// Path: crates/chain/src/referral.rs
//! The referral distribution tree.
//!
//! Every account records the account that referred it. Each maintenance pass
//! the tree is rebuilt from scratch, and every referrer earns a share of the
//! daily bonus its direct referrals generated. Payouts are emitted in
//! ascending referrer-id order so the distribution is deterministic.

use meridian_store::Store;
use meridian_types::app::ChildBalance;
use meridian_types::constants::{FULL_PERCENT, LEGACY_DAILY_BONUS_PERCENT};
use meridian_types::ids::{AccountId, AssetId};
use std::collections::BTreeMap;

/// Share of a direct referral's daily bonus that flows to its referrer,
/// in [`FULL_PERCENT`] scale.
const REFERRER_SHARE_PERCENT: u16 = 1_000;

/// One referrer's earnings for the pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferralPayout {
    /// The referrer being paid.
    pub to_account_id: AccountId,
    /// Satoshis earned.
    pub quantity: u64,
    /// Rank label derived from the referrer's direct-partner count.
    pub rank: String,
    /// The balances the payout was computed from.
    pub history: Vec<ChildBalance>,
}

/// The referral tree over one asset's balances.
pub struct ReferralTree<'a> {
    store: &'a Store,
    asset: AssetId,
    use_mature_balances: bool,
    children: BTreeMap<AccountId, Vec<ChildBalance>>,
}

/// Rank brackets by direct-partner count.
fn rank_for(partners: usize) -> &'static str {
    match partners {
        0..=4 => "bronze",
        5..=24 => "silver",
        _ => "gold",
    }
}

impl<'a> ReferralTree<'a> {
    /// Builds an unformed tree over `asset`. When `use_mature_balances` is
    /// set the payout base is the matured balance rather than the real one.
    pub fn new(store: &'a Store, asset: AssetId, use_mature_balances: bool) -> Self {
        ReferralTree {
            store,
            asset,
            use_mature_balances,
            children: BTreeMap::new(),
        }
    }

    fn balance_of(&self, account: AccountId) -> u64 {
        let amount = if self.use_mature_balances {
            self.store.get_mature_balance(account, self.asset)
        } else {
            self.store.get_balance(account, self.asset)
        };
        amount.max(0) as u64
    }

    fn form_with_balances(&mut self) {
        self.children.clear();
        for account in self.store.accounts.iter() {
            if account.referrer == account.id {
                continue;
            }
            let balance = self.balance_of(account.id);
            self.children
                .entry(account.referrer)
                .or_default()
                .push(ChildBalance {
                    account: account.id,
                    amount: balance,
                });
        }
    }

    /// Forms the tree from current balances.
    pub fn form(&mut self) {
        self.form_with_balances();
    }

    /// Forms the tree the way the pre-617 engine did: always from real
    /// balances, even when the tree was built with mature balances in hand.
    pub fn form_old(&mut self) {
        let saved = self.use_mature_balances;
        self.use_mature_balances = false;
        self.form_with_balances();
        self.use_mature_balances = saved;
    }

    fn scan_formed(&self) -> Vec<ReferralPayout> {
        let bonus_percent = self
            .store
            .assets
            .get(self.asset)
            .map(|a| a.params.bonus_percent)
            .filter(|p| *p > 0)
            .unwrap_or(LEGACY_DAILY_BONUS_PERCENT);

        let mut payouts = Vec::new();
        for (referrer, kids) in &self.children {
            let level_1_sum: u64 = kids.iter().map(|c| c.amount).sum();
            // The referrer earns a fixed share of the daily bonus its direct
            // referrals generate on their balances.
            let daily_bonus =
                (level_1_sum as u128 * bonus_percent as u128) / FULL_PERCENT as u128;
            let quantity =
                ((daily_bonus * REFERRER_SHARE_PERCENT as u128) / FULL_PERCENT as u128) as u64;
            if quantity < 1 {
                continue;
            }
            payouts.push(ReferralPayout {
                to_account_id: *referrer,
                quantity,
                rank: rank_for(kids.len()).to_string(),
                history: kids.clone(),
            });
        }
        payouts
    }

    /// Scans the formed tree into payouts, ascending referrer-id order.
    pub fn scan(&self) -> Vec<ReferralPayout> {
        self.scan_formed()
    }

    /// Scan counterpart of [`ReferralTree::form_old`].
    pub fn scan_old(&self) -> Vec<ReferralPayout> {
        self.scan_formed()
    }
}
