// Path: crates/types/src/app/account.rs
//! Accounts, per-account statistics, and balance rows.

use crate::amount::{AssetAmount, ShareAmount};
use crate::authority::Authority;
use crate::constants::PROXY_TO_SELF_ACCOUNT;
use crate::ids::{
    AccountHistoryId, AccountId, AssetId, BalanceId, MatureBalanceId, SpecialAuthorityId,
    VestingBalanceId,
};
use crate::time::TimePoint;
use crate::vote::VoteId;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Voting preferences an account publishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct AccountOptions {
    /// The account whose opinions this account's stake follows.
    /// [`PROXY_TO_SELF_ACCOUNT`] means the stake votes its own opinions.
    pub voting_account: AccountId,
    /// The voting options this account approves.
    pub votes: BTreeSet<VoteId>,
    /// How many block producers this account believes the chain should have.
    pub num_witness: u16,
    /// How many governance members this account believes the chain should have.
    pub num_committee: u16,
}

impl Default for AccountOptions {
    fn default() -> Self {
        AccountOptions {
            voting_account: PROXY_TO_SELF_ACCOUNT,
            votes: BTreeSet::new(),
            num_witness: 0,
            num_committee: 0,
        }
    }
}

/// An account-level authority override recomputed every maintenance pass.
#[derive(
    Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode,
)]
pub enum SpecialAuthority {
    /// No override.
    #[default]
    None,
    /// The authority is the top holders of an asset, weighted by balance.
    TopHolders {
        /// The asset whose holders control the account.
        asset: AssetId,
        /// How many of the largest holders participate.
        num_top_holders: u8,
    },
}

impl SpecialAuthority {
    /// Whether an override is configured.
    pub fn is_set(&self) -> bool {
        !matches!(self, SpecialAuthority::None)
    }
}

/// An account on the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct Account {
    /// This row's id.
    pub id: AccountId,
    /// Unique account name; the canonical account iteration order.
    pub name: String,
    /// Membership class sentinel: past = basic, [`TimePoint::MAX`] =
    /// lifetime, any other future instant = annual member.
    pub membership_expiration_date: TimePoint,
    /// The account that paid this account's registration fee.
    pub registrar: AccountId,
    /// The account credited with referring this account.
    pub referrer: AccountId,
    /// The lifetime member at the top of the referral chain.
    pub lifetime_referrer: AccountId,
    /// Published voting preferences.
    pub options: AccountOptions,
    /// Cold-storage authority with absolute control.
    pub owner: Authority,
    /// Day-to-day authority.
    pub active: Authority,
    /// Vesting pot receiving fee cashback, if one has been created.
    pub cashback_vb: Option<VestingBalanceId>,
    /// Maintenance-computed override of the owner authority.
    pub owner_special_authority: SpecialAuthority,
    /// Maintenance-computed override of the active authority.
    pub active_special_authority: SpecialAuthority,
    /// Which authorities are currently controlled by the top-holders logic.
    pub top_n_control_flags: u8,
    /// Accounts this account refuses to transact with (issuer blacklists).
    pub blacklisted_accounts: BTreeSet<AccountId>,
    /// If set, the only assets this account may hold. Used to restrict
    /// buyback accounts to the assets trading in their markets.
    pub allowed_assets: Option<BTreeSet<AssetId>>,
}

impl Account {
    /// Flag: the top-holders logic owns the owner authority.
    pub const TOP_N_CONTROL_OWNER: u8 = 1;
    /// Flag: the top-holders logic owns the active authority.
    pub const TOP_N_CONTROL_ACTIVE: u8 = 2;

    /// Builds a basic account with the given id and name.
    pub fn new(id: AccountId, name: impl Into<String>) -> Self {
        Account {
            id,
            name: name.into(),
            membership_expiration_date: TimePoint::ZERO,
            registrar: id,
            referrer: id,
            lifetime_referrer: id,
            options: AccountOptions::default(),
            owner: Authority::default(),
            active: Authority::default(),
            cashback_vb: None,
            owner_special_authority: SpecialAuthority::None,
            active_special_authority: SpecialAuthority::None,
            top_n_control_flags: 0,
            blacklisted_accounts: BTreeSet::new(),
            allowed_assets: None,
        }
    }

    /// True for lifetime members.
    pub fn is_lifetime_member(&self) -> bool {
        self.membership_expiration_date == TimePoint::MAX
    }

    /// True for basic (expired or never-upgraded) accounts.
    pub fn is_basic_account(&self, now: TimePoint) -> bool {
        now > self.membership_expiration_date
    }

    /// True for unexpired annual members. Lifetime members are not annual.
    pub fn is_annual_member(&self, now: TimePoint) -> bool {
        !self.is_lifetime_member() && !self.is_basic_account(now)
    }

    /// True for annual or lifetime members.
    pub fn is_member(&self, now: TimePoint) -> bool {
        !self.is_basic_account(now)
    }
}

/// Frequently-updated statistics split off the account row so that hot
/// writes do not churn the mostly-static account data.
#[derive(
    Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode,
)]
pub struct AccountStatistics {
    /// The account these statistics belong to.
    pub owner: AccountId,
    /// Head of the account's transaction-history linked list, newest first.
    pub most_recent_op: Option<AccountHistoryId>,
    /// Number of operations recorded for this account.
    pub total_ops: u32,
    /// Core-asset value locked in open orders, counted as voting stake.
    pub total_core_in_orders: ShareAmount,
    /// Lifetime fees paid, for bulk-discount accounting.
    pub lifetime_fees_paid: ShareAmount,
    /// Fees awaiting payout as vesting cashback at the next maintenance.
    pub pending_fees: ShareAmount,
    /// Fees awaiting payout as immediately-withdrawable cashback.
    pub pending_vested_fees: ShareAmount,
}

/// Balance of a single (account, asset) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct AccountBalance {
    /// This row's id.
    pub id: BalanceId,
    /// Owning account.
    pub owner: AccountId,
    /// Asset of this balance.
    pub asset_type: AssetId,
    /// Current balance in satoshis.
    pub balance: ShareAmount,
    /// Set when an outbound transfer is required before the balance matures.
    pub mandatory_transfer: bool,
}

impl AccountBalance {
    /// The balance as a tagged amount.
    pub fn get_balance(&self) -> AssetAmount {
        AssetAmount::new(self.balance, self.asset_type)
    }
}

/// One snapshot in a mature balance's rolling history.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode,
)]
pub struct MatureBalanceSnapshot {
    /// The real balance at snapshot time.
    pub real_balance: ShareAmount,
    /// The matured portion at snapshot time.
    pub balance: ShareAmount,
}

/// Rolling matured-balance state of a single (account, asset) pair, used to
/// gate daily bonuses on balances actually held over time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct AccountMatureBalance {
    /// This row's id.
    pub id: MatureBalanceId,
    /// Owning account.
    pub owner: AccountId,
    /// Asset of this balance.
    pub asset_type: AssetId,
    /// The matured balance.
    pub balance: ShareAmount,
    /// Mirror of the balance row's mandatory-transfer flag.
    pub mandatory_transfer: bool,
    /// Rolling history of (real, matured) snapshots.
    pub history: Vec<MatureBalanceSnapshot>,
}

/// Registry row marking an account as carrying a special authority, so the
/// maintenance pass can visit candidates without scanning every account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct SpecialAuthorityRecord {
    /// This row's id.
    pub id: SpecialAuthorityId,
    /// The account carrying the special authority.
    pub account: AccountId,
}

/// Singleton map of online presence, in minutes over the last day.
/// Only the legacy bonus window reads it.
#[derive(
    Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode,
)]
pub struct AccountsOnline {
    /// Minutes each account was observed online during the last day.
    pub online_info: BTreeMap<AccountId, u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_classes() {
        let now = TimePoint::from_secs(1_000);
        let mut acct = Account::new(AccountId(10), "alice");
        assert!(acct.is_basic_account(now));
        assert!(!acct.is_member(now));

        acct.membership_expiration_date = TimePoint::from_secs(2_000);
        assert!(acct.is_annual_member(now));
        assert!(acct.is_member(now));

        acct.membership_expiration_date = TimePoint::MAX;
        assert!(acct.is_lifetime_member());
        assert!(!acct.is_annual_member(now));
    }
}
