// Path: crates/types/src/constants.rs
//! Consensus-frozen network constants.
//!
//! These values are part of consensus: changing any of them is a hardfork.

use crate::amount::ShareAmount;
use crate::ids::{AccountId, AssetId};

/// 100% in the fixed-point percentage scale used by all protocol percentages.
pub const FULL_PERCENT: u16 = 10_000;
/// 1% in the protocol percentage scale.
pub const ONE_PERCENT: u16 = FULL_PERCENT / 100;

/// Numerator of the reserve payout rate (see [`CORE_CYCLE_RATE_BITS`]).
///
/// The per-interval treasury budget is
/// `reserve * seconds * CORE_CYCLE_RATE >> CORE_CYCLE_RATE_BITS`,
/// rounded up to the nearest satoshi.
pub const CORE_CYCLE_RATE: u64 = 17;
/// Denominator shift of the reserve payout rate.
pub const CORE_CYCLE_RATE_BITS: u32 = 32;

/// Largest representable supply of any asset.
pub const MAX_SHARE_SUPPLY: ShareAmount = i64::MAX;

/// The governance account whose active authority tracks elected members.
pub const COMMITTEE_ACCOUNT: AccountId = AccountId(0);
/// The producer account whose active authority tracks elected witnesses.
pub const WITNESS_ACCOUNT: AccountId = AccountId(1);
/// Mirror of the committee account with a relaxed review period.
pub const RELAXED_COMMITTEE_ACCOUNT: AccountId = AccountId(2);
/// Sink account for burned worker pay.
pub const NULL_ACCOUNT: AccountId = AccountId(3);
/// Sentinel meaning "this account expresses its own opinions".
pub const PROXY_TO_SELF_ACCOUNT: AccountId = AccountId(5);
/// System account whose blacklist globally excludes accounts from bonuses.
pub const ALPHA_ACCOUNT: AccountId = AccountId(6);

/// The core asset of the chain.
pub const CORE_ASSET: AssetId = AssetId(0);

/// Symbol of the branded bonus asset distributed by the legacy daily issue.
pub const BONUS_ASSET_SYMBOL: &str = "MERIT";
/// Satoshis per whole unit of the bonus asset.
pub const BONUS_ASSET_PRECISION: ShareAmount = 1_000;

/// Legacy daily bonus rate, in [`FULL_PERCENT`] scale (0.65% per day).
pub const LEGACY_DAILY_BONUS_PERCENT: u16 = 65;

/// Minutes in a day; denominator of the online-fraction weighting.
pub const MINUTES_IN_DAY: u16 = 1_440;
