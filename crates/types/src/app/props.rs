// Path: crates/types/src/app/props.rs
//! Global, dynamic, and immutable chain properties.

use crate::amount::ShareAmount;
use crate::ids::{CommitteeMemberId, WitnessId};
use crate::time::TimePoint;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The subset of the fee schedule the maintenance pass touches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct FeeSchedule {
    /// Base fee of account creation. Doubles while registrations ramp up
    /// inside an interval; the maintenance pass removes the scaling.
    pub account_create_basic_fee: ShareAmount,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        FeeSchedule {
            account_create_basic_fee: 5 * crate::constants::BONUS_ASSET_PRECISION,
        }
    }
}

/// Governance-controlled network parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct ChainParameters {
    /// Seconds between blocks.
    pub block_interval: u8,
    /// Seconds between maintenance passes.
    pub maintenance_interval: u32,
    /// Upper bound on the elected producer count.
    pub maximum_witness_count: u16,
    /// Upper bound on the elected governance-member count.
    pub maximum_committee_count: u16,
    /// Producer pay per block produced.
    pub witness_pay_per_block: ShareAmount,
    /// Ceiling of the daily worker budget.
    pub worker_budget_per_day: ShareAmount,
    /// Whether non-member stake participates in voting.
    pub count_non_member_votes: bool,
    /// Fees below this threshold cash back immediately instead of vesting.
    pub cashback_vesting_threshold: ShareAmount,
    /// Bits the account-creation fee is shifted per scale step.
    pub account_fee_scale_bitshifts: u8,
    /// Registrations per fee-scale step within one interval.
    pub accounts_per_fee_scale: u32,
    /// Current fee schedule.
    pub current_fees: FeeSchedule,
}

impl Default for ChainParameters {
    fn default() -> Self {
        ChainParameters {
            block_interval: 5,
            maintenance_interval: 86_400,
            maximum_witness_count: 1_001,
            maximum_committee_count: 1_001,
            witness_pay_per_block: 1_000,
            worker_budget_per_day: 500 * crate::constants::BONUS_ASSET_PRECISION,
            count_non_member_votes: true,
            cashback_vesting_threshold: 100 * crate::constants::BONUS_ASSET_PRECISION,
            account_fee_scale_bitshifts: 4,
            accounts_per_fee_scale: 1_000,
            current_fees: FeeSchedule::default(),
        }
    }
}

/// Singleton of governance-controlled state: parameters plus the elected
/// producer and governance sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct GlobalProperties {
    /// Parameters currently in force.
    pub parameters: ChainParameters,
    /// Parameters approved by governance, swapped in at the end of the next
    /// maintenance pass.
    pub pending_parameters: Option<ChainParameters>,
    /// Next unallocated voting-option instance; sizes the tally buffer.
    pub next_available_vote_id: u32,
    /// The elected block producers.
    pub active_witnesses: BTreeSet<WitnessId>,
    /// The elected governance members.
    pub active_committee_members: BTreeSet<CommitteeMemberId>,
}

impl Default for GlobalProperties {
    fn default() -> Self {
        GlobalProperties {
            parameters: ChainParameters::default(),
            pending_parameters: None,
            next_available_vote_id: 0,
            active_witnesses: BTreeSet::new(),
            active_committee_members: BTreeSet::new(),
        }
    }
}

/// Singleton of per-block bookkeeping.
#[derive(
    Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode,
)]
pub struct DynamicProperties {
    /// Height of the head block.
    pub head_block_number: u32,
    /// Timestamp of the head block.
    pub head_block_time: TimePoint,
    /// The next maintenance deadline.
    pub next_maintenance_time: TimePoint,
    /// When the budget was last computed.
    pub last_budget_time: TimePoint,
    /// Producer pay budgeted for the current interval and not yet spent.
    pub witness_budget: ShareAmount,
    /// Accounts registered since the last maintenance pass.
    pub accounts_registered_this_interval: u32,
}

/// Parameters fixed at genesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct ImmutableChainParameters {
    /// Floor of the elected producer count.
    pub min_witness_count: u16,
    /// Floor of the elected governance-member count.
    pub min_committee_member_count: u16,
}

impl Default for ImmutableChainParameters {
    fn default() -> Self {
        ImmutableChainParameters {
            min_witness_count: 11,
            min_committee_member_count: 11,
        }
    }
}

/// Singleton wrapper of the immutable parameters.
#[derive(
    Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode,
)]
pub struct ChainProperties {
    /// Parameters fixed at genesis.
    pub immutable_parameters: ImmutableChainParameters,
}

/// The view of a block the maintenance engine consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct BlockInfo {
    /// Height of the block.
    pub block_num: u32,
    /// Timestamp of the block.
    pub timestamp: TimePoint,
}
