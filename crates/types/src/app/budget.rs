// Path: crates/types/src/app/budget.rs
//! Budget records written once per maintenance pass.

use crate::amount::ShareAmount;
use crate::ids::BudgetRecordId;
use crate::time::TimePoint;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Full accounting of one interval's treasury budget.
///
/// `supply_delta` must always reconcile exactly:
/// `witness_budget + worker_budget - leftover_worker_funds
///  - from_accumulated_fees - from_unused_witness_budget`.
#[derive(
    Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode,
)]
pub struct BudgetRecord {
    /// Seconds since the previous budget; 0 on the very first pass.
    pub time_since_last_budget: u64,
    /// Reserve (unissued supply) at the start of the interval.
    pub from_initial_reserve: ShareAmount,
    /// Core-asset fees accumulated during the interval.
    pub from_accumulated_fees: ShareAmount,
    /// Producer budget left unspent by the previous interval.
    pub from_unused_witness_budget: ShareAmount,
    /// Producer budget the schedule asked for, before capping.
    pub requested_witness_budget: ShareAmount,
    /// Total spendable budget for this interval.
    pub total_budget: ShareAmount,
    /// Producer budget actually allocated.
    pub witness_budget: ShareAmount,
    /// Worker budget actually allocated.
    pub worker_budget: ShareAmount,
    /// Worker budget the workers did not consume.
    pub leftover_worker_funds: ShareAmount,
    /// Net change applied to the core asset's current supply.
    pub supply_delta: ShareAmount,
}

/// Append-only ledger row wrapping one pass's budget record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct BudgetRecordEntry {
    /// This row's id.
    pub id: BudgetRecordId,
    /// When the budget was computed.
    pub time: TimePoint,
    /// The accounting itself.
    pub record: BudgetRecord,
}
