// Path: crates/chain/src/maintenance/budget.rs
//! Treasury budget computation.
//!
//! The spendable budget for an interval is a fixed-point fraction of the
//! reserve, scaled by elapsed time. Fees and unspent producer budget are
//! conceptually refunded to the reserve at the *start* of the interval, so
//! they participate in the computation before the row that holds them is
//! touched.

use super::workers;
use meridian_store::Store;
use meridian_types::app::{BudgetRecord, BudgetRecordEntry};
use meridian_types::constants::{CORE_ASSET, CORE_CYCLE_RATE, CORE_CYCLE_RATE_BITS};
use meridian_types::time::DAY_SECS;
use meridian_types::{MaintenanceError, ShareAmount, TimePoint};

/// Computes the interval's total budget and the reserve snapshot fields.
fn initialize_budget_record(
    store: &Store,
    now: TimePoint,
) -> Result<BudgetRecord, MaintenanceError> {
    let dpo = &store.dynamic_properties;
    let core = store.assets.try_get(CORE_ASSET)?;
    let core_dd = store.asset_dynamic.try_get(CORE_ASSET)?;

    let mut rec = BudgetRecord {
        from_initial_reserve: core_dd.reserved(core.max_supply),
        from_accumulated_fees: core_dd.accumulated_fees,
        from_unused_witness_budget: dpo.witness_budget,
        ..BudgetRecord::default()
    };

    if dpo.last_budget_time == TimePoint::ZERO || now <= dpo.last_budget_time {
        rec.time_since_last_budget = 0;
        return Ok(rec);
    }
    let dt = now.diff_secs(dpo.last_budget_time) as u64;
    rec.time_since_last_budget = dt;

    // Fees and leftover producer budget count as reserve for this interval
    // even though their rows are only zeroed at the end of the pass.
    let reserve =
        rec.from_initial_reserve + core_dd.accumulated_fees + dpo.witness_budget;

    let budget_u128 = (reserve.max(0) as u128)
        .checked_mul(dt as u128)
        .and_then(|v| v.checked_mul(CORE_CYCLE_RATE as u128))
        .ok_or_else(|| {
            MaintenanceError::InvariantViolation(
                "budget computation overflowed its 128-bit intermediate".into(),
            )
        })?;
    // Round up to the nearest satoshi so no part of the reserve stays
    // permanently untouchable.
    let budget_u128 =
        (budget_u128 + ((1u128 << CORE_CYCLE_RATE_BITS) - 1)) >> CORE_CYCLE_RATE_BITS;

    rec.total_budget = if budget_u128 < reserve.max(0) as u128 {
        budget_u128 as ShareAmount
    } else {
        reserve
    };
    Ok(rec)
}

/// Computes and disburses the interval budget: producers first, workers
/// second, the rest evaporates back into the reserve.
pub(crate) fn process_budget(store: &mut Store) -> Result<(), MaintenanceError> {
    let params = store.global_properties.parameters.clone();
    let now = store.dynamic_properties.head_block_time;
    let last_budget_time = store.dynamic_properties.last_budget_time;
    let unused_witness_budget = store.dynamic_properties.witness_budget;

    let time_to_maint = store
        .dynamic_properties
        .next_maintenance_time
        .diff_secs(now);
    // The advancement step must only ever schedule into the future.
    if time_to_maint <= 0 {
        return Err(MaintenanceError::InvariantViolation(
            "next maintenance time is not in the future".into(),
        ));
    }
    if params.block_interval == 0 {
        return Err(MaintenanceError::ParameterViolation(
            "block_interval must be positive".into(),
        ));
    }
    let block_interval = u64::from(params.block_interval);
    let blocks_to_maint = (time_to_maint as u64 + block_interval - 1) / block_interval;

    let mut rec = initialize_budget_record(store, now)?;
    let mut available_funds = rec.total_budget;

    let requested_witness_budget = params
        .witness_pay_per_block
        .checked_mul(blocks_to_maint as ShareAmount)
        .ok_or_else(|| {
            MaintenanceError::InvariantViolation("witness budget overflowed".into())
        })?;
    rec.requested_witness_budget = requested_witness_budget;
    let witness_budget = requested_witness_budget.min(available_funds);
    rec.witness_budget = witness_budget;
    available_funds -= witness_budget;

    let worker_budget_u128 =
        (params.worker_budget_per_day.max(0) as u128) * (time_to_maint as u128) / DAY_SECS as u128;
    let worker_budget = if worker_budget_u128 >= available_funds.max(0) as u128 {
        available_funds
    } else {
        worker_budget_u128 as ShareAmount
    };
    rec.worker_budget = worker_budget;
    available_funds -= worker_budget;

    let mut leftover_worker_funds = worker_budget;
    workers::pay_workers(store, &mut leftover_worker_funds, now, last_budget_time)?;
    rec.leftover_worker_funds = leftover_worker_funds;
    available_funds += leftover_worker_funds;
    let _ = available_funds; // money we could spend but don't want to

    rec.supply_delta = rec.witness_budget + rec.worker_budget
        - rec.leftover_worker_funds
        - rec.from_accumulated_fees
        - rec.from_unused_witness_budget;

    let accumulated_fees = store.asset_dynamic.try_get(CORE_ASSET)?.accumulated_fees;
    if rec.supply_delta
        != witness_budget + worker_budget
            - leftover_worker_funds
            - accumulated_fees
            - unused_witness_budget
    {
        return Err(MaintenanceError::InvariantViolation(
            "budget supply delta does not reconcile".into(),
        ));
    }
    store.asset_dynamic.modify(CORE_ASSET, |core| {
        core.current_supply += rec.supply_delta;
        core.accumulated_fees = 0;
    })?;

    // The previous interval's leftover was rolled into available funds, so
    // the producer budget is overwritten rather than added.
    store.dynamic_properties.witness_budget = witness_budget;
    store.dynamic_properties.last_budget_time = now;

    store.budget_records.create(|id| BudgetRecordEntry {
        id,
        time: now,
        record: rec.clone(),
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_types::app::{Asset, AssetBonusParams, AssetDynamicData};
    use meridian_types::ids::AccountId;

    fn store_with_reserve(reserve: ShareAmount, supply: ShareAmount) -> Store {
        let mut store = Store::new();
        store
            .assets
            .insert(Asset {
                id: CORE_ASSET,
                symbol: "MRD".into(),
                precision: 3,
                issuer: AccountId(0),
                max_supply: supply + reserve,
                params: AssetBonusParams::default(),
                buyback_account: None,
            })
            .unwrap();
        store
            .asset_dynamic
            .insert(AssetDynamicData {
                asset: CORE_ASSET,
                current_supply: supply,
                accumulated_fees: 0,
            })
            .unwrap();
        store
    }

    #[test]
    fn first_pass_has_zero_budget() {
        let mut store = store_with_reserve(1_000_000, 0);
        store.dynamic_properties.head_block_time = TimePoint::from_secs(100);
        store.dynamic_properties.next_maintenance_time = TimePoint::from_secs(200);
        store.dynamic_properties.last_budget_time = TimePoint::ZERO;

        process_budget(&mut store).unwrap();

        let entry = store.budget_records.iter().next().unwrap();
        assert_eq!(entry.record.time_since_last_budget, 0);
        assert_eq!(entry.record.total_budget, 0);
        assert_eq!(entry.record.witness_budget, 0);
        assert_eq!(entry.record.worker_budget, 0);
        assert_eq!(entry.record.supply_delta, 0);
        assert_eq!(
            store.asset_dynamic.get(CORE_ASSET).unwrap().current_supply,
            0
        );
    }

    #[test]
    fn budget_never_exceeds_reserve() {
        let mut store = store_with_reserve(1_000, 0);
        store.dynamic_properties.head_block_time = TimePoint::from_secs(10 * DAY_SECS);
        store.dynamic_properties.next_maintenance_time =
            TimePoint::from_secs(11 * DAY_SECS);
        // A long elapsed period would compute far more than the reserve.
        store.dynamic_properties.last_budget_time = TimePoint::from_secs(1);

        process_budget(&mut store).unwrap();
        let entry = store.budget_records.iter().next().unwrap();
        assert!(entry.record.total_budget <= 1_000);
    }

    #[test]
    fn supply_delta_reconciles_with_fee_recycling() {
        let mut store = store_with_reserve(10_000_000, 5_000);
        store
            .asset_dynamic
            .modify(CORE_ASSET, |dd| dd.accumulated_fees = 700)
            .unwrap();
        store.dynamic_properties.witness_budget = 300;
        store.dynamic_properties.head_block_time = TimePoint::from_secs(2 * DAY_SECS);
        store.dynamic_properties.next_maintenance_time =
            TimePoint::from_secs(3 * DAY_SECS);
        store.dynamic_properties.last_budget_time = TimePoint::from_secs(DAY_SECS);

        let supply_before = store.asset_dynamic.get(CORE_ASSET).unwrap().current_supply;
        process_budget(&mut store).unwrap();
        let supply_after = store.asset_dynamic.get(CORE_ASSET).unwrap().current_supply;

        let entry = store.budget_records.iter().next().unwrap();
        assert_eq!(supply_after - supply_before, entry.record.supply_delta);
        assert_eq!(
            entry.record.supply_delta,
            entry.record.witness_budget + entry.record.worker_budget
                - entry.record.leftover_worker_funds
                - 700
                - 300
        );
        assert_eq!(
            store.asset_dynamic.get(CORE_ASSET).unwrap().accumulated_fees,
            0
        );
        assert_eq!(store.dynamic_properties.witness_budget, entry.record.witness_budget);
    }

    #[test]
    fn stale_schedule_is_fatal() {
        let mut store = store_with_reserve(1_000, 0);
        store.dynamic_properties.head_block_time = TimePoint::from_secs(500);
        store.dynamic_properties.next_maintenance_time = TimePoint::from_secs(500);
        let err = process_budget(&mut store).unwrap_err();
        assert!(matches!(err, MaintenanceError::InvariantViolation(_)));
    }
}
