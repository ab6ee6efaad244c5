// Path: crates/chain/src/maintenance/banking.rs
//! Funds and cheques.
//!
//! Funds accrue daily interest to their depositors while enabled and inside
//! their term; a fund whose deadline fell before the previous interval end
//! is wound down. Cheques that expired before the previous interval end are
//! reversed, returning the escrowed remainder to the drawer.

use crate::evaluator;
use meridian_store::Store;
use meridian_types::app::{ChequeStatus, Fund, FundTransactionHistory, Operation};
use meridian_types::{AssetAmount, MaintenanceError, TimePoint};

/// End of the interval that just completed.
fn previous_interval_end(store: &Store) -> TimePoint {
    let interval = u64::from(store.global_properties.parameters.maintenance_interval);
    store
        .dynamic_properties
        .next_maintenance_time
        .minus_secs(interval)
}

/// Processes every fund: pays interest, winds down overdue funds.
pub(crate) fn process_funds(store: &mut Store) -> Result<(), MaintenanceError> {
    let now = store.dynamic_properties.head_block_time;
    let prev_interval_end = previous_interval_end(store);

    for fund_id in store.funds.ids() {
        let Some(fund) = store.funds.get(fund_id).cloned() else {
            continue;
        };
        if !fund.enabled || fund.datetime_end < now {
            continue;
        }

        process_fund(store, &fund)?;

        if prev_interval_end >= fund.datetime_end {
            store.funds.modify(fund_id, |f| f.enabled = false)?;
        }
    }
    Ok(())
}

/// Pays one fund's enabled deposits their daily interest.
fn process_fund(store: &mut Store, fund: &Fund) -> Result<(), MaintenanceError> {
    let now = store.dynamic_properties.head_block_time;
    let block_num = store.dynamic_properties.head_block_number;

    for deposit_id in store.fund_deposits.ids() {
        let Some(deposit) = store.fund_deposits.get(deposit_id).cloned() else {
            continue;
        };
        if deposit.fund_id != fund.id || !deposit.enabled {
            continue;
        }
        if deposit.datetime_end < now {
            store.fund_deposits.modify(deposit_id, |d| d.enabled = false)?;
            continue;
        }
        if deposit.daily_payment <= 0 {
            continue;
        }

        let op = Operation::FundPayment {
            fund_id: fund.id,
            account_id: deposit.account_id,
            amount: AssetAmount::new(deposit.daily_payment, fund.asset_id),
        };
        match evaluator::apply_operation(store, op) {
            Ok(_) => {
                let fund_id = fund.id;
                store.fund_history.create(|id| FundTransactionHistory {
                    id,
                    fund: fund_id,
                    time: now,
                });
            }
            Err(e) => {
                log::warn!(
                    "[Funds] skipping interest payment from fund {} to account {} at block {block_num}: {e}",
                    fund.id,
                    deposit.account_id
                );
            }
        }
    }
    Ok(())
}

/// Reverses every expired cheque, returning the remainder to its drawer.
pub(crate) fn process_cheques(store: &mut Store) {
    let prev_interval_end = previous_interval_end(store);
    let block_num = store.dynamic_properties.head_block_number;

    for cheque_id in store.cheques.ids() {
        let Some(cheque) = store.cheques.get(cheque_id).cloned() else {
            continue;
        };
        if cheque.status != ChequeStatus::New
            || prev_interval_end < cheque.datetime_expiration
        {
            continue;
        }
        let op = Operation::ChequeReverse {
            cheque_id,
            account_id: cheque.drawer,
            amount: cheque.remaining_amount(),
        };
        if let Err(e) = evaluator::apply_operation(store, op) {
            log::warn!(
                "[Cheques] skipping reversal of cheque {cheque_id} for account {} at block {block_num}: {e}",
                cheque.drawer
            );
        }
    }
}
