// Path: crates/chain/src/maintenance/workers.rs
//! Worker vote refresh and payroll.

use super::Scratch;
use crate::hardfork::HARDFORK_607_TIME;
use meridian_store::Store;
use meridian_types::app::WorkerKind;
use meridian_types::constants::{CORE_ASSET, NULL_ACCOUNT};
use meridian_types::ids::WorkerId;
use meridian_types::time::DAY_SECS;
use meridian_types::{MaintenanceError, ShareAmount, TimePoint};

/// Refreshes every worker's vote totals from the tally. Negative votes stop
/// counting from the 607 activation.
pub(crate) fn update_worker_votes(
    store: &mut Store,
    scratch: &Scratch<'_>,
    now: TimePoint,
) -> Result<(), MaintenanceError> {
    let allow_negative_votes = now < HARDFORK_607_TIME;
    let worker_ids: Vec<WorkerId> = store
        .workers
        .index()
        .by_account
        .keys()
        .map(|(_, id)| *id)
        .collect();
    for id in worker_ids {
        store.workers.modify(id, |w| {
            w.total_votes_for = scratch.tally_of(w.vote_for);
            w.total_votes_against = if allow_negative_votes {
                scratch.tally_of(w.vote_against)
            } else {
                0
            };
        })?;
    }
    Ok(())
}

/// Pays active, approved workers greedily until `budget` runs dry.
///
/// A worker with more approving stake is paid first; exact ties prefer the
/// lower id. Requested pay prorates against the elapsed budget period
/// whenever that period is not exactly one day.
pub(crate) fn pay_workers(
    store: &mut Store,
    budget: &mut ShareAmount,
    now: TimePoint,
    last_budget_time: TimePoint,
) -> Result<(), MaintenanceError> {
    let mut active_workers: Vec<_> = store
        .workers
        .iter()
        .filter(|w| w.is_active(now) && w.approving_stake() > 0)
        .cloned()
        .collect();
    active_workers.sort_by(|a, b| {
        b.approving_stake()
            .cmp(&a.approving_stake())
            .then_with(|| a.id.cmp(&b.id))
    });

    for worker in active_workers {
        if *budget <= 0 {
            break;
        }
        let mut requested_pay = worker.daily_pay;
        let elapsed = now.diff_secs(last_budget_time);
        if elapsed != DAY_SECS as i64 {
            let prorated =
                (requested_pay.max(0) as u128) * (elapsed.max(0) as u128) / (DAY_SECS as u128);
            requested_pay = i64::try_from(prorated).unwrap_or(ShareAmount::MAX);
        }
        let actual_pay = (*budget).min(requested_pay);
        pay_worker(store, worker.id, actual_pay)?;
        *budget -= actual_pay;
    }
    Ok(())
}

/// Dispatches one payment by worker kind: refund evaporates into the
/// reserve, burn parks at the null account, vesting accrues in the pot.
fn pay_worker(
    store: &mut Store,
    id: WorkerId,
    pay: ShareAmount,
) -> Result<(), MaintenanceError> {
    let kind = store.workers.try_get(id)?.kind.clone();
    match kind {
        WorkerKind::Refund { .. } => {
            store
                .asset_dynamic
                .modify(CORE_ASSET, |dd| dd.current_supply -= pay)?;
            store.workers.modify(id, |w| {
                if let WorkerKind::Refund { total_burned } = &mut w.kind {
                    *total_burned += pay;
                }
            })?;
        }
        WorkerKind::Burn { .. } => {
            store.adjust_balance(NULL_ACCOUNT, CORE_ASSET, pay)?;
            store.workers.modify(id, |w| {
                if let WorkerKind::Burn { total_burned } = &mut w.kind {
                    *total_burned += pay;
                }
            })?;
        }
        WorkerKind::Vesting { balance } => {
            store.vesting_balances.modify(balance, |v| v.balance += pay)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_types::app::{AssetDynamicData, Worker};
    use meridian_types::ids::AccountId;
    use meridian_types::vote::{VoteId, VoteKind};

    fn test_worker(id: u32, votes_for: u64, daily_pay: ShareAmount) -> Worker {
        Worker {
            id: WorkerId(id),
            worker_account: AccountId(50 + id),
            work_begin_date: TimePoint::ZERO,
            work_end_date: TimePoint::MAX,
            daily_pay,
            name: format!("worker-{id}"),
            vote_for: VoteId::new(VoteKind::WorkerFor, 2 * id),
            vote_against: VoteId::new(VoteKind::WorkerAgainst, 2 * id + 1),
            total_votes_for: votes_for,
            total_votes_against: 0,
            kind: WorkerKind::Refund { total_burned: 0 },
        }
    }

    fn store_with_core_supply(supply: ShareAmount) -> Store {
        let mut store = Store::new();
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
    fn pay_prorates_for_short_periods() {
        let mut store = store_with_core_supply(1_000_000);
        store.workers.insert(test_worker(0, 10, 100)).unwrap();

        let mut budget: ShareAmount = 1_000;
        let last = TimePoint::from_secs(0);
        let now = TimePoint::from_secs(DAY_SECS / 2);
        pay_workers(&mut store, &mut budget, now, last).unwrap();

        // Half a day elapsed: 100 * 43200 / 86400 = 50.
        assert_eq!(budget, 950);
        let w = store.workers.get(WorkerId(0)).unwrap();
        assert!(matches!(w.kind, WorkerKind::Refund { total_burned: 50 }));
    }

    #[test]
    fn full_day_pays_exactly_daily_pay() {
        let mut store = store_with_core_supply(1_000_000);
        store.workers.insert(test_worker(0, 10, 100)).unwrap();

        let mut budget: ShareAmount = 1_000;
        pay_workers(
            &mut store,
            &mut budget,
            TimePoint::from_secs(DAY_SECS),
            TimePoint::from_secs(0),
        )
        .unwrap();
        assert_eq!(budget, 900);
    }

    #[test]
    fn higher_stake_paid_first_then_lower_id_on_ties() {
        let mut store = store_with_core_supply(1_000_000);
        store.workers.insert(test_worker(7, 500, 60)).unwrap();
        store.workers.insert(test_worker(9, 500, 60)).unwrap();
        store.workers.insert(test_worker(3, 900, 60)).unwrap();

        // Budget covers the leader and one of the tied workers.
        let mut budget: ShareAmount = 120;
        pay_workers(
            &mut store,
            &mut budget,
            TimePoint::from_secs(DAY_SECS),
            TimePoint::from_secs(0),
        )
        .unwrap();

        assert_eq!(budget, 0);
        let paid = |id: u32| match store.workers.get(WorkerId(id)).unwrap().kind {
            WorkerKind::Refund { total_burned } => total_burned,
            _ => unreachable!(),
        };
        assert_eq!(paid(3), 60);
        assert_eq!(paid(7), 60);
        assert_eq!(paid(9), 0);
    }

    #[test]
    fn unapproved_workers_earn_nothing() {
        let mut store = store_with_core_supply(1_000_000);
        let mut w = test_worker(0, 0, 100);
        w.total_votes_against = 5;
        store.workers.insert(w).unwrap();

        let mut budget: ShareAmount = 1_000;
        pay_workers(
            &mut store,
            &mut budget,
            TimePoint::from_secs(DAY_SECS),
            TimePoint::from_secs(0),
        )
        .unwrap();
        assert_eq!(budget, 1_000);
    }
}
