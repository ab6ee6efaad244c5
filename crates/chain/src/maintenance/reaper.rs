// Path: crates/chain/src/maintenance/reaper.rs
//! History pruning.
//!
//! With a retention horizon configured, every time-indexed history table
//! drops its rows older than the cutoff, in a fixed table order. Account
//! transaction history only becomes prey after the 617 activation — the
//! original bonus engine walks it and must keep seeing a full day.

use super::bonus;
use super::MaintenanceConfig;
use crate::hardfork::{
    HARDFORK_616_MAINTENANCE_CHANGE_TIME, HARDFORK_617_TIME, HARDFORK_618_TIME,
};
use meridian_store::Store;
use meridian_types::time::DAY_SECS;
use meridian_types::MaintenanceError;

/// Prunes expired history and resets per-interval presence state.
pub(crate) fn clear_old_entities(
    store: &mut Store,
    config: &MaintenanceConfig,
) -> Result<(), MaintenanceError> {
    let now = store.dynamic_properties.head_block_time;

    if now != HARDFORK_616_MAINTENANCE_CHANGE_TIME {
        bonus::clear_account_mature_balance_index(store)?;
    }

    if let Some(days) = config.history_retention_days.filter(|d| *d > 0) {
        let cutoff = now.minus_secs(u64::from(days) * DAY_SECS);

        for id in store.operation_history.index().ids_before(cutoff) {
            store.operation_history.remove(id)?;
        }
        if now > HARDFORK_617_TIME {
            for id in store.account_history.index().ids_before(cutoff) {
                store.account_history.remove(id)?;
            }
        }
        for id in store.fund_history.index().ids_before(cutoff) {
            store.fund_history.remove(id)?;
        }
        for id in store.blind_transfers.index().ids_before(cutoff) {
            store.blind_transfers.remove(id)?;
        }
        for id in store.cheques.index().ids_before(cutoff) {
            store.cheques.remove(id)?;
        }
    }

    if now > HARDFORK_618_TIME {
        store.accounts_online.online_info.clear();
    }
    Ok(())
}
