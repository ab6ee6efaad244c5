// Path: crates/chain/src/maintenance/special_authority.rs
//! Top-holder special authorities.
//!
//! Accounts may delegate an authority to the largest holders of an asset.
//! Each pass revisits every registered special authority and rebuilds the
//! controlled authority from the current holder ranking.

use crate::vote_counter::VoteCounter;
use meridian_store::Store;
use meridian_types::app::{Account, SpecialAuthority};
use meridian_types::MaintenanceError;

/// Recomputes every top-holders authority from the asset's holder ranking.
pub(crate) fn update_top_n_authorities(store: &mut Store) -> Result<(), MaintenanceError> {
    for record_id in store.special_authorities.ids() {
        let Some(record) = store.special_authorities.get(record_id) else {
            continue;
        };
        let account_id = record.account;
        let account = store.accounts.try_get(account_id)?;
        let slots = [
            (true, account.owner_special_authority.clone()),
            (false, account.active_special_authority.clone()),
        ];

        for (is_owner, special) in slots {
            let SpecialAuthority::TopHolders {
                asset,
                num_top_holders,
            } = special
            else {
                continue;
            };
            if num_top_holders == 0 {
                continue;
            }

            let mut vc = VoteCounter::new();
            let mut needed = num_top_holders;
            for row_id in store.balances.index().asset_rows_by_balance(asset) {
                let Some(balance) = store.balances.get(row_id) else {
                    continue;
                };
                // The account cannot be its own top holder.
                if balance.owner == account_id {
                    continue;
                }
                vc.add(balance.owner, balance.balance.max(0) as u64);
                needed -= 1;
                if needed == 0 {
                    break;
                }
            }

            store.accounts.modify(account_id, |a| {
                let target = if is_owner { &mut a.owner } else { &mut a.active };
                vc.finish(target);
                if !vc.is_empty() {
                    a.top_n_control_flags |= if is_owner {
                        Account::TOP_N_CONTROL_OWNER
                    } else {
                        Account::TOP_N_CONTROL_ACTIVE
                    };
                }
            })?;
        }
    }
    Ok(())
}
