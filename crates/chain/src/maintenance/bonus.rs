// Path: crates/chain/src/maintenance/bonus.rs
//! Daily bonus issuance and mature-balance upkeep.
//!
//! Three engines cover the chain's history. The oldest pays the branded
//! asset against real balances behind a 24-hour activity gate; the middle
//! one pays against matured balances with an optional online-fraction
//! weighting; the modern one pays every bonus-configured asset against
//! matured balances and routes referral earnings through the pending-bonus
//! ledgers. Which engine runs is decided by the hardfork schedule in the
//! orchestrator.

use crate::evaluator;
use crate::hardfork::{HARDFORK_618_TIME, HARDFORK_619_TIME, HARDFORK_620_TIME};
use crate::referral::{ReferralPayout, ReferralTree};
use meridian_store::Store;
use meridian_types::app::{MatureBalanceSnapshot, Operation, ReferralBalanceInfo};
use meridian_types::constants::{
    ALPHA_ACCOUNT, BONUS_ASSET_PRECISION, BONUS_ASSET_SYMBOL, CORE_ASSET, FULL_PERCENT,
    LEGACY_DAILY_BONUS_PERCENT, MAX_SHARE_SUPPLY, MINUTES_IN_DAY,
};
use meridian_types::ids::{AccountId, AssetId};
use meridian_types::time::DAY_SECS;
use meridian_types::{MaintenanceError, ShareAmount, TimePoint};
use std::collections::BTreeSet;

/// Asset in which referral earnings are ledgered.
const REFERRAL_BALANCE_ASSET: AssetId = AssetId(1);

/// Clamps an issuance so the asset's supply cannot exceed the representable
/// maximum. Issuing a clamped amount is normal, not an error.
fn clamp_issue(
    store: &Store,
    asset: AssetId,
    quantity: ShareAmount,
) -> Result<ShareAmount, MaintenanceError> {
    let dd = store.asset_dynamic.try_get(asset)?;
    Ok(quantity.min(MAX_SHARE_SUPPLY - dd.current_supply))
}

/// The balance a bonus is computed from: the matured balance when a row
/// exists, the real balance otherwise.
fn balance_for_bonus(store: &Store, owner: AccountId, asset: AssetId) -> ShareAmount {
    if store
        .mature_balances
        .index()
        .by_account_asset
        .contains_key(&(owner, asset))
    {
        store.get_mature_balance(owner, asset)
    } else {
        store.get_balance(owner, asset)
    }
}

/// Blacklist of the alpha system account; empty when the account is absent.
fn alpha_blacklist(store: &Store) -> BTreeSet<AccountId> {
    store
        .accounts
        .get(ALPHA_ACCOUNT)
        .map(|a| a.blacklisted_accounts.clone())
        .unwrap_or_default()
}

/// Whether `account` sent at least one whole unit of `asset` within the last
/// 24 hours. Walks the history linked list newest to oldest; a missing node
/// or an exhausted list counts as inactive.
fn had_recent_outbound_transfer(
    store: &Store,
    account: AccountId,
    asset: AssetId,
    now: TimePoint,
) -> bool {
    let Some(stats) = store.account_statistics.get(account) else {
        return false;
    };
    let Some(mut node_id) = stats.most_recent_op else {
        return false;
    };
    let horizon = now.minus_secs(DAY_SECS);
    loop {
        let Some(node) = store.account_history.get(node_id) else {
            return false;
        };
        if node.block_time <= horizon {
            return false;
        }
        if let Some(entry) = store.operation_history.get(node.operation_id) {
            if let Operation::Transfer { from, amount, .. } = &entry.op {
                if amount.asset_id == asset
                    && amount.amount >= BONUS_ASSET_PRECISION
                    && *from == account
                {
                    return true;
                }
            }
        }
        match node.next {
            Some(next) => node_id = next,
            None => return false,
        }
    }
}

/// Credits a pending bonus amount to an account's ledger.
fn adjust_bonus_balance(
    store: &mut Store,
    account: AccountId,
    asset: AssetId,
    amount: ShareAmount,
    now: TimePoint,
) -> Result<(), MaintenanceError> {
    store.bonus_balances_mut(account, REFERRAL_BALANCE_ASSET, |bb| {
        bb.adjust_balance(asset, amount, now);
    })?;
    Ok(())
}

/// Credits pending referral earnings to an account's ledger.
fn adjust_referral_balance(
    store: &mut Store,
    account: AccountId,
    info: ReferralBalanceInfo,
    now: TimePoint,
) -> Result<(), MaintenanceError> {
    store.bonus_balances_mut(account, REFERRAL_BALANCE_ASSET, |bb| {
        bb.add_referral(info, now);
    })?;
    Ok(())
}

/// Releases an account's matured pending bonuses into real balances through
/// the evaluator.
fn process_bonus_balances(
    store: &mut Store,
    account: AccountId,
) -> Result<(), MaintenanceError> {
    let Some(&ledger_id) = store.bonus_balances.index().by_account.get(&account) else {
        return Ok(());
    };
    let now = store.dynamic_properties.head_block_time;
    let block_num = store.dynamic_properties.head_block_number;
    let referral_asset = store.bonus_balances.try_get(ledger_id)?.referral_balance_asset;

    let mut matured = Vec::new();
    store
        .bonus_balances
        .modify(ledger_id, |bb| matured = bb.drain_matured(now))?;

    for entry in matured {
        for (asset, amount) in entry.balances {
            if amount <= 0 {
                continue;
            }
            let Some(asset_row) = store.assets.get(asset).cloned() else {
                continue;
            };
            let op = Operation::DailyIssue {
                issuer: asset_row.issuer,
                asset_to_issue: asset_row.amount(clamp_issue(store, asset, amount)?),
                issue_to_account: account,
                account_balance: store.get_balance(account, asset),
            };
            if let Err(e) = evaluator::apply_operation(store, op) {
                log::warn!(
                    "[Bonus] dropping matured bonus of asset {asset} for account {account} at block {block_num}: {e}"
                );
            }
        }
        if entry.referral.quantity > 0 {
            let Some(asset_row) = store.assets.get(referral_asset).cloned() else {
                continue;
            };
            let quantity =
                clamp_issue(store, referral_asset, entry.referral.quantity as ShareAmount)?;
            let op = Operation::ReferralIssue {
                issuer: asset_row.issuer,
                asset_to_issue: asset_row.amount(quantity),
                issue_to_account: account,
                account_balance: store.get_balance(account, referral_asset),
                rank: entry.referral.rank,
                history: entry.referral.history,
            };
            if let Err(e) = evaluator::apply_operation(store, op) {
                log::warn!(
                    "[Bonus] dropping matured referral earnings for account {account} at block {block_num}: {e}"
                );
            }
        }
    }
    Ok(())
}

/// Advances every mature-balance row one full step: the matured balance
/// catches up to the real balance and the pair is snapshotted.
fn consider_mining_in_mature_balances(store: &mut Store) -> Result<(), MaintenanceError> {
    for id in store.mature_balances.ids() {
        let Some(row) = store.mature_balances.get(id) else {
            continue;
        };
        let (owner, asset) = (row.owner, row.asset_type);
        let real = store.get_balance(owner, asset);
        store.mature_balances.modify(id, |m| {
            m.balance = real;
            m.history.push(MatureBalanceSnapshot {
                real_balance: real,
                balance: real,
            });
        })?;
    }
    Ok(())
}

/// Pre-620 maturation: the matured balance advances toward the real balance
/// in proportion to the minutes the holder was online over the last day.
fn consider_mining_old(store: &mut Store) -> Result<(), MaintenanceError> {
    let online_info = store.accounts_online.online_info.clone();
    for id in store.mature_balances.ids() {
        let Some(row) = store.mature_balances.get(id) else {
            continue;
        };
        let (owner, asset) = (row.owner, row.asset_type);
        let minutes = online_info
            .get(&owner)
            .copied()
            .unwrap_or(0)
            .min(MINUTES_IN_DAY);
        let real = store.get_balance(owner, asset);
        store.mature_balances.modify(id, |m| {
            let gap = real - m.balance;
            let step = (gap as i128 * minutes as i128 / MINUTES_IN_DAY as i128) as ShareAmount;
            m.balance += step;
            m.history.push(MatureBalanceSnapshot {
                real_balance: real,
                balance: m.balance,
            });
        })?;
    }
    Ok(())
}

/// Resets every mature-balance row to the current real balance and restarts
/// its history with a single settled snapshot.
pub(crate) fn clear_account_mature_balance_index(
    store: &mut Store,
) -> Result<(), MaintenanceError> {
    for balance_id in store.balances.ids() {
        store
            .balances
            .modify(balance_id, |b| b.mandatory_transfer = false)?;
        let Some(balance) = store.balances.get(balance_id) else {
            continue;
        };
        let (owner, asset, amount) = (balance.owner, balance.asset_type, balance.balance);
        let mature_id = store
            .mature_balances
            .index()
            .by_account_asset
            .get(&(owner, asset))
            .copied();
        if let Some(mature_id) = mature_id {
            store.mature_balances.modify(mature_id, |m| {
                m.asset_type = asset;
                m.balance = amount;
                m.mandatory_transfer = false;
                m.history.clear();
                m.history.push(MatureBalanceSnapshot {
                    real_balance: amount,
                    balance: amount,
                });
            })?;
        }
    }
    Ok(())
}

/// Modern referral distribution: the tree forms over core-asset balances
/// and earnings accrue in the pending-bonus ledgers.
fn issue_referral(store: &mut Store) -> Result<(), MaintenanceError> {
    let now = store.dynamic_properties.head_block_time;
    let payouts = {
        let mut tree = ReferralTree::new(store, CORE_ASSET, true);
        tree.form();
        tree.scan()
    };
    for payout in payouts {
        let ReferralPayout {
            to_account_id,
            quantity,
            rank,
            history,
        } = payout;
        adjust_referral_balance(
            store,
            to_account_id,
            ReferralBalanceInfo {
                quantity,
                rank,
                history,
            },
            now,
        )?;
    }
    Ok(())
}

/// The modern bonus engine (post-620).
pub(crate) fn issue_bonuses(store: &mut Store) -> Result<(), MaintenanceError> {
    consider_mining_in_mature_balances(store)?;

    if store.accounts.get(ALPHA_ACCOUNT).is_none() {
        return Ok(());
    }
    let alpha_list = alpha_blacklist(store);
    let now = store.dynamic_properties.head_block_time;
    let block_num = store.dynamic_properties.head_block_number;

    for asset_id in store.assets.ids() {
        let Some(asset) = store.assets.get(asset_id).cloned() else {
            continue;
        };
        if asset.id == CORE_ASSET {
            continue;
        }
        if !asset.params.daily_bonus || asset.params.bonus_percent == 0 {
            continue;
        }
        let issuer_list = store
            .accounts
            .try_get(asset.issuer)?
            .blacklisted_accounts
            .clone();

        for account_id in store.accounts.ids() {
            let balance = balance_for_bonus(store, account_id, asset.id);
            let quantity = (balance.max(0) as u128 * asset.params.bonus_percent as u128
                / FULL_PERCENT as u128) as ShareAmount;
            if quantity < 1 {
                continue;
            }
            if alpha_list.contains(&account_id) || issuer_list.contains(&account_id) {
                continue;
            }

            if asset.params.maturing_bonus_balance {
                let amount = clamp_issue(store, asset.id, quantity)?;
                adjust_bonus_balance(store, account_id, asset.id, amount, now)?;
            } else {
                let op = Operation::DailyIssue {
                    issuer: asset.issuer,
                    asset_to_issue: asset.amount(clamp_issue(store, asset.id, quantity)?),
                    issue_to_account: account_id,
                    account_balance: store.get_balance(account_id, asset.id),
                };
                if let Err(e) = evaluator::apply_operation(store, op) {
                    log::warn!(
                        "[Bonus] skipping daily issue of asset {asset_id} to account {account_id} at block {block_num}: {e}"
                    );
                }
            }
        }
    }

    issue_referral(store)?;

    for account_id in store.accounts.ids() {
        process_bonus_balances(store, account_id)?;
    }
    Ok(())
}

/// The middle bonus engine (617..=620): matured balances of the branded
/// asset, with online-fraction weighting inside the 618..619 window.
pub(crate) fn issue_bonuses_before_620(store: &mut Store) -> Result<(), MaintenanceError> {
    let now = store.dynamic_properties.head_block_time;
    let block_num = store.dynamic_properties.head_block_number;

    if now > HARDFORK_619_TIME {
        consider_mining_old(store)?;
    }

    let Some(&bonus_asset_id) = store.assets.index().by_symbol.get(BONUS_ASSET_SYMBOL) else {
        return Ok(());
    };
    let bonus_asset = store.assets.try_get(bonus_asset_id)?.clone();
    let issuer_list = store
        .accounts
        .try_get(bonus_asset.issuer)?
        .blacklisted_accounts
        .clone();
    let alpha_list = alpha_blacklist(store);
    let online_info = store.accounts_online.online_info.clone();
    let online_window = now > HARDFORK_618_TIME && now < HARDFORK_619_TIME;

    let payouts = {
        let mut tree = ReferralTree::new(store, bonus_asset_id, true);
        tree.form();
        tree.scan()
    };

    for account_id in store.accounts.ids() {
        process_bonus_balances(store, account_id)?;

        let real_balance = store.get_balance(account_id, bonus_asset_id);
        let balance = store.get_mature_balance(account_id, bonus_asset_id);
        let mut quantity = (balance.max(0) as u128 * LEGACY_DAILY_BONUS_PERCENT as u128
            / FULL_PERCENT as u128) as u64;
        if quantity < 1 {
            continue;
        }
        if alpha_list.contains(&account_id) || issuer_list.contains(&account_id) {
            continue;
        }

        // Consensus-frozen float: the online fraction only ever applied
        // inside the 618..619 window and is replayed exactly as written.
        let mut online_part = if online_info.is_empty() { 1.0 } else { 0.0 };
        if online_window && !online_info.is_empty() {
            online_part = online_info
                .get(&account_id)
                .map(|minutes| f64::from(*minutes) / f64::from(MINUTES_IN_DAY))
                .unwrap_or(0.0);
        }
        if online_window {
            quantity = (quantity as f64 * online_part) as u64;
        }
        if quantity < 1 {
            continue;
        }

        if now > HARDFORK_620_TIME {
            let amount = clamp_issue(store, bonus_asset_id, quantity as ShareAmount)?;
            adjust_bonus_balance(store, account_id, bonus_asset_id, amount, now)?;
        } else {
            let op = Operation::DailyIssue {
                issuer: bonus_asset.issuer,
                asset_to_issue: bonus_asset
                    .amount(clamp_issue(store, bonus_asset_id, quantity as ShareAmount)?),
                issue_to_account: account_id,
                account_balance: real_balance,
            };
            if let Err(e) = evaluator::apply_operation(store, op) {
                log::warn!(
                    "[Bonus] skipping daily issue to account {account_id} at block {block_num}: {e}"
                );
            }
        }

        let Some(payout) = payouts.iter().find(|p| p.to_account_id == account_id) else {
            continue;
        };
        if now > HARDFORK_620_TIME {
            adjust_referral_balance(
                store,
                account_id,
                ReferralBalanceInfo {
                    quantity: payout.quantity,
                    rank: payout.rank.clone(),
                    history: payout.history.clone(),
                },
                now,
            )?;
        } else {
            let amount = if online_window {
                (payout.quantity as f64 * online_part) as u64
            } else {
                payout.quantity
            };
            let op = Operation::ReferralIssue {
                issuer: bonus_asset.issuer,
                asset_to_issue: bonus_asset
                    .amount(clamp_issue(store, bonus_asset_id, amount as ShareAmount)?),
                issue_to_account: payout.to_account_id,
                account_balance: real_balance,
                rank: payout.rank.clone(),
                history: payout.history.clone(),
            };
            if let Err(e) = evaluator::apply_operation(store, op) {
                log::warn!(
                    "[Bonus] skipping referral issue to account {account_id} at block {block_num}: {e}"
                );
            }
        }
    }

    if now > HARDFORK_620_TIME {
        for account_id in store.accounts.ids() {
            process_bonus_balances(store, account_id)?;
        }
    }
    Ok(())
}

/// The original bonus engine (616..=617): real balances of the branded
/// asset, gated on a recent outbound transfer.
pub(crate) fn issue_bonuses_old(store: &mut Store) -> Result<(), MaintenanceError> {
    let now = store.dynamic_properties.head_block_time;
    let block_num = store.dynamic_properties.head_block_number;

    let Some(&bonus_asset_id) = store.assets.index().by_symbol.get(BONUS_ASSET_SYMBOL) else {
        return Ok(());
    };
    let bonus_asset = store.assets.try_get(bonus_asset_id)?.clone();
    let issuer_list = store
        .accounts
        .try_get(bonus_asset.issuer)?
        .blacklisted_accounts
        .clone();
    let alpha_list = alpha_blacklist(store);

    let payouts = {
        let mut tree = ReferralTree::new(store, bonus_asset_id, false);
        tree.form_old();
        tree.scan_old()
    };

    for payout in &payouts {
        let account_id = payout.to_account_id;
        if alpha_list.contains(&account_id) || issuer_list.contains(&account_id) {
            continue;
        }
        if !had_recent_outbound_transfer(store, account_id, bonus_asset_id, now) {
            continue;
        }
        let op = Operation::ReferralIssue {
            issuer: bonus_asset.issuer,
            asset_to_issue: bonus_asset
                .amount(clamp_issue(store, bonus_asset_id, payout.quantity as ShareAmount)?),
            issue_to_account: account_id,
            account_balance: store.get_balance(account_id, bonus_asset_id),
            rank: payout.rank.clone(),
            history: payout.history.clone(),
        };
        if let Err(e) = evaluator::apply_operation(store, op) {
            log::warn!(
                "[Bonus] skipping referral issue to account {account_id} at block {block_num}: {e}"
            );
        }
    }

    for account_id in store.accounts.ids() {
        if alpha_list.contains(&account_id) || issuer_list.contains(&account_id) {
            continue;
        }
        if !had_recent_outbound_transfer(store, account_id, bonus_asset_id, now) {
            continue;
        }
        let balance = store.get_balance(account_id, bonus_asset_id);
        if balance == 0 {
            continue;
        }
        let quantity = (balance.max(0) as u128 * LEGACY_DAILY_BONUS_PERCENT as u128
            / FULL_PERCENT as u128) as ShareAmount;
        if quantity < 1 {
            continue;
        }
        let op = Operation::DailyIssue {
            issuer: bonus_asset.issuer,
            asset_to_issue: bonus_asset.amount(clamp_issue(store, bonus_asset_id, quantity)?),
            issue_to_account: account_id,
            account_balance: balance,
        };
        if let Err(e) = evaluator::apply_operation(store, op) {
            log::warn!(
                "[Bonus] skipping daily issue to account {account_id} at block {block_num}: {e}"
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_types::app::{Account, Asset, AssetBonusParams, AssetDynamicData};

    fn bonus_store() -> Store {
        let mut store = Store::new();
        for (id, name) in [(2, "issuer"), (6, "alpha"), (20, "holder"), (21, "idler")] {
            store.accounts.insert(Account::new(AccountId(id), name)).unwrap();
        }
        for (id, symbol) in [(0u32, "MRD"), (1, "MERIT")] {
            store
                .assets
                .insert(Asset {
                    id: AssetId(id),
                    symbol: symbol.into(),
                    precision: 3,
                    issuer: AccountId(2),
                    max_supply: MAX_SHARE_SUPPLY,
                    params: AssetBonusParams::default(),
                    buyback_account: None,
                })
                .unwrap();
            store
                .asset_dynamic
                .insert(AssetDynamicData {
                    asset: AssetId(id),
                    current_supply: 0,
                    accumulated_fees: 0,
                })
                .unwrap();
        }
        store.dynamic_properties.head_block_time = TimePoint::from_secs(100 * DAY_SECS);
        store.dynamic_properties.head_block_number = 77;
        store
    }

    fn credit(store: &mut Store, account: u32, asset: u32, amount: ShareAmount) {
        store
            .adjust_balance(AccountId(account), AssetId(asset), amount)
            .unwrap();
        store
            .asset_dynamic
            .modify(AssetId(asset), |dd| dd.current_supply += amount)
            .unwrap();
    }

    #[test]
    fn activity_gate_requires_a_recent_outbound_transfer() {
        let mut store = bonus_store();
        credit(&mut store, 20, 1, 10_000);
        let now = store.dynamic_properties.head_block_time;

        assert!(!had_recent_outbound_transfer(&store, AccountId(20), AssetId(1), now));

        evaluator::apply_operation(
            &mut store,
            Operation::Transfer {
                from: AccountId(20),
                to: AccountId(21),
                amount: meridian_types::AssetAmount::new(2 * BONUS_ASSET_PRECISION, AssetId(1)),
            },
        )
        .unwrap();
        assert!(had_recent_outbound_transfer(&store, AccountId(20), AssetId(1), now));
        // A dust transfer below one whole unit does not open the gate.
        assert!(!had_recent_outbound_transfer(&store, AccountId(21), AssetId(1), now));
    }

    #[test]
    fn old_engine_pays_active_holders_only() {
        let mut store = bonus_store();
        credit(&mut store, 20, 1, 100_000);
        credit(&mut store, 21, 1, 100_000);
        // Only the holder shows activity.
        evaluator::apply_operation(
            &mut store,
            Operation::Transfer {
                from: AccountId(20),
                to: AccountId(21),
                amount: meridian_types::AssetAmount::new(BONUS_ASSET_PRECISION, AssetId(1)),
            },
        )
        .unwrap();

        issue_bonuses_old(&mut store).unwrap();

        // 0.65% of 99_000 (post-transfer balance) = 643.
        assert_eq!(store.get_balance(AccountId(20), AssetId(1)), 99_000 + 643);
        // The idler received the transfer but never sent one.
        assert_eq!(store.get_balance(AccountId(21), AssetId(1)), 101_000);
    }

    #[test]
    fn modern_engine_routes_maturing_bonuses_through_the_ledger() {
        let mut store = bonus_store();
        store
            .assets
            .modify(AssetId(1), |a| {
                a.params = AssetBonusParams {
                    daily_bonus: true,
                    bonus_percent: 100, // 1% per day
                    maturing_bonus_balance: true,
                };
            })
            .unwrap();
        credit(&mut store, 20, 1, 50_000);

        issue_bonuses(&mut store).unwrap();

        // Credited to the pending ledger, not the real balance.
        assert_eq!(store.get_balance(AccountId(20), AssetId(1)), 50_000);
        let ledger_id = store.bonus_balances.index().by_account[&AccountId(20)];
        let ledger = store.bonus_balances.get(ledger_id).unwrap();
        assert_eq!(ledger.balances_by_date.len(), 1);
        assert_eq!(ledger.balances_by_date[0].balances[&AssetId(1)], 500);

        // One day later the modern engine releases yesterday's entry.
        store.dynamic_properties.head_block_time =
            store.dynamic_properties.head_block_time.plus_secs(DAY_SECS);
        issue_bonuses(&mut store).unwrap();
        assert!(store.get_balance(AccountId(20), AssetId(1)) > 50_000);
    }

    #[test]
    fn blacklisted_accounts_never_earn() {
        let mut store = bonus_store();
        store
            .assets
            .modify(AssetId(1), |a| {
                a.params = AssetBonusParams {
                    daily_bonus: true,
                    bonus_percent: 100,
                    maturing_bonus_balance: false,
                };
            })
            .unwrap();
        store
            .accounts
            .modify(ALPHA_ACCOUNT, |a| {
                a.blacklisted_accounts.insert(AccountId(20));
            })
            .unwrap();
        credit(&mut store, 20, 1, 50_000);

        issue_bonuses(&mut store).unwrap();
        assert_eq!(store.get_balance(AccountId(20), AssetId(1)), 50_000);
    }

    #[test]
    fn mature_balance_reset_restarts_history() {
        let mut store = bonus_store();
        credit(&mut store, 20, 1, 9_000);
        store.mature_balances.create(|id| {
            meridian_types::app::AccountMatureBalance {
                id,
                owner: AccountId(20),
                asset_type: AssetId(1),
                balance: 4_000,
                mandatory_transfer: true,
                history: vec![MatureBalanceSnapshot {
                    real_balance: 4_000,
                    balance: 2_000,
                }],
            }
        });

        clear_account_mature_balance_index(&mut store).unwrap();

        assert_eq!(store.get_mature_balance(AccountId(20), AssetId(1)), 9_000);
        let id = store.mature_balances.index().by_account_asset[&(AccountId(20), AssetId(1))];
        let row = store.mature_balances.get(id).unwrap();
        assert!(!row.mandatory_transfer);
        assert_eq!(row.history.len(), 1);
        assert_eq!(row.history[0].balance, 9_000);
    }
}
