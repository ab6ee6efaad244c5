// Path: crates/chain/src/evaluator.rs
//! The synthetic-operation boundary.
//!
//! The maintenance engine never edits balances or supply directly for
//! anything that is observable as an operation: it builds an [`Operation`]
//! and pushes it through [`apply_operation`], which validates, applies the
//! balance and supply effects, and records the operation in history. A
//! rejection here is the per-record recoverable failure mode: callers log it
//! with context and continue with the next record.

use meridian_store::Store;
use meridian_types::app::{
    AccountTransactionHistory, ChequeStatus, LimitOrder, Operation, OperationHistory,
};
use meridian_types::constants::{CORE_ASSET, MAX_SHARE_SUPPLY};
use meridian_types::ids::{AccountId, LimitOrderId, OperationHistoryId};
use meridian_types::{AssetAmount, EvaluatorError, TimePoint};

/// Outcome of a successfully applied operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationResult {
    /// No object was created.
    None,
    /// A limit order was placed.
    LimitOrder(LimitOrderId),
}

/// Clamps `amount` so that issuing it cannot push the asset's supply past
/// [`MAX_SHARE_SUPPLY`]. Issuing a clamped amount is not an error.
pub fn check_supply_overflow(
    store: &Store,
    amount: AssetAmount,
) -> Result<AssetAmount, EvaluatorError> {
    let dd = store.asset_dynamic.try_get(amount.asset_id)?;
    let headroom = MAX_SHARE_SUPPLY - dd.current_supply;
    Ok(AssetAmount::new(amount.amount.min(headroom), amount.asset_id))
}

/// Issues `amount` out of thin air to `to`, growing the asset's supply.
/// The amount must already be clamped by [`check_supply_overflow`].
fn issue(store: &mut Store, to: AccountId, amount: AssetAmount) -> Result<(), EvaluatorError> {
    store
        .asset_dynamic
        .modify(amount.asset_id, |dd| dd.current_supply += amount.amount)?;
    store.adjust_balance(to, amount.asset_id, amount.amount)?;
    Ok(())
}

/// Rejects issuance to accounts the issuer has blacklisted.
fn check_issue_allowed(
    store: &Store,
    issuer: AccountId,
    to: AccountId,
) -> Result<(), EvaluatorError> {
    let issuer_account = store.accounts.try_get(issuer)?;
    if issuer_account.blacklisted_accounts.contains(&to) {
        return Err(EvaluatorError::AuthorityRejected(format!(
            "account {to} is blacklisted by issuer {issuer}"
        )));
    }
    Ok(())
}

/// Records `op` in the global history and threads it onto the history
/// linked list of every affected account.
pub fn push_applied_operation(store: &mut Store, op: Operation) -> OperationHistoryId {
    let block_num = store.dynamic_properties.head_block_number;
    let time = store.dynamic_properties.head_block_time;
    let affected = op.affected_accounts();
    let op_id = store.operation_history.create(|id| OperationHistory {
        id,
        op,
        block_num,
        time,
    });
    for account in affected {
        let prev = store
            .account_statistics
            .get(account)
            .and_then(|s| s.most_recent_op);
        let node = store.account_history.create(|id| AccountTransactionHistory {
            id,
            account,
            operation_id: op_id,
            block_time: time,
            next: prev,
        });
        // The statistics row is created on demand, so this cannot fail.
        let _ = store.statistics_mut(account, |s| {
            s.most_recent_op = Some(node);
            s.total_ops += 1;
        });
    }
    op_id
}

fn apply_limit_order_create(
    store: &mut Store,
    seller: AccountId,
    amount_to_sell: AssetAmount,
    min_to_receive: AssetAmount,
    expiration: TimePoint,
) -> Result<LimitOrderId, EvaluatorError> {
    if amount_to_sell.amount <= 0 {
        return Err(EvaluatorError::Validation(
            "amount to sell must be positive".into(),
        ));
    }
    let seller_account = store.accounts.try_get(seller)?;
    if let Some(allowed) = &seller_account.allowed_assets {
        if !allowed.contains(&amount_to_sell.asset_id) {
            return Err(EvaluatorError::AuthorityRejected(format!(
                "seller {seller} may not hold or sell asset {}",
                amount_to_sell.asset_id
            )));
        }
    }
    let sell_asset = store.assets.try_get(amount_to_sell.asset_id)?;
    let sell_issuer = sell_asset.issuer;
    let issuer_account = store.accounts.try_get(sell_issuer)?;
    if issuer_account.blacklisted_accounts.contains(&seller) {
        return Err(EvaluatorError::AuthorityRejected(format!(
            "seller {seller} is blacklisted by issuer of asset {}",
            amount_to_sell.asset_id
        )));
    }
    let balance = store.get_balance(seller, amount_to_sell.asset_id);
    if balance < amount_to_sell.amount {
        return Err(EvaluatorError::InsufficientBalance(format!(
            "seller {seller} holds {balance} of asset {}, needs {}",
            amount_to_sell.asset_id, amount_to_sell.amount
        )));
    }

    store.adjust_balance(seller, amount_to_sell.asset_id, -amount_to_sell.amount)?;
    if amount_to_sell.asset_id == CORE_ASSET {
        store.statistics_mut(seller, |s| s.total_core_in_orders += amount_to_sell.amount)?;
    }
    let order = store.limit_orders.create(|id| LimitOrder {
        id,
        seller,
        for_sale: amount_to_sell.amount,
        sell_asset: amount_to_sell.asset_id,
        receive_asset: min_to_receive.asset_id,
        min_to_receive: min_to_receive.amount,
        expiration,
    });
    Ok(order)
}

fn apply_limit_order_cancel(
    store: &mut Store,
    order_id: LimitOrderId,
    fee_paying_account: AccountId,
) -> Result<(), EvaluatorError> {
    let order = store.limit_orders.try_get(order_id)?.clone();
    if order.seller != fee_paying_account {
        return Err(EvaluatorError::Validation(format!(
            "order {order_id} does not belong to account {fee_paying_account}"
        )));
    }
    store.adjust_balance(order.seller, order.sell_asset, order.for_sale)?;
    if order.sell_asset == CORE_ASSET {
        store.statistics_mut(order.seller, |s| s.total_core_in_orders -= order.for_sale)?;
    }
    store.limit_orders.remove(order_id)?;
    Ok(())
}

fn apply_transfer(
    store: &mut Store,
    from: AccountId,
    to: AccountId,
    amount: AssetAmount,
) -> Result<(), EvaluatorError> {
    if amount.amount <= 0 {
        return Err(EvaluatorError::Validation("transfer amount must be positive".into()));
    }
    let balance = store.get_balance(from, amount.asset_id);
    if balance < amount.amount {
        return Err(EvaluatorError::InsufficientBalance(format!(
            "account {from} holds {balance} of asset {}, needs {}",
            amount.asset_id, amount.amount
        )));
    }
    store.adjust_balance(from, amount.asset_id, -amount.amount)?;
    store.adjust_balance(to, amount.asset_id, amount.amount)?;
    Ok(())
}

/// Validates and applies a synthetic operation, then records it in history.
pub fn apply_operation(
    store: &mut Store,
    op: Operation,
) -> Result<OperationResult, EvaluatorError> {
    let result = match &op {
        Operation::DailyIssue {
            issuer,
            asset_to_issue,
            issue_to_account,
            ..
        } => {
            if asset_to_issue.amount < 0 {
                return Err(EvaluatorError::Validation("negative issue amount".into()));
            }
            check_issue_allowed(store, *issuer, *issue_to_account)?;
            let clamped = check_supply_overflow(store, *asset_to_issue)?;
            issue(store, *issue_to_account, clamped)?;
            OperationResult::None
        }
        Operation::ReferralIssue {
            issuer,
            asset_to_issue,
            issue_to_account,
            ..
        } => {
            if asset_to_issue.amount < 0 {
                return Err(EvaluatorError::Validation("negative issue amount".into()));
            }
            check_issue_allowed(store, *issuer, *issue_to_account)?;
            let clamped = check_supply_overflow(store, *asset_to_issue)?;
            issue(store, *issue_to_account, clamped)?;
            OperationResult::None
        }
        Operation::ChequeReverse {
            cheque_id,
            account_id,
            amount,
        } => {
            let cheque = store.cheques.try_get(*cheque_id)?.clone();
            if cheque.status != ChequeStatus::New {
                return Err(EvaluatorError::Validation(format!(
                    "cheque {cheque_id} is not reversible"
                )));
            }
            if cheque.drawer != *account_id {
                return Err(EvaluatorError::Validation(format!(
                    "cheque {cheque_id} was not drawn by account {account_id}"
                )));
            }
            store.adjust_balance(cheque.drawer, amount.asset_id, amount.amount)?;
            let used_at = store.dynamic_properties.head_block_time;
            store.cheques.modify(*cheque_id, |c| {
                c.status = ChequeStatus::Reversed;
                c.datetime_used = used_at;
                c.amount_remaining = 0;
            })?;
            OperationResult::None
        }
        Operation::LimitOrderCreate {
            seller,
            amount_to_sell,
            min_to_receive,
            expiration,
            ..
        } => {
            let order =
                apply_limit_order_create(store, *seller, *amount_to_sell, *min_to_receive, *expiration)?;
            OperationResult::LimitOrder(order)
        }
        Operation::LimitOrderCancel {
            order,
            fee_paying_account,
        } => {
            apply_limit_order_cancel(store, *order, *fee_paying_account)?;
            OperationResult::None
        }
        Operation::AccountUpgrade {
            account_to_upgrade,
            upgrade_to_lifetime_member,
        } => {
            if !upgrade_to_lifetime_member {
                return Err(EvaluatorError::Validation(
                    "only lifetime upgrades are supported".into(),
                ));
            }
            store
                .accounts
                .modify(*account_to_upgrade, |a| {
                    a.membership_expiration_date = TimePoint::MAX;
                })
                .map_err(EvaluatorError::Store)?;
            OperationResult::None
        }
        Operation::FbaDistribute { .. } => OperationResult::None,
        Operation::FundPayment {
            account_id, amount, ..
        } => {
            let clamped = check_supply_overflow(store, *amount)?;
            issue(store, *account_id, clamped)?;
            OperationResult::None
        }
        Operation::Transfer { from, to, amount } => {
            apply_transfer(store, *from, *to, *amount)?;
            OperationResult::None
        }
    };
    push_applied_operation(store, op);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_types::app::{Account, Asset, AssetBonusParams, AssetDynamicData};
    use meridian_types::ids::AssetId;

    fn seeded_store() -> Store {
        let mut store = Store::new();
        for (id, name) in [(0, "committee"), (1, "witnesses"), (2, "issuer"), (3, "holder")] {
            store
                .accounts
                .insert(Account::new(AccountId(id), name))
                .unwrap();
        }
        store
            .assets
            .insert(Asset {
                id: CORE_ASSET,
                symbol: "MRD".into(),
                precision: 3,
                issuer: AccountId(2),
                max_supply: 1_000_000,
                params: AssetBonusParams::default(),
                buyback_account: None,
            })
            .unwrap();
        store
            .asset_dynamic
            .insert(AssetDynamicData {
                asset: CORE_ASSET,
                current_supply: 10_000,
                accumulated_fees: 0,
            })
            .unwrap();
        store.adjust_balance(AccountId(3), CORE_ASSET, 500).unwrap();
        store
            .asset_dynamic
            .modify(CORE_ASSET, |dd| dd.current_supply += 500)
            .unwrap();
        store
    }

    #[test]
    fn daily_issue_grows_supply_and_balance() {
        let mut store = seeded_store();
        let before = store.asset_dynamic.get(CORE_ASSET).unwrap().current_supply;
        apply_operation(
            &mut store,
            Operation::DailyIssue {
                issuer: AccountId(2),
                asset_to_issue: AssetAmount::new(100, CORE_ASSET),
                issue_to_account: AccountId(3),
                account_balance: 500,
            },
        )
        .unwrap();
        assert_eq!(store.get_balance(AccountId(3), CORE_ASSET), 600);
        assert_eq!(
            store.asset_dynamic.get(CORE_ASSET).unwrap().current_supply,
            before + 100
        );
    }

    #[test]
    fn issue_to_blacklisted_account_is_rejected() {
        let mut store = seeded_store();
        store
            .accounts
            .modify(AccountId(2), |a| {
                a.blacklisted_accounts.insert(AccountId(3));
            })
            .unwrap();
        let err = apply_operation(
            &mut store,
            Operation::DailyIssue {
                issuer: AccountId(2),
                asset_to_issue: AssetAmount::new(100, CORE_ASSET),
                issue_to_account: AccountId(3),
                account_balance: 500,
            },
        )
        .unwrap_err();
        assert!(matches!(err, EvaluatorError::AuthorityRejected(_)));
    }

    #[test]
    fn issuance_clamps_at_max_supply() {
        let mut store = seeded_store();
        store
            .asset_dynamic
            .modify(CORE_ASSET, |dd| dd.current_supply = MAX_SHARE_SUPPLY - 10)
            .unwrap();
        apply_operation(
            &mut store,
            Operation::DailyIssue {
                issuer: AccountId(2),
                asset_to_issue: AssetAmount::new(100, CORE_ASSET),
                issue_to_account: AccountId(3),
                account_balance: 500,
            },
        )
        .unwrap();
        assert_eq!(
            store.asset_dynamic.get(CORE_ASSET).unwrap().current_supply,
            MAX_SHARE_SUPPLY
        );
    }

    #[test]
    fn order_round_trip_restores_balance_and_orders_total() {
        let mut store = seeded_store();
        let result = apply_operation(
            &mut store,
            Operation::LimitOrderCreate {
                seller: AccountId(3),
                amount_to_sell: AssetAmount::new(500, CORE_ASSET),
                min_to_receive: AssetAmount::new(1, AssetId(1)),
                expiration: TimePoint::MAX,
                fill_or_kill: false,
            },
        )
        .unwrap();
        let OperationResult::LimitOrder(order) = result else {
            panic!("expected an order id");
        };
        assert_eq!(store.get_balance(AccountId(3), CORE_ASSET), 0);
        assert_eq!(
            store.account_statistics.get(AccountId(3)).unwrap().total_core_in_orders,
            500
        );

        apply_operation(
            &mut store,
            Operation::LimitOrderCancel {
                order,
                fee_paying_account: AccountId(3),
            },
        )
        .unwrap();
        assert_eq!(store.get_balance(AccountId(3), CORE_ASSET), 500);
        assert_eq!(
            store.account_statistics.get(AccountId(3)).unwrap().total_core_in_orders,
            0
        );
        assert!(store.limit_orders.is_empty());
    }

    #[test]
    fn history_links_newest_first() {
        let mut store = seeded_store();
        for _ in 0..2 {
            apply_operation(
                &mut store,
                Operation::DailyIssue {
                    issuer: AccountId(2),
                    asset_to_issue: AssetAmount::new(1, CORE_ASSET),
                    issue_to_account: AccountId(3),
                    account_balance: 0,
                },
            )
            .unwrap();
        }
        let stats = store.account_statistics.get(AccountId(3)).unwrap();
        let head = stats.most_recent_op.unwrap();
        let node = store.account_history.get(head).unwrap();
        assert!(node.next.is_some());
        let older = store.account_history.get(node.next.unwrap()).unwrap();
        assert!(older.next.is_none());
        assert!(older.operation_id < node.operation_id);
    }
}
