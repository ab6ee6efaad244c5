// Path: crates/chain/src/maintenance/buyback.rs
//! Buyback order placement.
//!
//! Each buyback-configured asset has an account that accumulates other
//! assets (fee splits, market proceeds). Every pass that account offers its
//! entire whitelisted holdings for the asset being bought back, then cancels
//! whatever did not fill immediately. Evaluator rejections are per-asset
//! recoverable: log and continue with the next holding.

use crate::evaluator::{self, OperationResult};
use meridian_store::Store;
use meridian_types::app::Operation;
use meridian_types::ids::{AccountId, AssetId};
use meridian_types::{AssetAmount, EvaluatorError, TimePoint};

/// Places and immediately cancels buyback orders for every program.
pub(crate) fn create_buyback_orders(store: &mut Store) {
    for buyback_id in store.buybacks.ids() {
        let Some(buyback) = store.buybacks.get(buyback_id).cloned() else {
            continue;
        };
        let Some(asset_to_buy) = store.assets.get(buyback.asset_to_buy).cloned() else {
            log::warn!(
                "[Buyback] program {buyback_id} references missing asset {}",
                buyback.asset_to_buy
            );
            continue;
        };
        let Some(buyback_account_id) = asset_to_buy.buyback_account else {
            log::warn!(
                "[Buyback] asset {} has a program but no buyback account",
                asset_to_buy.id
            );
            continue;
        };
        let Some(buyback_account) = store.accounts.get(buyback_account_id).cloned() else {
            continue;
        };
        let Some(allowed_assets) = buyback_account.allowed_assets.clone() else {
            log::warn!(
                "[Buyback] skipping buyback account {buyback_account_id} at block {}: allowed_assets does not exist",
                store.dynamic_properties.head_block_number
            );
            continue;
        };

        // Ascending asset order over the account's holdings.
        for (asset_to_sell, _) in store.balances.index().account_rows(buyback_account_id) {
            if asset_to_sell == asset_to_buy.id {
                continue;
            }
            let amount_to_sell = store.get_balance(buyback_account_id, asset_to_sell);
            if amount_to_sell == 0 {
                continue;
            }
            if !allowed_assets.contains(&asset_to_sell) {
                log::warn!(
                    "[Buyback] account {buyback_account_id} not selling disallowed holdings of asset {asset_to_sell} at block {}",
                    store.dynamic_properties.head_block_number
                );
                continue;
            }

            if let Err(e) = submit_and_cancel(
                store,
                buyback_account_id,
                AssetAmount::new(amount_to_sell, asset_to_sell),
                asset_to_buy.id,
            ) {
                log::warn!(
                    "[Buyback] skipping sale of asset {asset_to_sell} for asset {} by account {buyback_account_id} at block {}: {e}",
                    asset_to_buy.id,
                    store.dynamic_properties.head_block_number
                );
                continue;
            }
        }
    }
}

/// One holding's attempt: offer everything at the minimum price, then cancel
/// the residual order if it survived.
fn submit_and_cancel(
    store: &mut Store,
    seller: AccountId,
    amount_to_sell: AssetAmount,
    asset_to_buy: AssetId,
) -> Result<(), EvaluatorError> {
    let created = evaluator::apply_operation(
        store,
        Operation::LimitOrderCreate {
            seller,
            amount_to_sell,
            min_to_receive: AssetAmount::new(1, asset_to_buy),
            expiration: TimePoint::MAX,
            fill_or_kill: false,
        },
    )?;
    if let OperationResult::LimitOrder(order) = created {
        if store.limit_orders.contains(order) {
            evaluator::apply_operation(
                store,
                Operation::LimitOrderCancel {
                    order,
                    fee_paying_account: seller,
                },
            )?;
        }
    }
    Ok(())
}
