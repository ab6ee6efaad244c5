// Path: crates/chain/src/maintenance/fba.rs
//! Fee-backed-asset pool distribution.
//!
//! Three hard-wired pools collect fees from the confidential-transfer
//! operations. Each pass the pools split 20/60/20 between the network (a
//! burn), the designated asset's buyback account, and its issuer. A pool
//! with no designated asset burns everything.

use crate::evaluator;
use meridian_store::Store;
use meridian_types::app::Operation;
use meridian_types::constants::{CORE_ASSET, FULL_PERCENT, ONE_PERCENT};
use meridian_types::ids::FbaAccumulatorId;
use meridian_types::MaintenanceError;

/// Pool fed by transfer-to-blind fees.
pub const FBA_TRANSFER_TO_BLIND: FbaAccumulatorId = FbaAccumulatorId(0);
/// Pool fed by blind-transfer fees.
pub const FBA_BLIND_TRANSFER: FbaAccumulatorId = FbaAccumulatorId(1);
/// Pool fed by transfer-from-blind fees.
pub const FBA_TRANSFER_FROM_BLIND: FbaAccumulatorId = FbaAccumulatorId(2);

/// Splits every pool with the protocol's fixed 20/60/20 shares.
pub(crate) fn distribute_fba_balances(store: &mut Store) -> Result<(), MaintenanceError> {
    for fba_id in [
        FBA_TRANSFER_TO_BLIND,
        FBA_BLIND_TRANSFER,
        FBA_TRANSFER_FROM_BLIND,
    ] {
        split_fba_balance(
            store,
            fba_id,
            20 * ONE_PERCENT,
            60 * ONE_PERCENT,
            20 * ONE_PERCENT,
        )?;
    }
    Ok(())
}

/// Splits one pool: burns the network share, credits the buyback account and
/// the issuer, and zeroes the accumulator.
fn split_fba_balance(
    store: &mut Store,
    fba_id: FbaAccumulatorId,
    network_pct: u16,
    designated_asset_buyback_pct: u16,
    designated_asset_issuer_pct: u16,
) -> Result<(), MaintenanceError> {
    if u32::from(network_pct)
        + u32::from(designated_asset_buyback_pct)
        + u32::from(designated_asset_issuer_pct)
        != u32::from(FULL_PERCENT)
    {
        return Err(MaintenanceError::ParameterViolation(format!(
            "fba pool {fba_id} percentages do not sum to 100%"
        )));
    }
    let Some(fba) = store.fba_accumulators.get(fba_id).cloned() else {
        return Ok(());
    };
    if fba.accumulated_fba_fees == 0 {
        return Ok(());
    }

    let Some(designated_asset_id) = fba.designated_asset else {
        log::info!(
            "[Fba] {} core given to network at block {} due to non-configured pool {fba_id}",
            fba.accumulated_fba_fees,
            store.dynamic_properties.head_block_number
        );
        store
            .asset_dynamic
            .modify(CORE_ASSET, |dd| dd.current_supply -= fba.accumulated_fba_fees)?;
        store
            .fba_accumulators
            .modify(fba_id, |f| f.accumulated_fba_fees = 0)?;
        return Ok(());
    };

    let accumulated = fba.accumulated_fba_fees.max(0) as u128;
    let buyback_amount = (accumulated * u128::from(designated_asset_buyback_pct)
        / u128::from(FULL_PERCENT)) as i64;
    let issuer_amount = (accumulated * u128::from(designated_asset_issuer_pct)
        / u128::from(FULL_PERCENT)) as i64;
    if buyback_amount + issuer_amount > fba.accumulated_fba_fees {
        return Err(MaintenanceError::InvariantViolation(format!(
            "fba pool {fba_id} split exceeds its accumulated fees"
        )));
    }
    let network_amount = fba.accumulated_fba_fees - (buyback_amount + issuer_amount);

    let designated_asset = store.assets.try_get(designated_asset_id)?.clone();

    if network_amount != 0 {
        store
            .asset_dynamic
            .modify(CORE_ASSET, |dd| dd.current_supply -= network_amount)?;
    }

    if buyback_amount != 0 {
        let Some(buyback_account) = designated_asset.buyback_account else {
            return Err(MaintenanceError::ParameterViolation(format!(
                "designated asset {designated_asset_id} has no buyback account"
            )));
        };
        store.adjust_balance(buyback_account, CORE_ASSET, buyback_amount)?;
        evaluator::push_applied_operation(
            store,
            Operation::FbaDistribute {
                account_id: buyback_account,
                fba_id,
                amount: buyback_amount,
            },
        );
    }

    if issuer_amount != 0 {
        store.adjust_balance(designated_asset.issuer, CORE_ASSET, issuer_amount)?;
        evaluator::push_applied_operation(
            store,
            Operation::FbaDistribute {
                account_id: designated_asset.issuer,
                fba_id,
                amount: issuer_amount,
            },
        );
    }

    store
        .fba_accumulators
        .modify(fba_id, |f| f.accumulated_fba_fees = 0)?;
    Ok(())
}
