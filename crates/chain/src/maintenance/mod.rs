// Path: crates/chain/src/maintenance/mod.rs
//! The maintenance pass orchestrator.
//!
//! [`MaintenanceEngine::perform_chain_maintenance`] runs the fixed pass
//! order. It executes inside the block-application critical section: the
//! store is exclusively owned, there are no suspension points, and any fatal
//! error aborts the containing block so the transactional layer can roll the
//! state back.

/// Funds and cheques.
pub mod banking;
/// Daily bonus issuance (all three engines) and mature-balance upkeep.
pub mod bonus;
/// Treasury budget computation.
pub mod budget;
/// Buyback order placement.
pub mod buyback;
/// Producer and governance elections.
pub mod elections;
/// Fee-backed-asset pool distribution.
pub mod fba;
/// History pruning.
pub mod reaper;
/// Top-holder special authorities.
pub mod special_authority;
/// Vote tallying and fee-burst processing.
pub mod tally;
/// Worker vote refresh and payroll.
pub mod workers;

use crate::evaluator;
use crate::hardfork::{
    HARDFORK_613_TIME, HARDFORK_616_MAINTENANCE_CHANGE_TIME, HARDFORK_616_TIME,
    HARDFORK_617_TIME, HARDFORK_620_TIME, HARDFORK_622_TIME,
};
use meridian_store::Store;
use meridian_types::app::{BlockInfo, Operation};
use meridian_types::{MaintenanceError, TimePoint, VoteId};

/// Node-local engine configuration.
#[derive(Debug, Clone, Default)]
pub struct MaintenanceConfig {
    /// History retention horizon in days. `None` (or zero) disables reaping.
    pub history_retention_days: Option<u32>,
}

/// Per-pass scratch state. Holding the buffers behind one guard gives them a
/// single owner for the duration of the pass, and the `Drop` impl clears
/// them on every exit path, including unwinding.
pub(crate) struct Scratch<'a> {
    pub vote_tally: &'a mut Vec<u64>,
    pub witness_count_histogram: &'a mut Vec<u64>,
    pub committee_count_histogram: &'a mut Vec<u64>,
    pub total_voting_stake: u64,
}

impl Scratch<'_> {
    /// Tally of one voting option; out-of-range ids count zero.
    pub fn tally_of(&self, vote_id: VoteId) -> u64 {
        self.vote_tally
            .get(vote_id.instance() as usize)
            .copied()
            .unwrap_or(0)
    }
}

impl Drop for Scratch<'_> {
    fn drop(&mut self) {
        self.vote_tally.clear();
        self.witness_count_histogram.clear();
        self.committee_count_histogram.clear();
    }
}

/// The periodic maintenance engine.
///
/// The scratch buffers live on the engine so their capacity is reused across
/// passes; between passes they are empty, and that emptiness is checked as a
/// pass-entry invariant.
#[derive(Debug, Default)]
pub struct MaintenanceEngine {
    config: MaintenanceConfig,
    vote_tally: Vec<u64>,
    witness_count_histogram: Vec<u64>,
    committee_count_histogram: Vec<u64>,
}

impl MaintenanceEngine {
    /// Builds an engine with the given node-local configuration.
    pub fn new(config: MaintenanceConfig) -> Self {
        MaintenanceEngine {
            config,
            ..MaintenanceEngine::default()
        }
    }

    /// Runs the full maintenance pass for `next_block`.
    ///
    /// The caller must already have advanced the dynamic properties to the
    /// triggering block (`head_block_time == next_block.timestamp`); the
    /// engine is the last step of applying that block.
    pub fn perform_chain_maintenance(
        &mut self,
        store: &mut Store,
        next_block: &BlockInfo,
    ) -> Result<(), MaintenanceError> {
        if !self.vote_tally.is_empty()
            || !self.witness_count_histogram.is_empty()
            || !self.committee_count_histogram.is_empty()
        {
            return Err(MaintenanceError::InvariantViolation(
                "scratch buffers not empty on pass entry".into(),
            ));
        }

        fba::distribute_fba_balances(store)?;
        buyback::create_buyback_orders(store);

        let params = store.global_properties.parameters.clone();
        let now = store.dynamic_properties.head_block_time;

        {
            let mut scratch = Scratch {
                vote_tally: &mut self.vote_tally,
                witness_count_histogram: &mut self.witness_count_histogram,
                committee_count_histogram: &mut self.committee_count_histogram,
                total_voting_stake: 0,
            };
            scratch
                .vote_tally
                .resize(store.global_properties.next_available_vote_id as usize, 0);
            scratch
                .witness_count_histogram
                .resize(usize::from(params.maximum_witness_count) / 2 + 1, 0);
            scratch
                .committee_count_histogram
                .resize(usize::from(params.maximum_committee_count) / 2 + 1, 0);

            tally::perform_account_maintenance(store, &params, now, &mut scratch)?;
            special_authority::update_top_n_authorities(store)?;
            elections::update_active_witnesses(store, &scratch, now)?;
            elections::update_active_committee_members(store, &scratch, now)?;
            workers::update_worker_votes(store, &scratch, now)?;
        }

        remove_fee_scaling(store)?;
        if let Some(pending) = store.global_properties.pending_parameters.take() {
            store.global_properties.parameters = pending;
        }

        let next_maintenance_time = advance_maintenance_time(store, next_block)?;

        let old_next = store.dynamic_properties.next_maintenance_time;
        if old_next < HARDFORK_613_TIME && next_maintenance_time >= HARDFORK_613_TIME {
            deprecate_annual_members(store, now);
        }

        store.dynamic_properties.next_maintenance_time = next_maintenance_time;
        store.dynamic_properties.accounts_registered_this_interval = 0;

        for id in store.bitassets.ids() {
            store.bitassets.modify(id, |b| b.force_settled_volume = 0)?;
        }

        // The budget needs the freshly advanced next_maintenance_time.
        budget::process_budget(store)?;

        log::info!(
            "[Maintenance] pass complete: head_block_time={now}, next_maintenance_time={next_maintenance_time}"
        );

        if now > HARDFORK_622_TIME {
            banking::process_funds(store)?;
        }
        if now > HARDFORK_620_TIME {
            bonus::issue_bonuses(store)?;
        } else if now > HARDFORK_617_TIME {
            bonus::issue_bonuses_before_620(store)?;
        } else if now > HARDFORK_616_TIME {
            bonus::issue_bonuses_old(store)?;
        }

        banking::process_cheques(store);

        reaper::clear_old_entities(store, &self.config)?;
        Ok(())
    }
}

/// Removes the account-registration fee scaling accumulated during the
/// interval by shifting the basic fee back down.
fn remove_fee_scaling(store: &mut Store) -> Result<(), MaintenanceError> {
    let registered = store.dynamic_properties.accounts_registered_this_interval;
    let p = &mut store.global_properties.parameters;
    if p.accounts_per_fee_scale == 0 {
        return Err(MaintenanceError::ParameterViolation(
            "accounts_per_fee_scale must be positive".into(),
        ));
    }
    let steps = registered / p.accounts_per_fee_scale;
    let shift = u32::from(p.account_fee_scale_bitshifts) * steps;
    p.current_fees.account_create_basic_fee >>= shift.min(63);
    Ok(())
}

/// Computes the next maintenance deadline.
///
/// Picks the smallest k such that `next + k * interval > head_block_time`;
/// the one-shot phase shift replaces k's fractional step with 3/8 of an
/// interval exactly once, at the scheduled wall-clock instant. 0.375 is
/// exactly representable, so the float product is deterministic.
fn advance_maintenance_time(
    store: &Store,
    next_block: &BlockInfo,
) -> Result<TimePoint, MaintenanceError> {
    let maintenance_interval = u64::from(store.global_properties.parameters.maintenance_interval);
    if maintenance_interval == 0 {
        return Err(MaintenanceError::ParameterViolation(
            "maintenance_interval must be positive".into(),
        ));
    }

    let mut next_maintenance_time = store.dynamic_properties.next_maintenance_time;
    if next_maintenance_time > next_block.timestamp {
        return Ok(next_maintenance_time);
    }

    if next_block.block_num == 1 {
        next_maintenance_time = TimePoint::from_secs(
            (next_block.timestamp.secs() / maintenance_interval + 1) * maintenance_interval,
        );
    } else {
        let head = store.dynamic_properties.head_block_time;
        let y = head.diff_secs(next_maintenance_time).max(0) as u64 / maintenance_interval;
        let coef = if head == HARDFORK_616_MAINTENANCE_CHANGE_TIME {
            0.375
        } else {
            1.0
        };
        let step = ((y as f64 + coef) * maintenance_interval as f64) as u64;
        next_maintenance_time = next_maintenance_time.plus_secs(step);
    }
    Ok(next_maintenance_time)
}

/// One-shot at the 613 boundary: upgrades every annual member to lifetime
/// membership through the evaluator, skipping accounts it rejects.
fn deprecate_annual_members(store: &mut Store, now: TimePoint) {
    for id in store.accounts.ids() {
        let Some(account) = store.accounts.get(id) else {
            continue;
        };
        if !account.is_annual_member(now) {
            continue;
        }
        let name = account.name.clone();
        let op = Operation::AccountUpgrade {
            account_to_upgrade: id,
            upgrade_to_lifetime_member: true,
        };
        if let Err(e) = evaluator::apply_operation(store, op) {
            log::warn!(
                "[Maintenance] skipping annual-member upgrade for account {id} ({name}) at block {}: {e}",
                store.dynamic_properties.head_block_number
            );
        }
    }
}
