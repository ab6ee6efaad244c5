// Path: crates/chain/src/maintenance/tally.rs
//! The per-account sweep: vote tallying and fee-burst processing.
//!
//! Both jobs share one traversal of the account table in ascending name
//! order — the canonical deterministic sweep order.

use super::Scratch;
use meridian_store::Store;
use meridian_types::app::{Account, ChainParameters, VestingBalance};
use meridian_types::constants::{CORE_ASSET, PROXY_TO_SELF_ACCOUNT};
use meridian_types::{MaintenanceError, TimePoint};

/// Sweeps every account once, feeding the vote tally and flushing pending
/// fee bursts.
pub(crate) fn perform_account_maintenance(
    store: &mut Store,
    params: &ChainParameters,
    now: TimePoint,
    scratch: &mut Scratch<'_>,
) -> Result<(), MaintenanceError> {
    for id in store.account_ids_by_name() {
        let account = store.accounts.try_get(id)?.clone();
        tally_account_votes(store, params, now, &account, scratch)?;
        process_account_fees(store, &account)?;
    }
    Ok(())
}

/// Adds one account's stake to the tally buffers.
///
/// Non-member stake only counts when the parameters allow it. The stake
/// votes the opinions of its voting account when one is set; out-of-range
/// vote ids are ignored, and desired counts above the configured maxima are
/// clipped into the top histogram bucket rather than rejected (this absorbs
/// parameter reductions gracefully).
fn tally_account_votes(
    store: &Store,
    params: &ChainParameters,
    now: TimePoint,
    stake_account: &Account,
    scratch: &mut Scratch<'_>,
) -> Result<(), MaintenanceError> {
    if !params.count_non_member_votes && !stake_account.is_member(now) {
        return Ok(());
    }

    // The stake and the opinions may belong to different accounts.
    let opinion_options = if stake_account.options.voting_account == PROXY_TO_SELF_ACCOUNT {
        stake_account.options.clone()
    } else {
        store
            .accounts
            .try_get(stake_account.options.voting_account)?
            .options
            .clone()
    };

    let in_orders = store
        .account_statistics
        .get(stake_account.id)
        .map(|s| s.total_core_in_orders)
        .unwrap_or(0);
    let cashback = stake_account
        .cashback_vb
        .and_then(|id| store.vesting_balances.get(id))
        .map(|v| v.balance)
        .unwrap_or(0);
    let core_balance = store.get_balance(stake_account.id, CORE_ASSET);
    let voting_stake =
        in_orders.max(0) as u64 + cashback.max(0) as u64 + core_balance.max(0) as u64;

    for vote_id in &opinion_options.votes {
        let offset = vote_id.instance() as usize;
        if offset < scratch.vote_tally.len() {
            scratch.vote_tally[offset] += voting_stake;
        }
    }

    if opinion_options.num_witness <= params.maximum_witness_count {
        let offset = usize::from(opinion_options.num_witness / 2)
            .min(scratch.witness_count_histogram.len() - 1);
        scratch.witness_count_histogram[offset] += voting_stake;
    }
    if opinion_options.num_committee <= params.maximum_committee_count {
        let offset = usize::from(opinion_options.num_committee / 2)
            .min(scratch.committee_count_histogram.len() - 1);
        scratch.committee_count_histogram[offset] += voting_stake;
    }

    scratch.total_voting_stake += voting_stake;
    Ok(())
}

/// Flushes an account's accumulated fee statistics: `pending_fees` vest as
/// cashback, `pending_vested_fees` credit the core balance directly.
fn process_account_fees(store: &mut Store, account: &Account) -> Result<(), MaintenanceError> {
    let Some(stats) = store.account_statistics.get(account.id).cloned() else {
        return Ok(());
    };
    if stats.pending_fees == 0 && stats.pending_vested_fees == 0 {
        return Ok(());
    }

    if stats.pending_fees > 0 {
        let vb_id = match account.cashback_vb {
            Some(id) => id,
            None => {
                let owner = account.id;
                let id = store.vesting_balances.create(|id| VestingBalance {
                    id,
                    owner,
                    asset: CORE_ASSET,
                    balance: 0,
                });
                store.accounts.modify(owner, |a| a.cashback_vb = Some(id))?;
                id
            }
        };
        store
            .vesting_balances
            .modify(vb_id, |v| v.balance += stats.pending_fees)?;
    }
    if stats.pending_vested_fees > 0 {
        store.adjust_balance(account.id, CORE_ASSET, stats.pending_vested_fees)?;
    }
    store.statistics_mut(account.id, |s| {
        s.pending_fees = 0;
        s.pending_vested_fees = 0;
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_types::ids::AccountId;
    use meridian_types::vote::{VoteId, VoteKind};

    fn scratch_buffers() -> (Vec<u64>, Vec<u64>, Vec<u64>) {
        (Vec::new(), Vec::new(), Vec::new())
    }

    fn build_scratch<'a>(
        bufs: &'a mut (Vec<u64>, Vec<u64>, Vec<u64>),
        vote_slots: usize,
        hist_slots: usize,
    ) -> Scratch<'a> {
        let scratch = Scratch {
            vote_tally: &mut bufs.0,
            witness_count_histogram: &mut bufs.1,
            committee_count_histogram: &mut bufs.2,
            total_voting_stake: 0,
        };
        scratch.vote_tally.resize(vote_slots, 0);
        scratch.witness_count_histogram.resize(hist_slots, 0);
        scratch.committee_count_histogram.resize(hist_slots, 0);
        scratch
    }

    fn voting_store(stake: i64) -> (Store, Account) {
        let mut store = Store::new();
        let mut account = Account::new(AccountId(10), "voter");
        account.options.votes.insert(VoteId::new(VoteKind::Witness, 1));
        account.options.num_witness = 6;
        account.options.num_committee = 2;
        store.accounts.insert(account.clone()).unwrap();
        store.adjust_balance(AccountId(10), CORE_ASSET, stake).unwrap();
        (store, account)
    }

    #[test]
    fn stake_lands_in_voted_buckets() {
        let (store, account) = voting_store(500);
        let mut bufs = scratch_buffers();
        let mut scratch = build_scratch(&mut bufs, 4, 8);
        let params = ChainParameters::default();

        tally_account_votes(
            &store,
            &params,
            TimePoint::from_secs(100),
            &account,
            &mut scratch,
        )
        .unwrap();

        assert_eq!(scratch.vote_tally[1], 500);
        assert_eq!(scratch.witness_count_histogram[3], 500);
        assert_eq!(scratch.committee_count_histogram[1], 500);
        assert_eq!(scratch.total_voting_stake, 500);
    }

    #[test]
    fn out_of_range_vote_ids_are_ignored() {
        let (store, mut account) = voting_store(500);
        account
            .options
            .votes
            .insert(VoteId::new(VoteKind::Witness, 900));
        let mut bufs = scratch_buffers();
        let mut scratch = build_scratch(&mut bufs, 4, 8);
        let params = ChainParameters::default();

        tally_account_votes(
            &store,
            &params,
            TimePoint::from_secs(100),
            &account,
            &mut scratch,
        )
        .unwrap();

        assert_eq!(scratch.vote_tally.iter().sum::<u64>(), 500);
    }

    #[test]
    fn desired_counts_above_the_cap_are_clipped_into_the_top_bucket() {
        let (store, mut account) = voting_store(100);
        account.options.num_witness = 14;
        let mut bufs = scratch_buffers();
        let mut scratch = build_scratch(&mut bufs, 4, 4);
        let mut params = ChainParameters::default();
        params.maximum_witness_count = 20;

        tally_account_votes(
            &store,
            &params,
            TimePoint::from_secs(100),
            &account,
            &mut scratch,
        )
        .unwrap();

        // 14/2 = 7 clips into the last bucket (index 3).
        assert_eq!(scratch.witness_count_histogram[3], 100);
    }

    #[test]
    fn non_member_stake_is_excluded_when_parameter_says_so() {
        let (store, account) = voting_store(500);
        let mut bufs = scratch_buffers();
        let mut scratch = build_scratch(&mut bufs, 4, 8);
        let mut params = ChainParameters::default();
        params.count_non_member_votes = false;

        tally_account_votes(
            &store,
            &params,
            TimePoint::from_secs(100),
            &account,
            &mut scratch,
        )
        .unwrap();

        assert_eq!(scratch.total_voting_stake, 0);
    }

    #[test]
    fn fee_burst_flushes_into_vesting_and_balance() {
        let mut store = Store::new();
        let account = Account::new(AccountId(3), "earner");
        store.accounts.insert(account.clone()).unwrap();
        store
            .statistics_mut(AccountId(3), |s| {
                s.pending_fees = 70;
                s.pending_vested_fees = 30;
            })
            .unwrap();

        process_account_fees(&mut store, &account).unwrap();

        let vb = store.accounts.get(AccountId(3)).unwrap().cashback_vb.unwrap();
        assert_eq!(store.vesting_balances.get(vb).unwrap().balance, 70);
        assert_eq!(store.get_balance(AccountId(3), CORE_ASSET), 30);
        let stats = store.account_statistics.get(AccountId(3)).unwrap();
        assert_eq!(stats.pending_fees, 0);
        assert_eq!(stats.pending_vested_fees, 0);
    }
}
