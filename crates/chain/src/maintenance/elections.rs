// Path: crates/chain/src/maintenance/elections.rs
//! Producer and governance elections.
//!
//! Elected-set sizing derives from the count histograms (median by stake with
//! half-voter exclusion), candidates rank by tally with the vote id as the
//! deterministic tie-break, and the system accounts' authorities are rebuilt
//! from the winners.

use super::Scratch;
use crate::hardfork::HARDFORK_533_TIME;
use crate::vote_counter::{find_msb, VoteCounter};
use meridian_store::Store;
use meridian_types::constants::{COMMITTEE_ACCOUNT, RELAXED_COMMITTEE_ACCOUNT, WITNESS_ACCOUNT};
use meridian_types::ids::AccountId;
use meridian_types::{Authority, MaintenanceError, TimePoint, VoteId};
use std::collections::BTreeMap;

/// Tally of one voting option; out-of-range ids count zero.
fn tally_of(tally: &[u64], vote_id: VoteId) -> u64 {
    tally.get(vote_id.instance() as usize).copied().unwrap_or(0)
}

/// Selects the top `count` candidates: tally descending, vote id ascending
/// on ties. Ties MUST resolve this way on every node.
pub(crate) fn sort_votable<T: Clone>(
    mut candidates: Vec<T>,
    count: usize,
    tally: &[u64],
    vote_id_of: impl Fn(&T) -> VoteId,
) -> Vec<T> {
    let count = count.min(candidates.len());
    candidates.sort_by(|a, b| {
        let va = tally_of(tally, vote_id_of(a));
        let vb = tally_of(tally, vote_id_of(b));
        vb.cmp(&va)
            .then_with(|| vote_id_of(a).cmp(&vote_id_of(b)))
    });
    candidates.truncate(count);
    candidates
}

/// Derives the target half-population from a count histogram: walk buckets
/// until the accumulated stake passes the target. Accounts opting for 0 or 1
/// seats sit in bucket 0 and abstain from the sizing question.
pub(crate) fn desired_count(histogram: &[u64], stake_target: u64) -> usize {
    let mut count = 0;
    let mut tally = 0u64;
    if stake_target > 0 {
        while count < histogram.len() - 1 && tally <= stake_target {
            count += 1;
            tally += histogram[count];
        }
    }
    count
}

/// Pre-533 authority construction: drop low bits until the largest weight
/// fits 16 bits, floor every member at weight 1, majority threshold.
fn rebuild_authority_legacy(authority: &mut Authority, members: &[(AccountId, u64)]) {
    authority.clear();
    let mut weights: BTreeMap<AccountId, u64> = BTreeMap::new();
    let mut total_votes: u64 = 0;
    for (account, votes) in members {
        weights.entry(*account).or_insert(*votes);
        total_votes += votes;
    }

    let bits_to_drop = find_msb(total_votes).saturating_sub(15);
    let mut threshold: u32 = 0;
    for (account, weight) in &weights {
        // Zero weights are not allowed; everyone keeps at least one vote.
        let votes = ((weight >> bits_to_drop).max(1)) as u16;
        authority.add_account_weight(*account, votes);
        threshold += u32::from(votes);
    }
    authority.weight_threshold = threshold / 2 + 1;
}

/// Rebuilds a system account's active authority from the elected members.
fn rebuild_elected_authority(
    authority: &mut Authority,
    members: &[(AccountId, u64)],
    now: TimePoint,
) {
    if now < HARDFORK_533_TIME {
        rebuild_authority_legacy(authority, members);
    } else {
        let mut vc = VoteCounter::new();
        for (account, votes) in members {
            vc.add(*account, *votes);
        }
        vc.finish(authority);
    }
}

/// Elects the active producers, refreshes witness tallies, and rebuilds the
/// producer account's authority.
pub(crate) fn update_active_witnesses(
    store: &mut Store,
    scratch: &Scratch<'_>,
    now: TimePoint,
) -> Result<(), MaintenanceError> {
    if scratch.witness_count_histogram.is_empty() {
        return Err(MaintenanceError::InvariantViolation(
            "witness count histogram is empty".into(),
        ));
    }
    let stake_target =
        (scratch.total_voting_stake - scratch.witness_count_histogram[0]) / 2;
    let witness_count = desired_count(scratch.witness_count_histogram.as_slice(), stake_target);

    let min_count =
        usize::from(store.chain_properties.immutable_parameters.min_witness_count);
    let candidates: Vec<_> = store.witnesses.iter().cloned().collect();
    let wits = sort_votable(
        candidates,
        (witness_count * 2 + 1).max(min_count),
        scratch.vote_tally.as_slice(),
        |w| w.vote_id,
    );

    for id in store.witnesses.ids() {
        store
            .witnesses
            .modify(id, |w| w.total_votes = scratch.tally_of(w.vote_id))?;
    }

    let elected: Vec<(AccountId, u64)> = wits
        .iter()
        .map(|w| (w.witness_account, scratch.tally_of(w.vote_id)))
        .collect();
    store.accounts.modify(WITNESS_ACCOUNT, |a| {
        rebuild_elected_authority(&mut a.active, &elected, now);
    })?;

    store.global_properties.active_witnesses = wits.iter().map(|w| w.id).collect();
    Ok(())
}

/// Elects the active governance members, refreshes their tallies, and
/// rebuilds the committee accounts' authorities.
pub(crate) fn update_active_committee_members(
    store: &mut Store,
    scratch: &Scratch<'_>,
    now: TimePoint,
) -> Result<(), MaintenanceError> {
    if scratch.committee_count_histogram.is_empty() {
        return Err(MaintenanceError::InvariantViolation(
            "committee count histogram is empty".into(),
        ));
    }
    // The committee sizing subtracts the witness histogram's abstain bucket,
    // not its own. Historical replay depends on keeping it that way.
    let stake_target =
        (scratch.total_voting_stake - scratch.witness_count_histogram[0]) / 2;
    let committee_member_count =
        desired_count(scratch.committee_count_histogram.as_slice(), stake_target);

    let min_count = usize::from(
        store
            .chain_properties
            .immutable_parameters
            .min_committee_member_count,
    );
    let candidates: Vec<_> = store.committee_members.iter().cloned().collect();
    let members = sort_votable(
        candidates,
        (committee_member_count * 2 + 1).max(min_count),
        scratch.vote_tally.as_slice(),
        |m| m.vote_id,
    );

    for member in &members {
        store.committee_members.modify(member.id, |m| {
            m.total_votes = scratch.tally_of(m.vote_id);
        })?;
    }

    if !members.is_empty() {
        let elected: Vec<(AccountId, u64)> = members
            .iter()
            .map(|m| {
                (
                    m.committee_member_account,
                    scratch.tally_of(m.vote_id),
                )
            })
            .collect();
        store.accounts.modify(COMMITTEE_ACCOUNT, |a| {
            rebuild_elected_authority(&mut a.active, &elected, now);
        })?;
        let committee_active = store.accounts.try_get(COMMITTEE_ACCOUNT)?.active.clone();
        store
            .accounts
            .modify(RELAXED_COMMITTEE_ACCOUNT, |a| a.active = committee_active)?;
    }

    store.global_properties.active_committee_members =
        members.iter().map(|m| m.id).collect();
    Ok(())
}
