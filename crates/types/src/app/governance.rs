// Path: crates/types/src/app/governance.rs
//! Block producers, governance members, and budget-funded workers.

use crate::amount::ShareAmount;
use crate::ids::{AccountId, AssetId, CommitteeMemberId, VestingBalanceId, WitnessId, WorkerId};
use crate::time::TimePoint;
use crate::vote::VoteId;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// A block-producer candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct Witness {
    /// This row's id.
    pub id: WitnessId,
    /// The account operating the producer.
    pub witness_account: AccountId,
    /// The voting option approving this candidate.
    pub vote_id: VoteId,
    /// Stake-weighted approval, refreshed every maintenance pass.
    pub total_votes: u64,
}

/// A governance-member candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct CommitteeMember {
    /// This row's id.
    pub id: CommitteeMemberId,
    /// The account holding the seat.
    pub committee_member_account: AccountId,
    /// The voting option approving this candidate.
    pub vote_id: VoteId,
    /// Stake-weighted approval, refreshed every maintenance pass.
    pub total_votes: u64,
}

/// What a worker does with the pay it receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum WorkerKind {
    /// Pay evaporates back into the reserve.
    Refund {
        /// Total returned to the reserve so far.
        total_burned: ShareAmount,
    },
    /// Pay is sent to the null account, permanently out of circulation.
    Burn {
        /// Total burned so far.
        total_burned: ShareAmount,
    },
    /// Pay accrues in a vesting balance owned by the worker.
    Vesting {
        /// The vesting pot receiving the pay.
        balance: VestingBalanceId,
    },
}

/// A budget-funded worker proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct Worker {
    /// This row's id.
    pub id: WorkerId,
    /// The account performing the work.
    pub worker_account: AccountId,
    /// First instant the worker may be paid.
    pub work_begin_date: TimePoint,
    /// Last instant the worker may be paid.
    pub work_end_date: TimePoint,
    /// Requested pay per day of work.
    pub daily_pay: ShareAmount,
    /// Human-readable proposal name.
    pub name: String,
    /// Voting option approving the proposal.
    pub vote_for: VoteId,
    /// Voting option opposing the proposal.
    pub vote_against: VoteId,
    /// Stake-weighted approval, refreshed every maintenance pass.
    pub total_votes_for: u64,
    /// Stake-weighted opposition, refreshed every maintenance pass.
    pub total_votes_against: u64,
    /// Disposition of received pay.
    pub kind: WorkerKind,
}

impl Worker {
    /// Whether the worker's pay period covers `now`.
    pub fn is_active(&self, now: TimePoint) -> bool {
        self.work_begin_date <= now && now <= self.work_end_date
    }

    /// Net stake margin in favor of the proposal.
    pub fn approving_stake(&self) -> ShareAmount {
        self.total_votes_for as i64 - self.total_votes_against as i64
    }
}

/// A vesting pot. Withdrawal policy is outside the maintenance engine;
/// only the balance matters here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct VestingBalance {
    /// This row's id.
    pub id: VestingBalanceId,
    /// Owning account.
    pub owner: AccountId,
    /// Asset held by the pot.
    pub asset: AssetId,
    /// Current pot balance.
    pub balance: ShareAmount,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vote::VoteKind;

    fn worker() -> Worker {
        Worker {
            id: WorkerId(0),
            worker_account: AccountId(20),
            work_begin_date: TimePoint::from_secs(100),
            work_end_date: TimePoint::from_secs(200),
            daily_pay: 100,
            name: "refund-worker".into(),
            vote_for: VoteId::new(VoteKind::WorkerFor, 0),
            vote_against: VoteId::new(VoteKind::WorkerAgainst, 1),
            total_votes_for: 70,
            total_votes_against: 30,
            kind: WorkerKind::Refund { total_burned: 0 },
        }
    }

    #[test]
    fn active_window_is_inclusive() {
        let w = worker();
        assert!(!w.is_active(TimePoint::from_secs(99)));
        assert!(w.is_active(TimePoint::from_secs(100)));
        assert!(w.is_active(TimePoint::from_secs(200)));
        assert!(!w.is_active(TimePoint::from_secs(201)));
    }

    #[test]
    fn approving_stake_is_a_margin() {
        assert_eq!(worker().approving_stake(), 40);
    }
}
