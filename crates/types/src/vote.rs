// Path: crates/types/src/vote.rs
//! Voting option identifiers.
//!
//! A vote id packs the kind of thing being voted on together with a dense
//! instance number. The instance space is shared across kinds: the global
//! properties track `next_available_vote_id`, and the per-pass tally buffer
//! is indexed directly by instance.

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// What a voting option refers to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    Encode, Decode,
)]
pub enum VoteKind {
    /// Approval of a governance member.
    Committee,
    /// Approval of a block producer.
    Witness,
    /// Approval of a worker proposal.
    WorkerFor,
    /// Disapproval of a worker proposal.
    WorkerAgainst,
}

/// A single voting option: kind tag plus dense instance.
///
/// Ordering is by instance first so that vote ids sort in allocation order
/// regardless of kind; consensus sorts rely on this.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode,
)]
pub struct VoteId {
    instance: u32,
    kind: VoteKind,
}

impl VoteId {
    /// Builds a vote id for the given kind and dense instance.
    pub const fn new(kind: VoteKind, instance: u32) -> Self {
        VoteId { instance, kind }
    }

    /// The dense instance, used as the tally-buffer offset.
    pub const fn instance(self) -> u32 {
        self.instance
    }

    /// The kind of object this option votes on.
    pub const fn kind(self) -> VoteKind {
        self.kind
    }
}

impl PartialOrd for VoteId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VoteId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.instance
            .cmp(&other.instance)
            .then_with(|| self.kind.cmp(&other.kind))
    }
}
