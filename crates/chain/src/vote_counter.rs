// Path: crates/chain/src/vote_counter.rs
//! Weighted-vote authority builder.
//!
//! Collects `(account, votes)` pairs and emits a multi-sig authority whose
//! weights fit the protocol's 16-bit weight type. The scaling shift is fixed
//! by the first (largest) vote count, so callers must add candidates in
//! non-increasing vote order — election results already arrive sorted that
//! way.

use meridian_types::ids::AccountId;
use meridian_types::Authority;

/// Most significant set bit of `v`; 0 for `v == 0`.
pub(crate) fn find_msb(v: u64) -> u32 {
    63u32.saturating_sub(v.leading_zeros())
}

/// Builder that scales weighted votes into a 16-bit-weight authority.
#[derive(Debug)]
pub struct VoteCounter {
    total_weight: u64,
    bitshift: Option<u32>,
    last_votes: u64,
    auth: Authority,
}

impl VoteCounter {
    /// An empty counter.
    pub fn new() -> Self {
        VoteCounter {
            total_weight: 0,
            bitshift: None,
            last_votes: u64::MAX,
            auth: Authority::default(),
        }
    }

    /// Adds `votes` for `who`. Zero-vote candidates are skipped entirely;
    /// every counted candidate keeps at least weight 1 after scaling.
    pub fn add(&mut self, who: AccountId, votes: u64) {
        if votes == 0 {
            return;
        }
        debug_assert!(
            votes <= self.last_votes,
            "candidates must be added in non-increasing vote order"
        );
        self.last_votes = votes;
        let shift = *self
            .bitshift
            .get_or_insert_with(|| find_msb(votes).saturating_sub(15));
        let scaled = (votes >> shift).max(1);
        debug_assert!(scaled <= u64::from(u16::MAX));
        self.total_weight += scaled;
        self.auth.add_account_weight(who, scaled as u16);
    }

    /// Whether any candidate was counted.
    pub fn is_empty(&self) -> bool {
        self.total_weight == 0
    }

    /// Moves the accumulated authority into `authority` with threshold
    /// `floor(sum/2) + 1`. Leaves `authority` untouched when nothing was
    /// counted, so a zero-vote election keeps the previous authority.
    pub fn finish(&mut self, authority: &mut Authority) {
        if self.is_empty() {
            return;
        }
        debug_assert!(self.total_weight <= u64::from(u32::MAX));
        self.auth.weight_threshold = (self.total_weight / 2 + 1) as u32;
        *authority = std::mem::take(&mut self.auth);
    }
}
