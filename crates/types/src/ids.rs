// Path: crates/types/src/ids.rs
//! Dense, per-type object identifiers.
//!
//! Every row in the object store is addressed by a small integer instance
//! scoped to its own type. Ids are allocated densely in creation order, which
//! makes them usable both as stable references and as deterministic
//! tie-breakers in consensus-critical sorts.

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Common interface of all typed object ids.
pub trait ObjectId: Copy + Ord {
    /// The dense instance number of this id.
    fn instance(self) -> u32;
    /// Builds the id addressing the given instance.
    fn from_instance(instance: u32) -> Self;
}

macro_rules! define_object_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            Serialize, Deserialize, Encode, Decode,
        )]
        pub struct $name(pub u32);

        impl ObjectId for $name {
            fn instance(self) -> u32 {
                self.0
            }
            fn from_instance(instance: u32) -> Self {
                Self(instance)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}.{}", stringify!($name), self.0)
            }
        }
    };
}

define_object_id!(
    /// An account on the chain.
    AccountId
);
define_object_id!(
    /// An asset definition.
    AssetId
);
define_object_id!(
    /// A block-producer candidate record.
    WitnessId
);
define_object_id!(
    /// A governance-member candidate record.
    CommitteeMemberId
);
define_object_id!(
    /// A budget-funded worker proposal.
    WorkerId
);
define_object_id!(
    /// An open limit order.
    LimitOrderId
);
define_object_id!(
    /// A vesting balance pot.
    VestingBalanceId
);
define_object_id!(
    /// An interest-bearing fund.
    FundId
);
define_object_id!(
    /// A deposit inside a fund.
    FundDepositId
);
define_object_id!(
    /// A transferable cheque.
    ChequeId
);
define_object_id!(
    /// A per-(account, asset) balance row.
    BalanceId
);
define_object_id!(
    /// A per-(account, asset) mature-balance row.
    MatureBalanceId
);
define_object_id!(
    /// A per-account pending-bonus ledger.
    BonusBalancesId
);
define_object_id!(
    /// A special-authority registry row.
    SpecialAuthorityId
);
define_object_id!(
    /// A buyback-program registry row.
    BuybackId
);
define_object_id!(
    /// A fee-backed-asset accumulator pool.
    FbaAccumulatorId
);
define_object_id!(
    /// A global operation-history row.
    OperationHistoryId
);
define_object_id!(
    /// A per-account transaction-history node.
    AccountHistoryId
);
define_object_id!(
    /// A fund transaction-history row.
    FundHistoryId
);
define_object_id!(
    /// A blind-transfer record.
    BlindTransferId
);
define_object_id!(
    /// An append-only budget record.
    BudgetRecordId
);
define_object_id!(
    /// A market-pegged asset data row.
    BitassetDataId
);
