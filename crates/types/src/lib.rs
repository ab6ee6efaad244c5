// Path: crates/types/src/lib.rs
//! Core data types for the Meridian kernel: typed object ids, amounts,
//! wall-clock time, authorities, object rows, and the error taxonomy.

/// Share amounts and (amount, asset) pairs.
pub mod amount;
/// Object rows stored in the chain state.
pub mod app;
/// Multi-signature authority (threshold + per-account weights).
pub mod authority;
/// Consensus-frozen network constants.
pub mod constants;
/// Error taxonomy with stable machine-readable codes.
pub mod error;
/// Dense, per-type object identifiers.
pub mod ids;
/// Wall-clock seconds and interval helpers.
pub mod time;
/// Voting option identifiers.
pub mod vote;

pub use amount::{AssetAmount, ShareAmount};
pub use authority::Authority;
pub use error::{ErrorCode, EvaluatorError, MaintenanceError, StoreError};
pub use time::TimePoint;
pub use vote::{VoteId, VoteKind};
