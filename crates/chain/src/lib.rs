// Path: crates/chain/src/lib.rs
//! The periodic maintenance engine of the Meridian kernel.
//!
//! Once per maintenance interval the engine runs a fixed, totally-ordered
//! sequence of passes over the whole chain state: it tallies stake-weighted
//! votes, elects producers and governance members, computes and disburses the
//! treasury budget, pays workers, splits accumulated fee pools, issues daily
//! bonuses, winds down expired banking objects, and prunes stale history.
//! Every step is consensus-critical: all nodes must arrive at byte-identical
//! state, so iteration orders, integer widths, and activation thresholds are
//! all pinned down here.

/// The synthetic-operation boundary between the engine and balance effects.
pub mod evaluator;
/// Wall-clock activation thresholds.
pub mod hardfork;
/// The maintenance pass itself.
pub mod maintenance;
/// The referral distribution tree.
pub mod referral;
/// Weighted-vote authority builder.
pub mod vote_counter;

pub use maintenance::{MaintenanceConfig, MaintenanceEngine};
