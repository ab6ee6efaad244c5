// Path: crates/chain/src/hardfork.rs
//! Wall-clock activation thresholds.
//!
//! Each constant marks the instant a behavior change activates. The values
//! are consensus-frozen: historical replay depends on comparing block times
//! against exactly these numbers.

use meridian_types::TimePoint;

/// Authority construction switches from the legacy bit-drop scaling to the
/// [`crate::vote_counter::VoteCounter`].
pub const HARDFORK_533_TIME: TimePoint = TimePoint::from_secs(1_445_817_600);

/// Negative votes against workers stop counting.
pub const HARDFORK_607_TIME: TimePoint = TimePoint::from_secs(1_458_550_800);

/// One-shot: every annual member is upgraded to lifetime membership.
pub const HARDFORK_613_TIME: TimePoint = TimePoint::from_secs(1_496_275_200);

/// The first daily-bonus engine activates.
pub const HARDFORK_616_TIME: TimePoint = TimePoint::from_secs(1_515_974_400);

/// One-shot: the maintenance schedule phase-shifts by 3/8 of an interval.
pub const HARDFORK_616_MAINTENANCE_CHANGE_TIME: TimePoint =
    TimePoint::from_secs(1_517_216_400);

/// The second daily-bonus engine activates; account transaction history
/// becomes reapable.
pub const HARDFORK_617_TIME: TimePoint = TimePoint::from_secs(1_519_862_400);

/// Online-fraction weighting of bonuses activates; the online-presence map
/// is cleared every pass from here on.
pub const HARDFORK_618_TIME: TimePoint = TimePoint::from_secs(1_522_886_400);

/// Online-fraction weighting of bonuses deactivates.
pub const HARDFORK_619_TIME: TimePoint = TimePoint::from_secs(1_528_934_400);

/// The modern bonus engine activates; referral earnings route through the
/// pending-bonus ledgers.
pub const HARDFORK_620_TIME: TimePoint = TimePoint::from_secs(1_536_537_600);

/// Fund interest processing activates.
pub const HARDFORK_622_TIME: TimePoint = TimePoint::from_secs(1_544_400_000);
