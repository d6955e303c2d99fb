//! Priority levels and host-tier mapping
//!
//! Callers schedule work at one of five logical priority levels. The host
//! queue only understands three urgency tiers, so every level is collapsed
//! onto a tier through a fixed mapping table. `Low` and `Normal` share a
//! tier on purpose: the scheduler's own time-slicing is what protects
//! urgent work, not host tiering.

/// Logical priority levels for scheduled work
///
/// Higher numeric values have higher urgency. The level chosen at
/// scheduling time also becomes the priority context a callback observes
/// while it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PriorityLevel {
    /// Idle work (lowest urgency, runs when nothing else is pending)
    Idle = 0,

    /// Low urgency work (prefetch, speculative computation)
    Low = 1,

    /// Default urgency for work with no stated priority
    Normal = 2,

    /// Work the user is actively waiting on
    UserBlocking = 3,

    /// Work that must run ahead of everything else (highest urgency)
    Immediate = 4,
}

impl PriorityLevel {
    /// Convert a raw numeric level coming from a host boundary
    ///
    /// Returns `None` for values outside `0..=4`. Untrusted values should
    /// go through [`HostTier::from_raw_priority`] instead, which soft-fails
    /// to the safest tier rather than erroring.
    pub fn from_raw(raw: u32) -> Option<PriorityLevel> {
        match raw {
            0 => Some(PriorityLevel::Idle),
            1 => Some(PriorityLevel::Low),
            2 => Some(PriorityLevel::Normal),
            3 => Some(PriorityLevel::UserBlocking),
            4 => Some(PriorityLevel::Immediate),
            _ => None,
        }
    }

    /// Get the raw numeric value of this level
    pub fn as_raw(self) -> u32 {
        self as u32
    }

    /// Map this level onto the tier the host queue understands
    ///
    /// The table is fixed policy, not configurable:
    ///
    /// | level | tier |
    /// |---|---|
    /// | `Immediate`, `UserBlocking` | `UserBlocking` |
    /// | `Normal`, `Low` | `UserVisible` |
    /// | `Idle` | `Background` |
    pub fn host_tier(self) -> HostTier {
        match self {
            PriorityLevel::Immediate | PriorityLevel::UserBlocking => HostTier::UserBlocking,
            PriorityLevel::Normal | PriorityLevel::Low => HostTier::UserVisible,
            PriorityLevel::Idle => HostTier::Background,
        }
    }

    /// Cap this level at `Normal` urgency
    ///
    /// Used for follow-up work scheduled from inside a priority context:
    /// code running as "a continuation of whatever is currently important"
    /// should not silently inherit `Immediate` or `UserBlocking` urgency it
    /// never asked for, while low-urgency work keeps its low urgency.
    pub fn capped_at_normal(self) -> PriorityLevel {
        match self {
            PriorityLevel::Immediate | PriorityLevel::UserBlocking | PriorityLevel::Normal => {
                PriorityLevel::Normal
            }
            lower => lower,
        }
    }
}

impl Default for PriorityLevel {
    /// The priority context in effect when no scope is active
    fn default() -> Self {
        PriorityLevel::Normal
    }
}

/// Urgency tiers understood by the host task queue
///
/// Derived deterministically from [`PriorityLevel`]; never set directly by
/// callers. Higher numeric values run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HostTier {
    /// Runs when the host queue is otherwise idle
    Background = 0,

    /// Default tier for work the user can see the results of
    UserVisible = 1,

    /// Runs ahead of both other tiers
    UserBlocking = 2,
}

impl HostTier {
    /// Map a raw numeric priority level onto a tier, soft-failing
    ///
    /// Any value that is not a recognized [`PriorityLevel`] maps to
    /// `UserVisible` rather than erroring. Unknown input degrades to the
    /// safest visible default.
    pub fn from_raw_priority(raw: u32) -> HostTier {
        PriorityLevel::from_raw(raw)
            .map(PriorityLevel::host_tier)
            .unwrap_or(HostTier::UserVisible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_level_ordering() {
        assert!(PriorityLevel::Immediate > PriorityLevel::UserBlocking);
        assert!(PriorityLevel::UserBlocking > PriorityLevel::Normal);
        assert!(PriorityLevel::Normal > PriorityLevel::Low);
        assert!(PriorityLevel::Low > PriorityLevel::Idle);
    }

    #[test]
    fn test_host_tier_ordering() {
        assert!(HostTier::UserBlocking > HostTier::UserVisible);
        assert!(HostTier::UserVisible > HostTier::Background);
    }

    #[test]
    fn test_mapping_table() {
        assert_eq!(PriorityLevel::Immediate.host_tier(), HostTier::UserBlocking);
        assert_eq!(
            PriorityLevel::UserBlocking.host_tier(),
            HostTier::UserBlocking
        );
        assert_eq!(PriorityLevel::Normal.host_tier(), HostTier::UserVisible);
        assert_eq!(PriorityLevel::Low.host_tier(), HostTier::UserVisible);
        assert_eq!(PriorityLevel::Idle.host_tier(), HostTier::Background);
    }

    #[test]
    fn test_low_and_normal_share_a_tier() {
        assert_eq!(
            PriorityLevel::Low.host_tier(),
            PriorityLevel::Normal.host_tier()
        );
    }

    #[test]
    fn test_from_raw_round_trip() {
        for level in [
            PriorityLevel::Idle,
            PriorityLevel::Low,
            PriorityLevel::Normal,
            PriorityLevel::UserBlocking,
            PriorityLevel::Immediate,
        ] {
            assert_eq!(PriorityLevel::from_raw(level.as_raw()), Some(level));
        }
    }

    #[test]
    fn test_from_raw_unknown() {
        assert_eq!(PriorityLevel::from_raw(5), None);
        assert_eq!(PriorityLevel::from_raw(u32::MAX), None);
    }

    #[test]
    fn test_raw_fallback_is_user_visible() {
        assert_eq!(HostTier::from_raw_priority(5), HostTier::UserVisible);
        assert_eq!(HostTier::from_raw_priority(99), HostTier::UserVisible);
        assert_eq!(HostTier::from_raw_priority(u32::MAX), HostTier::UserVisible);
    }

    #[test]
    fn test_raw_fallback_preserves_known_levels() {
        assert_eq!(HostTier::from_raw_priority(0), HostTier::Background);
        assert_eq!(HostTier::from_raw_priority(2), HostTier::UserVisible);
        assert_eq!(HostTier::from_raw_priority(4), HostTier::UserBlocking);
    }

    #[test]
    fn test_capped_at_normal() {
        assert_eq!(
            PriorityLevel::Immediate.capped_at_normal(),
            PriorityLevel::Normal
        );
        assert_eq!(
            PriorityLevel::UserBlocking.capped_at_normal(),
            PriorityLevel::Normal
        );
        assert_eq!(
            PriorityLevel::Normal.capped_at_normal(),
            PriorityLevel::Normal
        );
        assert_eq!(PriorityLevel::Low.capped_at_normal(), PriorityLevel::Low);
        assert_eq!(PriorityLevel::Idle.capped_at_normal(), PriorityLevel::Idle);
    }

    #[test]
    fn test_default_is_normal() {
        assert_eq!(PriorityLevel::default(), PriorityLevel::Normal);
    }
}
