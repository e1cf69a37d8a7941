use thiserror::Error;

/// Tier table configuration faults. These are detected when a table is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressError {
    #[error("XP table has no tiers")]
    EmptyTable,

    #[error("first XP tier must start at 0 points, found {threshold}")]
    FirstThresholdNotZero { threshold: u64 },

    #[error("XP tiers must be numbered consecutively from 1: expected {expected}, found {found}")]
    NonSequentialTier { expected: u32, found: u32 },

    #[error("XP tier {tier} threshold {threshold} does not exceed the previous tier's {previous}")]
    NonIncreasingThreshold { tier: u32, threshold: u64, previous: u64 },
}
