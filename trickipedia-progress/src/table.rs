use crate::error::ProgressError;
use crate::level::{STANDARD_LEVELS, XpLevel};
use crate::progress::{LevelUp, XpProgress};
use std::sync::LazyLock;

static STANDARD: LazyLock<XpTable> = LazyLock::new(|| {
    let levels = STANDARD_LEVELS
        .iter()
        .map(|(tier, name, threshold, unlocks)| XpLevel::new(*tier, *name, *threshold, unlocks))
        .collect();
    // A broken built-in table is a build defect; there is no sensible fallback.
    XpTable::new(levels).expect("built-in XP table is valid")
});

/// Validated, ordered tier table.
#[derive(Debug, Clone, PartialEq)]
pub struct XpTable {
    levels: Vec<XpLevel>,
}

impl XpTable {
    /// Builds a table, checking that it is non-empty, numbered 1..N, starts at
    /// 0 points and has strictly increasing thresholds.
    pub fn new(levels: Vec<XpLevel>) -> Result<Self, ProgressError> {
        let first = levels.first().ok_or(ProgressError::EmptyTable)?;
        if first.threshold != 0 {
            return Err(ProgressError::FirstThresholdNotZero {
                threshold: first.threshold,
            });
        }

        for (i, level) in levels.iter().enumerate() {
            let expected = i as u32 + 1;
            if level.tier != expected {
                return Err(ProgressError::NonSequentialTier {
                    expected,
                    found: level.tier,
                });
            }
            if i > 0 && level.threshold <= levels[i - 1].threshold {
                return Err(ProgressError::NonIncreasingThreshold {
                    tier: level.tier,
                    threshold: level.threshold,
                    previous: levels[i - 1].threshold,
                });
            }
        }

        Ok(Self { levels })
    }

    /// The built-in table, validated on first use.
    pub fn standard() -> &'static XpTable {
        &STANDARD
    }

    pub fn levels(&self) -> &[XpLevel] {
        &self.levels
    }

    /// Index of the highest tier whose threshold `total_points` meets.
    fn current_index(&self, total_points: u64) -> usize {
        // Tier 1 starts at 0, so some tier always matches.
        self.levels
            .iter()
            .rposition(|l| l.threshold <= total_points)
            .unwrap_or(0)
    }

    pub fn tier_for(&self, total_points: u64) -> &XpLevel {
        &self.levels[self.current_index(total_points)]
    }

    pub fn calculate_progress(&self, total_points: u64) -> XpProgress {
        let idx = self.current_index(total_points);
        let current = &self.levels[idx];

        let Some(next) = self.levels.get(idx + 1) else {
            return XpProgress {
                current_tier: current.clone(),
                next_tier: None,
                progress_percent: 100.0,
                points_to_next: 0,
                total_points,
            };
        };

        let span = (next.threshold - current.threshold) as f64;
        let earned = total_points.saturating_sub(current.threshold) as f64;
        let progress_percent = (earned / span * 100.0).clamp(0.0, 100.0);

        XpProgress {
            current_tier: current.clone(),
            next_tier: Some(next.clone()),
            progress_percent,
            points_to_next: next.threshold.saturating_sub(total_points),
            total_points,
        }
    }

    /// Every capability unlocked at or below the tier for `total_points`.
    pub fn unlocks_for(&self, total_points: u64) -> Vec<&str> {
        self.levels[..=self.current_index(total_points)]
            .iter()
            .flat_map(|l| l.unlocks.iter().map(String::as_str))
            .collect()
    }

    pub fn has_unlock(&self, total_points: u64, capability: &str) -> bool {
        self.unlocks_for(total_points).contains(&capability)
    }

    /// Returns the tier change if going from `previous` to `current` points
    /// lands in a higher tier. Point losses never produce a level-up.
    pub fn level_up(&self, previous: u64, current: u64) -> Option<LevelUp> {
        let from = self.current_index(previous);
        let to = self.current_index(current);
        if to <= from {
            return None;
        }

        Some(LevelUp {
            from: self.levels[from].clone(),
            to: self.levels[to].clone(),
            unlocked: self.levels[from + 1..=to]
                .iter()
                .flat_map(|l| l.unlocks.iter().cloned())
                .collect(),
        })
    }
}
