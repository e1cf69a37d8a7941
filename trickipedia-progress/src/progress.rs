use crate::level::XpLevel;
use serde::Serialize;

/// Where a point total sits in the tier table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XpProgress {
    pub current_tier: XpLevel,
    /// `None` once the final tier is reached.
    pub next_tier: Option<XpLevel>,
    /// Progress through the current tier, 0–100.
    pub progress_percent: f64,
    pub points_to_next: u64,
    pub total_points: u64,
}

impl XpProgress {
    pub fn is_max_tier(&self) -> bool {
        self.next_tier.is_none()
    }
}

/// A point change that crossed into a higher tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelUp {
    pub from: XpLevel,
    pub to: XpLevel,
    /// Capabilities granted by every tier passed, in tier order.
    pub unlocked: Vec<String>,
}
