use serde::{Deserialize, Serialize};

/// A named rank gated by a cumulative point threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpLevel {
    pub tier: u32,
    pub name: String,
    pub threshold: u64,
    /// Capabilities granted on reaching this tier.
    pub unlocks: Vec<String>,
}

impl XpLevel {
    pub fn new(tier: u32, name: impl Into<String>, threshold: u64, unlocks: &[&str]) -> Self {
        Self {
            tier,
            name: name.into(),
            threshold,
            unlocks: unlocks.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Built-in tiers: (tier, name, threshold, unlocks).
pub(crate) const STANDARD_LEVELS: &[(u32, &str, u64, &[&str])] = &[
    (1, "Rookie", 0, &["view_tricks", "comment"]),
    (2, "Apprentice", 500, &["submit_tricks"]),
    (3, "Trickster", 1000, &["edit_tricks", "upload_media"]),
    (4, "Pro", 2000, &["create_subcategories"]),
    (5, "Expert", 3500, &["review_submissions"]),
    (6, "Legend", 5000, &["moderate", "feature_tricks"]),
];
