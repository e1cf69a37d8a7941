use crate::progress::LevelUp;
use crate::table::XpTable;
use serde::{Deserialize, Serialize};

/// Kinds of community contribution that earn XP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionKind {
    TrickSubmitted,
    SubmissionApproved,
    TrickEdited,
    MediaUploaded,
    CommentPosted,
    DailyLogin,
}

impl ContributionKind {
    pub fn xp(&self) -> u64 {
        match self {
            ContributionKind::TrickSubmitted => 50,
            ContributionKind::SubmissionApproved => 100,
            ContributionKind::TrickEdited => 25,
            ContributionKind::MediaUploaded => 20,
            ContributionKind::CommentPosted => 5,
            ContributionKind::DailyLogin => 2,
        }
    }
}

/// Result of crediting one contribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct XpAward {
    pub kind: ContributionKind,
    pub previous_total: u64,
    pub new_total: u64,
    pub level_up: Option<LevelUp>,
}

impl XpTable {
    /// Credits `kind` to a user currently at `total_points`.
    pub fn award(&self, total_points: u64, kind: ContributionKind) -> XpAward {
        let new_total = total_points.saturating_add(kind.xp());
        XpAward {
            kind,
            previous_total: total_points,
            new_total,
            level_up: self.level_up(total_points, new_total),
        }
    }
}
