//! XP progression for Trickipedia contributors.
//!
//! A point total maps to a tier through an ordered threshold table. The
//! table is validated once when it is built; every calculation after that is
//! infallible.
//!
//! ```
//! use trickipedia_progress::calculate_progress;
//!
//! let progress = calculate_progress(750);
//! assert_eq!(progress.current_tier.tier, 2);
//! assert_eq!(progress.points_to_next, 250);
//! ```

mod contribution;
mod error;
mod level;
mod progress;
mod table;

pub use contribution::{ContributionKind, XpAward};
pub use error::ProgressError;
pub use level::XpLevel;
pub use progress::{LevelUp, XpProgress};
pub use table::XpTable;

/// Calculates progress against the built-in tier table.
pub fn calculate_progress(total_points: u64) -> XpProgress {
    XpTable::standard().calculate_progress(total_points)
}
