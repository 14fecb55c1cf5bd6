pub mod score_list;
pub mod updater;

pub use score_list::{INVALID_RESULT_SENTINEL, MAX_POINTS, ScoreList};
pub use updater::{ScoreUpdateSummary, ScoreUpdater};
