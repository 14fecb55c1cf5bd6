use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A discipline joined with its configuration.
///
/// `ascending` disciplines rank lower performances first (timed events); the flag drives sort
/// order, comparison direction and score-list orientation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Discipline {
    pub discipline_id: Uuid,
    pub config_id: Uuid,
    pub name: String,
    pub ascending: bool,
    pub discipline_code: String,
    pub indoor: bool,
    pub male: bool,
    pub ignore: bool,
    pub score_identifier: Option<String>,
}

impl Discipline {
    pub fn place(&self) -> &'static str {
        if self.indoor { "indoor" } else { "outdoor" }
    }

    pub fn gender(&self) -> &'static str {
        if self.male { "men" } else { "women" }
    }
}
