use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Club {
    pub club_id: Uuid,
    /// Some clubs are listed without an identifier upstream; those are matched by name.
    pub club_code: Option<String>,
    pub name: String,
    pub latest_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct NewClub {
    pub club_code: Option<String>,
    pub name: String,
    pub latest_date: NaiveDate,
}
