use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Athlete {
    pub athlete_id: Uuid,
    pub athlete_code: String,
    pub name: String,
    pub birthdate: NaiveDate,
    pub nationality: String,
    /// Date of the most recent result whose attributes were applied to this athlete.
    pub latest_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct NewAthlete {
    pub athlete_code: String,
    pub name: String,
    pub birthdate: NaiveDate,
    pub nationality: String,
    pub latest_date: NaiveDate,
}
