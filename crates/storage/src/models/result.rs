use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResultEntry {
    pub result_id: Uuid,
    pub athlete_id: Uuid,
    pub club_id: Uuid,
    pub event_id: Uuid,
    pub discipline_id: Uuid,
    pub performance: i32,
    pub wind: Option<Decimal>,
    pub rank: String,
    pub location: String,
    pub date: NaiveDate,
    pub homologated: bool,
    /// Parses fine but is rejected by the score table (better than any known performance).
    pub ignore: bool,
    pub manual: bool,
    pub insert_date: NaiveDateTime,
    pub points: i16,
}

/// A result joined with its athlete, club and event, as consumed by the reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoredResult {
    pub result_id: Uuid,
    pub performance: i32,
    pub wind: Option<Decimal>,
    pub rank: String,
    pub homologated: bool,
    pub manual: bool,
    pub location: String,
    pub date: NaiveDate,
    pub athlete_name: String,
    pub athlete_code: String,
    pub nationality: String,
    pub birthdate: NaiveDate,
    pub club_name: String,
    pub club_code: Option<String>,
    pub event_name: String,
    pub event_code: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewResult {
    pub athlete_id: Uuid,
    pub club_id: Uuid,
    pub event_id: Uuid,
    pub discipline_id: Uuid,
    pub performance: i32,
    pub wind: Option<Decimal>,
    pub rank: String,
    pub location: String,
    pub date: NaiveDate,
    pub homologated: bool,
    pub manual: bool,
    pub points: i16,
}
