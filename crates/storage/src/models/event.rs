use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub event_id: Uuid,
    pub event_code: String,
    pub name: String,
    pub latest_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub event_code: String,
    pub name: String,
    pub latest_date: NaiveDate,
}
