use std::ops::Range;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::common::{CategoryIdentifier, flag};

pub const MAX_BESTLIST_RESULTS: i64 = 5000;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct BestlistQuery {
    pub discipline_id: Option<Uuid>,
    pub year: Option<i32>,
    /// e.g. `u18_w`
    pub category_identifier: Option<String>,
    pub only_homologated: Option<String>,
    pub restrict_category: Option<String>,
    /// Defaults to true
    pub one_result_per_athlete: Option<String>,
    pub allow_wind: Option<String>,
    pub range_start: Option<i32>,
    pub range_end: Option<i32>,
    /// `performance` or `score`
    pub range_type: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeKind {
    Performance,
    Score,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRange {
    pub kind: RangeKind,
    pub start: Option<i32>,
    pub end: Option<i32>,
}

/// A validated bestlist query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestlistRequest {
    pub discipline_id: Uuid,
    pub year: Option<i32>,
    pub age_range: Range<i32>,
    pub only_homologated: bool,
    pub one_result_per_athlete: bool,
    pub allow_wind: bool,
    pub range: Option<ResultRange>,
    pub limit: i64,
}

impl BestlistQuery {
    pub fn resolve(&self) -> Result<BestlistRequest, String> {
        let discipline_id = self
            .discipline_id
            .ok_or_else(|| "No discipline identifier specified".to_string())?;

        let range = match self.range_type.as_deref() {
            None => None,
            Some(kind) => {
                let kind = match kind {
                    "performance" => RangeKind::Performance,
                    "score" => RangeKind::Score,
                    other => return Err(format!("Invalid range type {other}")),
                };
                Some(ResultRange {
                    kind,
                    start: self.range_start,
                    end: self.range_end,
                })
            }
        };

        let limit = self.limit.unwrap_or(MAX_BESTLIST_RESULTS);
        if limit < 1 {
            return Err("limit must be positive".to_string());
        }

        let category = CategoryIdentifier::parse(self.category_identifier.as_deref());
        Ok(BestlistRequest {
            discipline_id,
            year: self.year,
            age_range: category.age_range(flag(self.restrict_category.as_deref(), false)),
            only_homologated: flag(self.only_homologated.as_deref(), false),
            one_result_per_athlete: flag(self.one_result_per_athlete.as_deref(), true),
            allow_wind: flag(self.allow_wind.as_deref(), false),
            range,
            limit: limit.min(MAX_BESTLIST_RESULTS),
        })
    }
}

impl BestlistRequest {
    /// Score ranges fall back to performance when the discipline has no score list.
    pub fn range_column(&self, score_available: bool) -> Option<(&'static str, &ResultRange)> {
        let range = self.range.as_ref()?;
        let column = match range.kind {
            RangeKind::Score if score_available => "points",
            _ => "performance",
        };
        Some((column, range))
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BestlistResponse {
    pub configuration: BestlistConfiguration,
    pub results: Vec<BestlistEntry>,
}

#[derive(Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct BestlistConfiguration {
    pub wind_relevant: bool,
    pub homologation_relevant: bool,
    pub score_available: bool,
    pub discipline_type: String,
}

impl BestlistConfiguration {
    pub fn new(results: &[BestlistEntry], score_available: bool, discipline_type: String) -> Self {
        Self {
            wind_relevant: results.iter().any(|entry| entry.result.wind.is_some()),
            homologation_relevant: results.iter().any(|entry| !entry.result.homologated),
            score_available,
            discipline_type,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BestlistEntry {
    pub athlete: AthleteInfo,
    pub club: ClubInfo,
    pub event: EventInfo,
    pub result: ResultInfo,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AthleteInfo {
    pub id: Uuid,
    pub name: String,
    pub birthdate: NaiveDate,
    pub nationality: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClubInfo {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventInfo {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResultInfo {
    pub performance: i32,
    pub wind: Option<f64>,
    pub rank: String,
    pub location: String,
    pub date: NaiveDate,
    pub homologated: bool,
    pub points: i16,
}
