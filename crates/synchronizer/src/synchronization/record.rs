use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use storage::models::StoredResult;
use uuid::Uuid;

use crate::error::{Result, SyncError};
use crate::parse::{
    UNPARSABLE_PERFORMANCE, parse_date, parse_not_homologated, parse_performance, parse_wind,
};
use crate::scraping::{BestlistColumn, BestlistTable};

pub const MIN_WIND: f64 = -100.0;
pub const MAX_WIND: f64 = 100.0;

/// One result, either scraped or read from the store.
#[derive(Debug, Clone)]
pub struct Record {
    pub performance: i32,
    pub wind: Option<f64>,
    pub rank: String,
    pub not_homologated: bool,
    pub athlete: String,
    pub club: String,
    pub nationality: String,
    pub birthdate: NaiveDate,
    pub event: String,
    pub location: String,
    pub event_date: NaiveDate,
    pub athlete_code: String,
    pub club_code: String,
    pub event_code: String,
    pub manual: bool,
    /// Set for records read from the store.
    pub id: Option<Uuid>,
}

/// How a scraped record relates to a stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Similarity {
    Exact,
    /// Same result, but athlete, club or event attributes drifted.
    Candidate,
    Unrelated,
}

impl Record {
    pub fn from_stored(result: &StoredResult) -> Self {
        Self {
            performance: result.performance,
            wind: result.wind.and_then(|wind| wind.to_f64()),
            rank: result.rank.clone(),
            not_homologated: !result.homologated,
            athlete: result.athlete_name.clone(),
            club: result.club_name.clone(),
            nationality: result.nationality.clone(),
            birthdate: result.birthdate,
            event: result.event_name.clone(),
            location: result.location.clone(),
            event_date: result.date,
            athlete_code: result.athlete_code.clone(),
            club_code: result.club_code.clone().unwrap_or_default(),
            event_code: result.event_code.clone(),
            manual: result.manual,
            id: Some(result.result_id),
        }
    }

    /// Wind as stored: one decimal.
    pub fn stored_wind(&self) -> Option<Decimal> {
        self.wind.and_then(Decimal::from_f64_retain).map(|wind| {
            wind.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
        })
    }

    /// `year(event date) - year(birthdate)`, the value age categories are defined on.
    pub fn age(&self) -> i32 {
        self.event_date.year() - self.birthdate.year()
    }

    /// Winds are equal when both round to the same tenth (half away from zero), the precision
    /// the store keeps. This is rounding, not truncation: -2.0 equals -2.04 but not -2.06.
    /// Missing winds only equal missing winds.
    pub fn same_wind(a: Option<f64>, b: Option<f64>) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => (a * 10.0).round() as i64 == (b * 10.0).round() as i64,
            _ => false,
        }
    }

    /// Club identity: codes when both sides know one, names otherwise.
    pub fn same_club(&self, other: &Record) -> bool {
        if self.club_code.is_empty() || other.club_code.is_empty() {
            self.club == other.club
        } else {
            self.club_code == other.club_code
        }
    }

    /// Whether both records describe the same result, ignoring display attributes.
    pub fn same_result(&self, other: &Record, compare_homologation: bool) -> bool {
        self.performance == other.performance
            && self.rank == other.rank
            && self.location == other.location
            && self.event_date == other.event_date
            && self.athlete_code == other.athlete_code
            && self.event_code == other.event_code
            && Self::same_wind(self.wind, other.wind)
            && (!compare_homologation || self.not_homologated == other.not_homologated)
            && self.same_club(other)
    }

    fn same_attributes(&self, other: &Record) -> bool {
        self.athlete == other.athlete
            && self.nationality == other.nationality
            && self.birthdate == other.birthdate
            && self.club == other.club
            && self.club_code == other.club_code
            && self.event == other.event
    }

    pub fn similarity(&self, other: &Record, compare_homologation: bool) -> Similarity {
        if !self.same_result(other, compare_homologation) {
            Similarity::Unrelated
        } else if self.same_attributes(other) {
            Similarity::Exact
        } else {
            Similarity::Candidate
        }
    }

    pub(crate) fn sort_key(&self, ascending: bool) -> (i64, NaiveDate, &str, &str, &str) {
        let sign = if ascending { 1 } else { -1 };
        (
            sign * i64::from(self.performance),
            self.event_date,
            &self.athlete,
            &self.event,
            &self.rank,
        )
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.similarity(other, true) == Similarity::Exact
    }
}

/// Reasons a scraped row cannot enter the reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    InvalidPerformance,
    WindOutOfRange,
    InvalidEventDate,
    InvalidBirthdate,
    NationalityTooLong,
}

/// A record straight from a bestlist row, before validation.
#[derive(Debug, Clone)]
pub struct ParsedRecord {
    pub performance: i32,
    pub wind: Option<f64>,
    pub rank: String,
    pub not_homologated: bool,
    pub athlete: String,
    pub club: String,
    pub nationality: String,
    pub birthdate: Option<NaiveDate>,
    pub event: String,
    pub location: String,
    pub event_date: Option<NaiveDate>,
    pub athlete_code: String,
    pub club_code: String,
    pub event_code: String,
}

impl Default for ParsedRecord {
    fn default() -> Self {
        Self {
            performance: UNPARSABLE_PERFORMANCE,
            wind: None,
            rank: String::new(),
            not_homologated: false,
            athlete: String::new(),
            club: String::new(),
            nationality: String::new(),
            birthdate: None,
            event: String::new(),
            location: String::new(),
            event_date: None,
            athlete_code: String::new(),
            club_code: String::new(),
            event_code: String::new(),
        }
    }
}

struct ColumnField {
    column: BestlistColumn,
    required: bool,
    apply: fn(&mut ParsedRecord, &str),
}

/// Maps bestlist columns onto record fields.
static FIELDS: &[ColumnField] = &[
    ColumnField {
        column: BestlistColumn::Result,
        required: true,
        apply: |record, value| record.performance = parse_performance(value),
    },
    ColumnField {
        column: BestlistColumn::Wind,
        required: false,
        apply: |record, value| record.wind = parse_wind(value),
    },
    ColumnField {
        column: BestlistColumn::Rank,
        required: true,
        apply: |record, value| record.rank = value.to_string(),
    },
    ColumnField {
        column: BestlistColumn::NotHomologated,
        required: false,
        apply: |record, value| record.not_homologated = parse_not_homologated(value),
    },
    ColumnField {
        column: BestlistColumn::Athlete,
        required: true,
        apply: |record, value| record.athlete = value.to_string(),
    },
    ColumnField {
        column: BestlistColumn::Club,
        required: true,
        apply: |record, value| record.club = value.to_string(),
    },
    ColumnField {
        column: BestlistColumn::Nationality,
        required: true,
        apply: |record, value| record.nationality = value.to_string(),
    },
    ColumnField {
        column: BestlistColumn::Birthdate,
        required: true,
        apply: |record, value| record.birthdate = parse_date(value),
    },
    ColumnField {
        column: BestlistColumn::Event,
        required: true,
        apply: |record, value| record.event = value.to_string(),
    },
    ColumnField {
        column: BestlistColumn::Location,
        required: true,
        apply: |record, value| record.location = value.to_string(),
    },
    ColumnField {
        column: BestlistColumn::Date,
        required: true,
        apply: |record, value| record.event_date = parse_date(value),
    },
    ColumnField {
        column: BestlistColumn::AthleteCode,
        required: true,
        apply: |record, value| record.athlete_code = value.to_string(),
    },
    ColumnField {
        column: BestlistColumn::ClubCode,
        required: true,
        apply: |record, value| record.club_code = value.to_string(),
    },
    ColumnField {
        column: BestlistColumn::EventCode,
        required: true,
        apply: |record, value| record.event_code = value.to_string(),
    },
];

impl ParsedRecord {
    /// Fails when the table lacks a column every record needs.
    pub fn check_columns(table: &BestlistTable) -> Result<()> {
        let missing: Vec<String> = FIELDS
            .iter()
            .filter(|field| field.required && !table.contains(field.column))
            .map(|field| field.column.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(SyncError::ScrapeError(format!(
                "Bestlist lacks the columns {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }

    pub fn from_row(table: &BestlistTable, row: usize) -> Self {
        let mut record = ParsedRecord::default();
        for field in FIELDS {
            if let Some(value) = table.value(row, field.column) {
                (field.apply)(&mut record, value);
            }
        }
        record
    }

    pub fn violations(&self) -> Vec<Violation> {
        let mut violations = Vec::new();
        if self.performance < 0 {
            violations.push(Violation::InvalidPerformance);
        }
        if self
            .wind
            .is_some_and(|wind| !(MIN_WIND < wind && wind < MAX_WIND))
        {
            violations.push(Violation::WindOutOfRange);
        }
        if self.event_date.is_none() {
            violations.push(Violation::InvalidEventDate);
        }
        if self.birthdate.is_none() {
            violations.push(Violation::InvalidBirthdate);
        }
        if self.nationality.chars().count() > 3 {
            violations.push(Violation::NationalityTooLong);
        }
        violations
    }

    pub fn is_valid(&self) -> bool {
        self.violations().is_empty()
    }

    /// The validated record, or everything wrong with it.
    pub fn validate(self) -> std::result::Result<Record, Vec<Violation>> {
        let violations = self.violations();
        match (self.event_date, self.birthdate) {
            (Some(event_date), Some(birthdate)) if violations.is_empty() => Ok(Record {
                performance: self.performance,
                wind: self.wind,
                rank: self.rank,
                not_homologated: self.not_homologated,
                athlete: self.athlete,
                club: self.club,
                nationality: self.nationality,
                birthdate,
                event: self.event,
                location: self.location,
                event_date,
                athlete_code: self.athlete_code,
                club_code: self.club_code,
                event_code: self.event_code,
                manual: false,
                id: None,
            }),
            _ => Err(violations),
        }
    }
}
