use std::ops::Range;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::dto::bestlist::{
    AthleteInfo, BestlistEntry, BestlistRequest, ClubInfo, EventInfo, ResultInfo,
};
use crate::dto::discipline::{DisciplineRequest, DisciplineSummary};
use crate::error::{Result, StorageError};

/// What a bestlist needs to know about its discipline.
#[derive(Debug, Clone, FromRow)]
pub struct BestlistDiscipline {
    pub discipline_id: Uuid,
    pub ascending: bool,
    pub score_identifier: Option<String>,
    pub discipline_type: String,
}

#[derive(FromRow)]
struct BestlistRow {
    athlete_id: Uuid,
    club_id: Uuid,
    event_id: Uuid,
    performance: i32,
    wind: Option<Decimal>,
    rank: String,
    location: String,
    date: NaiveDate,
    homologated: bool,
    points: i16,
    athlete_name: String,
    birthdate: NaiveDate,
    nationality: String,
    club_name: String,
    event_name: String,
}

#[derive(FromRow)]
struct DisciplineRow {
    discipline_id: Uuid,
    name: String,
    score_identifier: Option<String>,
    wind_results: i64,
}

/// Read side of the stored results, as served to the front end.
pub struct BestlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BestlistRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_discipline(&self, discipline_id: Uuid) -> Result<BestlistDiscipline> {
        sqlx::query_as::<_, BestlistDiscipline>(
            r#"
            SELECT d.discipline_id, dc.ascending, d.score_identifier, dc.discipline_type
            FROM disciplines d
            JOIN discipline_configs dc ON dc.config_id = d.config_id
            WHERE d.discipline_id = $1
            "#,
        )
        .bind(discipline_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Results of `discipline` best first, ties in chronological order.
    ///
    /// With `one_result_per_athlete` only each athlete's best result is kept, the most recent
    /// one among equal performances.
    pub async fn query(
        &self,
        discipline: &BestlistDiscipline,
        request: &BestlistRequest,
    ) -> Result<Vec<BestlistEntry>> {
        let direction = if discipline.ascending { "ASC" } else { "DESC" };

        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            WITH base AS (
                SELECT
                    r.result_id, r.athlete_id, r.club_id, r.event_id, r.performance, r.wind,
                    r.rank, r.location, r.date, r.homologated, r.points,
                    a.name AS athlete_name, a.birthdate, a.nationality,
                    c.name AS club_name, e.name AS event_name
                FROM results r
                JOIN athletes a ON a.athlete_id = r.athlete_id
                JOIN clubs c ON c.club_id = r.club_id
                JOIN events e ON e.event_id = r.event_id
                WHERE r.ignore = FALSE AND r.discipline_id =
            "#,
        );
        query.push_bind(discipline.discipline_id);

        if let Some((column, range)) =
            request.range_column(discipline.score_identifier.is_some())
        {
            if let Some(start) = range.start {
                query.push(format!(" AND r.{column} >= "));
                query.push_bind(start);
            }
            if let Some(end) = range.end {
                query.push(format!(" AND r.{column} <= "));
                query.push_bind(end);
            }
        }

        push_common_filters(
            &mut query,
            request.year,
            &request.age_range,
            request.only_homologated,
        );

        if !request.allow_wind {
            query.push(" AND (r.wind IS NULL OR r.wind <= 2.0)");
        }

        query.push(
            r#"
            ),
            ranked AS (
                SELECT base.*, ROW_NUMBER() OVER (
                    PARTITION BY athlete_id ORDER BY performance
            "#,
        );
        query.push(direction);
        query.push(
            r#"
                    , date DESC
                ) AS rn
                FROM base
            )
            SELECT * FROM ranked
            "#,
        );

        if request.one_result_per_athlete {
            query.push(" WHERE rn = 1");
        }

        query.push(" ORDER BY performance ");
        query.push(direction);
        query.push(", date ASC LIMIT ");
        query.push_bind(request.limit);

        let rows: Vec<BestlistRow> = query.build_query_as().fetch_all(self.pool).await?;

        Ok(rows.into_iter().map(BestlistRow::into_entry).collect())
    }

    /// Disciplines with at least one matching result, by name.
    pub async fn disciplines(&self, request: &DisciplineRequest) -> Result<Vec<DisciplineSummary>> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT r.discipline_id, dc.name, d.score_identifier, COUNT(r.wind) AS wind_results
            FROM results r
            JOIN athletes a ON a.athlete_id = r.athlete_id
            JOIN disciplines d ON d.discipline_id = r.discipline_id
            JOIN discipline_configs dc ON dc.config_id = d.config_id
            WHERE r.ignore = FALSE AND d.male =
            "#,
        );
        query.push_bind(request.male);
        query.push(" AND d.indoor = ");
        query.push_bind(request.indoor);

        if request.score_available {
            query.push(" AND d.score_identifier IS NOT NULL");
        }

        push_common_filters(
            &mut query,
            request.year,
            &request.age_range,
            request.only_homologated,
        );

        query.push(" GROUP BY r.discipline_id, dc.name, d.score_identifier ORDER BY dc.name");

        let rows: Vec<DisciplineRow> = query.build_query_as().fetch_all(self.pool).await?;

        Ok(rows
            .into_iter()
            .map(|row| DisciplineSummary {
                id: row.discipline_id,
                name: row.name,
                score_available: row.score_identifier.is_some(),
                wind_relevant: row.wind_results > 0,
            })
            .collect())
    }
}

fn push_common_filters(
    query: &mut QueryBuilder<'_, Postgres>,
    year: Option<i32>,
    age_range: &Range<i32>,
    only_homologated: bool,
) {
    query.push(
        " AND (EXTRACT(YEAR FROM r.date)::INTEGER - EXTRACT(YEAR FROM a.birthdate)::INTEGER) >= ",
    );
    query.push_bind(age_range.start);
    query.push(
        " AND (EXTRACT(YEAR FROM r.date)::INTEGER - EXTRACT(YEAR FROM a.birthdate)::INTEGER) < ",
    );
    query.push_bind(age_range.end);

    if let Some(year) = year {
        query.push(" AND EXTRACT(YEAR FROM r.date)::INTEGER = ");
        query.push_bind(year);
    }

    if only_homologated {
        query.push(" AND r.homologated = TRUE");
    }
}

impl BestlistRow {
    fn into_entry(self) -> BestlistEntry {
        BestlistEntry {
            athlete: AthleteInfo {
                id: self.athlete_id,
                name: self.athlete_name,
                birthdate: self.birthdate,
                nationality: self.nationality,
            },
            club: ClubInfo {
                id: self.club_id,
                name: self.club_name,
            },
            event: EventInfo {
                id: self.event_id,
                name: self.event_name,
            },
            result: ResultInfo {
                performance: self.performance,
                wind: self.wind.and_then(|wind| wind.to_f64()),
                rank: self.rank,
                location: self.location,
                date: self.date,
                homologated: self.homologated,
                points: self.points,
            },
        }
    }
}
