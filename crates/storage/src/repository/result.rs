use sqlx::{PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{Athlete, Club, Event, NewResult, ResultEntry, StoredResult};
use crate::store::{ResultFilter, ResultLinks};

const STORED_RESULT_SELECT: &str = r#"
    SELECT
        r.result_id, r.performance, r.wind, r.rank, r.homologated, r.manual,
        r.location, r.date,
        a.name AS athlete_name, a.athlete_code, a.nationality, a.birthdate,
        c.name AS club_name, c.club_code,
        e.name AS event_name, e.event_code
    FROM results r
    JOIN athletes a ON a.athlete_id = r.athlete_id
    JOIN clubs c ON c.club_id = r.club_id
    JOIN events e ON e.event_id = r.event_id
    WHERE r.discipline_id = "#;

pub struct ResultRepository<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> ResultRepository<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }

    /// Stored results matching `filter`, best performance first.
    pub async fn query(&mut self, filter: &ResultFilter) -> Result<Vec<StoredResult>> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(STORED_RESULT_SELECT);
        query.push_bind(filter.discipline_id);

        if let Some(year) = filter.year {
            query.push(" AND EXTRACT(YEAR FROM r.date)::INTEGER = ");
            query.push_bind(year);
        }

        if let Some(boundary) = filter.boundary {
            if filter.ascending {
                query.push(" AND r.performance <= ");
            } else {
                query.push(" AND r.performance >= ");
            }
            query.push_bind(boundary);
        }

        if filter.only_homologated {
            query.push(" AND r.homologated = TRUE");
        }

        if !filter.allow_wind {
            query.push(" AND (r.wind IS NULL OR r.wind <= 2.0)");
        }

        query.push(
            " AND (EXTRACT(YEAR FROM r.date)::INTEGER - EXTRACT(YEAR FROM a.birthdate)::INTEGER) >= ",
        );
        query.push_bind(filter.age_range.start);
        query.push(
            " AND (EXTRACT(YEAR FROM r.date)::INTEGER - EXTRACT(YEAR FROM a.birthdate)::INTEGER) < ",
        );
        query.push_bind(filter.age_range.end);

        if filter.ascending {
            query.push(" ORDER BY r.performance ASC, r.date ASC");
        } else {
            query.push(" ORDER BY r.performance DESC, r.date ASC");
        }

        let results = query
            .build_query_as::<StoredResult>()
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(results)
    }

    pub async fn links(&mut self, result_id: Uuid) -> Result<ResultLinks> {
        let ids: (Uuid, Uuid, Uuid) = sqlx::query_as(
            "SELECT athlete_id, club_id, event_id FROM results WHERE result_id = $1",
        )
        .bind(result_id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or(StorageError::NotFound)?;

        let athlete = sqlx::query_as::<_, Athlete>(
            r#"
            SELECT athlete_id, athlete_code, name, birthdate, nationality, latest_date
            FROM athletes
            WHERE athlete_id = $1
            "#,
        )
        .bind(ids.0)
        .fetch_one(&mut *self.conn)
        .await?;

        let club = sqlx::query_as::<_, Club>(
            "SELECT club_id, club_code, name, latest_date FROM clubs WHERE club_id = $1",
        )
        .bind(ids.1)
        .fetch_one(&mut *self.conn)
        .await?;

        let event = sqlx::query_as::<_, Event>(
            "SELECT event_id, event_code, name, latest_date FROM events WHERE event_id = $1",
        )
        .bind(ids.2)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(ResultLinks {
            athlete,
            club,
            event,
        })
    }

    pub async fn find_identical(&mut self, result: &NewResult) -> Result<Option<Uuid>> {
        let result_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT result_id
            FROM results
            WHERE athlete_id = $1
              AND club_id = $2
              AND event_id = $3
              AND discipline_id = $4
              AND performance = $5
              AND wind IS NOT DISTINCT FROM $6
              AND rank = $7
              AND location = $8
              AND date = $9
              AND homologated = $10
            LIMIT 1
            "#,
        )
        .bind(result.athlete_id)
        .bind(result.club_id)
        .bind(result.event_id)
        .bind(result.discipline_id)
        .bind(result.performance)
        .bind(result.wind)
        .bind(&result.rank)
        .bind(&result.location)
        .bind(result.date)
        .bind(result.homologated)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(result_id)
    }

    pub async fn mark_manual(&mut self, result_id: Uuid) -> Result<()> {
        let result = sqlx::query("UPDATE results SET manual = TRUE WHERE result_id = $1")
            .bind(result_id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }

    pub async fn create(&mut self, result: &NewResult) -> Result<Uuid> {
        let result_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO results (
                athlete_id, club_id, event_id, discipline_id, performance, wind,
                rank, location, date, homologated, manual, points
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING result_id
            "#,
        )
        .bind(result.athlete_id)
        .bind(result.club_id)
        .bind(result.event_id)
        .bind(result.discipline_id)
        .bind(result.performance)
        .bind(result.wind)
        .bind(&result.rank)
        .bind(&result.location)
        .bind(result.date)
        .bind(result.homologated)
        .bind(result.manual)
        .bind(result.points)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(result_id)
    }

    pub async fn delete_many(&mut self, result_ids: &[Uuid]) -> Result<u64> {
        if result_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM results WHERE result_id = ANY($1)")
            .bind(result_ids)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() != result_ids.len() as u64 {
            tracing::warn!(
                "Deleted {} results, {} were requested",
                result.rows_affected(),
                result_ids.len()
            );
        }
        Ok(result.rows_affected())
    }

    /// Every result of a discipline, used when recomputing points.
    pub async fn list_for_discipline(&mut self, discipline_id: Uuid) -> Result<Vec<ResultEntry>> {
        let results = sqlx::query_as::<_, ResultEntry>(
            r#"
            SELECT result_id, athlete_id, club_id, event_id, discipline_id, performance, wind,
                   rank, location, date, homologated, ignore, manual, insert_date, points
            FROM results
            WHERE discipline_id = $1
            ORDER BY performance
            "#,
        )
        .bind(discipline_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(results)
    }

    pub async fn update_points(&mut self, result_id: Uuid, points: i16, ignore: bool) -> Result<()> {
        sqlx::query("UPDATE results SET points = $2, ignore = $3 WHERE result_id = $1")
            .bind(result_id)
            .bind(points)
            .bind(ignore)
            .execute(&mut *self.conn)
            .await?;

        Ok(())
    }
}
