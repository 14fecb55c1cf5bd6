use sqlx::PgConnection;

use crate::error::{Result, StorageError};
use crate::models::{Athlete, NewAthlete};

pub struct AthleteRepository<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> AthleteRepository<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn find_by_code(&mut self, athlete_code: &str) -> Result<Option<Athlete>> {
        let athlete = sqlx::query_as::<_, Athlete>(
            r#"
            SELECT athlete_id, athlete_code, name, birthdate, nationality, latest_date
            FROM athletes
            WHERE athlete_code = $1
            "#,
        )
        .bind(athlete_code)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(athlete)
    }

    pub async fn create(&mut self, athlete: &NewAthlete) -> Result<Athlete> {
        let athlete = sqlx::query_as::<_, Athlete>(
            r#"
            INSERT INTO athletes (athlete_code, name, birthdate, nationality, latest_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING athlete_id, athlete_code, name, birthdate, nationality, latest_date
            "#,
        )
        .bind(&athlete.athlete_code)
        .bind(&athlete.name)
        .bind(athlete.birthdate)
        .bind(&athlete.nationality)
        .bind(athlete.latest_date)
        .fetch_one(&mut *self.conn)
        .await
        .map_err(StorageError::from)
        .map_err(|e| {
            if e.is_unique_violation() {
                StorageError::ConstraintViolation(format!(
                    "athlete code '{}' already exists",
                    athlete.athlete_code
                ))
            } else {
                e
            }
        })?;

        Ok(athlete)
    }

    pub async fn update(&mut self, athlete: &Athlete) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE athletes
            SET name = $2,
                birthdate = $3,
                nationality = $4,
                latest_date = $5
            WHERE athlete_id = $1
            "#,
        )
        .bind(athlete.athlete_id)
        .bind(&athlete.name)
        .bind(athlete.birthdate)
        .bind(&athlete.nationality)
        .bind(athlete.latest_date)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}
