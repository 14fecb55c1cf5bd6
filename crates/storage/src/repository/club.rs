use sqlx::PgConnection;

use crate::error::{Result, StorageError};
use crate::models::{Club, NewClub};

pub struct ClubRepository<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> ClubRepository<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn find_by_code(&mut self, club_code: &str) -> Result<Option<Club>> {
        let club = sqlx::query_as::<_, Club>(
            "SELECT club_id, club_code, name, latest_date FROM clubs WHERE club_code = $1",
        )
        .bind(club_code)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(club)
    }

    /// Oldest club carrying this name. Used for clubs listed without a code.
    pub async fn find_by_name(&mut self, name: &str) -> Result<Option<Club>> {
        let club = sqlx::query_as::<_, Club>(
            r#"
            SELECT club_id, club_code, name, latest_date
            FROM clubs
            WHERE name = $1
            ORDER BY latest_date
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(club)
    }

    pub async fn create(&mut self, club: &NewClub) -> Result<Club> {
        let club = sqlx::query_as::<_, Club>(
            r#"
            INSERT INTO clubs (club_code, name, latest_date)
            VALUES ($1, $2, $3)
            RETURNING club_id, club_code, name, latest_date
            "#,
        )
        .bind(&club.club_code)
        .bind(&club.name)
        .bind(club.latest_date)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(club)
    }

    pub async fn update(&mut self, club: &Club) -> Result<()> {
        let result = sqlx::query("UPDATE clubs SET name = $2, latest_date = $3 WHERE club_id = $1")
            .bind(club.club_id)
            .bind(&club.name)
            .bind(club.latest_date)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}
