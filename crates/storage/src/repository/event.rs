use sqlx::PgConnection;

use crate::error::{Result, StorageError};
use crate::models::{Event, NewEvent};

pub struct EventRepository<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> EventRepository<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn find_by_code(&mut self, event_code: &str) -> Result<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(
            "SELECT event_id, event_code, name, latest_date FROM events WHERE event_code = $1",
        )
        .bind(event_code)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(event)
    }

    pub async fn create(&mut self, event: &NewEvent) -> Result<Event> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (event_code, name, latest_date)
            VALUES ($1, $2, $3)
            RETURNING event_id, event_code, name, latest_date
            "#,
        )
        .bind(&event.event_code)
        .bind(&event.name)
        .bind(event.latest_date)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(event)
    }

    pub async fn update(&mut self, event: &Event) -> Result<()> {
        let result =
            sqlx::query("UPDATE events SET name = $2, latest_date = $3 WHERE event_id = $1")
                .bind(event.event_id)
                .bind(&event.name)
                .bind(event.latest_date)
                .execute(&mut *self.conn)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}
