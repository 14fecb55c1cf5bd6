use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{AthleteRepository, ClubRepository, EventRepository, ResultRepository};
use crate::error::Result;
use crate::models::{
    Athlete, Club, Event, NewAthlete, NewClub, NewEvent, NewResult, StoredResult,
};
use crate::store::{ResultFilter, ResultLinks, ResultStore, StoreSession};

/// Postgres-backed [`ResultStore`].
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ResultStore for PgStore {
    type Session = PgSession;

    async fn begin(&self) -> Result<PgSession> {
        let tx = self.pool.begin().await?;
        tracing::debug!("Opened store session");
        Ok(PgSession { tx })
    }
}

/// A store session backed by one database transaction. Rolled back on drop unless committed.
pub struct PgSession {
    tx: Transaction<'static, Postgres>,
}

#[async_trait::async_trait]
impl StoreSession for PgSession {
    async fn query_results(&mut self, filter: &ResultFilter) -> Result<Vec<StoredResult>> {
        ResultRepository::new(&mut self.tx).query(filter).await
    }

    async fn find_athlete_by_code(&mut self, athlete_code: &str) -> Result<Option<Athlete>> {
        AthleteRepository::new(&mut self.tx)
            .find_by_code(athlete_code)
            .await
    }

    async fn create_athlete(&mut self, athlete: &NewAthlete) -> Result<Athlete> {
        AthleteRepository::new(&mut self.tx).create(athlete).await
    }

    async fn update_athlete(&mut self, athlete: &Athlete) -> Result<()> {
        AthleteRepository::new(&mut self.tx).update(athlete).await
    }

    async fn find_club_by_code(&mut self, club_code: &str) -> Result<Option<Club>> {
        ClubRepository::new(&mut self.tx).find_by_code(club_code).await
    }

    async fn find_club_by_name(&mut self, name: &str) -> Result<Option<Club>> {
        ClubRepository::new(&mut self.tx).find_by_name(name).await
    }

    async fn create_club(&mut self, club: &NewClub) -> Result<Club> {
        ClubRepository::new(&mut self.tx).create(club).await
    }

    async fn update_club(&mut self, club: &Club) -> Result<()> {
        ClubRepository::new(&mut self.tx).update(club).await
    }

    async fn find_event_by_code(&mut self, event_code: &str) -> Result<Option<Event>> {
        EventRepository::new(&mut self.tx)
            .find_by_code(event_code)
            .await
    }

    async fn create_event(&mut self, event: &NewEvent) -> Result<Event> {
        EventRepository::new(&mut self.tx).create(event).await
    }

    async fn update_event(&mut self, event: &Event) -> Result<()> {
        EventRepository::new(&mut self.tx).update(event).await
    }

    async fn result_links(&mut self, result_id: Uuid) -> Result<ResultLinks> {
        ResultRepository::new(&mut self.tx).links(result_id).await
    }

    async fn find_identical_result(&mut self, result: &NewResult) -> Result<Option<Uuid>> {
        ResultRepository::new(&mut self.tx)
            .find_identical(result)
            .await
    }

    async fn mark_manual(&mut self, result_id: Uuid) -> Result<()> {
        ResultRepository::new(&mut self.tx)
            .mark_manual(result_id)
            .await
    }

    async fn create_result(&mut self, result: &NewResult) -> Result<Uuid> {
        ResultRepository::new(&mut self.tx).create(result).await
    }

    async fn delete_results(&mut self, result_ids: &[Uuid]) -> Result<u64> {
        ResultRepository::new(&mut self.tx)
            .delete_many(result_ids)
            .await
    }

    async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
