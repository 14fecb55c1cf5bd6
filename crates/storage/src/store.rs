use std::ops::Range;

use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Athlete, Club, Event, NewAthlete, NewClub, NewEvent, NewResult, StoredResult,
};

/// Filters applied when reading the stored counterpart of a scraped bestlist.
///
/// Manual results are returned as well; reconciliation keeps them.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultFilter {
    pub discipline_id: Uuid,
    pub year: Option<i32>,
    /// Only results at least as good as this performance are returned.
    pub boundary: Option<i32>,
    pub ascending: bool,
    pub only_homologated: bool,
    /// When false, results with a wind above 2.0 are left out. Results without wind always pass.
    pub allow_wind: bool,
    /// Accepted values of `year(result date) - year(birthdate)`.
    pub age_range: Range<i32>,
}

impl ResultFilter {
    pub fn new(discipline_id: Uuid, ascending: bool) -> Self {
        Self {
            discipline_id,
            year: None,
            boundary: None,
            ascending,
            only_homologated: false,
            allow_wind: true,
            age_range: 0..200,
        }
    }

    /// Whether `performance` lies on the good side of the boundary (inclusive).
    pub fn within_boundary(&self, performance: i32) -> bool {
        match self.boundary {
            None => true,
            Some(boundary) if self.ascending => performance <= boundary,
            Some(boundary) => performance >= boundary,
        }
    }
}

/// The entities a stored result points at.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultLinks {
    pub athlete: Athlete,
    pub club: Club,
    pub event: Event,
}

/// Opens transactional sessions. One session covers all reads and writes of a single slice.
#[async_trait::async_trait]
pub trait ResultStore: Send + Sync {
    type Session: StoreSession;

    async fn begin(&self) -> Result<Self::Session>;
}

/// A unit of work against the store.
///
/// Nothing written through a session is visible until [`StoreSession::commit`] succeeds; dropping
/// the session discards all of its writes.
#[async_trait::async_trait]
pub trait StoreSession: Send {
    async fn query_results(&mut self, filter: &ResultFilter) -> Result<Vec<StoredResult>>;

    async fn find_athlete_by_code(&mut self, athlete_code: &str) -> Result<Option<Athlete>>;
    async fn create_athlete(&mut self, athlete: &NewAthlete) -> Result<Athlete>;
    async fn update_athlete(&mut self, athlete: &Athlete) -> Result<()>;

    async fn find_club_by_code(&mut self, club_code: &str) -> Result<Option<Club>>;
    async fn find_club_by_name(&mut self, name: &str) -> Result<Option<Club>>;
    async fn create_club(&mut self, club: &NewClub) -> Result<Club>;
    async fn update_club(&mut self, club: &Club) -> Result<()>;

    async fn find_event_by_code(&mut self, event_code: &str) -> Result<Option<Event>>;
    async fn create_event(&mut self, event: &NewEvent) -> Result<Event>;
    async fn update_event(&mut self, event: &Event) -> Result<()>;

    async fn result_links(&mut self, result_id: Uuid) -> Result<ResultLinks>;
    /// Looks up a stored result whose every column matches `result` (except `manual`/`points`).
    async fn find_identical_result(&mut self, result: &NewResult) -> Result<Option<Uuid>>;
    async fn mark_manual(&mut self, result_id: Uuid) -> Result<()>;
    async fn create_result(&mut self, result: &NewResult) -> Result<Uuid>;
    async fn delete_results(&mut self, result_ids: &[Uuid]) -> Result<u64>;

    async fn commit(self) -> Result<()>
    where
        Self: Sized;
}
