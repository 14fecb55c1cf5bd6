//! In-memory collaborators for driving the synchronizer in tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use storage::models::{
    Athlete, Club, Discipline, Event, NewAthlete, NewClub, NewEvent, NewResult, StoredResult,
};
use storage::{ResultFilter, ResultLinks, ResultStore, StorageError, StoreSession};
use uuid::Uuid;

use super::record::Record;
use crate::error::{Result, SyncError};
use crate::scraping::{BestlistCategory, BestlistColumn, BestlistTable, ScrapeConfig};
use crate::traits::Scraper;

type StoreResult<T> = storage::Result<T>;

#[derive(Debug, Clone)]
pub struct MemoryResult {
    pub result_id: Uuid,
    pub result: NewResult,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryData {
    pub athletes: Vec<Athlete>,
    pub clubs: Vec<Club>,
    pub events: Vec<Event>,
    pub results: Vec<MemoryResult>,
}

/// Store whose sessions work on a snapshot that only replaces the shared state on commit.
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<MemoryData>>,
    failing_begins: Arc<AtomicU32>,
    failing_commits: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn snapshot(&self) -> MemoryData {
        self.data.lock().unwrap().clone()
    }

    /// The next `count` sessions fail to open with a lost connection.
    pub fn fail_next_begins(&self, count: u32) {
        self.failing_begins.store(count, Ordering::SeqCst);
    }

    /// Every commit fails with a closed pool until reset.
    pub fn fail_commits(&self, failing: bool) {
        self.failing_commits.store(failing, Ordering::SeqCst);
    }

    /// Seeds the store with `record` as if it had been synchronized before.
    pub fn seed(&self, discipline: &Discipline, record: &Record) -> Uuid {
        let mut data = self.data.lock().unwrap();

        let athlete_id = match data
            .athletes
            .iter()
            .find(|a| a.athlete_code == record.athlete_code)
        {
            Some(athlete) => athlete.athlete_id,
            None => {
                let athlete = Athlete {
                    athlete_id: Uuid::new_v4(),
                    athlete_code: record.athlete_code.clone(),
                    name: record.athlete.clone(),
                    birthdate: record.birthdate,
                    nationality: record.nationality.clone(),
                    latest_date: record.event_date,
                };
                let id = athlete.athlete_id;
                data.athletes.push(athlete);
                id
            }
        };

        let club_id = match data
            .clubs
            .iter()
            .find(|c| c.club_code.as_deref() == Some(record.club_code.as_str()))
        {
            Some(club) => club.club_id,
            None => {
                let club = Club {
                    club_id: Uuid::new_v4(),
                    club_code: (!record.club_code.is_empty()).then(|| record.club_code.clone()),
                    name: record.club.clone(),
                    latest_date: record.event_date,
                };
                let id = club.club_id;
                data.clubs.push(club);
                id
            }
        };

        let event_id = match data
            .events
            .iter()
            .find(|e| e.event_code == record.event_code)
        {
            Some(event) => event.event_id,
            None => {
                let event = Event {
                    event_id: Uuid::new_v4(),
                    event_code: record.event_code.clone(),
                    name: record.event.clone(),
                    latest_date: record.event_date,
                };
                let id = event.event_id;
                data.events.push(event);
                id
            }
        };

        let result_id = Uuid::new_v4();
        data.results.push(MemoryResult {
            result_id,
            result: NewResult {
                athlete_id,
                club_id,
                event_id,
                discipline_id: discipline.discipline_id,
                performance: record.performance,
                wind: record.stored_wind(),
                rank: record.rank.clone(),
                location: record.location.clone(),
                date: record.event_date,
                homologated: !record.not_homologated,
                manual: record.manual,
                points: 0,
            },
        });
        result_id
    }
}

#[async_trait::async_trait]
impl ResultStore for MemoryStore {
    type Session = MemorySession;

    async fn begin(&self) -> StoreResult<MemorySession> {
        let failing = self.failing_begins.load(Ordering::SeqCst);
        if failing > 0 {
            self.failing_begins.store(failing - 1, Ordering::SeqCst);
            return Err(StorageError::Database(sqlx::Error::PoolTimedOut));
        }

        Ok(MemorySession {
            shared: Arc::clone(&self.data),
            data: self.snapshot(),
            failing_commit: self.failing_commits.load(Ordering::SeqCst),
        })
    }
}

pub struct MemorySession {
    shared: Arc<Mutex<MemoryData>>,
    data: MemoryData,
    failing_commit: bool,
}

impl MemorySession {
    fn joined(&self, entry: &MemoryResult) -> Option<(StoredResult, NaiveDate)> {
        let result = &entry.result;
        let athlete = self
            .data
            .athletes
            .iter()
            .find(|a| a.athlete_id == result.athlete_id)?;
        let club = self.data.clubs.iter().find(|c| c.club_id == result.club_id)?;
        let event = self
            .data
            .events
            .iter()
            .find(|e| e.event_id == result.event_id)?;

        Some((
            StoredResult {
                result_id: entry.result_id,
                performance: result.performance,
                wind: result.wind,
                rank: result.rank.clone(),
                homologated: result.homologated,
                manual: result.manual,
                location: result.location.clone(),
                date: result.date,
                athlete_name: athlete.name.clone(),
                athlete_code: athlete.athlete_code.clone(),
                nationality: athlete.nationality.clone(),
                birthdate: athlete.birthdate,
                club_name: club.name.clone(),
                club_code: club.club_code.clone(),
                event_name: event.name.clone(),
                event_code: event.event_code.clone(),
            },
            athlete.birthdate,
        ))
    }
}

#[async_trait::async_trait]
impl StoreSession for MemorySession {
    async fn query_results(&mut self, filter: &ResultFilter) -> StoreResult<Vec<StoredResult>> {
        let max_wind = Decimal::new(20, 1);
        let mut rows: Vec<StoredResult> = self
            .data
            .results
            .iter()
            .filter(|entry| entry.result.discipline_id == filter.discipline_id)
            .filter_map(|entry| self.joined(entry))
            .filter(|(row, birthdate)| {
                filter.year.is_none_or(|year| row.date.year() == year)
                    && filter.within_boundary(row.performance)
                    && (!filter.only_homologated || row.homologated)
                    && (filter.allow_wind || row.wind.is_none_or(|wind| wind <= max_wind))
                    && filter
                        .age_range
                        .contains(&(row.date.year() - birthdate.year()))
            })
            .map(|(row, _)| row)
            .collect();

        rows.sort_by_key(|row| {
            if filter.ascending {
                i64::from(row.performance)
            } else {
                -i64::from(row.performance)
            }
        });
        Ok(rows)
    }

    async fn find_athlete_by_code(&mut self, athlete_code: &str) -> StoreResult<Option<Athlete>> {
        Ok(self
            .data
            .athletes
            .iter()
            .find(|a| a.athlete_code == athlete_code)
            .cloned())
    }

    async fn create_athlete(&mut self, athlete: &NewAthlete) -> StoreResult<Athlete> {
        let created = Athlete {
            athlete_id: Uuid::new_v4(),
            athlete_code: athlete.athlete_code.clone(),
            name: athlete.name.clone(),
            birthdate: athlete.birthdate,
            nationality: athlete.nationality.clone(),
            latest_date: athlete.latest_date,
        };
        self.data.athletes.push(created.clone());
        Ok(created)
    }

    async fn update_athlete(&mut self, athlete: &Athlete) -> StoreResult<()> {
        let existing = self
            .data
            .athletes
            .iter_mut()
            .find(|a| a.athlete_id == athlete.athlete_id)
            .ok_or(StorageError::NotFound)?;
        *existing = athlete.clone();
        Ok(())
    }

    async fn find_club_by_code(&mut self, club_code: &str) -> StoreResult<Option<Club>> {
        Ok(self
            .data
            .clubs
            .iter()
            .find(|c| c.club_code.as_deref() == Some(club_code))
            .cloned())
    }

    async fn find_club_by_name(&mut self, name: &str) -> StoreResult<Option<Club>> {
        Ok(self.data.clubs.iter().find(|c| c.name == name).cloned())
    }

    async fn create_club(&mut self, club: &NewClub) -> StoreResult<Club> {
        let created = Club {
            club_id: Uuid::new_v4(),
            club_code: club.club_code.clone(),
            name: club.name.clone(),
            latest_date: club.latest_date,
        };
        self.data.clubs.push(created.clone());
        Ok(created)
    }

    async fn update_club(&mut self, club: &Club) -> StoreResult<()> {
        let existing = self
            .data
            .clubs
            .iter_mut()
            .find(|c| c.club_id == club.club_id)
            .ok_or(StorageError::NotFound)?;
        *existing = club.clone();
        Ok(())
    }

    async fn find_event_by_code(&mut self, event_code: &str) -> StoreResult<Option<Event>> {
        Ok(self
            .data
            .events
            .iter()
            .find(|e| e.event_code == event_code)
            .cloned())
    }

    async fn create_event(&mut self, event: &NewEvent) -> StoreResult<Event> {
        let created = Event {
            event_id: Uuid::new_v4(),
            event_code: event.event_code.clone(),
            name: event.name.clone(),
            latest_date: event.latest_date,
        };
        self.data.events.push(created.clone());
        Ok(created)
    }

    async fn update_event(&mut self, event: &Event) -> StoreResult<()> {
        let existing = self
            .data
            .events
            .iter_mut()
            .find(|e| e.event_id == event.event_id)
            .ok_or(StorageError::NotFound)?;
        *existing = event.clone();
        Ok(())
    }

    async fn result_links(&mut self, result_id: Uuid) -> StoreResult<ResultLinks> {
        let entry = self
            .data
            .results
            .iter()
            .find(|r| r.result_id == result_id)
            .ok_or(StorageError::NotFound)?;

        Ok(ResultLinks {
            athlete: self
                .data
                .athletes
                .iter()
                .find(|a| a.athlete_id == entry.result.athlete_id)
                .cloned()
                .ok_or(StorageError::NotFound)?,
            club: self
                .data
                .clubs
                .iter()
                .find(|c| c.club_id == entry.result.club_id)
                .cloned()
                .ok_or(StorageError::NotFound)?,
            event: self
                .data
                .events
                .iter()
                .find(|e| e.event_id == entry.result.event_id)
                .cloned()
                .ok_or(StorageError::NotFound)?,
        })
    }

    async fn find_identical_result(&mut self, result: &NewResult) -> StoreResult<Option<Uuid>> {
        Ok(self
            .data
            .results
            .iter()
            .find(|entry| {
                NewResult {
                    manual: result.manual,
                    points: result.points,
                    ..entry.result.clone()
                } == *result
            })
            .map(|entry| entry.result_id))
    }

    async fn mark_manual(&mut self, result_id: Uuid) -> StoreResult<()> {
        let entry = self
            .data
            .results
            .iter_mut()
            .find(|r| r.result_id == result_id)
            .ok_or(StorageError::NotFound)?;
        entry.result.manual = true;
        Ok(())
    }

    async fn create_result(&mut self, result: &NewResult) -> StoreResult<Uuid> {
        let result_id = Uuid::new_v4();
        self.data.results.push(MemoryResult {
            result_id,
            result: result.clone(),
        });
        Ok(result_id)
    }

    async fn delete_results(&mut self, result_ids: &[Uuid]) -> StoreResult<u64> {
        let before = self.data.results.len();
        self.data
            .results
            .retain(|entry| !result_ids.contains(&entry.result_id));
        Ok((before - self.data.results.len()) as u64)
    }

    async fn commit(self) -> StoreResult<()> {
        if self.failing_commit {
            return Err(StorageError::Database(sqlx::Error::PoolClosed));
        }
        *self.shared.lock().unwrap() = self.data;
        Ok(())
    }
}

/// Key of a canned bestlist: category, year and homologated-only flag.
pub type SliceKey = (BestlistCategory, Option<i32>, bool);

/// What the synchronizer asked a [`StaticScraper`] for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScraperCall {
    Session { exclusive_categories: bool },
    Bestlist(SliceKey),
}

/// Scraper serving canned bestlists and recording every request.
#[derive(Default)]
pub struct StaticScraper {
    pub tables: HashMap<SliceKey, BestlistTable>,
    pub years: Vec<i32>,
    calls: Mutex<Vec<ScraperCall>>,
    failing_requests: AtomicU32,
}

impl StaticScraper {
    pub fn with_table(mut self, key: SliceKey, table: BestlistTable) -> Self {
        self.tables.insert(key, table);
        self
    }

    pub fn with_years(mut self, years: Vec<i32>) -> Self {
        self.years = years;
        self
    }

    /// The next `count` requests fail with a lost connection.
    pub fn fail_next_requests(&self, count: u32) {
        self.failing_requests.store(count, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<SliceKey> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ScraperCall::Bestlist(key) => Some(key),
                ScraperCall::Session { .. } => None,
            })
            .collect()
    }

    pub fn calls(&self) -> Vec<ScraperCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Scraper for StaticScraper {
    async fn extract_data(&self, config: &ScrapeConfig) -> Result<Option<BestlistTable>> {
        let failing = self.failing_requests.load(Ordering::SeqCst);
        if failing > 0 {
            self.failing_requests.store(failing - 1, Ordering::SeqCst);
            return Err(SyncError::ConnectionError("connection reset".into()));
        }

        let key = (config.category, config.year, config.only_homologated);
        self.calls.lock().unwrap().push(ScraperCall::Bestlist(key));
        Ok(self.tables.get(&key).cloned())
    }

    async fn prepare_session(&self, exclusive_categories: bool) -> Result<()> {
        self.calls.lock().unwrap().push(ScraperCall::Session {
            exclusive_categories,
        });
        Ok(())
    }

    async fn available_years(&self) -> Result<Vec<i32>> {
        Ok(self.years.clone())
    }
}

/// Renders records the way the bestlist page lists them, numbered from 1.
pub fn bestlist_table(records: &[Record]) -> BestlistTable {
    let mut table = BestlistTable::new(vec![
        BestlistColumn::Number,
        BestlistColumn::Result,
        BestlistColumn::Wind,
        BestlistColumn::Rank,
        BestlistColumn::Athlete,
        BestlistColumn::Club,
        BestlistColumn::Nationality,
        BestlistColumn::Birthdate,
        BestlistColumn::Event,
        BestlistColumn::Location,
        BestlistColumn::Date,
        BestlistColumn::AthleteCode,
        BestlistColumn::ClubCode,
        BestlistColumn::EventCode,
    ]);

    for (index, record) in records.iter().enumerate() {
        table
            .push_row(vec![
                (index + 1).to_string(),
                format!("{}.{:02}", record.performance / 100, record.performance % 100),
                record.wind.map(|w| format!("{w:.1}")).unwrap_or_default(),
                record.rank.clone(),
                record.athlete.clone(),
                record.club.clone(),
                record.nationality.clone(),
                record.birthdate.format("%d.%m.%Y").to_string(),
                record.event.clone(),
                record.location.clone(),
                record.event_date.format("%d.%m.%Y").to_string(),
                record.athlete_code.clone(),
                record.club_code.clone(),
                record.event_code.clone(),
            ])
            .unwrap();
    }
    table
}

pub fn long_jump() -> Discipline {
    Discipline {
        discipline_id: Uuid::new_v4(),
        config_id: Uuid::new_v4(),
        name: "Weit".to_string(),
        ascending: false,
        discipline_code: "5c4o3k5m-d686mo-j986g2ie-1-j986ge5c-3mp".to_string(),
        indoor: false,
        male: false,
        ignore: false,
        score_identifier: None,
    }
}
