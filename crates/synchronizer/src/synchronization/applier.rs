use std::ops::Range;

use storage::models::{Athlete, Club, Discipline, Event, NewAthlete, NewClub, NewEvent, NewResult};
use storage::{ResultLinks, StoreSession};
use tracing::debug;

use super::collection::RecordCollection;
use super::reconcile::Reconciliation;
use super::record::Record;
use super::statistics::SynchronizationStatistics;
use crate::error::Result;
use crate::scores::ScoreList;

/// Outcome of refreshing the entities linked to a result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityUpdates {
    /// Display fields overwritten.
    pub changes: usize,
    pub athlete_dirty: bool,
    pub club_dirty: bool,
    pub event_dirty: bool,
}

/// Applies the display attributes of `record` to its athlete, club and event.
///
/// Each entity is only touched if the record is at least as recent as the latest result the
/// entity was refreshed from, so an old result never reverts a rename.
pub fn update_entries(
    athlete: &mut Athlete,
    club: &mut Club,
    event: &mut Event,
    record: &Record,
) -> EntityUpdates {
    let date = record.event_date;
    let mut updates = EntityUpdates::default();

    if date >= athlete.latest_date {
        let mut changes = 0;
        if athlete.name != record.athlete {
            athlete.name = record.athlete.clone();
            changes += 1;
        }
        if athlete.birthdate != record.birthdate {
            athlete.birthdate = record.birthdate;
            changes += 1;
        }
        if athlete.nationality != record.nationality {
            athlete.nationality = record.nationality.clone();
            changes += 1;
        }
        updates.athlete_dirty = changes > 0 || athlete.latest_date != date;
        athlete.latest_date = date;
        updates.changes += changes;
    }

    if date >= club.latest_date {
        let renamed = club.name != record.club;
        if renamed {
            club.name = record.club.clone();
            updates.changes += 1;
        }
        updates.club_dirty = renamed || club.latest_date != date;
        club.latest_date = date;
    }

    if date >= event.latest_date {
        let renamed = event.name != record.event;
        if renamed {
            event.name = record.event.clone();
            updates.changes += 1;
        }
        updates.event_dirty = renamed || event.latest_date != date;
        event.latest_date = date;
    }

    updates
}

/// Turns reconciliation decisions into store mutations within one session.
pub struct PersistenceApplier<'a, S: StoreSession> {
    session: &'a mut S,
    discipline: &'a Discipline,
    age_range: Range<i32>,
    score_list: Option<&'a ScoreList>,
}

impl<'a, S: StoreSession> PersistenceApplier<'a, S> {
    pub fn new(
        session: &'a mut S,
        discipline: &'a Discipline,
        age_range: Range<i32>,
        score_list: Option<&'a ScoreList>,
    ) -> Self {
        Self {
            session,
            discipline,
            age_range,
            score_list,
        }
    }

    pub async fn apply(
        &mut self,
        bestlist: &RecordCollection,
        store: &RecordCollection,
        reconciliation: Reconciliation,
    ) -> Result<SynchronizationStatistics> {
        let Reconciliation {
            mut insertion_mask,
            mut deletion_mask,
            candidate_pairs,
        } = reconciliation;
        let mut statistics = SynchronizationStatistics::default();

        // first pairing wins
        for (bestlist_index, store_index) in candidate_pairs {
            if !insertion_mask[bestlist_index] || !deletion_mask[store_index] {
                continue;
            }
            let Some(result_id) = store[store_index].id else {
                continue;
            };
            insertion_mask[bestlist_index] = false;
            deletion_mask[store_index] = false;

            let mut links = self.session.result_links(result_id).await?;
            statistics.updates += self.refresh(&mut links, &bestlist[bestlist_index]).await?;
        }

        let deletions: Vec<&Record> = store
            .iter()
            .zip(&deletion_mask)
            .filter(|(record, delete)| **delete && !record.manual)
            .map(|(record, _)| record)
            .collect();
        let deletion_ids: Vec<_> = deletions.iter().filter_map(|record| record.id).collect();
        if !deletion_ids.is_empty() {
            let deleted = self.session.delete_results(&deletion_ids).await?;
            debug!("Deleted {} results", deleted);
        }
        statistics.deletions = deletions.into_iter().cloned().collect();

        for (record, _) in bestlist
            .iter()
            .zip(&insertion_mask)
            .filter(|(_, insert)| **insert)
        {
            self.insert(record, &mut statistics).await?;
        }

        Ok(statistics)
    }

    async fn refresh(&mut self, links: &mut ResultLinks, record: &Record) -> Result<usize> {
        let updates = update_entries(
            &mut links.athlete,
            &mut links.club,
            &mut links.event,
            record,
        );

        if updates.athlete_dirty {
            self.session.update_athlete(&links.athlete).await?;
        }
        if updates.club_dirty {
            self.session.update_club(&links.club).await?;
        }
        if updates.event_dirty {
            self.session.update_event(&links.event).await?;
        }

        Ok(updates.changes)
    }

    async fn insert(
        &mut self,
        record: &Record,
        statistics: &mut SynchronizationStatistics,
    ) -> Result<()> {
        let athlete = match self.session.find_athlete_by_code(&record.athlete_code).await? {
            Some(athlete) => athlete,
            None => {
                statistics.added_athletes += 1;
                self.session
                    .create_athlete(&NewAthlete {
                        athlete_code: record.athlete_code.clone(),
                        name: record.athlete.clone(),
                        birthdate: record.birthdate,
                        nationality: record.nationality.clone(),
                        latest_date: record.event_date,
                    })
                    .await?
            }
        };

        let existing_club = if record.club_code.is_empty() {
            self.session.find_club_by_name(&record.club).await?
        } else {
            self.session.find_club_by_code(&record.club_code).await?
        };
        let club = match existing_club {
            Some(club) => club,
            None => {
                statistics.added_clubs += 1;
                self.session
                    .create_club(&NewClub {
                        club_code: (!record.club_code.is_empty())
                            .then(|| record.club_code.clone()),
                        name: record.club.clone(),
                        latest_date: record.event_date,
                    })
                    .await?
            }
        };

        let event = match self.session.find_event_by_code(&record.event_code).await? {
            Some(event) => event,
            None => {
                statistics.added_events += 1;
                self.session
                    .create_event(&NewEvent {
                        event_code: record.event_code.clone(),
                        name: record.event.clone(),
                        latest_date: record.event_date,
                    })
                    .await?
            }
        };

        let mut links = ResultLinks {
            athlete,
            club,
            event,
        };
        statistics.updates += self.refresh(&mut links, record).await?;

        // the category filter of the bestlist sometimes lists results of other age groups
        let manual = !self.age_range.contains(&record.age());
        let result = NewResult {
            athlete_id: links.athlete.athlete_id,
            club_id: links.club.club_id,
            event_id: links.event.event_id,
            discipline_id: self.discipline.discipline_id,
            performance: record.performance,
            wind: record.stored_wind(),
            rank: record.rank.clone(),
            location: record.location.clone(),
            date: record.event_date,
            homologated: !record.not_homologated,
            manual,
            points: self
                .score_list
                .map(|list| list.find_score(record.performance))
                .unwrap_or(0),
        };

        if manual {
            if let Some(result_id) = self.session.find_identical_result(&result).await? {
                debug!(
                    "Flagging {} {} as manual, age {} outside {:?}",
                    record.performance,
                    record.athlete,
                    record.age(),
                    self.age_range
                );
                self.session.mark_manual(result_id).await?;
                return Ok(());
            }
        }

        self.session.create_result(&result).await?;
        statistics.added_results += 1;
        Ok(())
    }
}
