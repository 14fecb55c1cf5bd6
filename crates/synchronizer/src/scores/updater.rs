use std::path::PathBuf;

use sqlx::PgPool;
use storage::StorageError;
use storage::models::{Discipline, ResultEntry};
use storage::repository::ResultRepository;
use tracing::{info, warn};
use uuid::Uuid;

use super::{INVALID_RESULT_SENTINEL, ScoreList};
use crate::error::Result;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScoreUpdateSummary {
    pub disciplines: usize,
    pub results: usize,
    pub flagged: usize,
    pub skipped_disciplines: usize,
}

/// Recomputes the points of stored results from the score tables.
pub struct ScoreUpdater<'a> {
    pool: &'a PgPool,
    score_lists_dir: PathBuf,
}

impl<'a> ScoreUpdater<'a> {
    pub fn new(pool: &'a PgPool, score_lists_dir: impl Into<PathBuf>) -> Self {
        Self {
            pool,
            score_lists_dir: score_lists_dir.into(),
        }
    }

    pub async fn update(&self, disciplines: &[Discipline]) -> Result<ScoreUpdateSummary> {
        let mut summary = ScoreUpdateSummary::default();

        for discipline in disciplines {
            if discipline.score_identifier.is_none() {
                continue;
            }

            let score_list = match ScoreList::load(&self.score_lists_dir, discipline) {
                Ok(list) => list,
                Err(e) => {
                    warn!(
                        "Cannot update scores for {} ({}, {}): {}",
                        discipline.name,
                        discipline.place(),
                        discipline.gender(),
                        e
                    );
                    summary.skipped_disciplines += 1;
                    continue;
                }
            };

            let mut tx = self.pool.begin().await.map_err(StorageError::from)?;
            let entries = ResultRepository::new(&mut tx)
                .list_for_discipline(discipline.discipline_id)
                .await?;

            let rescored = rescore(&score_list, &entries);
            for (result_id, points, ignore) in &rescored {
                ResultRepository::new(&mut tx)
                    .update_points(*result_id, *points, *ignore)
                    .await?;
            }
            tx.commit().await.map_err(StorageError::from)?;

            let flagged = rescored.iter().filter(|(_, _, ignore)| *ignore).count();
            info!(
                "Updated {} results of {} ({}, {}), {} flagged",
                rescored.len(),
                discipline.name,
                discipline.place(),
                discipline.gender(),
                flagged
            );

            summary.disciplines += 1;
            summary.results += rescored.len();
            summary.flagged += flagged;
        }

        Ok(summary)
    }
}

/// New `(result_id, points, ignore)` for every result not already ignored. Results scoring
/// above the table get flagged.
pub fn rescore(score_list: &ScoreList, entries: &[ResultEntry]) -> Vec<(Uuid, i16, bool)> {
    entries
        .iter()
        .filter(|entry| !entry.ignore)
        .map(|entry| {
            let points = score_list.find_score(entry.performance);
            (entry.result_id, points, points == INVALID_RESULT_SENTINEL)
        })
        .collect()
}
