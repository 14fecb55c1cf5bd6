use std::path::Path;

use storage::ResultStore;
use storage::models::Discipline;
use tracing::{error, info, warn};

use super::anomaly::{AnomalySink, IgnoredEntries};
use super::bestlist::{BestlistSynchronizer, SliceContext, SliceOutcome};
use super::retry::RetryPolicy;
use super::statistics::SynchronizationStatistics;
use crate::error::{SyncError, SynchronizationError};
use crate::scores::ScoreList;
use crate::scraping::{BestlistCategory, MAX_AMOUNT, ScrapeConfig};
use crate::traits::Scraper;

type SliceResult<T> = std::result::Result<T, SynchronizationError>;

/// Drives every bestlist slice of one discipline and aggregates their statistics.
pub struct DisciplineSynchronizer<'a, S, C> {
    discipline: Discipline,
    store: &'a S,
    scraper: &'a C,
    anomalies: AnomalySink,
    ignored: &'a IgnoredEntries,
    score_list: Option<ScoreList>,
    retry: RetryPolicy,
    amount: u32,
}

impl<'a, S, C> DisciplineSynchronizer<'a, S, C>
where
    S: ResultStore,
    C: Scraper,
{
    pub fn new(
        discipline: Discipline,
        store: &'a S,
        scraper: &'a C,
        anomalies: AnomalySink,
        ignored: &'a IgnoredEntries,
    ) -> Self {
        Self {
            discipline,
            store,
            scraper,
            anomalies,
            ignored,
            score_list: None,
            retry: RetryPolicy::default(),
            amount: MAX_AMOUNT,
        }
    }

    pub fn with_score_list(mut self, score_list: Option<ScoreList>) -> Self {
        self.score_list = score_list;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_amount(mut self, amount: u32) -> Self {
        self.amount = amount;
        self
    }

    /// Synchronizes the years `[end_year, start_year]`, newest first.
    ///
    /// Without a start year the all-time list is synchronized first; when it is complete the
    /// per-year lists cannot add anything.
    pub async fn synchronize(
        &self,
        start_year: Option<i32>,
        end_year: Option<i32>,
    ) -> SliceResult<SynchronizationStatistics> {
        if let (Some(start), Some(end)) = (start_year, end_year) {
            if start < end {
                return Err(SynchronizationError::unknown(format!(
                    "Start year {start} lies before end year {end}"
                )));
            }
        }

        let label = format!(
            "{} ({}, {})",
            self.discipline.name,
            self.discipline.place(),
            self.discipline.gender()
        );
        info!("Synchronizing {}", label);

        let mut statistics = SynchronizationStatistics::default();
        let male = self.discipline.male;
        self.prepare_session(false).await?;

        if start_year.is_none() {
            let outcome = self
                .slice(BestlistCategory::all(male), None, false, &mut statistics)
                .await?;
            if !outcome.is_some_and(|outcome| outcome.truncated) {
                statistics.log_summary(&label);
                return Ok(statistics);
            }
        }

        let years: Vec<i32> = self
            .available_years()
            .await?
            .into_iter()
            .filter(|year| start_year.is_none_or(|start| *year <= start))
            .filter(|year| end_year.is_none_or(|end| *year >= end))
            .collect();

        for year in years {
            let outcome = self
                .slice(BestlistCategory::all(male), Some(year), false, &mut statistics)
                .await?;
            if !outcome.is_some_and(|outcome| outcome.truncated) {
                continue;
            }

            self.category_with_fallback(BestlistCategory::main(male), year, &mut statistics)
                .await?;

            self.prepare_session(true).await?;
            for category in BestlistCategory::juniors(male) {
                self.category_with_fallback(category, year, &mut statistics)
                    .await?;
            }
            self.prepare_session(false).await?;
        }

        statistics.log_summary(&label);
        Ok(statistics)
    }

    /// Runs the slice, narrowed to homologated results when it is truncated.
    async fn category_with_fallback(
        &self,
        category: BestlistCategory,
        year: i32,
        statistics: &mut SynchronizationStatistics,
    ) -> SliceResult<()> {
        let outcome = self.slice(category, Some(year), false, statistics).await?;
        if !outcome.is_some_and(|outcome| outcome.truncated) {
            return Ok(());
        }

        let outcome = self.slice(category, Some(year), true, statistics).await?;
        if outcome.is_some_and(|outcome| outcome.truncated) {
            warn!(
                "{} {} {}: homologated bestlist still truncated, results may be missing",
                self.discipline.name, category, year
            );
        }
        Ok(())
    }

    /// Runs one slice. `None` when it failed without compromising the batch.
    async fn slice(
        &self,
        category: BestlistCategory,
        year: Option<i32>,
        only_homologated: bool,
        statistics: &mut SynchronizationStatistics,
    ) -> SliceResult<Option<SliceOutcome>> {
        let config = ScrapeConfig {
            category,
            year,
            only_homologated,
            amount: self.amount,
            ..ScrapeConfig::basic(self.discipline.clone())
        };
        let ctx = SliceContext {
            store: self.store,
            scraper: self.scraper,
            anomalies: &self.anomalies,
            ignored: self.ignored,
            score_list: self.score_list.as_ref(),
            retry: self.retry,
        };

        let mut synchronizer = BestlistSynchronizer::new(&config);
        match synchronizer.run(&ctx).await {
            Ok(mut outcome) => {
                statistics.add(std::mem::take(&mut outcome.statistics));
                Ok(Some(outcome))
            }
            Err(e) if e.is_connectivity() => {
                Err(SynchronizationError::connection_lost(format!("{config}: {e}")))
            }
            Err(e) => {
                error!("Synchronization of {} failed: {}", config, e);
                statistics.failed_slices += 1;
                Ok(None)
            }
        }
    }

    async fn prepare_session(&self, exclusive_categories: bool) -> SliceResult<()> {
        let scraper = self.scraper;
        self.retry
            .run("Preparing bestlist session", move || {
                scraper.prepare_session(exclusive_categories)
            })
            .await
            .into_result()
            .map_err(classify)
    }

    async fn available_years(&self) -> SliceResult<Vec<i32>> {
        let scraper = self.scraper;
        let mut years = self
            .retry
            .run("Fetching bestlist years", move || scraper.available_years())
            .await
            .into_result()
            .map_err(classify)?;
        years.sort_unstable_by(|a, b| b.cmp(a));
        Ok(years)
    }
}

fn classify(error: SyncError) -> SynchronizationError {
    if error.is_connectivity() {
        SynchronizationError::connection_lost(error.to_string())
    } else {
        SynchronizationError::unknown(error.to_string())
    }
}

/// Score list of `discipline`, `None` when it has none or it cannot be read.
pub fn load_score_list(score_lists_dir: &Path, discipline: &Discipline) -> Option<ScoreList> {
    discipline.score_identifier.as_ref()?;
    match ScoreList::load(score_lists_dir, discipline) {
        Ok(list) => Some(list),
        Err(e) => {
            warn!(
                "No points for {}: score list unavailable: {}",
                discipline.name, e
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::SynchronizationErrorKind;
    use crate::synchronization::record::Record;
    use crate::synchronization::record::tests::record;
    use crate::scores::MAX_POINTS;
    use crate::synchronization::testing::{
        MemoryStore, ScraperCall, SliceKey, StaticScraper, bestlist_table, long_jump,
    };

    fn one_result() -> crate::scraping::BestlistTable {
        bestlist_table(&[record(833, "Hans Muster")])
    }

    async fn run(
        scraper: &StaticScraper,
        start_year: Option<i32>,
        end_year: Option<i32>,
    ) -> SliceResult<SynchronizationStatistics> {
        let store = MemoryStore::default();
        run_into(&store, long_jump(), None, scraper, start_year, end_year).await
    }

    async fn run_into(
        store: &MemoryStore,
        discipline: Discipline,
        score_list: Option<ScoreList>,
        scraper: &StaticScraper,
        start_year: Option<i32>,
        end_year: Option<i32>,
    ) -> SliceResult<SynchronizationStatistics> {
        let dir = tempfile::tempdir().unwrap();
        let ignored = IgnoredEntries::default();
        DisciplineSynchronizer::new(
            discipline,
            store,
            scraper,
            AnomalySink::new(dir.path().join("anomalies.json")),
            &ignored,
        )
        .with_score_list(score_list)
        .with_retry(RetryPolicy::new(3, Duration::ZERO))
        .with_amount(1)
        .synchronize(start_year, end_year)
        .await
    }

    fn scored_long_jump() -> Discipline {
        Discipline {
            score_identifier: Some("weit".to_string()),
            ..long_jump()
        }
    }

    /// Descending table: 900 for the maximum, one centimetre less every second point.
    fn write_score_list(dir: &Path, discipline: &Discipline) {
        let values: Vec<i64> = (0..MAX_POINTS as i64).map(|i| 900 - i / 2).collect();
        let path = ScoreList::path(dir, discipline).unwrap();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, serde_json::to_string(&values).unwrap()).unwrap();
    }

    fn juniors(year: i32, only_homologated: bool) -> Vec<SliceKey> {
        BestlistCategory::juniors(false)
            .into_iter()
            .map(|category| (category, Some(year), only_homologated))
            .collect()
    }

    #[tokio::test]
    async fn test_complete_all_time_list_ends_the_batch() {
        let scraper = StaticScraper::default()
            .with_years(vec![2023])
            .with_table((BestlistCategory::AllWomen, None, false), bestlist_table(&[]));

        let statistics = run(&scraper, None, None).await.unwrap();

        assert!(statistics.is_empty());
        assert_eq!(
            scraper.requests(),
            vec![(BestlistCategory::AllWomen, None, false)]
        );
    }

    #[tokio::test]
    async fn test_truncated_lists_are_narrowed_down() {
        let scraper = StaticScraper::default()
            .with_years(vec![2022, 2023])
            .with_table((BestlistCategory::AllWomen, None, false), one_result())
            .with_table((BestlistCategory::AllWomen, Some(2023), false), one_result())
            .with_table((BestlistCategory::Women, Some(2023), false), one_result());

        let statistics = run(&scraper, None, None).await.unwrap();
        assert_eq!(statistics.added_results, 1);
        assert_eq!(statistics.failed_slices, 0);

        let mut expected = vec![
            (BestlistCategory::AllWomen, None, false),
            (BestlistCategory::AllWomen, Some(2023), false),
            (BestlistCategory::Women, Some(2023), false),
            (BestlistCategory::Women, Some(2023), true),
        ];
        expected.extend(juniors(2023, false));
        expected.push((BestlistCategory::AllWomen, Some(2022), false));
        assert_eq!(scraper.requests(), expected);
    }

    #[tokio::test]
    async fn test_juniors_are_scraped_in_an_exclusive_session() {
        let scraper = StaticScraper::default()
            .with_years(vec![2023])
            .with_table((BestlistCategory::AllWomen, Some(2023), false), one_result());

        run(&scraper, Some(2023), None).await.unwrap();

        let session = |exclusive_categories| ScraperCall::Session {
            exclusive_categories,
        };
        let mut expected = vec![
            session(false),
            ScraperCall::Bestlist((BestlistCategory::AllWomen, Some(2023), false)),
            ScraperCall::Bestlist((BestlistCategory::Women, Some(2023), false)),
            session(true),
        ];
        expected.extend(juniors(2023, false).into_iter().map(ScraperCall::Bestlist));
        expected.push(session(false));
        assert_eq!(scraper.calls(), expected);
    }

    #[tokio::test]
    async fn test_missing_score_list_scores_zero() {
        let dir = tempfile::tempdir().unwrap();
        let discipline = scored_long_jump();
        let score_list = load_score_list(dir.path(), &discipline);
        assert!(score_list.is_none());

        let store = MemoryStore::default();
        let scraper = StaticScraper::default()
            .with_table((BestlistCategory::AllWomen, None, false), one_result());
        let statistics = run_into(&store, discipline, score_list, &scraper, None, None)
            .await
            .unwrap();

        assert_eq!(statistics.added_results, 1);
        let data = store.snapshot();
        assert_eq!(data.results.len(), 1);
        assert_eq!(data.results[0].result.points, 0);
    }

    #[tokio::test]
    async fn test_inserted_results_are_scored() {
        let dir = tempfile::tempdir().unwrap();
        let discipline = scored_long_jump();
        write_score_list(dir.path(), &discipline);
        let score_list = load_score_list(dir.path(), &discipline).unwrap();
        let expected = score_list.find_score(833);
        // 833 is first reached at index 134
        assert_eq!(expected, 1266);

        let store = MemoryStore::default();
        let scraper = StaticScraper::default()
            .with_table((BestlistCategory::AllWomen, None, false), one_result());
        run_into(&store, discipline, Some(score_list), &scraper, None, None)
            .await
            .unwrap();

        let data = store.snapshot();
        assert_eq!(data.results.len(), 1);
        assert_eq!(data.results[0].result.points, expected);
    }

    #[test]
    fn test_score_list_needs_an_identifier() {
        let dir = tempfile::tempdir().unwrap();
        write_score_list(dir.path(), &scored_long_jump());
        assert!(load_score_list(dir.path(), &long_jump()).is_none());
        assert!(load_score_list(dir.path(), &scored_long_jump()).is_some());
    }

    #[tokio::test]
    async fn test_years_are_bounded() {
        let scraper = StaticScraper::default().with_years(vec![2024, 2023, 2022, 2021]);

        run(&scraper, Some(2023), Some(2022)).await.unwrap();

        assert_eq!(
            scraper.requests(),
            vec![
                (BestlistCategory::AllWomen, Some(2023), false),
                (BestlistCategory::AllWomen, Some(2022), false),
            ]
        );
    }

    #[tokio::test]
    async fn test_inverted_years_are_rejected() {
        let scraper = StaticScraper::default();

        let error = run(&scraper, Some(2020), Some(2023)).await.unwrap_err();

        assert_eq!(error.kind, SynchronizationErrorKind::Unknown);
        assert!(scraper.requests().is_empty());
    }

    #[tokio::test]
    async fn test_lost_connection_stops_the_batch() {
        let scraper = StaticScraper::default().with_years(vec![2023]);
        scraper.fail_next_requests(3);

        let error = run(&scraper, None, None).await.unwrap_err();

        assert!(error.is_connection_lost());
        assert!(scraper.requests().is_empty());
    }

    #[tokio::test]
    async fn test_failed_slice_does_not_stop_the_batch() {
        let unordered = bestlist_table(&[
            Record {
                event_code: "e-4".to_string(),
                ..record(790, "Vera Weg")
            },
            record(833, "Hans Muster"),
        ]);
        let scraper = StaticScraper::default()
            .with_years(vec![2023, 2022])
            .with_table((BestlistCategory::AllWomen, Some(2023), false), unordered)
            .with_table((BestlistCategory::AllWomen, Some(2022), false), one_result());

        let statistics = run(&scraper, Some(2023), None).await.unwrap();

        assert_eq!(statistics.failed_slices, 1);
        assert_eq!(statistics.added_results, 1);
        assert_eq!(scraper.requests().len(), 2 + juniors(2022, false).len() + 1);
    }
}
