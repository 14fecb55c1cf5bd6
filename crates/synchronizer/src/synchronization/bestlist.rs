use std::fmt;

use storage::{ResultFilter, ResultStore, StoreSession};
use tracing::{debug, info};

use super::anomaly::{AnomalySink, IgnoredEntries};
use super::applier::PersistenceApplier;
use super::collection::RecordCollection;
use super::reconcile::Reconciler;
use super::retry::{RetryPolicy, RetryStep};
use super::statistics::SynchronizationStatistics;
use crate::error::{Result, SyncError};
use crate::scores::ScoreList;
use crate::scraping::{BestlistColumn, ScrapeConfig};
use crate::traits::Scraper;

/// Progress of one slice. `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceState {
    Idle,
    Scraping,
    Validating,
    SanityChecking,
    Fetching,
    Reconciling,
    Persisting,
    Done,
    Failed,
}

impl fmt::Display for SliceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Collaborators shared by every slice of a discipline.
pub struct SliceContext<'a, S, C> {
    pub store: &'a S,
    pub scraper: &'a C,
    pub anomalies: &'a AnomalySink,
    pub ignored: &'a IgnoredEntries,
    pub score_list: Option<&'a ScoreList>,
    pub retry: RetryPolicy,
}

#[derive(Debug, Default)]
pub struct SliceOutcome {
    /// The bestlist hit the configured amount, so it may hide further results.
    pub truncated: bool,
    pub statistics: SynchronizationStatistics,
}

/// Synchronizes one discipline/category/year slice: scrape, validate, reconcile, persist.
///
/// All store reads and writes happen in one session that is only committed once everything
/// was applied; any failure before leaves the store untouched.
pub struct BestlistSynchronizer<'a> {
    config: &'a ScrapeConfig,
    state: SliceState,
}

impl<'a> BestlistSynchronizer<'a> {
    pub fn new(config: &'a ScrapeConfig) -> Self {
        Self {
            config,
            state: SliceState::Idle,
        }
    }

    pub fn state(&self) -> SliceState {
        self.state
    }

    fn enter(&mut self, next: SliceState) {
        debug!("[{}] {} -> {}", self.config, self.state, next);
        self.state = next;
    }

    pub async fn run<S, C>(&mut self, ctx: &SliceContext<'_, S, C>) -> Result<SliceOutcome>
    where
        S: ResultStore,
        C: Scraper,
    {
        let outcome = self.execute(ctx).await;
        if outcome.is_err() {
            self.enter(SliceState::Failed);
        }
        outcome
    }

    async fn execute<S, C>(&mut self, ctx: &SliceContext<'_, S, C>) -> Result<SliceOutcome>
    where
        S: ResultStore,
        C: Scraper,
    {
        self.enter(SliceState::Scraping);
        let config = self.config;
        let scraper = ctx.scraper;
        let table = ctx
            .retry
            .run("Scraping", move || scraper.extract_data(config))
            .await
            .into_result()?;

        let Some(table) = table else {
            debug!("No results for {}", self.config);
            self.enter(SliceState::Done);
            return Ok(SliceOutcome::default());
        };

        let truncated = table.len() >= self.config.amount as usize;
        let table = table.without(BestlistColumn::Number);

        self.enter(SliceState::Validating);
        let mut bestlist = RecordCollection::from_table(&table, ctx.anomalies, ctx.ignored)?;

        self.enter(SliceState::SanityChecking);
        let ascending = self.config.discipline.ascending;
        if !bestlist.sanity_check(ascending) {
            return Err(SyncError::sanity_check_failed(ascending));
        }

        let filter = self.store_filter(bestlist.last().map(|record| record.performance));
        bestlist.sort(ascending);

        let reconciler = Reconciler::new(ascending)
            .truncated(truncated)
            .compare_homologation(table.contains(BestlistColumn::NotHomologated));

        let mut attempt = 1;
        let statistics = loop {
            match self.store_phase(ctx, &bestlist, &filter, reconciler).await {
                Ok(statistics) => break statistics,
                Err(error) => match ctx.retry.after_failure(attempt, error) {
                    RetryStep::Retry(error) => {
                        ctx.retry.pause("Store synchronization", attempt, &error).await;
                        attempt += 1;
                    }
                    RetryStep::Stop(error) => return Err(error),
                },
            }
        };

        info!(
            "[{}] {} added, {} updated, {} deleted",
            self.config,
            statistics.added_results,
            statistics.updates,
            statistics.deletions.len()
        );
        self.enter(SliceState::Done);

        Ok(SliceOutcome {
            truncated,
            statistics,
        })
    }

    /// Stored results that may appear on this bestlist.
    fn store_filter(&self, boundary: Option<i32>) -> ResultFilter {
        let discipline = &self.config.discipline;
        ResultFilter {
            year: self.config.year,
            boundary,
            only_homologated: self.config.only_homologated,
            allow_wind: self.config.allow_wind,
            age_range: self.config.category.age_bounds(),
            ..ResultFilter::new(discipline.discipline_id, discipline.ascending)
        }
    }

    async fn store_phase<S, C>(
        &mut self,
        ctx: &SliceContext<'_, S, C>,
        bestlist: &RecordCollection,
        filter: &ResultFilter,
        reconciler: Reconciler,
    ) -> Result<SynchronizationStatistics>
    where
        S: ResultStore,
        C: Scraper,
    {
        self.enter(SliceState::Fetching);
        let mut session = ctx.store.begin().await?;
        let rows = session.query_results(filter).await?;
        let mut stored = RecordCollection::from_stored(&rows);
        stored.sort(filter.ascending);

        self.enter(SliceState::Reconciling);
        let reconciliation = reconciler.reconcile(bestlist, &stored);
        debug!(
            "[{}] {} of {} bestlist records to insert, {} of {} stored to delete, {} candidates",
            self.config,
            reconciliation.insertions(),
            bestlist.len(),
            reconciliation.deletions(),
            stored.len(),
            reconciliation.candidate_pairs.len()
        );

        self.enter(SliceState::Persisting);
        let statistics = PersistenceApplier::new(
            &mut session,
            &self.config.discipline,
            self.config.category.age_bounds(),
            ctx.score_list,
        )
        .apply(bestlist, &stored, reconciliation)
        .await?;

        session.commit().await?;
        Ok(statistics)
    }
}
