use tracing::{error, warn};

use super::statistics::SynchronizationStatistics;
use crate::error::SynchronizationError;

/// Unknown discipline failures tolerated before a batch gives up.
pub const MAX_UNKNOWN_ERRORS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStep {
    Continue,
    Stop,
}

/// Outcome of a multi-discipline run and whether it may go on after a failure.
///
/// A lost connection ends the batch at once. Unknown failures are counted and end it once
/// there were more than `max_unknown_errors` of them.
#[derive(Debug)]
pub struct BatchRun {
    max_unknown_errors: usize,
    pub statistics: SynchronizationStatistics,
    pub failed_disciplines: usize,
}

impl Default for BatchRun {
    fn default() -> Self {
        Self::new(MAX_UNKNOWN_ERRORS)
    }
}

impl BatchRun {
    pub fn new(max_unknown_errors: usize) -> Self {
        Self {
            max_unknown_errors,
            statistics: SynchronizationStatistics::default(),
            failed_disciplines: 0,
        }
    }

    pub fn record(
        &mut self,
        discipline: &str,
        result: Result<SynchronizationStatistics, SynchronizationError>,
    ) -> BatchStep {
        match result {
            Ok(statistics) => {
                self.statistics += statistics;
                BatchStep::Continue
            }
            Err(e) if e.is_connection_lost() => {
                error!("Stopping synchronization: {}", e);
                BatchStep::Stop
            }
            Err(e) => {
                error!("Synchronization of {} failed: {}", discipline, e);
                self.failed_disciplines += 1;
                if self.failed_disciplines > self.max_unknown_errors {
                    error!(
                        "Stopping synchronization after {} failed disciplines",
                        self.failed_disciplines
                    );
                    BatchStep::Stop
                } else {
                    BatchStep::Continue
                }
            }
        }
    }

    pub fn log_summary(&self, log_deletions: bool) {
        self.statistics.log_summary("all disciplines");
        if log_deletions {
            self.statistics.log_deletions();
        }
        if self.failed_disciplines > 0 {
            warn!("{} disciplines failed", self.failed_disciplines);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synchronization::record::tests::record;

    fn added(results: usize) -> Result<SynchronizationStatistics, SynchronizationError> {
        Ok(SynchronizationStatistics {
            added_results: results,
            ..SynchronizationStatistics::default()
        })
    }

    #[test]
    fn test_statistics_are_aggregated() {
        let mut run = BatchRun::default();
        assert_eq!(run.record("100m", added(2)), BatchStep::Continue);
        assert_eq!(
            run.record(
                "Weit",
                Ok(SynchronizationStatistics {
                    deletions: vec![record(820, "Petra Tester")],
                    ..SynchronizationStatistics::default()
                })
            ),
            BatchStep::Continue
        );

        assert_eq!(run.statistics.added_results, 2);
        assert_eq!(run.statistics.deletions.len(), 1);
        assert_eq!(run.failed_disciplines, 0);
    }

    #[test]
    fn test_lost_connection_stops_immediately() {
        let mut run = BatchRun::default();
        let step = run.record("100m", Err(SynchronizationError::connection_lost("timeout")));
        assert_eq!(step, BatchStep::Stop);
        assert_eq!(run.failed_disciplines, 0);
    }

    #[test]
    fn test_unknown_failures_stop_past_the_budget() {
        let mut run = BatchRun::default();
        for _ in 0..MAX_UNKNOWN_ERRORS {
            assert_eq!(
                run.record("100m", Err(SynchronizationError::unknown("broken"))),
                BatchStep::Continue
            );
        }
        assert_eq!(run.record("Weit", added(1)), BatchStep::Continue);
        assert_eq!(
            run.record("Hoch", Err(SynchronizationError::unknown("broken"))),
            BatchStep::Stop
        );
        assert_eq!(run.failed_disciplines, MAX_UNKNOWN_ERRORS + 1);
        assert_eq!(run.statistics.added_results, 1);
    }
}
