use std::ops::AddAssign;

use tracing::info;

use super::record::Record;

#[derive(Debug, Clone, Default)]
pub struct SynchronizationStatistics {
    pub added_results: usize,
    pub added_athletes: usize,
    pub added_clubs: usize,
    pub added_events: usize,
    pub updates: usize,
    pub deletions: Vec<Record>,
    /// Slices that failed without stopping the batch.
    pub failed_slices: usize,
}

impl SynchronizationStatistics {
    pub fn add(&mut self, other: SynchronizationStatistics) {
        self.added_results += other.added_results;
        self.added_athletes += other.added_athletes;
        self.added_clubs += other.added_clubs;
        self.added_events += other.added_events;
        self.updates += other.updates;
        self.deletions.extend(other.deletions);
        self.failed_slices += other.failed_slices;
    }

    pub fn is_empty(&self) -> bool {
        self.added_results == 0
            && self.added_athletes == 0
            && self.added_clubs == 0
            && self.added_events == 0
            && self.updates == 0
            && self.deletions.is_empty()
            && self.failed_slices == 0
    }

    pub fn log_summary(&self, label: &str) {
        info!("Synchronization summary for {}:", label);
        info!("  Results added:  {}", self.added_results);
        info!("  Athletes added: {}", self.added_athletes);
        info!("  Clubs added:    {}", self.added_clubs);
        info!("  Events added:   {}", self.added_events);
        info!("  Updates:        {}", self.updates);
        info!("  Deletions:      {}", self.deletions.len());
        if self.failed_slices > 0 {
            info!("  Failed slices:  {}", self.failed_slices);
        }
    }

    /// One line per deleted result: performance, athlete, event and date.
    pub fn deletion_lines(&self) -> Vec<String> {
        self.deletions
            .iter()
            .map(|record| {
                format!(
                    "{} {} ({}, {})",
                    record.performance, record.athlete, record.event, record.event_date
                )
            })
            .collect()
    }

    pub fn log_deletions(&self) {
        info!("Deleted results:");
        for line in self.deletion_lines() {
            info!("  - {}", line);
        }
    }
}

impl AddAssign for SynchronizationStatistics {
    fn add_assign(&mut self, other: SynchronizationStatistics) {
        self.add(other);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synchronization::record::tests::record;

    #[test]
    fn test_add_aggregates_everything() {
        let mut total = SynchronizationStatistics::default();
        assert!(total.is_empty());

        total += SynchronizationStatistics {
            added_results: 2,
            added_athletes: 1,
            updates: 3,
            deletions: vec![record(833, "Hans Muster")],
            ..Default::default()
        };
        total.add(SynchronizationStatistics {
            added_results: 1,
            added_clubs: 1,
            added_events: 2,
            failed_slices: 1,
            deletions: vec![record(820, "Petra Tester")],
            ..Default::default()
        });

        assert_eq!(total.added_results, 3);
        assert_eq!(total.added_athletes, 1);
        assert_eq!(total.added_clubs, 1);
        assert_eq!(total.added_events, 2);
        assert_eq!(total.updates, 3);
        assert_eq!(total.deletions.len(), 2);
        assert_eq!(total.failed_slices, 1);
        assert!(!total.is_empty());
    }

    #[test]
    fn test_deletion_lines() {
        let statistics = SynchronizationStatistics {
            deletions: vec![record(833, "Hans Muster")],
            ..Default::default()
        };
        assert_eq!(
            statistics.deletion_lines(),
            vec!["833 Hans Muster (Meeting Zürich, 2023-07-03)".to_string()]
        );
    }
}
