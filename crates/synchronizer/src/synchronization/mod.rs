pub mod anomaly;
pub mod applier;
pub mod batch;
pub mod bestlist;
pub mod collection;
pub mod discipline;
pub mod reconcile;
pub mod record;
pub mod retry;
pub mod statistics;

#[cfg(test)]
pub(crate) mod testing;

pub use anomaly::{AnomalySink, IgnoredEntries};
pub use applier::{EntityUpdates, PersistenceApplier, update_entries};
pub use batch::{BatchRun, BatchStep, MAX_UNKNOWN_ERRORS};
pub use bestlist::{BestlistSynchronizer, SliceContext, SliceOutcome, SliceState};
pub use collection::RecordCollection;
pub use discipline::{DisciplineSynchronizer, load_score_list};
pub use reconcile::{Reconciler, Reconciliation};
pub use record::{ParsedRecord, Record, Similarity, Violation};
pub use retry::{RetryOutcome, RetryPolicy, RetryStep};
pub use statistics::SynchronizationStatistics;
