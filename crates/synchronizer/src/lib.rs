pub mod config;
pub mod error;
pub mod parse;
pub mod scores;
pub mod scraping;
pub mod synchronization;
pub mod traits;

pub use config::Config;
pub use error::{Result, SyncError, SynchronizationError, SynchronizationErrorKind};
pub use scraping::{BestlistCategory, BestlistTable, HttpScraper, ScrapeConfig};
pub use synchronization::{
    AnomalySink, DisciplineSynchronizer, IgnoredEntries, RetryPolicy, SynchronizationStatistics,
};
pub use traits::Scraper;
