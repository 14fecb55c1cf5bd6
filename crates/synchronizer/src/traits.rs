use crate::Result;
use crate::scraping::{BestlistTable, ScrapeConfig};

/// Source of bestlists.
#[async_trait::async_trait]
pub trait Scraper: Send + Sync {
    /// The bestlist for `config`, or `None` when the page lists no results for the query.
    async fn extract_data(&self, config: &ScrapeConfig) -> Result<Option<BestlistTable>>;

    /// Starts a fresh page session listing every result instead of each athlete's best.
    /// With `exclusive_categories` category lists only hold athletes of exactly that category.
    /// Later queries run in this session.
    async fn prepare_session(&self, exclusive_categories: bool) -> Result<()>;

    /// Years the bestlist offers, most recent first.
    async fn available_years(&self) -> Result<Vec<i32>>;
}
