pub mod category;
pub mod column;
pub mod scrape_config;
pub mod scraper;
pub mod table;

pub use category::BestlistCategory;
pub use column::BestlistColumn;
pub use scrape_config::{MAX_AMOUNT, ScrapeConfig, VALID_AMOUNTS};
pub use scraper::{DEFAULT_BESTLIST_URL, HttpScraper, SessionForm, session_form};
pub use table::BestlistTable;
