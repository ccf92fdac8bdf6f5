pub mod driver;
pub mod error;
pub mod extract;
pub mod orchestrator;
pub mod pacing;
pub mod selectors;
pub mod store;
pub mod webdriver;

#[cfg(test)]
mod fake;

pub use driver::PageDriver;
pub use error::{DriverError, ScraperError, StoreError};
pub use extract::{collect_top_posts, scrape_profile, HARD_POST_LIMIT};
pub use orchestrator::{run_scrape, NoPrompt, OperatorPrompt, ScrapeOptions, ScrapeSummary};
pub use pacing::{JitterRange, Pacing};
pub use store::{open_store, write_document, AggregateStore, DocumentStore, LineStore, StoreEncoding};
pub use webdriver::{ElementRef, WebDriverConfig, WebDriverPage};
