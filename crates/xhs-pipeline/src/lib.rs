//! Batch aggregation, crawl orchestration, and persistence for normalized
//! notes.

pub mod batch;
pub mod crawl;
pub mod dedupe;
pub mod persist;

pub use batch::{run_batch, BatchInput};
pub use crawl::{crawl_posts, crawl_user, default_batch_name, fetch_profile, CrawlSettings, UserCrawl};
pub use dedupe::dedupe_summaries;
pub use persist::{MediaDownloader, PersistError, PersistReport, Persister, SinkKind};
