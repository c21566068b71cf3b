//! Upstream access for the note pipeline: the [`NoteSource`] boundary, its
//! reqwest-backed implementation, and the pure listing, resolving and
//! normalizing steps built on top of it.

pub mod client;
pub mod error;
pub mod governor;
pub mod normalize;
pub mod pagination;
mod rate_limit;
pub mod resolve;
pub mod source;
pub mod target;
pub mod types;

pub use client::{ClientSettings, XhsClient};
pub use error::ScraperError;
pub use normalize::{normalize_note, normalize_profile, parse_count};
pub use pagination::{list_user_posts, MAX_PAGES};
pub use resolve::{resolve_detail, DetailTarget};
pub use source::NoteSource;
pub use target::{ensure_source_tag, NoteTarget, UserTarget};
pub use types::{FeedResponse, RawNoteItem, RawUserProfile, UserNotesPage};
