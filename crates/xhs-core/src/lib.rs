//! Shared domain types, error taxonomy, and configuration for the note
//! acquisition pipeline.

pub mod app_config;
pub mod batch;
pub mod config;
pub mod error;
pub mod notes;
pub mod save_mode;
pub mod session;

pub use app_config::{AppConfig, Environment};
pub use batch::{BatchResult, FailedItem};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, ItemError, PipelineError};
pub use notes::{NoteRecord, NoteSummary, NoteType, UserProfile};
pub use save_mode::SaveMode;
pub use session::{Credential, ProxyConfig};
