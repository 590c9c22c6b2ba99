pub mod config;
pub mod error;
pub mod fetch;
pub mod types;

pub use config::{Config, SocialApiAuth};
pub use error::{NexusError, SourceError, SourceResult};
pub use fetch::{bounded, fetch_json, fetch_text};
pub use types::*;
