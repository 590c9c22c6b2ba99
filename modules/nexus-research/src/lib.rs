pub mod deep_research;
pub mod dedup;
pub mod events;
pub mod orchestrator;
pub mod scraper;
pub mod sources;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;

pub use deep_research::DeepResearcher;
pub use events::EventScraper;
pub use orchestrator::{ResearchSources, Researcher};
pub use scraper::WebScraper;
