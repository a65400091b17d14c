//! Row loaders and persistence
//!
//! The loaders extend `EntityGraph` one entity kind at a time; the
//! orchestrator drains the finished graph into a store.

pub mod author_loader;
pub mod persistence_orchestrator;
pub mod publication_loader;
pub mod story_loader;
pub mod villain_loader;

pub use author_loader::{parse_author_names, AuthorName, ROLE_COLUMNS};
pub use persistence_orchestrator::{ImportStore, PersistSummary, PersistenceOrchestrator};
pub use publication_loader::{classify_special, PlannedPublication};
pub use story_loader::StoryKey;
pub use villain_loader::split_values;
