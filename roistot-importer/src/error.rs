//! Error types for the importer
//!
//! Every error is fatal to the run. Parse errors abort before the offending
//! row touches any registry; reconciliation errors abort persistence, leaving
//! chunks committed before the failure in the store.

use std::fmt;
use thiserror::Error;

/// Phase of an import run, used to tell where a run failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Version,
    Author,
    Publication,
    Story,
    StoryAuthor,
    StoryPublication,
    Villain,
    StoryVillain,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Version => "version",
            Stage::Author => "author",
            Stage::Publication => "publication",
            Stage::Story => "story",
            Stage::StoryAuthor => "story-author",
            Stage::StoryPublication => "story-publication",
            Stage::Villain => "villain",
            Stage::StoryVillain => "story-villain",
        };
        f.write_str(name)
    }
}

/// Import run error
#[derive(Debug, Error)]
pub enum ImportError {
    /// Cell that must hold a usable number does not
    #[error("Row {row}: invalid {column} value '{value}'")]
    Parse {
        row: usize,
        column: &'static str,
        value: String,
    },

    /// A title is required but the title cell is blank
    #[error("Row {row}: {column} is missing")]
    MissingTitle { row: usize, column: &'static str },

    /// Issue range wraps into the next year, but the year's issue count is unknown
    #[error("Row {row}: issue range wraps past year {year}, which has no known issue count")]
    UnknownAnnualCount { row: usize, year: i32 },

    /// Store reported a different number of inserted rows than were sent
    #[error("{stage} stage: bulk insert affected {actual} rows, expected {expected}")]
    CountMismatch {
        stage: Stage,
        expected: usize,
        actual: u64,
    },

    /// Read-back after insert did not contain an entry's hash
    #[error("{stage} stage: matching entity not found for hash {hash}")]
    EntityNotFound { stage: Stage, hash: String },

    /// Join row refers to an entity that has no durable id yet
    #[error("{stage} stage: entity {temp_id} has no durable id")]
    UnresolvedReference { stage: Stage, temp_id: u64 },

    /// Storage layer failure
    #[error("{stage} stage: store error: {source}")]
    Store {
        stage: Stage,
        #[source]
        source: roistot_common::Error,
    },
}

impl ImportError {
    pub fn store(stage: Stage) -> impl FnOnce(roistot_common::Error) -> ImportError {
        move |source| ImportError::Store { stage, source }
    }
}

/// Result type for import operations
pub type ImportResult<T> = Result<T, ImportError>;
