//! Entity graph of one import run
//!
//! Owns every registry, the shared temporary id counter and the content
//! hasher. Rows are folded into the graph one at a time by the loaders in
//! `services`; persistence drains it afterwards.

use crate::columns::Row;
use crate::error::ImportResult;
use crate::registry::{
    IdAllocator, Registry, StoryDraft, StoryPublicationLink, StoryVillainLink, TempId,
};
use roistot_common::db::{NewAuthor, NewPublication, NewVillain};
use roistot_common::ContentHasher;
use tracing::debug;

/// Deduplicated entities and links gathered from the table
#[derive(Debug)]
pub struct EntityGraph {
    pub(crate) hasher: ContentHasher,
    pub(crate) ids: IdAllocator,
    pub(crate) authors: Registry<String, NewAuthor>,
    pub(crate) stories: Registry<String, StoryDraft>,
    pub(crate) publications: Registry<String, NewPublication>,
    pub(crate) story_publications: Registry<(TempId, TempId), StoryPublicationLink>,
    pub(crate) villains: Registry<String, NewVillain>,
    pub(crate) story_villains: Registry<String, StoryVillainLink>,
}

/// Entity counts of a graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub rows: usize,
    pub authors: usize,
    pub stories: usize,
    pub publications: usize,
    pub story_publications: usize,
    pub villains: usize,
    pub story_villains: usize,
}

impl EntityGraph {
    pub fn new(hasher: ContentHasher) -> Self {
        Self {
            hasher,
            ids: IdAllocator::new(),
            authors: Registry::new(),
            stories: Registry::new(),
            publications: Registry::new(),
            story_publications: Registry::new(),
            villains: Registry::new(),
            story_villains: Registry::new(),
        }
    }

    /// Fold one data row into the graph
    ///
    /// Story first, then its authors, publications and villain. A row that
    /// fails to parse is rejected before any registry is touched.
    pub fn load_row(&mut self, row: &Row<'_>) -> ImportResult<()> {
        let plan = self.plan_publications(row)?;
        let story_key = self.story_key(row)?;

        let story = self.load_story(story_key);
        self.load_authors(story, row);
        self.load_publications(story, plan);
        self.load_villain(story, row);

        debug!(row = row.number(), story = %story, "Row loaded");
        Ok(())
    }

    pub fn summary(&self, rows: usize) -> LoadSummary {
        LoadSummary {
            rows,
            authors: self.authors.len(),
            stories: self.stories.len(),
            publications: self.publications.len(),
            story_publications: self.story_publications.len(),
            villains: self.villains.len(),
            story_villains: self.story_villains.len(),
        }
    }

    pub fn authors(&self) -> &Registry<String, NewAuthor> {
        &self.authors
    }

    pub fn stories(&self) -> &Registry<String, StoryDraft> {
        &self.stories
    }

    pub fn publications(&self) -> &Registry<String, NewPublication> {
        &self.publications
    }

    pub fn story_publications(&self) -> &Registry<(TempId, TempId), StoryPublicationLink> {
        &self.story_publications
    }

    pub fn villains(&self) -> &Registry<String, NewVillain> {
        &self.villains
    }

    pub fn story_villains(&self) -> &Registry<String, StoryVillainLink> {
        &self.story_villains
    }

    pub fn hasher(&self) -> &ContentHasher {
        &self.hasher
    }
}
