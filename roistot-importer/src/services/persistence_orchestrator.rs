//! Persistence of an entity graph
//!
//! Drains the registries into the store under a fresh version, in
//! dependency order:
//!
//! 1. Authors
//! 2. Publications
//! 3. Stories, then their author and publication links
//! 4. Villains, then their story appearances
//!
//! Each registry goes out in chunks of at most `chunk_size` rows. After every
//! chunk the store must report exactly that many inserted rows; the chunk is
//! then read back (newest rows of the run) and each entry picks up its
//! durable id by content hash. Any mismatch aborts the run. Chunks committed
//! before the failure stay in the store under the unactivated version.

use crate::error::{ImportError, ImportResult, Stage};
use crate::graph::EntityGraph;
use crate::registry::Entry;
use roistot_common::config::MAX_BULK_CREATE_SIZE;
use roistot_common::db::{
    Author, AuthorRole, BulkCreate, CreateVersion, Hashed, List, NewAuthor, NewPublication,
    NewStory, NewStoryAuthor, NewStoryPublication, NewStoryVillain, NewVillain, Publication,
    Story, StoryVillain, Version, Villain,
};
use std::collections::HashMap;
use tracing::{debug, info};

/// Every storage capability an import run needs
pub trait ImportStore:
    CreateVersion
    + BulkCreate<NewAuthor>
    + List<Author>
    + BulkCreate<NewPublication>
    + List<Publication>
    + BulkCreate<NewStory>
    + List<Story>
    + BulkCreate<NewStoryAuthor>
    + BulkCreate<NewStoryPublication>
    + BulkCreate<NewVillain>
    + List<Villain>
    + BulkCreate<NewStoryVillain>
    + List<StoryVillain>
{
}

impl<S> ImportStore for S where
    S: CreateVersion
        + BulkCreate<NewAuthor>
        + List<Author>
        + BulkCreate<NewPublication>
        + List<Publication>
        + BulkCreate<NewStory>
        + List<Story>
        + BulkCreate<NewStoryAuthor>
        + BulkCreate<NewStoryPublication>
        + BulkCreate<NewVillain>
        + List<Villain>
        + BulkCreate<NewStoryVillain>
        + List<StoryVillain>
{
}

/// Row identified by a content hash
pub trait ContentHashed {
    fn content_hash(&self) -> &str;
}

macro_rules! impl_content_hashed {
    ($($ty:ty),*) => {
        $(impl ContentHashed for $ty {
            fn content_hash(&self) -> &str {
                &self.hash
            }
        })*
    };
}

impl_content_hashed!(NewAuthor, NewPublication, NewStory, NewVillain, NewStoryVillain);

/// Rows written per table by one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistSummary {
    pub version: Version,
    pub authors: u64,
    pub publications: u64,
    pub stories: u64,
    pub story_authors: u64,
    pub story_publications: u64,
    pub villains: u64,
    pub story_villains: u64,
}

pub struct PersistenceOrchestrator<'a, S> {
    store: &'a S,
    chunk_size: usize,
}

impl<'a, S: ImportStore> PersistenceOrchestrator<'a, S> {
    /// `chunk_size` is clamped to `1..=MAX_BULK_CREATE_SIZE`
    pub fn new(store: &'a S, chunk_size: usize) -> Self {
        Self {
            store,
            chunk_size: chunk_size.clamp(1, MAX_BULK_CREATE_SIZE),
        }
    }

    /// Write the whole graph under a new inactive version
    pub async fn persist(&self, graph: &mut EntityGraph) -> ImportResult<PersistSummary> {
        let version = self
            .store
            .create_version()
            .await
            .map_err(ImportError::store(Stage::Version))?;
        info!(version_id = version.id, chunk_size = self.chunk_size, "Persisting import");

        let rows: Vec<NewAuthor> = graph.authors.entries().iter().map(|e| e.item.clone()).collect();
        let authors = self
            .insert_and_reconcile::<_, _, Author>(Stage::Author, &version, graph.authors.entries_mut(), rows)
            .await?;

        let rows: Vec<NewPublication> = graph.publications.entries().iter().map(|e| e.item.clone()).collect();
        let publications = self
            .insert_and_reconcile::<_, _, Publication>(
                Stage::Publication,
                &version,
                graph.publications.entries_mut(),
                rows,
            )
            .await?;

        let rows: Vec<NewStory> = graph.stories.entries().iter().map(|e| e.item.story.clone()).collect();
        let stories = self
            .insert_and_reconcile::<_, _, Story>(Stage::Story, &version, graph.stories.entries_mut(), rows)
            .await?;

        let story_authors = self
            .insert_links(Stage::StoryAuthor, &version, story_author_rows(graph)?)
            .await?;
        let story_publications = self
            .insert_links(Stage::StoryPublication, &version, story_publication_rows(graph)?)
            .await?;

        let rows: Vec<NewVillain> = graph.villains.entries().iter().map(|e| e.item.clone()).collect();
        let villains = self
            .insert_and_reconcile::<_, _, Villain>(Stage::Villain, &version, graph.villains.entries_mut(), rows)
            .await?;

        let rows = story_villain_rows(graph)?;
        let story_villains = self
            .insert_and_reconcile::<_, _, StoryVillain>(
                Stage::StoryVillain,
                &version,
                graph.story_villains.entries_mut(),
                rows,
            )
            .await?;

        let summary = PersistSummary {
            version,
            authors,
            publications,
            stories,
            story_authors,
            story_publications,
            villains,
            story_villains,
        };
        info!(
            version_id = summary.version.id,
            authors = summary.authors,
            publications = summary.publications,
            stories = summary.stories,
            villains = summary.villains,
            "Import persisted"
        );
        Ok(summary)
    }

    /// Insert `rows` chunk by chunk and give each entry its durable id
    ///
    /// `rows[i]` is the stored shape of `entries[i]`.
    async fn insert_and_reconcile<T, N, R>(
        &self,
        stage: Stage,
        version: &Version,
        entries: &mut [Entry<T>],
        rows: Vec<N>,
    ) -> ImportResult<u64>
    where
        N: ContentHashed + Send + Sync,
        R: Hashed + Send,
        S: BulkCreate<N> + List<R>,
    {
        let mut inserted = 0;

        for (chunk, (entries, rows)) in entries
            .chunks_mut(self.chunk_size)
            .zip(rows.chunks(self.chunk_size))
            .enumerate()
        {
            inserted += self.insert_chunk(stage, version, rows, chunk).await?;

            let stored = List::<R>::list_latest(self.store, version, rows.len())
                .await
                .map_err(ImportError::store(stage))?;
            let durable: HashMap<&str, i64> = stored.iter().map(|r| (r.hash(), r.id())).collect();

            for (entry, row) in entries.iter_mut().zip(rows) {
                let id = durable.get(row.content_hash()).copied().ok_or_else(|| {
                    ImportError::EntityNotFound {
                        stage,
                        hash: row.content_hash().to_string(),
                    }
                })?;
                entry.durable_id = Some(id);
            }
        }

        info!(stage = %stage, items = inserted, "Stage persisted");
        Ok(inserted)
    }

    /// Insert join rows that need no read-back
    async fn insert_links<N>(&self, stage: Stage, version: &Version, rows: Vec<N>) -> ImportResult<u64>
    where
        N: Send + Sync,
        S: BulkCreate<N>,
    {
        let mut inserted = 0;
        for (chunk, rows) in rows.chunks(self.chunk_size).enumerate() {
            inserted += self.insert_chunk(stage, version, rows, chunk).await?;
        }

        info!(stage = %stage, items = inserted, "Stage persisted");
        Ok(inserted)
    }

    async fn insert_chunk<N>(&self, stage: Stage, version: &Version, rows: &[N], chunk: usize) -> ImportResult<u64>
    where
        N: Send + Sync,
        S: BulkCreate<N>,
    {
        let affected = BulkCreate::<N>::bulk_create(self.store, rows, version)
            .await
            .map_err(ImportError::store(stage))?;
        if affected != rows.len() as u64 {
            return Err(ImportError::CountMismatch {
                stage,
                expected: rows.len(),
                actual: affected,
            });
        }

        debug!(stage = %stage, chunk, items = rows.len(), "Chunk inserted");
        Ok(affected)
    }
}

fn story_author_rows(graph: &EntityGraph) -> ImportResult<Vec<NewStoryAuthor>> {
    let mut rows = Vec::new();
    for entry in graph.stories.entries() {
        let story = entry.durable_id.ok_or(ImportError::UnresolvedReference {
            stage: Stage::StoryAuthor,
            temp_id: entry.id.0,
        })?;
        for role in AuthorRole::ALL {
            for &author in entry.item.authors(role) {
                let author = graph.authors.durable_id(author).ok_or(ImportError::UnresolvedReference {
                    stage: Stage::StoryAuthor,
                    temp_id: author.0,
                })?;
                rows.push(NewStoryAuthor { story, author, role });
            }
        }
    }
    Ok(rows)
}

fn story_publication_rows(graph: &EntityGraph) -> ImportResult<Vec<NewStoryPublication>> {
    graph
        .story_publications
        .entries()
        .iter()
        .map(|entry| {
            let link = &entry.item;
            let unresolved = |temp_id: u64| ImportError::UnresolvedReference {
                stage: Stage::StoryPublication,
                temp_id,
            };
            Ok(NewStoryPublication {
                story: graph.stories.durable_id(link.story).ok_or_else(|| unresolved(link.story.0))?,
                publication: graph
                    .publications
                    .durable_id(link.publication)
                    .ok_or_else(|| unresolved(link.publication.0))?,
                title: link.title.clone(),
            })
        })
        .collect()
}

fn story_villain_rows(graph: &EntityGraph) -> ImportResult<Vec<NewStoryVillain>> {
    graph
        .story_villains
        .entries()
        .iter()
        .map(|entry| {
            let link = &entry.item;
            let unresolved = |temp_id: u64| ImportError::UnresolvedReference {
                stage: Stage::StoryVillain,
                temp_id,
            };
            Ok(NewStoryVillain {
                villain: graph.villains.durable_id(link.villain).ok_or_else(|| unresolved(link.villain.0))?,
                story: graph.stories.durable_id(link.story).ok_or_else(|| unresolved(link.story.0))?,
                hash: link.hash.clone(),
                nicknames: link.nicknames.clone(),
                aliases: link.aliases.clone(),
                roles: link.roles.clone(),
                destinies: link.destinies.clone(),
            })
        })
        .collect()
}
