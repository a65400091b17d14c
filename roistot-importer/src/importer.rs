//! Import run context
//!
//! One `Importer` per run: it maps the header once, folds every data row
//! into its entity graph, then persists the graph.

use crate::columns::{ColumnMap, Row};
use crate::error::ImportResult;
use crate::graph::{EntityGraph, LoadSummary};
use crate::services::{ImportStore, PersistSummary, PersistenceOrchestrator};
use roistot_common::ContentHasher;
use tracing::info;

pub struct Importer {
    columns: ColumnMap,
    graph: EntityGraph,
    rows: usize,
}

impl Importer {
    /// Importer for a table with the given header row
    pub fn new<S: AsRef<str>>(header: &[S], hasher: ContentHasher) -> Self {
        Self::with_columns(ColumnMap::new(header), hasher)
    }

    pub fn with_columns(columns: ColumnMap, hasher: ContentHasher) -> Self {
        Self {
            columns,
            graph: EntityGraph::new(hasher),
            rows: 0,
        }
    }

    /// Fold data rows into the graph, in order
    ///
    /// Stops at the first row that fails to parse; rows before it stay loaded.
    pub fn load_data(&mut self, rows: &[Vec<String>]) -> ImportResult<LoadSummary> {
        for cells in rows {
            let row = Row::new(&self.columns, cells, self.rows);
            self.graph.load_row(&row)?;
            self.rows += 1;
        }

        let summary = self.graph.summary(self.rows);
        info!(
            rows = summary.rows,
            stories = summary.stories,
            authors = summary.authors,
            publications = summary.publications,
            villains = summary.villains,
            "Table loaded"
        );
        Ok(summary)
    }

    /// Persist everything loaded so far under a new version
    pub async fn persist_data<S: ImportStore>(&mut self, store: &S, chunk_size: usize) -> ImportResult<PersistSummary> {
        PersistenceOrchestrator::new(store, chunk_size)
            .persist(&mut self.graph)
            .await
    }

    pub fn graph(&self) -> &EntityGraph {
        &self.graph
    }

    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }
}
