//! roistot-importer library interface
//!
//! Turns a table of story records into a deduplicated entity graph and
//! persists it under a new version.

pub mod columns;
pub mod error;
pub mod graph;
pub mod importer;
pub mod issues;
pub mod registry;
pub mod services;
pub mod table;

pub use crate::columns::{ColumnMap, Field, Row};
pub use crate::error::{ImportError, ImportResult, Stage};
pub use crate::graph::{EntityGraph, LoadSummary};
pub use crate::importer::Importer;
pub use crate::services::{ImportStore, PersistSummary};
pub use crate::table::{read_table, read_table_file, Table};
