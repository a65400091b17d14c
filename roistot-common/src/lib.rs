//! # Roistot Common Library
//!
//! Shared code for the roistot import tooling including:
//! - Database schema, records and the SQLite storage backend
//! - Version records grouping everything written by one import run
//! - Configuration loading
//! - Content hashing used as entity identity

pub mod config;
pub mod db;
pub mod error;
pub mod hash;

pub use error::{Error, Result};
pub use hash::ContentHasher;
