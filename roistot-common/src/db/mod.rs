//! Database schema, records and storage backend

pub mod bulk;
pub mod init;
pub mod models;
pub mod repository;
pub mod store;
pub mod versions;

pub use bulk::*;
pub use init::*;
pub use models::*;
pub use repository::*;
pub use store::*;
pub use versions::*;
