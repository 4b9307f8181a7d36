//! Relational half of the dual storage system: durable chunk metadata,
//! themes, relations, and embedding-version records keyed by the vector
//! index's `vector_id`.

pub mod db;
pub mod models;
pub mod schema;
pub mod store;

mod error;

pub use db::Db;
pub use error::Error;
pub use store::{KnowledgeStore, MetadataFilter, StoreStats};

pub type Result<T, E = Error> = std::result::Result<T, E>;
