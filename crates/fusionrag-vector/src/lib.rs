//! LanceDB-backed vector index for text chunks.
//!
//! [`LanceDbIndexer`] writes chunks with their embeddings into one table;
//! [`LanceSearchEngine`] embeds a query and returns the nearest chunks in
//! rank order.

pub mod schema;
pub mod search;
pub mod writer;

pub use schema::build_arrow_schema;
pub use search::LanceSearchEngine;
pub use writer::LanceDbIndexer;
