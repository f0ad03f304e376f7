pub mod registry;

pub use registry::{for_statement, list_all, lookup, ranking_keys, CatalogEntry};
