//! Storage capability consumed by the pipeline.
//!
//! The relational engine behind this interface is out of scope; the pipeline
//! only ever talks to the [`Storage`] trait. `InMemoryStorage` backs tests and
//! development.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryStorage;
pub use r#trait::{Storage, StorageError};
