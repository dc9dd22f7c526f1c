//! Persistence layer — the backend query/upsert service behind traits.

pub mod catalog;
pub mod libsql_backend;
pub mod memory;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use memory::MemoryBackend;
pub use traits::ProfileStore;
