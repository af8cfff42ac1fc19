//! Storage layer - settings store implementations

pub mod file;
pub mod memory;

pub use file::{FileStoreProvider, JsonFileStore};
pub use memory::{MemoryBackend, MemoryStore, MemoryStoreProvider};
