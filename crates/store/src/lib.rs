//! `orderflow-store` — in-memory implementation of the persistence
//! contracts.
//!
//! Intended for tests/dev. Not optimized for performance.

pub mod in_memory;

pub use in_memory::InMemoryStore;
