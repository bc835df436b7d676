//! In-memory store for the ride matching core.
//!
//! Provides the same interface a transactional backend would; the single
//! write lock is what makes the conditional ride update a true
//! compare-and-set.

mod memory;

pub use memory::InMemoryStore;
