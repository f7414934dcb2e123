//! Store adapters for the repository traits.

pub mod memory;

pub use memory::{InMemoryEmployeeStore, InMemoryUserStore};
