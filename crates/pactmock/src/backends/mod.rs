//! In-memory implementations of the control-plane capabilities.

mod memory_server;
mod memory_store;

pub use memory_server::{InMemoryServer, ServerError};
pub use memory_store::{MemoryStore, PactKey, StoreError};
