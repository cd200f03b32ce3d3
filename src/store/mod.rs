//! Keyed entity storage
//!
//! The import pipeline only needs two operations from a store: an upsert
//! keyed by entity id and a lookup by id. Two implementations ship with the
//! crate:
//!
//! - [`MemoryStore`]: an ordered in-memory map
//! - [`JsonlStore`]: the same map persisted as a JSON Lines file

pub mod jsonl;
pub mod memory;

pub use jsonl::JsonlStore;
pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::types::{Author, Keyed};

/// Upsert/lookup contract for entities keyed by id
pub trait EntityStore<T: Keyed> {
    /// Insert or overwrite the entity with the same id
    fn save(&mut self, entity: T) -> Result<(), StoreError>;

    fn find_by_id(&self, id: &str) -> Result<Option<T>, StoreError>;

    /// All stored ids, in ascending order
    fn ids(&self) -> Vec<String>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolves author ids while loading works
pub trait AuthorLookup {
    fn find_author(&self, id: &str) -> Option<Author>;
}

impl<S> AuthorLookup for S
where
    S: EntityStore<Author>,
{
    fn find_author(&self, id: &str) -> Option<Author> {
        match self.find_by_id(id) {
            Ok(found) => found,
            Err(error) => {
                tracing::debug!(author_id = id, %error, "author lookup failed");
                None
            }
        }
    }
}
