use crate::error::StoreError;
use crate::store::EntityStore;
use crate::types::Keyed;
use std::collections::BTreeMap;

/// In-memory store; iteration order is id order
#[derive(Debug, Clone)]
pub struct MemoryStore<T> {
    entries: BTreeMap<String, T>,
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        MemoryStore {
            entries: BTreeMap::new(),
        }
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries.get(id)
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Keyed + Clone> EntityStore<T> for MemoryStore<T> {
    fn save(&mut self, entity: T) -> Result<(), StoreError> {
        self.entries.insert(entity.id().to_string(), entity);
        Ok(())
    }

    fn find_by_id(&self, id: &str) -> Result<Option<T>, StoreError> {
        Ok(self.entries.get(id).cloned())
    }

    fn ids(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<T: Keyed> FromIterator<T> for MemoryStore<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        MemoryStore {
            entries: iter
                .into_iter()
                .map(|entity| (entity.id().to_string(), entity))
                .collect(),
        }
    }
}
