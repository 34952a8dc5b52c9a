use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::GraphStore;
use crate::collab::GraphData;
use crate::error::Result;

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Arc<GraphData>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl GraphStore for MemoryStore {
    fn has(&self, key: &str) -> Result<bool> {
        Ok(self
            .entries
            .read()
            .map(|entries| entries.contains_key(key))
            .unwrap_or(false))
    }

    fn read(&self, key: &str) -> Result<Option<GraphData>> {
        let entry = self
            .entries
            .read()
            .ok()
            .and_then(|entries| entries.get(key).cloned());
        Ok(entry.map(|graph| graph.as_ref().clone()))
    }

    fn write(&self, key: &str, graph: &GraphData) -> Result<()> {
        let snapshot = Arc::new(graph.clone());
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(key.to_owned(), snapshot);
        Ok(())
    }
}
