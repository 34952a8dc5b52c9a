mod disk;
mod fingerprint;
mod memory;

pub use disk::DiskStore;
pub use fingerprint::{fingerprint, fingerprint_with_dataset};
pub use memory::MemoryStore;

use crate::collab::GraphData;
use crate::error::Result;

pub trait GraphStore: Send + Sync {
    fn has(&self, key: &str) -> Result<bool>;
    fn read(&self, key: &str) -> Result<Option<GraphData>>;
    fn write(&self, key: &str, graph: &GraphData) -> Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Stored,
    NotPersisted,
    Uncached,
}

impl CacheOutcome {
    pub fn label(self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Stored => "stored",
            Self::NotPersisted => "not persisted",
            Self::Uncached => "uncached",
        }
    }
}
