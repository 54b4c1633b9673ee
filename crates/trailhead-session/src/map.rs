//! The map collaborator, as far as the session is concerned.
//!
//! Map queries live elsewhere. The session only needs to tell the map
//! "the player moved, whatever you cached is stale".

use std::collections::HashMap;

/// Receives the cache invalidation signal on location change.
pub trait MapCache: Send + Sync + 'static {
    /// Drops everything cached for the previous location.
    fn invalidate_cache(&mut self);
}

/// One cached map cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedCell {
    /// When the cell was fetched, in milliseconds since the Unix epoch.
    pub fetched_at_ms: u64,
    /// The cell body as returned by the server.
    pub data: Vec<u8>,
}

/// Default map handle: a per-cell cache cleared on every move.
#[derive(Debug, Default)]
pub struct Map {
    cells: HashMap<u64, CachedCell>,
}

impl Map {
    /// Creates an empty map cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores (or replaces) a cell.
    pub fn cache_cell(&mut self, cell_id: u64, cell: CachedCell) {
        self.cells.insert(cell_id, cell);
    }

    /// Looks up a cached cell.
    pub fn cached_cell(&self, cell_id: u64) -> Option<&CachedCell> {
        self.cells.get(&cell_id)
    }

    /// Number of cached cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl MapCache for Map {
    fn invalidate_cache(&mut self) {
        tracing::debug!(cells = self.cells.len(), "map cache invalidated");
        self.cells.clear();
    }
}
