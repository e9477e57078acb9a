//! Named input history pools.
//!
//! Each pool is an independent, chronologically ordered list of entered lines.
//! One pool is active at a time; switching never discards the others.

use std::collections::HashMap;

/// Name of the pool that is active until another one is selected.
pub const DEFAULT_POOL: &str = "default";

/// Default cap on entries per pool.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Named history pools with one active pool.
#[derive(Debug)]
pub struct HistoryPool {
    /// Stored entries per pool (oldest first).
    pools: HashMap<String, Vec<String>>,
    /// Name of the active pool.
    active: String,
    /// Whether completed reads are recorded.
    enabled: bool,
    /// Maximum entries kept per pool (0 = unbounded).
    limit: usize,
}

impl Default for HistoryPool {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryPool {
    /// Creates a history with an empty default pool.
    pub fn new() -> Self {
        let mut pools = HashMap::new();
        pools.insert(DEFAULT_POOL.to_string(), Vec::new());
        Self {
            pools,
            active: DEFAULT_POOL.to_string(),
            enabled: true,
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Switches the active pool, creating it empty if unseen.
    pub fn set_pool(&mut self, name: &str) {
        self.pools.entry(name.to_string()).or_default();
        self.active = name.to_string();
    }

    /// Returns the active pool name.
    pub fn active_name(&self) -> &str {
        &self.active
    }

    /// Returns the names of all pools, sorted.
    pub fn pool_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.pools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Enables or disables recording.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Returns true if completed reads are recorded.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Sets the per-pool cap (0 = unbounded).
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
    }

    /// Adds an entry to the active pool.
    /// Skips blank entries, consecutive duplicates, and everything while disabled.
    /// Returns true if the entry was stored.
    pub fn push(&mut self, entry: &str) -> bool {
        if !self.enabled || entry.trim().is_empty() {
            return false;
        }

        let limit = self.limit;
        let pool = self.pools.entry(self.active.clone()).or_default();

        // Skip consecutive duplicates
        if pool.last().map(String::as_str) == Some(entry) {
            return false;
        }

        pool.push(entry.to_string());

        // Trim to max size (remove oldest)
        if limit > 0 && pool.len() > limit {
            let excess = pool.len() - limit;
            pool.drain(..excess);
        }

        true
    }

    /// Returns the entries of the active pool (oldest first).
    pub fn entries(&self) -> &[String] {
        self.pools
            .get(&self.active)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Removes the newest entry of the active pool, if any.
    pub fn remove_last(&mut self) -> Option<String> {
        self.pools.get_mut(&self.active).and_then(Vec::pop)
    }

    /// Clears the active pool.
    pub fn clear(&mut self) {
        if let Some(pool) = self.pools.get_mut(&self.active) {
            pool.clear();
        }
    }

    /// Returns the number of entries in the active pool.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Returns true if the active pool is empty.
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}
