//! Catalog seam: resolving shared tables by `(name, version)`.
//!
//! The reader binding consults a [`Catalog`] while resolving import
//! clauses. A catalog may return a different version than requested; the
//! parser handles the mismatch (an exact match is used directly, anything
//! else requires the import to declare its own `max_id`).

use std::collections::BTreeMap;
use std::sync::Arc;

use hashbrown::HashMap;

use crate::error::{Error, Result};
use crate::table::SymbolTable;

/// Resolver from `(name, version)` to a shared table.
pub trait Catalog {
    /// Best available table for `name`, preferring exactly `version`.
    /// Returns `None` when nothing under `name` is known.
    fn get_table(&self, name: &str, version: u32) -> Option<Arc<SymbolTable>>;
}

/// In-memory catalog.
///
/// Exact version hits are returned as-is; otherwise the highest version
/// registered under the name stands in, and the caller's mismatch rules
/// apply.
#[derive(Default, Debug)]
pub struct MemoryCatalog {
    tables: HashMap<String, BTreeMap<u32, Arc<SymbolTable>>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a shared table under its own `(name, version)`.
    ///
    /// Replaces any table previously registered at the same coordinates.
    pub fn put(&mut self, table: Arc<SymbolTable>) -> Result<()> {
        let Some(name) = table.name() else {
            return Err(Error::illegal_argument(
                "only named shared tables can be cataloged",
            ));
        };
        if table.is_local() || table.is_system() {
            return Err(Error::illegal_argument(
                "only non-system shared tables can be cataloged",
            ));
        }
        let name = name.to_string();
        let version = table.version();
        self.tables.entry(name).or_default().insert(version, table);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tables.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl Catalog for MemoryCatalog {
    fn get_table(&self, name: &str, version: u32) -> Option<Arc<SymbolTable>> {
        let versions = self.tables.get(name)?;
        if let Some(table) = versions.get(&version) {
            return Some(Arc::clone(table));
        }
        versions.values().next_back().cloned()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn shared(name: &str, version: u32, symbols: &[&str]) -> Arc<SymbolTable> {
        let mut t = SymbolTable::empty();
        for (i, s) in symbols.iter().enumerate() {
            t.define_symbol(s, i as u32 + 1).unwrap();
        }
        Arc::new(t.promote_to_shared(name, version).unwrap())
    }

    #[test]
    fn test_exact_version_preferred() {
        let mut cat = MemoryCatalog::new();
        cat.put(shared("greek", 1, &["alpha"])).unwrap();
        cat.put(shared("greek", 2, &["alpha", "beta"])).unwrap();

        let hit = cat.get_table("greek", 1).unwrap();
        assert_eq!(hit.version(), 1);
        let hit = cat.get_table("greek", 2).unwrap();
        assert_eq!(hit.version(), 2);
    }

    #[test]
    fn test_fallback_to_highest_version() {
        let mut cat = MemoryCatalog::new();
        cat.put(shared("greek", 1, &["alpha"])).unwrap();
        cat.put(shared("greek", 3, &["alpha", "beta", "gamma"])).unwrap();

        let hit = cat.get_table("greek", 2).unwrap();
        assert_eq!(hit.version(), 3);
    }

    #[test]
    fn test_miss_returns_none() {
        let cat = MemoryCatalog::new();
        assert!(cat.get_table("nothing", 1).is_none());
    }

    #[test]
    fn test_put_rejects_local_and_system() {
        let mut cat = MemoryCatalog::new();
        assert!(cat.put(Arc::new(SymbolTable::empty())).is_err());
        assert!(cat
            .put(Arc::clone(crate::system::system_table()))
            .is_err());
        assert!(cat.is_empty());
    }

    #[test]
    fn test_len_counts_versions() {
        let mut cat = MemoryCatalog::new();
        cat.put(shared("a", 1, &["x"])).unwrap();
        cat.put(shared("a", 2, &["x", "y"])).unwrap();
        cat.put(shared("b", 1, &["z"])).unwrap();
        assert_eq!(cat.len(), 3);
    }
}
