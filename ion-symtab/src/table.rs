//! The unified symbol table.
//!
//! [`SymbolTable`] is the one concrete table type; system, shared, and
//! local tables are lifecycle states of it, distinguished by
//! `(locked, name, system)`:
//!
//! - **system**: locked, named `$ion`, no system reference of its own
//! - **shared**: locked, named, versioned, flat sid space
//! - **local**: unlocked, unnamed, chains a system table, zero or more
//!   imported shared tables, and a tail of locally defined symbols
//!
//! Symbol inheritance is: system symbols first, then each import in order
//! offset by the prior `max_id` (reserving the import's declared range even
//! when its symbols cannot be resolved), then local symbols from the next
//! free sid.
//!
//! Storage follows the dense-forward / hashed-reverse discipline: a
//! `Vec<Option<SymbolEntry>>` indexed by sid (slot 0 unused) and a
//! `HashMap<Arc<str>, Sid>` reverse index sharing the interned text with
//! the entries. Holes are legal inside import-reserved ranges and where a
//! local symbol was removed.

use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;

use crate::error::{Error, Result};
use crate::symbol::{Sid, SymbolEntry, TableId};
use crate::value::Element;
use ion_vocab::system::ION;

// ---------------------------------------------------------------------------
// TableImport
// ---------------------------------------------------------------------------

/// One imported shared table and the sid range it reserves.
#[derive(Clone, Debug)]
pub struct TableImport {
    /// The imported table (possibly a placeholder with unresolved symbols).
    pub(crate) table: Arc<SymbolTable>,
    /// The declared range width; `max_id` advanced by this much even when
    /// the table resolved with fewer symbols.
    pub(crate) declared_max_id: Sid,
    /// `max_id` of the importing table just before this import.
    pub(crate) base_sid: Sid,
}

impl TableImport {
    #[inline]
    pub fn table(&self) -> &Arc<SymbolTable> {
        &self.table
    }

    #[inline]
    pub fn declared_max_id(&self) -> Sid {
        self.declared_max_id
    }

    /// First sid of the reserved range in the importing table.
    #[inline]
    pub fn first_sid(&self) -> Sid {
        self.base_sid + 1
    }

    /// Last sid of the reserved range in the importing table.
    #[inline]
    pub fn last_sid(&self) -> Sid {
        self.base_sid + self.declared_max_id
    }
}

// ---------------------------------------------------------------------------
// SymbolTable
// ---------------------------------------------------------------------------

/// Unified symbol table: system, shared, or local by lifecycle state.
#[derive(Debug)]
pub struct SymbolTable {
    pub(crate) id: TableId,
    /// Present iff the table is shared (the system table counts as shared).
    pub(crate) name: Option<String>,
    /// `>= 1` for shared tables, 0 for locals.
    pub(crate) version: u32,
    /// The system table whose symbols occupy the low sid range. Absent for
    /// the system table itself and for shared tables.
    pub(crate) system: Option<Arc<SymbolTable>>,
    pub(crate) imports: Vec<TableImport>,
    /// Dense sid-indexed entries; slot 0 unused. `None` slots are holes.
    pub(crate) entries: Vec<Option<SymbolEntry>>,
    /// text -> sid over every reachable symbol. Never maps to a hole.
    pub(crate) text_index: HashMap<Arc<str>, Sid>,
    pub(crate) max_id: Sid,
    pub(crate) has_local_symbols: bool,
    pub(crate) locked: bool,
    /// Cached structural mirror; maintained for unlocked tables only.
    pub(crate) view: Option<Element>,
}

impl SymbolTable {
    pub(crate) fn new_bare() -> Self {
        Self {
            id: TableId::next(),
            name: None,
            version: 0,
            system: None,
            imports: Vec::new(),
            entries: vec![None],
            text_index: HashMap::new(),
            max_id: 0,
            has_local_symbols: false,
            locked: false,
            view: None,
        }
    }

    /// An empty mutable table with no system reference.
    ///
    /// This is the authoring starting point for shared tables: define
    /// symbols from sid 1, then [`promote_to_shared`](Self::promote_to_shared).
    pub fn empty() -> Self {
        Self::new_bare()
    }

    /// An empty local table chaining `system`.
    ///
    /// The system table's symbols are in effect immediately: they occupy
    /// sids `1..=system.max_id()` and are never shadowed locally.
    pub fn local(system: Arc<SymbolTable>) -> Result<Self> {
        if !system.is_system() {
            return Err(Error::illegal_argument(
                "a local table requires a system symbol table",
            ));
        }
        let mut table = Self::new_bare();
        table.ingest(&system, 0, None)?;
        debug_assert_eq!(table.max_id, system.max_id);
        table.system = Some(system);
        Ok(table)
    }

    // -- state ---------------------------------------------------------------

    #[inline]
    pub fn id(&self) -> TableId {
        self.id
    }

    /// Table name; present iff shared.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Table version; `>= 1` for shared tables, 0 for locals.
    #[inline]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Highest sid known to this table, including import-reserved ranges.
    #[inline]
    pub fn max_id(&self) -> Sid {
        self.max_id
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    #[inline]
    pub fn is_local(&self) -> bool {
        !self.locked
    }

    #[inline]
    pub fn is_shared(&self) -> bool {
        self.locked
    }

    /// True for the system table (locked and carrying the system name).
    pub fn is_system(&self) -> bool {
        self.locked && self.name.as_deref() == Some(ION)
    }

    /// True when the table adds nothing over its system table.
    pub fn is_trivial(&self) -> bool {
        if self.locked {
            self.max_id == 0
        } else {
            !self.has_local_symbols && self.imports.is_empty()
        }
    }

    /// The system table whose symbols are in effect. The system table
    /// reports itself; shared tables report none.
    pub fn system(&self) -> Option<&SymbolTable> {
        if self.is_system() {
            Some(self)
        } else {
            self.system.as_deref()
        }
    }

    pub fn has_imports(&self) -> bool {
        !self.imports.is_empty()
    }

    /// Imported shared tables in import order. Empty for shared and system
    /// tables.
    pub fn imports(&self) -> &[TableImport] {
        &self.imports
    }

    /// Find an import by table name.
    pub fn imported_table(&self, name: &str) -> Option<&Arc<SymbolTable>> {
        self.imports
            .iter()
            .find(|imp| imp.table.name() == Some(name))
            .map(|imp| &imp.table)
    }

    /// True once a symbol with `source == self` exists.
    #[inline]
    pub fn has_local_symbols(&self) -> bool {
        self.has_local_symbols
    }

    /// The entry occupying `sid`, if the slot is not a hole.
    pub fn entry(&self, sid: Sid) -> Option<&SymbolEntry> {
        self.entries.get(sid as usize).and_then(|slot| slot.as_ref())
    }

    // -- lookups -------------------------------------------------------------

    /// Resolve `text` to a sid.
    ///
    /// Probes the system table first, then the local index. Unmatched text
    /// of the form `$NNN` resolves to `NNN` directly; text carrying the
    /// reserved prefix that is not a well-formed sid literal fails with
    /// [`Error::InvalidSystemSymbol`].
    pub fn find_sid_by_text(&self, text: &str) -> Result<Option<Sid>> {
        if text.is_empty() {
            return Err(Error::illegal_argument("symbol text must be non-empty"));
        }
        if let Some(system) = &self.system {
            if let Some(&sid) = system.text_index.get(text) {
                return Ok(Some(sid));
            }
        }
        if let Some(&sid) = self.text_index.get(text) {
            return Ok(Some(sid));
        }
        if text.starts_with(ion_vocab::SID_SIGIL) {
            if let Some(sid) = ion_vocab::parse_sid_literal(text) {
                return Ok(Some(sid));
            }
            if ion_vocab::is_reserved(text) {
                return Err(Error::InvalidSystemSymbol(text.to_string()));
            }
        }
        Ok(None)
    }

    /// Text for `sid`, when known. Never synthesizes a sid literal.
    pub fn find_known_text(&self, sid: Sid) -> Result<Option<&str>> {
        if sid < 1 {
            return Err(Error::illegal_argument("symbol ids are greater than 0"));
        }
        if sid > self.max_id {
            return Ok(None);
        }
        if let Some(system) = &self.system {
            if sid <= system.max_id {
                if let Some(text) = system.find_known_text(sid)? {
                    return Ok(Some(text));
                }
            }
        }
        Ok(self.entry(sid).and_then(|e| e.text()))
    }

    /// Text for `sid`, synthesizing the `$NNN` literal when unknown.
    pub fn find_text(&self, sid: Sid) -> Result<String> {
        Ok(match self.find_known_text(sid)? {
            Some(text) => text.to_string(),
            None => ion_vocab::sid_literal(sid),
        })
    }

    /// Text for `sid`, failing with [`Error::UnknownSymbol`] when absent.
    ///
    /// Deep copies across catalogs re-resolve through this and surface the
    /// error when the originating shared table was never found.
    pub fn known_text(&self, sid: Sid) -> Result<&str> {
        self.find_known_text(sid)?
            .ok_or(Error::UnknownSymbol(sid))
    }

    // -- mutation ------------------------------------------------------------

    /// Look up `text`, allocating the next sid when unknown.
    pub fn add_symbol(&mut self, text: &str) -> Result<Sid> {
        if let Some(sid) = self.find_sid_by_text(text)? {
            return Ok(sid);
        }
        if self.locked {
            return Err(Error::illegal_state("can't change shared symbol table"));
        }
        let sid = self.max_id + 1;
        self.install_entry(SymbolEntry::new(Some(Arc::from(text)), sid, self.id))?;
        Ok(sid)
    }

    /// Bind `text` to `sid`.
    ///
    /// A no-op when the binding already exists; rebinding to a different
    /// sid is an error. Binding into an unoccupied import-reserved slot is
    /// permitted.
    pub fn define_symbol(&mut self, text: &str, sid: Sid) -> Result<()> {
        if self.locked {
            return Err(Error::illegal_state("can't change shared symbol table"));
        }
        if text.is_empty() || sid < 1 {
            return Err(Error::illegal_argument("invalid symbol definition"));
        }
        match self.find_sid_by_text(text)? {
            Some(existing) if existing != sid => Err(Error::illegal_argument(format!(
                "'{}' is already bound to ${}; symbol ids cannot change",
                text, existing
            ))),
            Some(_) => Ok(()),
            None => self.install_entry(SymbolEntry::new(Some(Arc::from(text)), sid, self.id)),
        }
    }

    /// Remove the binding for `text`. A no-op when `text` is unknown.
    ///
    /// System-range sids cannot be removed. The slot becomes a hole;
    /// `max_id` does not decrease.
    pub fn remove_symbol(&mut self, text: &str) -> Result<()> {
        if self.locked {
            return Err(Error::illegal_state("can't change shared symbol table"));
        }
        match self.find_sid_by_text(text)? {
            None => Ok(()),
            Some(sid) => self.remove_binding(text, sid),
        }
    }

    /// Remove the binding for `text`, checking it currently maps to `sid`.
    pub fn remove_symbol_at(&mut self, text: &str, sid: Sid) -> Result<()> {
        if self.locked {
            return Err(Error::illegal_state("can't change shared symbol table"));
        }
        if self.find_sid_by_text(text)? != Some(sid) {
            return Err(Error::illegal_argument(
                "sid doesn't match the existing binding",
            ));
        }
        self.remove_binding(text, sid)
    }

    fn remove_binding(&mut self, text: &str, sid: Sid) -> Result<()> {
        if let Some(system) = &self.system {
            if sid <= system.max_id {
                return Err(Error::illegal_argument("can't remove system symbols"));
            }
        }
        if let Some(slot) = self.entries.get_mut(sid as usize) {
            *slot = None;
        }
        if self.text_index.get(text).copied() == Some(sid) {
            self.text_index.remove(text);
        }
        self.mirror_remove(sid);
        Ok(())
    }

    /// Append a shared table to the import chain.
    ///
    /// Symbols `1..=min(table.max_id, declared_max_id)` are ingested at the
    /// current `max_id` offset; `max_id` then advances by the full declared
    /// width (defaulting to `table.max_id()` when `declared_max_id` is
    /// absent), reserving id space the resolved table may not fill.
    pub fn import(
        &mut self,
        table: Arc<SymbolTable>,
        declared_max_id: Option<Sid>,
    ) -> Result<()> {
        if self.has_local_symbols {
            return Err(Error::illegal_state(
                "importing tables is not valid once local symbols have been added",
            ));
        }
        if self.locked {
            return Err(Error::illegal_state(
                "importing tables is not valid on a locked table",
            ));
        }
        if self.system.is_none() {
            return Err(Error::illegal_state(
                "a system table must be set before importing other tables",
            ));
        }
        match table.name() {
            None | Some("") => {
                return Err(Error::illegal_argument(
                    "imported symbol tables must be named",
                ))
            }
            _ => {}
        }
        if table.is_local() || table.is_system() {
            return Err(Error::illegal_argument(
                "only non-system shared tables can be imported",
            ));
        }

        let base_sid = self.max_id;
        let declared = declared_max_id.unwrap_or(table.max_id);
        self.imports.push(TableImport {
            table: Arc::clone(&table),
            declared_max_id: declared,
            base_sid,
        });
        self.ingest(&table, base_sid, Some(declared))
    }

    /// Copy `table`'s symbols in at `offset`, then advance `max_id` by the
    /// declared width. Skips holes; unresolved entries keep absent text.
    fn ingest(
        &mut self,
        table: &SymbolTable,
        offset: Sid,
        declared_max_id: Option<Sid>,
    ) -> Result<()> {
        let declared = declared_max_id.unwrap_or(table.max_id);
        let limit = table.max_id.min(declared);
        for sid in 1..=limit {
            let Some(entry) = table.entry(sid) else {
                continue;
            };
            debug_assert_eq!(entry.sid(), sid);
            self.install_entry(SymbolEntry::new(
                entry.text_arc().cloned(),
                sid + offset,
                table.id,
            ))?;
        }
        let new_max = offset + declared;
        debug_assert!(self.max_id <= new_max);
        self.max_id = new_max;
        self.grow_to(new_max);
        Ok(())
    }

    /// Place an entry at its sid, enforcing the redefinition and
    /// first-writer-wins rules.
    ///
    /// An occupied slot rejects a different text outright. When the same
    /// text is already bound elsewhere, the lower sid keeps the binding and
    /// the higher slot becomes a hole.
    pub(crate) fn install_entry(&mut self, entry: SymbolEntry) -> Result<()> {
        debug_assert!(!self.locked);
        debug_assert!(entry.sid() >= 1);

        let sid = entry.sid();
        let idx = sid as usize;
        if let Some(Some(existing)) = self.entries.get(idx) {
            return Err(Error::SymbolRedefinition {
                sid,
                existing: existing.text().map(str::to_string),
                attempted: entry.text().map(str::to_string),
            });
        }
        self.grow_to(sid);

        let text = entry.text_arc().cloned();
        let source = entry.source();
        self.entries[idx] = Some(entry);

        let mut survived = true;
        if let Some(text) = text {
            match self.text_index.get(&text).copied() {
                Some(prior) if prior < sid => {
                    // Lower sid wins; this slot becomes a hole.
                    self.entries[idx] = None;
                    survived = false;
                }
                Some(prior) => {
                    // This sid is lower; the prior slot becomes a hole.
                    let displaced_local =
                        self.entry(prior).is_some_and(|e| e.source() == self.id);
                    self.entries[prior as usize] = None;
                    if displaced_local {
                        self.mirror_remove(prior);
                    }
                    self.text_index.insert(text, sid);
                }
                None => {
                    self.text_index.insert(text, sid);
                }
            }
        }

        if sid > self.max_id {
            self.max_id = sid;
        }
        if source == self.id {
            self.has_local_symbols = true;
            if survived {
                self.mirror_record(sid);
            }
        }
        Ok(())
    }

    /// Install a parsed local-symbol candidate, dropping attempted
    /// overrides of the import range.
    pub(crate) fn install_local_candidate(
        &mut self,
        entry: SymbolEntry,
        first_local_sid: Sid,
    ) -> Result<()> {
        if entry.sid() < first_local_sid {
            return Ok(());
        }
        self.install_entry(entry)
    }

    /// Lock as a shared table, forgetting the system reference and import
    /// metadata.
    pub(crate) fn share(&mut self, name: &str, version: u32) -> Result<()> {
        if name.is_empty() {
            return Err(Error::illegal_argument("name must be non-empty"));
        }
        if version < 1 {
            return Err(Error::illegal_argument("version must be at least 1"));
        }
        if self.locked {
            return Err(Error::illegal_state("already shared"));
        }
        self.name = Some(name.to_string());
        self.version = version;
        self.system = None;
        self.imports.clear();
        self.view = None;
        self.locked = true;
        Ok(())
    }

    /// Consume this local table into a shared table.
    ///
    /// Every symbol declared here (source == self, known text) is kept, in
    /// ascending sid order, renumbered contiguously from 1. System symbols
    /// and imports are left behind.
    pub fn promote_to_shared(self, name: &str, version: u32) -> Result<SymbolTable> {
        if self.locked {
            return Err(Error::illegal_state("already shared"));
        }
        if name.is_empty() {
            return Err(Error::illegal_argument("name must be non-empty"));
        }
        if version < 1 {
            return Err(Error::illegal_argument("version must be at least 1"));
        }

        let mut shared = SymbolTable::new_bare();
        let mut next_sid: Sid = 1;
        for entry in self.entries.iter().flatten() {
            if entry.source() != self.id || entry.text().is_none() {
                continue;
            }
            shared.install_entry(SymbolEntry::new(
                entry.text_arc().cloned(),
                next_sid,
                shared.id,
            ))?;
            next_sid += 1;
        }
        shared.share(name, version)?;
        Ok(shared)
    }

    // -- compatibility -------------------------------------------------------

    /// Can this table fully stand in for `other`?
    ///
    /// True iff every known-text entry of `other` resolves to the same sid
    /// here. Asymmetric by design.
    pub fn is_compatible(&self, other: &SymbolTable) -> bool {
        for entry in other.entries.iter().flatten() {
            let Some(text) = entry.text() else {
                continue;
            };
            match self.find_sid_by_text(text) {
                Ok(Some(sid)) if sid == entry.sid() => {}
                _ => return false,
            }
        }
        true
    }

    // -- internals -----------------------------------------------------------

    /// Grow the entries vector to cover `sid` (keeping `len > max_id`).
    pub(crate) fn grow_to(&mut self, sid: Sid) {
        let needed = sid as usize + 1;
        if self.entries.len() < needed {
            let mut capacity = self.entries.len().max(8);
            while capacity < needed {
                capacity *= 2;
            }
            self.entries.reserve(capacity - self.entries.len());
            self.entries.resize_with(needed, || None);
        }
    }
}

impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "[SymbolTable {} {}]", name, self.version),
            None => write!(f, "[SymbolTable local]"),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::system_table;

    fn shared_greek() -> Arc<SymbolTable> {
        let mut t = SymbolTable::empty();
        t.define_symbol("alpha", 1).unwrap();
        t.define_symbol("beta", 2).unwrap();
        Arc::new(t.promote_to_shared("greek", 1).unwrap())
    }

    #[test]
    fn test_empty_table_is_trivial() {
        let t = SymbolTable::empty();
        assert!(t.is_local());
        assert!(t.is_trivial());
        assert_eq!(t.max_id(), 0);
        assert_eq!(t.name(), None);
    }

    #[test]
    fn test_local_starts_with_system_range() {
        let t = SymbolTable::local(Arc::clone(system_table())).unwrap();
        assert_eq!(t.max_id(), 9);
        assert!(!t.has_local_symbols());
        assert!(t.is_trivial());
        assert_eq!(t.find_sid_by_text("name").unwrap(), Some(4));
        assert_eq!(t.find_known_text(3).unwrap(), Some("$ion_symbol_table"));
    }

    #[test]
    fn test_local_requires_system_table() {
        let shared = shared_greek();
        assert!(SymbolTable::local(shared).is_err());
    }

    #[test]
    fn test_add_symbol_allocates_and_dedups() {
        let mut t = SymbolTable::local(Arc::clone(system_table())).unwrap();
        let sid = t.add_symbol("city").unwrap();
        assert_eq!(sid, 10);
        assert_eq!(t.add_symbol("city").unwrap(), 10);
        assert_eq!(t.add_symbol("state").unwrap(), 11);
        assert_eq!(t.max_id(), 11);
        assert!(t.has_local_symbols());
    }

    #[test]
    fn test_add_symbol_empty_text() {
        let mut t = SymbolTable::local(Arc::clone(system_table())).unwrap();
        assert!(matches!(
            t.add_symbol(""),
            Err(Error::IllegalArgument(_))
        ));
    }

    #[test]
    fn test_define_symbol_no_op_and_conflict() {
        let mut t = SymbolTable::local(Arc::clone(system_table())).unwrap();
        t.define_symbol("city", 10).unwrap();
        t.define_symbol("city", 10).unwrap(); // no-op
        assert!(matches!(
            t.define_symbol("city", 12),
            Err(Error::IllegalArgument(_))
        ));
        // system texts are never rebindable either
        assert!(matches!(
            t.define_symbol("name", 20),
            Err(Error::IllegalArgument(_))
        ));
    }

    #[test]
    fn test_redefining_occupied_slot_is_fatal() {
        let mut t = SymbolTable::local(Arc::clone(system_table())).unwrap();
        t.define_symbol("city", 10).unwrap();
        assert!(matches!(
            t.define_symbol("town", 10),
            Err(Error::SymbolRedefinition { sid: 10, .. })
        ));
        // the failed call left the table unchanged
        assert_eq!(t.find_known_text(10).unwrap(), Some("city"));
        assert_eq!(t.find_sid_by_text("town").unwrap(), None);
    }

    #[test]
    fn test_define_gap_then_fill() {
        let mut t = SymbolTable::local(Arc::clone(system_table())).unwrap();
        t.define_symbol("far", 15).unwrap();
        assert_eq!(t.max_id(), 15);
        // sids 10..14 are holes
        assert_eq!(t.find_known_text(12).unwrap(), None);
        t.define_symbol("near", 12).unwrap();
        assert_eq!(t.find_sid_by_text("near").unwrap(), Some(12));
    }

    #[test]
    fn test_find_sid_literal_and_reserved() {
        let t = SymbolTable::local(Arc::clone(system_table())).unwrap();
        assert_eq!(t.find_sid_by_text("$324").unwrap(), Some(324));
        assert_eq!(t.find_sid_by_text("$0").unwrap(), Some(0));
        assert_eq!(t.find_sid_by_text("$12a").unwrap(), None);
        assert!(matches!(
            t.find_sid_by_text("$ion_bogus"),
            Err(Error::InvalidSystemSymbol(_))
        ));
        // "$ion" itself is a real system symbol
        assert_eq!(t.find_sid_by_text("$ion").unwrap(), Some(1));
    }

    #[test]
    fn test_find_text_synthesizes_literal() {
        let t = SymbolTable::local(Arc::clone(system_table())).unwrap();
        assert_eq!(t.find_text(4).unwrap(), "name");
        assert_eq!(t.find_text(324).unwrap(), "$324");
        assert_eq!(t.find_known_text(324).unwrap(), None);
        assert!(t.find_known_text(0).is_err());
    }

    #[test]
    fn test_known_text_surfaces_unknown_symbol() {
        let t = SymbolTable::local(Arc::clone(system_table())).unwrap();
        assert_eq!(t.known_text(4).unwrap(), "name");
        assert!(matches!(t.known_text(99), Err(Error::UnknownSymbol(99))));
    }

    #[test]
    fn test_import_offsets_sids() {
        let mut t = SymbolTable::local(Arc::clone(system_table())).unwrap();
        t.import(shared_greek(), Some(2)).unwrap();
        assert_eq!(t.find_sid_by_text("alpha").unwrap(), Some(10));
        assert_eq!(t.find_sid_by_text("beta").unwrap(), Some(11));
        assert_eq!(t.max_id(), 11);
        assert_eq!(t.find_known_text(10).unwrap(), Some("alpha"));
        assert!(t.has_imports());
        assert!(t.imported_table("greek").is_some());
        assert!(t.imported_table("latin").is_none());
    }

    #[test]
    fn test_import_reserves_declared_range() {
        let mut t = SymbolTable::local(Arc::clone(system_table())).unwrap();
        t.import(shared_greek(), Some(5)).unwrap();
        assert_eq!(t.max_id(), 14);
        assert_eq!(t.find_known_text(12).unwrap(), None); // reserved hole
        assert_eq!(t.add_symbol("next").unwrap(), 15);
    }

    #[test]
    fn test_import_truncates_to_declared() {
        let mut t = SymbolTable::local(Arc::clone(system_table())).unwrap();
        t.import(shared_greek(), Some(1)).unwrap();
        assert_eq!(t.max_id(), 10);
        assert_eq!(t.find_sid_by_text("alpha").unwrap(), Some(10));
        assert_eq!(t.find_sid_by_text("beta").unwrap(), None);
    }

    #[test]
    fn test_import_ordering_rules() {
        let mut t = SymbolTable::local(Arc::clone(system_table())).unwrap();
        t.add_symbol("local").unwrap();
        assert!(matches!(
            t.import(shared_greek(), None),
            Err(Error::IllegalState(_))
        ));

        let mut bare = SymbolTable::empty();
        bare.define_symbol("x", 1).unwrap();
        assert!(matches!(
            bare.import(shared_greek(), None),
            Err(Error::IllegalState(_))
        ));
    }

    #[test]
    fn test_import_rejects_local_and_system() {
        let mut t = SymbolTable::local(Arc::clone(system_table())).unwrap();
        assert!(matches!(
            t.import(Arc::clone(system_table()), None),
            Err(Error::IllegalArgument(_))
        ));
        let local = Arc::new(SymbolTable::empty());
        assert!(matches!(
            t.import(local, None),
            Err(Error::IllegalArgument(_))
        ));
    }

    #[test]
    fn test_define_over_import_text_keeps_import_binding() {
        let mut t = SymbolTable::local(Arc::clone(system_table())).unwrap();
        t.import(shared_greek(), Some(2)).unwrap();
        assert!(t.define_symbol("alpha", 20).is_err());
        assert_eq!(t.add_symbol("alpha").unwrap(), 10);
        assert_eq!(t.find_sid_by_text("alpha").unwrap(), Some(10));
    }

    #[test]
    fn test_define_into_unoccupied_import_slot() {
        let mut t = SymbolTable::local(Arc::clone(system_table())).unwrap();
        t.import(shared_greek(), Some(5)).unwrap(); // sids 12..14 reserved holes
        t.define_symbol("squatter", 13).unwrap();
        assert_eq!(t.find_sid_by_text("squatter").unwrap(), Some(13));
        assert_eq!(t.entry(13).unwrap().source(), t.id());
    }

    #[test]
    fn test_remove_symbol() {
        let mut t = SymbolTable::local(Arc::clone(system_table())).unwrap();
        t.add_symbol("city").unwrap();
        t.add_symbol("state").unwrap();
        t.remove_symbol("city").unwrap();
        assert_eq!(t.find_sid_by_text("city").unwrap(), None);
        assert_eq!(t.find_known_text(10).unwrap(), None);
        assert_eq!(t.max_id(), 11); // max does not decrease
        t.remove_symbol("never-there").unwrap(); // no-op
    }

    #[test]
    fn test_remove_symbol_at_checks_binding() {
        let mut t = SymbolTable::local(Arc::clone(system_table())).unwrap();
        t.add_symbol("city").unwrap();
        assert!(matches!(
            t.remove_symbol_at("city", 11),
            Err(Error::IllegalArgument(_))
        ));
        t.remove_symbol_at("city", 10).unwrap();
        assert_eq!(t.find_sid_by_text("city").unwrap(), None);
    }

    #[test]
    fn test_remove_system_symbol_rejected() {
        let mut t = SymbolTable::local(Arc::clone(system_table())).unwrap();
        assert!(matches!(
            t.remove_symbol("name"),
            Err(Error::IllegalArgument(_))
        ));
    }

    #[test]
    fn test_promote_renumbers_locals() {
        let mut t = SymbolTable::local(Arc::clone(system_table())).unwrap();
        t.import(shared_greek(), Some(2)).unwrap();
        t.add_symbol("one").unwrap(); // 12
        t.add_symbol("two").unwrap(); // 13
        t.remove_symbol("one").unwrap();
        t.add_symbol("three").unwrap(); // 14

        let shared = t.promote_to_shared("mine", 3).unwrap();
        assert!(shared.is_shared());
        assert!(shared.is_locked());
        assert_eq!(shared.name(), Some("mine"));
        assert_eq!(shared.version(), 3);
        assert!(shared.imports().is_empty());
        assert!(shared.system().is_none());
        assert_eq!(shared.max_id(), 2);
        assert_eq!(shared.find_sid_by_text("two").unwrap(), Some(1));
        assert_eq!(shared.find_sid_by_text("three").unwrap(), Some(2));
        assert_eq!(shared.find_sid_by_text("alpha").unwrap(), None);
    }

    #[test]
    fn test_promote_requires_name_and_version() {
        let t = SymbolTable::empty();
        assert!(t.promote_to_shared("", 1).is_err());
        let t = SymbolTable::empty();
        assert!(t.promote_to_shared("x", 0).is_err());
    }

    #[test]
    fn test_shared_table_rejects_mutation() {
        let shared = shared_greek();
        let mut owned = SymbolTable::empty();
        owned.define_symbol("a", 1).unwrap();
        let mut owned = owned.promote_to_shared("t", 1).unwrap();
        assert!(matches!(
            owned.add_symbol("b"),
            Err(Error::IllegalState(_))
        ));
        assert!(matches!(
            owned.define_symbol("b", 2),
            Err(Error::IllegalState(_))
        ));
        assert!(matches!(
            owned.remove_symbol("a"),
            Err(Error::IllegalState(_))
        ));
        // lookups still work on locked tables
        assert_eq!(shared.find_sid_by_text("alpha").unwrap(), Some(1));
        assert_eq!(shared.find_known_text(2).unwrap(), Some("beta"));
    }

    #[test]
    fn test_is_compatible() {
        let greek = shared_greek();
        let mut t = SymbolTable::local(Arc::clone(system_table())).unwrap();
        t.import(Arc::clone(&greek), Some(2)).unwrap();

        // the local cannot stand in for greek: alpha is at 10, not 1
        assert!(!t.is_compatible(&greek));

        // another greek authored identically can
        let greek2 = shared_greek();
        assert!(greek.is_compatible(&greek2));

        // reflexive for any table
        assert!(t.is_compatible(&t));
        assert!(greek.is_compatible(&greek));
        assert!(system_table().is_compatible(system_table()));
    }

    #[test]
    fn test_system_table_state() {
        let sys = system_table();
        assert!(sys.is_system());
        assert!(sys.is_shared());
        assert_eq!(sys.name(), Some("$ion"));
        assert_eq!(sys.version(), 1);
        assert_eq!(sys.max_id(), 9);
        assert!(sys.system().is_some_and(|s| s.id() == sys.id()));
    }

    #[test]
    fn test_display() {
        let greek = shared_greek();
        assert_eq!(greek.to_string(), "[SymbolTable greek 1]");
        let local = SymbolTable::empty();
        assert_eq!(local.to_string(), "[SymbolTable local]");
    }

    #[test]
    fn test_contiguity_invariant() {
        let mut t = SymbolTable::local(Arc::clone(system_table())).unwrap();
        t.import(shared_greek(), Some(4)).unwrap();
        t.add_symbol("tail").unwrap();

        for sid in 1..=t.max_id() {
            let occupied = t.entry(sid).is_some();
            let in_import = t
                .imports()
                .iter()
                .any(|imp| sid >= imp.first_sid() && sid <= imp.last_sid());
            let in_system = sid <= 9;
            assert!(
                occupied || in_import || in_system,
                "sid {} is outside every reserved range",
                sid
            );
        }
    }
}
