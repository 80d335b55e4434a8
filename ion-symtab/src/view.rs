//! Writer binding: the structural view of a table.
//!
//! The view is the value tree handed to a writer for serialization:
//!
//! ```text
//! $ion_symbol_table::{
//!   name: "...", version: N,          // shared only
//!   imports: [{name, version, max_id}, ...],   // local only, if any
//!   symbols: { "$10": "city", ... },  // symbols declared by this table
//! }
//! ```
//!
//! Unlocked tables cache the view and keep it current through
//! `define`/`remove` (a write-through mirror); locked tables build a fresh
//! tree per call, since they never change.

use crate::symbol::Sid;
use crate::table::SymbolTable;
use crate::value::Element;
use ion_vocab::system::{IMPORTS, ION_SYMBOL_TABLE, MAX_ID, NAME, SYMBOLS, VERSION};

impl SymbolTable {
    /// Build the structural view of this table.
    pub fn to_element(&self) -> Element {
        if let Some(view) = &self.view {
            return view.clone();
        }
        self.build_element()
    }

    /// The cached structural view, built on first call.
    ///
    /// Local-symbol changes after this call are mirrored into the cached
    /// tree incrementally. Locked tables never cache; use
    /// [`to_element`](Self::to_element) for them.
    pub fn structural_view(&mut self) -> &Element {
        if self.view.is_none() {
            self.view = Some(self.build_element());
        }
        self.view.as_ref().expect("view was just built")
    }

    fn build_element(&self) -> Element {
        let mut rep = Element::empty_struct();
        rep.add_annotation(ION_SYMBOL_TABLE);

        if self.is_shared() {
            debug_assert!(self.version() > 0);
            if let Some(name) = self.name() {
                rep.struct_add(NAME, Element::string(name));
            }
            rep.struct_add(VERSION, Element::int(self.version() as i64));
        }

        if !self.imports().is_empty() {
            let mut list = Element::empty_list();
            for import in self.imports() {
                let mut clause = Element::empty_struct();
                clause.struct_add(
                    NAME,
                    Element::string(import.table().name().unwrap_or_default()),
                );
                clause.struct_add(VERSION, Element::int(import.table().version() as i64));
                clause.struct_add(MAX_ID, Element::int(import.declared_max_id() as i64));
                list.list_add(clause);
            }
            rep.struct_add(IMPORTS, list);
        }

        let mut symbols = Element::null_struct();
        let mut count = 0usize;
        for entry in self.entries.iter().flatten() {
            if entry.source() != self.id() {
                continue;
            }
            let Some(text) = entry.text() else {
                continue;
            };
            symbols.struct_add(ion_vocab::sid_literal(entry.sid()), Element::string(text));
            count += 1;
        }
        rep.struct_add(SYMBOLS, symbols);

        tracing::debug!(
            shared = self.is_shared(),
            imports = self.imports().len(),
            symbols = count,
            "structural view built"
        );
        rep
    }

    /// Mirror a newly installed local symbol into the cached view.
    pub(crate) fn mirror_record(&mut self, sid: Sid) {
        let Some(text) = self
            .entry(sid)
            .filter(|e| e.source() == self.id)
            .and_then(|e| e.text())
            .map(str::to_string)
        else {
            return;
        };
        let Some(view) = &mut self.view else {
            return;
        };
        if view
            .struct_get(SYMBOLS)
            .map_or(true, |s| s.as_struct().is_none() && !s.is_null())
        {
            view.struct_put(SYMBOLS, Element::null_struct());
        }
        let symbols = view
            .struct_get_mut(SYMBOLS)
            .expect("symbols field exists after put");
        symbols.struct_add(ion_vocab::sid_literal(sid), Element::string(text));
    }

    /// Drop a removed local symbol from the cached view.
    pub(crate) fn mirror_remove(&mut self, sid: Sid) {
        let Some(view) = &mut self.view else {
            return;
        };
        if let Some(symbols) = view.struct_get_mut(SYMBOLS) {
            symbols.struct_remove_all(&ion_vocab::sid_literal(sid));
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
    use crate::value::TypeTag;
    use std::sync::Arc;

    fn shared_greek() -> Arc<SymbolTable> {
        let mut t = SymbolTable::empty();
        t.define_symbol("alpha", 1).unwrap();
        t.define_symbol("beta", 2).unwrap();
        Arc::new(t.promote_to_shared("greek", 1).unwrap())
    }

    #[test]
    fn test_shared_view_shape() {
        let greek = shared_greek();
        let rep = greek.to_element();

        assert!(rep.has_annotation(ION_SYMBOL_TABLE));
        assert_eq!(rep.struct_get(NAME).unwrap().as_str(), Some("greek"));
        assert_eq!(rep.struct_get(VERSION).unwrap().as_int(), Some(1));
        assert!(rep.struct_get(IMPORTS).is_none());

        let symbols = rep.struct_get(SYMBOLS).unwrap();
        let fields = symbols.as_struct().unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].0, "$1");
        assert_eq!(fields[0].1.as_str(), Some("alpha"));
        assert_eq!(fields[1].0, "$2");
        assert_eq!(fields[1].1.as_str(), Some("beta"));
    }

    #[test]
    fn test_local_view_shape() {
        let mut t = SymbolTable::local(Arc::clone(system_table())).unwrap();
        t.import(shared_greek(), Some(2)).unwrap();
        t.add_symbol("city").unwrap(); // $12

        let rep = t.structural_view().clone();
        assert!(rep.has_annotation(ION_SYMBOL_TABLE));
        assert!(rep.struct_get(NAME).is_none());
        assert!(rep.struct_get(VERSION).is_none());

        let imports = rep.struct_get(IMPORTS).unwrap().as_list().unwrap();
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].struct_get(NAME).unwrap().as_str(), Some("greek"));
        assert_eq!(imports[0].struct_get(VERSION).unwrap().as_int(), Some(1));
        assert_eq!(imports[0].struct_get(MAX_ID).unwrap().as_int(), Some(2));

        let symbols = rep.struct_get(SYMBOLS).unwrap();
        let fields = symbols.as_struct().unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].0, "$12");
        assert_eq!(fields[0].1.as_str(), Some("city"));
    }

    #[test]
    fn test_empty_local_symbols_stay_null() {
        let mut t = SymbolTable::local(Arc::clone(system_table())).unwrap();
        let rep = t.structural_view();
        let symbols = rep.struct_get(SYMBOLS).unwrap();
        assert!(symbols.is_null());
        assert_eq!(symbols.type_tag(), TypeTag::Struct);
    }

    #[test]
    fn test_incremental_mirror_add() {
        let mut t = SymbolTable::local(Arc::clone(system_table())).unwrap();
        t.structural_view(); // prime the cache
        t.add_symbol("city").unwrap();
        t.add_symbol("state").unwrap();

        let rep = t.structural_view();
        let fields = rep.struct_get(SYMBOLS).unwrap().as_struct().unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].0, "$10");
        assert_eq!(fields[1].0, "$11");
    }

    #[test]
    fn test_incremental_mirror_remove() {
        let mut t = SymbolTable::local(Arc::clone(system_table())).unwrap();
        t.add_symbol("city").unwrap();
        t.add_symbol("state").unwrap();
        t.structural_view();

        t.remove_symbol("city").unwrap();
        let rep = t.structural_view();
        let fields = rep.struct_get(SYMBOLS).unwrap().as_struct().unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].0, "$11");
    }

    #[test]
    fn test_mirror_matches_rebuild() {
        let mut t = SymbolTable::local(Arc::clone(system_table())).unwrap();
        t.structural_view();
        t.add_symbol("a").unwrap();
        t.add_symbol("b").unwrap();
        t.remove_symbol("a").unwrap();

        let mirrored = t.structural_view().clone();
        let rebuilt = t.build_element();
        assert_eq!(
            mirrored.struct_get(SYMBOLS).unwrap().as_struct(),
            rebuilt.struct_get(SYMBOLS).unwrap().as_struct()
        );
    }

    #[test]
    fn test_view_idempotent() {
        let mut t = SymbolTable::local(Arc::clone(system_table())).unwrap();
        t.add_symbol("x").unwrap();
        let first = t.structural_view().clone();
        let second = t.structural_view().clone();
        assert_eq!(first, second);
    }
}
