//! The process-wide version-1 system table.
//!
//! Built once behind a `OnceLock`, so initialization is published with a
//! happens-before edge and the locked table is freely shared across
//! threads afterward.

use std::sync::{Arc, OnceLock};

use crate::symbol::SymbolEntry;
use crate::table::SymbolTable;
use ion_vocab::system::{ION, SYSTEM_SYMBOLS};

/// The version-1 system table singleton.
///
/// Carries the Format-defined symbols at sids `1..=9` in declared order,
/// named `$ion` version 1, locked.
pub fn system_table() -> &'static Arc<SymbolTable> {
    static SYSTEM: OnceLock<Arc<SymbolTable>> = OnceLock::new();
    SYSTEM.get_or_init(|| {
        let mut table = SymbolTable::new_bare();
        for (i, text) in SYSTEM_SYMBOLS.iter().enumerate() {
            table
                .install_entry(SymbolEntry::new(
                    Some(Arc::from(*text)),
                    i as u32 + 1,
                    table.id(),
                ))
                .expect("system symbols are distinct");
        }
        table.share(ION, 1).expect("system table is unlocked here");
        Arc::new(table)
    })
}
