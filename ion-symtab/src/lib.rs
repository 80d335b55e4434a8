//! # ion-symtab
//!
//! Unified symbol table for the Ion data format.
//!
//! Every textual identifier in the Format may travel as a compact symbol
//! id (sid); a symbol table resolves sids back to text and assigns sids to
//! new text. This crate provides:
//!
//! - [`SymbolTable`]: the one concrete table type — system, shared, and
//!   local tables are lifecycle states of it
//! - [`system_table`]: the process-wide version-1 system table
//! - [`Catalog`] / [`MemoryCatalog`]: resolution of imports by
//!   `(name, version)`
//! - Reader binding ([`SymbolTable::read_local`],
//!   [`SymbolTable::read_shared`]) over the [`ValueReader`] seam
//! - Writer binding ([`SymbolTable::to_element`],
//!   [`SymbolTable::structural_view`]) producing the structural
//!   [`Element`] tree
//!
//! ## Design Principles
//!
//! 1. **One table type, three roles**: `(locked, name, system)` decide
//!    whether a table is system, shared, or local; the id-space invariants
//!    hold in every state
//! 2. **Dense forward, hashed reverse**: sid lookup is a Vec index; text
//!    lookup is one hash probe; the interned `Arc<str>` is shared between
//!    both sides
//! 3. **Single-threaded cooperative**: no operation blocks; locked tables
//!    are freely shared across threads once published
//!
//! ## Example
//!
//! ```ignore
//! use ion_symtab::{system_table, SymbolTable};
//!
//! let mut table = SymbolTable::local(system_table().clone())?;
//! let sid = table.add_symbol("city")?;
//! assert_eq!(table.find_text(sid)?, "city");
//! ```

pub mod catalog;
pub mod error;
pub mod parse;
pub mod reader;
pub mod symbol;
pub mod system;
pub mod table;
pub mod value;
pub mod view;

// Re-export main types
pub use catalog::{Catalog, MemoryCatalog};
pub use error::{Error, Result};
pub use reader::{ElementReader, ValueReader};
pub use symbol::{Sid, SymbolEntry, TableId};
pub use system::system_table;
pub use table::{SymbolTable, TableImport};
pub use value::{Element, TypeTag, Value};
