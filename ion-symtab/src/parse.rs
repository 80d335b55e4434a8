//! Reader binding: materialize a table from its structural form.
//!
//! The entry points expect the reader positioned *inside* the struct that
//! carries the table (the annotation on the struct is the caller's
//! concern). Fields dispatch on their sids; anything unrecognized is open
//! content and is skipped.
//!
//! Symbol candidates are collected during the scan and installed after the
//! whole struct is consumed, so a `symbols` field is interpreted against
//! the final import layout regardless of field order. Candidates whose sid
//! lands inside the import range are dropped: wire data cannot override an
//! import.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::reader::{ElementReader, ValueReader};
use crate::symbol::{Sid, SymbolEntry};
use crate::table::SymbolTable;
use crate::value::{Element, TypeTag};
use ion_vocab::system::{
    IMPORTS_SID, ION, MAX_ID_SID, NAME_SID, SYMBOLS_SID, VERSION_SID,
};

#[derive(Copy, Clone, Eq, PartialEq)]
enum TableRole {
    Local,
    Shared,
}

/// A symbol slot scanned from the `symbols` field, not yet installed.
struct Candidate {
    text: Option<String>,
    sid: Sid,
}

impl SymbolTable {
    /// Read a local table from a reader positioned inside the table struct.
    ///
    /// Imports resolve through `catalog`; unresolved imports with a
    /// declared `max_id` become placeholder ranges of unknown symbols.
    pub fn read_local<R>(
        system: Arc<SymbolTable>,
        reader: &mut R,
        catalog: Option<&dyn Catalog>,
    ) -> Result<SymbolTable>
    where
        R: ValueReader + ?Sized,
    {
        let table = SymbolTable::local(system)?;
        read_table_struct(table, TableRole::Local, reader, catalog)
    }

    /// Read a shared table from a reader positioned inside the table
    /// struct. Fails with [`Error::MalformedTable`] when the struct lacks a
    /// non-empty `name`.
    pub fn read_shared<R>(reader: &mut R) -> Result<SymbolTable>
    where
        R: ValueReader + ?Sized,
    {
        let table = SymbolTable::new_bare();
        read_table_struct(table, TableRole::Shared, reader, None)
    }

    /// Read a local table from its structural element.
    pub fn local_from_element(
        system: Arc<SymbolTable>,
        element: &Element,
        catalog: Option<&dyn Catalog>,
    ) -> Result<SymbolTable> {
        let mut reader = ElementReader::new(element);
        reader.next();
        reader.step_in()?;
        SymbolTable::read_local(system, &mut reader, catalog)
    }

    /// Read a shared table from its structural element.
    pub fn shared_from_element(element: &Element) -> Result<SymbolTable> {
        let mut reader = ElementReader::new(element);
        reader.next();
        reader.step_in()?;
        SymbolTable::read_shared(&mut reader)
    }
}

fn read_table_struct<R>(
    mut table: SymbolTable,
    role: TableRole,
    reader: &mut R,
    catalog: Option<&dyn Catalog>,
) -> Result<SymbolTable>
where
    R: ValueReader + ?Sized,
{
    debug_assert!(reader.is_in_struct());

    let mut name: Option<String> = None;
    let mut version: i64 = 1;
    let mut candidates: Vec<Candidate> = Vec::new();

    while reader.has_next() {
        let Some(field_type) = reader.next() else {
            break;
        };
        if reader.is_null_value() {
            continue;
        }
        match reader.field_id() {
            Some(VERSION_SID) if role == TableRole::Shared && field_type == TypeTag::Int => {
                version = reader.int_value()?;
            }
            Some(NAME_SID) if role == TableRole::Shared && field_type == TypeTag::String => {
                name = Some(reader.string_value()?.to_string());
            }
            Some(SYMBOLS_SID) => {
                let struct_format = match field_type {
                    TypeTag::Struct => true,
                    TypeTag::List => false,
                    // Other types are treated as an empty symbol list.
                    _ => continue,
                };
                read_symbols_field(&table, struct_format, reader, &mut candidates)?;
            }
            Some(IMPORTS_SID) if role == TableRole::Local && field_type == TypeTag::List => {
                read_import_list(&mut table, reader, catalog)?;
            }
            _ => {} // open content
        }
    }

    match role {
        TableRole::Shared => {
            let name = match name {
                Some(n) if !n.is_empty() => n,
                _ => {
                    return Err(Error::malformed_table(
                        "field 'name' must be a non-empty string",
                    ))
                }
            };

            // Forget anything scanned before the reset: a shared table owns
            // a flat sid space.
            table.max_id = 0;
            table.system = None;
            table.text_index.clear();
            for slot in table.entries.iter_mut() {
                *slot = None;
            }

            for candidate in candidates {
                if candidate.sid < 1 {
                    continue;
                }
                table.install_entry(SymbolEntry::new(
                    candidate.text.map(Arc::from),
                    candidate.sid,
                    table.id(),
                ))?;
            }

            let version = version.clamp(1, u32::MAX as i64) as u32;
            table.share(&name, version)?;

            tracing::debug!(
                name = table.name().unwrap_or_default(),
                version = table.version(),
                max_id = table.max_id(),
                "shared symbol table read"
            );
        }
        TableRole::Local => {
            let first_local_sid = table.max_id() + 1;
            let mut installed = 0usize;
            for candidate in candidates {
                if candidate.sid >= first_local_sid {
                    installed += 1;
                }
                table.install_local_candidate(
                    SymbolEntry::new(candidate.text.map(Arc::from), candidate.sid, table.id()),
                    first_local_sid,
                )?;
            }

            tracing::debug!(
                max_id = table.max_id(),
                imports = table.imports().len(),
                local_symbols = installed,
                "local symbol table read"
            );
        }
    }

    Ok(table)
}

/// Collect symbol candidates from a `symbols` list or struct.
///
/// List elements take `prior max_id + position`; struct fields take their
/// field sid literally. Elements that are not non-null strings (or are
/// empty strings) still claim their sid but carry no text.
fn read_symbols_field<R>(
    table: &SymbolTable,
    struct_format: bool,
    reader: &mut R,
    candidates: &mut Vec<Candidate>,
) -> Result<()>
where
    R: ValueReader + ?Sized,
{
    let mut sid = table.max_id();
    reader.step_in()?;
    while reader.has_next() {
        let Some(element_type) = reader.next() else {
            break;
        };
        if struct_format {
            sid = reader.field_id().unwrap_or(0);
        } else {
            sid += 1;
        }

        let mut text = None;
        if element_type == TypeTag::String && !reader.is_null_value() {
            let s = reader.string_value()?;
            if !s.is_empty() {
                text = Some(s.to_string());
            }
        }
        candidates.push(Candidate { text, sid });
    }
    reader.step_out()
}

fn read_import_list<R>(
    table: &mut SymbolTable,
    reader: &mut R,
    catalog: Option<&dyn Catalog>,
) -> Result<()>
where
    R: ValueReader + ?Sized,
{
    reader.step_in()?;
    while reader.has_next() {
        let Some(element_type) = reader.next() else {
            break;
        };
        if element_type == TypeTag::Struct && !reader.is_null_value() {
            read_one_import(table, reader, catalog)?;
        }
    }
    reader.step_out()
}

/// Resolve and apply one import clause.
///
/// Clauses without a usable name (missing, empty, or naming the system
/// table) are skipped. A catalog miss or version mismatch is an error
/// unless the clause declares its own `max_id`, in which case a
/// placeholder table preserves the sid arithmetic.
fn read_one_import<R>(
    table: &mut SymbolTable,
    reader: &mut R,
    catalog: Option<&dyn Catalog>,
) -> Result<()>
where
    R: ValueReader + ?Sized,
{
    let mut name: Option<String> = None;
    let mut version: i64 = -1;
    let mut max_id: i64 = -1;

    reader.step_in()?;
    while reader.has_next() {
        let Some(field_type) = reader.next() else {
            break;
        };
        if reader.is_null_value() {
            continue;
        }
        match reader.field_id() {
            Some(NAME_SID) if field_type == TypeTag::String => {
                name = Some(reader.string_value()?.to_string());
            }
            Some(VERSION_SID) if field_type == TypeTag::Int => {
                version = reader.int_value()?;
            }
            Some(MAX_ID_SID) if field_type == TypeTag::Int => {
                max_id = reader.int_value()?;
            }
            _ => {} // open content
        }
    }
    reader.step_out()?;

    let name = match name {
        Some(n) if !n.is_empty() && n != ION => n,
        other => {
            tracing::debug!(name = ?other, "import clause without usable name ignored");
            return Ok(());
        }
    };
    let version = version.clamp(1, u32::MAX as i64) as u32;
    let declared_max_id = if max_id < 0 {
        None
    } else {
        Some(max_id.min(u32::MAX as i64) as Sid)
    };

    let resolved = catalog.and_then(|c| c.get_table(&name, version));
    let exact = resolved
        .as_ref()
        .is_some_and(|t| t.version() == version);
    if !exact && declared_max_id.is_none() {
        let mut message = format!(
            "import of shared table '{}' lacks a valid max_id field, \
             but an exact match was not found in the catalog",
            name
        );
        if let Some(found) = &resolved {
            message.push_str(&format!(" (found version {})", found.version()));
        }
        return Err(Error::malformed_import(message));
    }

    let imported = match resolved {
        Some(t) => t,
        None => {
            // Placeholder: the declared range with every symbol unresolved.
            let declared = declared_max_id.unwrap_or(0);
            let mut placeholder = SymbolTable::new_bare();
            placeholder.max_id = declared;
            placeholder.grow_to(declared);
            placeholder.share(&name, version)?;
            tracing::debug!(
                name = placeholder.name().unwrap_or_default(),
                version,
                max_id = declared,
                "import not in catalog; placeholder reserved"
            );
            Arc::new(placeholder)
        }
    };

    table.import(imported, declared_max_id)
}
