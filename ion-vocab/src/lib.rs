//! Ion System Symbol Constants and Sid-Literal Helpers
//!
//! This crate provides a centralized location for the symbol texts and
//! symbol ids (sids) that Ion 1.0 defines, plus the small helper functions
//! used to recognize and render sid literals (`$NNN`).
//!
//! # Organization
//!
//! - `system` - the version-1 system symbols in declared order, sids 1..9
//! - `fields` - the struct field sids recognized when reading a symbol table
//! - top-level helpers for the `$` sigil and the `$ion_` reserved prefix

/// The sigil that introduces a sid literal (`$NNN`).
pub const SID_SIGIL: char = '$';

/// Prefix reserved for system-defined symbol texts.
pub const RESERVED_PREFIX: &str = "$ion_";

/// Version-1 system symbols.
pub mod system {
    /// The system symbol `$ion`, also the name of the system symbol table.
    pub const ION: &str = "$ion";
    pub const ION_SID: u32 = 1;

    /// The system symbol `$ion_1_0` (the version marker).
    pub const ION_1_0: &str = "$ion_1_0";
    pub const ION_1_0_SID: u32 = 2;

    /// The system symbol `$ion_symbol_table` (the table annotation).
    pub const ION_SYMBOL_TABLE: &str = "$ion_symbol_table";
    pub const ION_SYMBOL_TABLE_SID: u32 = 3;

    /// The system symbol `name`.
    pub const NAME: &str = "name";
    pub const NAME_SID: u32 = 4;

    /// The system symbol `version`.
    pub const VERSION: &str = "version";
    pub const VERSION_SID: u32 = 5;

    /// The system symbol `imports`.
    pub const IMPORTS: &str = "imports";
    pub const IMPORTS_SID: u32 = 6;

    /// The system symbol `symbols`.
    pub const SYMBOLS: &str = "symbols";
    pub const SYMBOLS_SID: u32 = 7;

    /// The system symbol `max_id`.
    pub const MAX_ID: &str = "max_id";
    pub const MAX_ID_SID: u32 = 8;

    /// The system symbol `$ion_shared_symbol_table`.
    pub const ION_SHARED_SYMBOL_TABLE: &str = "$ion_shared_symbol_table";
    pub const ION_SHARED_SYMBOL_TABLE_SID: u32 = 9;

    /// All version-1 system symbols in declared order.
    ///
    /// Index `i` carries sid `i + 1`.
    pub const SYSTEM_SYMBOLS: [&str; 9] = [
        ION,
        ION_1_0,
        ION_SYMBOL_TABLE,
        NAME,
        VERSION,
        IMPORTS,
        SYMBOLS,
        MAX_ID,
        ION_SHARED_SYMBOL_TABLE,
    ];

    /// Highest sid in the version-1 system table.
    pub const SYSTEM_MAX_ID: u32 = SYSTEM_SYMBOLS.len() as u32;
}

/// Check whether `text` uses the reserved system prefix.
pub fn is_reserved(text: &str) -> bool {
    text.starts_with(RESERVED_PREFIX)
}

/// Render the sid literal for `sid` (`324` becomes `"$324"`).
pub fn sid_literal(sid: u32) -> String {
    format!("{}{}", SID_SIGIL, sid)
}

/// Parse a well-formed sid literal (`\$\d+`).
///
/// Returns `None` when `text` is not the sigil followed by one or more
/// decimal digits. `"$0"` parses to 0; range checks are the caller's job.
pub fn parse_sid_literal(text: &str) -> Option<u32> {
    let digits = text.strip_prefix(SID_SIGIL)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Map a well-known struct field name to its system sid.
///
/// Used by tree readers to report a field id for the structural field
/// names without consulting a full table.
pub fn field_sid(name: &str) -> Option<u32> {
    match name {
        system::ION => Some(system::ION_SID),
        system::ION_1_0 => Some(system::ION_1_0_SID),
        system::ION_SYMBOL_TABLE => Some(system::ION_SYMBOL_TABLE_SID),
        system::NAME => Some(system::NAME_SID),
        system::VERSION => Some(system::VERSION_SID),
        system::IMPORTS => Some(system::IMPORTS_SID),
        system::SYMBOLS => Some(system::SYMBOLS_SID),
        system::MAX_ID => Some(system::MAX_ID_SID),
        system::ION_SHARED_SYMBOL_TABLE => Some(system::ION_SHARED_SYMBOL_TABLE_SID),
        _ => None,
    }
}
