//! Error types for ion-symtab

use crate::symbol::Sid;
use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Symbol table error type
#[derive(Error, Debug)]
pub enum Error {
    /// Caller passed empty text, a non-positive sid, or an inconsistent
    /// `(text, sid)` pair to a mutator.
    #[error("invalid argument: {0}")]
    IllegalArgument(String),

    /// Operation not valid in the table's current lifecycle state
    /// (mutation of a locked table, import after local symbols, ...).
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// A sid slot already holds a different text.
    #[error("cannot redefine ${sid} from {existing:?} to {attempted:?}")]
    SymbolRedefinition {
        sid: Sid,
        existing: Option<String>,
        attempted: Option<String>,
    },

    /// Lookup text matches the reserved prefix but is not a well-formed
    /// sid literal.
    #[error("invalid system symbol: {0}")]
    InvalidSystemSymbol(String),

    /// Parsed shared table lacks a non-empty `name`.
    #[error("shared symbol table is malformed: {0}")]
    MalformedTable(String),

    /// Parsed import lacks `max_id` and is not exactly matched by the
    /// catalog.
    #[error("malformed import: {0}")]
    MalformedImport(String),

    /// A text lookup on a sid whose text is absent.
    #[error("unknown symbol text for ${0}")]
    UnknownSymbol(Sid),
}

impl Error {
    /// Create an invalid-argument error
    pub fn illegal_argument(msg: impl Into<String>) -> Self {
        Error::IllegalArgument(msg.into())
    }

    /// Create an illegal-state error
    pub fn illegal_state(msg: impl Into<String>) -> Self {
        Error::IllegalState(msg.into())
    }

    /// Create a malformed-table error
    pub fn malformed_table(msg: impl Into<String>) -> Self {
        Error::MalformedTable(msg.into())
    }

    /// Create a malformed-import error
    pub fn malformed_import(msg: impl Into<String>) -> Self {
        Error::MalformedImport(msg.into())
    }
}
