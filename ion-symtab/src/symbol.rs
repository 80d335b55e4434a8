//! Symbol entries and the id types they hang off.
//!
//! A [`SymbolEntry`] is the immutable `(sid, text, source)` triple stored in
//! a table's dense entries vector. `source` is a non-owning [`TableId`]
//! handle; comparing it against a table's own id answers "was this symbol
//! declared here?" without keeping the declaring table alive.
//!
//! Entry construction precomputes three wire-length hints so downstream
//! encoders can size buffers without re-measuring.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Symbol id. Valid sids are >= 1; 0 never names a symbol.
pub type Sid = u32;

// ---------------------------------------------------------------------------
// TableId
// ---------------------------------------------------------------------------

/// Process-unique, non-owning handle identifying a table instance.
///
/// Allocated from a monotonic counter at table construction. Identity
/// comparisons only; a `TableId` never resolves back to the table.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct TableId(u64);

impl TableId {
    /// Allocate the next process-unique id.
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        TableId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TableId({})", self.0)
    }
}

// ---------------------------------------------------------------------------
// Wire length helpers
// ---------------------------------------------------------------------------

/// Encoded length of `value` as a var-uint with 7 payload bits per byte.
#[inline]
pub fn var_uint7_len(value: u64) -> u32 {
    let mut len = 1;
    let mut v = value >> 7;
    while v > 0 {
        len += 1;
        v >>= 7;
    }
    len
}

/// Width of the length prefix for a field of `len` bytes.
///
/// Lengths below 14 fit in the type descriptor's low nibble and need no
/// extra bytes; longer fields carry a var-uint length.
#[inline]
pub fn len_prefix_width(len: u32) -> u32 {
    if len < 14 {
        0
    } else {
        var_uint7_len(len as u64)
    }
}

/// One type-descriptor token byte.
pub const TOKEN_LEN: u32 = 1;

// ---------------------------------------------------------------------------
// SymbolEntry
// ---------------------------------------------------------------------------

/// One slot of a table's sid-indexed entries vector.
///
/// `text` is `None` for a symbol that reserves its sid without carrying
/// text (a malformed wire element, or an import whose table was not in the
/// catalog). The `Arc<str>` is shared with the table's reverse index.
#[derive(Clone, Debug)]
pub struct SymbolEntry {
    sid: Sid,
    text: Option<Arc<str>>,
    source: TableId,
    /// UTF-8 byte length of the text (0 when absent).
    text_len: u32,
    /// Var-uint length of the sid.
    sid_len: u32,
    /// Type descriptor plus length prefix for the text field.
    td_len: u32,
}

impl SymbolEntry {
    pub fn new(text: Option<Arc<str>>, sid: Sid, source: TableId) -> Self {
        let text_len = text.as_deref().map(|t| t.len() as u32).unwrap_or(0);
        Self {
            sid,
            text,
            source,
            text_len,
            sid_len: var_uint7_len(sid as u64),
            td_len: len_prefix_width(text_len) + TOKEN_LEN,
        }
    }

    #[inline]
    pub fn sid(&self) -> Sid {
        self.sid
    }

    /// The symbol text, absent for unresolved symbols.
    #[inline]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Shared handle on the text, for index structures.
    #[inline]
    pub(crate) fn text_arc(&self) -> Option<&Arc<str>> {
        self.text.as_ref()
    }

    /// Handle of the table that declared this symbol.
    #[inline]
    pub fn source(&self) -> TableId {
        self.source
    }

    #[inline]
    pub fn text_len(&self) -> u32 {
        self.text_len
    }

    #[inline]
    pub fn sid_len(&self) -> u32 {
        self.sid_len
    }

    #[inline]
    pub fn td_len(&self) -> u32 {
        self.td_len
    }
}

/// Value equality on `(sid, text)`; `source` is identity only.
impl PartialEq for SymbolEntry {
    fn eq(&self, other: &Self) -> bool {
        self.sid == other.sid && self.text.as_deref() == other.text.as_deref()
    }
}

impl Eq for SymbolEntry {}

impl fmt::Display for SymbolEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.text.as_deref() {
            Some(t) => write!(f, "Symbol:{}-{}", self.sid, t),
            None => write!(f, "Symbol:{}", self.sid),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
