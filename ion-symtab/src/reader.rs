//! Streaming-reader seam consumed by the table parser.
//!
//! [`ValueReader`] is the narrow cursor interface the reader binding needs:
//! advance, inspect the current value, step into containers. Any streaming
//! decoder can sit behind it; [`ElementReader`] walks an in-memory
//! [`Element`] tree and is what table round-trips use.
//!
//! Field ids reported inside structs resolve well-known field names through
//! `ion-vocab` and `$NNN` literal names directly; other names report no id
//! and fall out of the parser's dispatch as open content.

use crate::error::{Error, Result};
use crate::symbol::Sid;
use crate::value::{Element, TypeTag, Value};

// ---------------------------------------------------------------------------
// ValueReader
// ---------------------------------------------------------------------------

/// Cursor over a stream of structural values.
///
/// `next` positions the cursor on a value; the inspection methods read the
/// value under the cursor. `step_in`/`step_out` move between container
/// levels. Implementations are synchronous and never block.
pub trait ValueReader {
    /// True when another value exists at the current depth.
    fn has_next(&self) -> bool;

    /// Advance to the next value at the current depth.
    fn next(&mut self) -> Option<TypeTag>;

    /// Type of the value under the cursor.
    fn get_type(&self) -> Option<TypeTag>;

    /// True when the value under the cursor is any null.
    fn is_null_value(&self) -> bool;

    /// Field sid of the value under the cursor, when inside a struct and
    /// the field name resolves to one.
    fn field_id(&self) -> Option<Sid>;

    /// True when the current container is a struct.
    fn is_in_struct(&self) -> bool;

    /// Enter the container under the cursor.
    fn step_in(&mut self) -> Result<()>;

    /// Leave the current container.
    fn step_out(&mut self) -> Result<()>;

    /// Integer under the cursor.
    fn int_value(&self) -> Result<i64>;

    /// String under the cursor.
    fn string_value(&self) -> Result<&str>;
}

// ---------------------------------------------------------------------------
// ElementReader
// ---------------------------------------------------------------------------

enum FrameKind {
    TopLevel,
    List,
    Struct,
}

struct Frame<'a> {
    kind: FrameKind,
    /// `(field_name, element)` pairs; names only in struct frames.
    items: Vec<(Option<&'a str>, &'a Element)>,
    /// Index of the current item; `items.len()` once exhausted, or
    /// `usize::MAX` before the first `next`.
    cursor: usize,
}

impl<'a> Frame<'a> {
    fn current(&self) -> Option<(Option<&'a str>, &'a Element)> {
        if self.cursor == usize::MAX {
            return None;
        }
        self.items.get(self.cursor).copied()
    }
}

/// Tree reader over an [`Element`].
///
/// The root element is presented as a one-value top-level stream, so the
/// usual drive sequence is `next()`, `step_in()`, then the field loop.
pub struct ElementReader<'a> {
    stack: Vec<Frame<'a>>,
}

impl<'a> ElementReader<'a> {
    pub fn new(root: &'a Element) -> Self {
        Self {
            stack: vec![Frame {
                kind: FrameKind::TopLevel,
                items: vec![(None, root)],
                cursor: usize::MAX,
            }],
        }
    }

    fn frame(&self) -> &Frame<'a> {
        self.stack.last().expect("reader stack never empties")
    }

    fn frame_mut(&mut self) -> &mut Frame<'a> {
        self.stack.last_mut().expect("reader stack never empties")
    }

    fn current_element(&self) -> Option<&'a Element> {
        self.frame().current().map(|(_, e)| e)
    }
}

impl<'a> ValueReader for ElementReader<'a> {
    fn has_next(&self) -> bool {
        let f = self.frame();
        let next = if f.cursor == usize::MAX { 0 } else { f.cursor + 1 };
        next < f.items.len()
    }

    fn next(&mut self) -> Option<TypeTag> {
        let f = self.frame_mut();
        let next = if f.cursor == usize::MAX { 0 } else { f.cursor + 1 };
        if next < f.items.len() {
            f.cursor = next;
            f.current().map(|(_, e)| e.type_tag())
        } else {
            f.cursor = f.items.len();
            None
        }
    }

    fn get_type(&self) -> Option<TypeTag> {
        self.current_element().map(|e| e.type_tag())
    }

    fn is_null_value(&self) -> bool {
        self.current_element().is_some_and(|e| e.is_null())
    }

    fn field_id(&self) -> Option<Sid> {
        let (name, _) = self.frame().current()?;
        let name = name?;
        ion_vocab::field_sid(name).or_else(|| ion_vocab::parse_sid_literal(name))
    }

    fn is_in_struct(&self) -> bool {
        matches!(self.frame().kind, FrameKind::Struct)
    }

    fn step_in(&mut self) -> Result<()> {
        let element = self
            .current_element()
            .ok_or_else(|| Error::illegal_state("step_in: no value under the cursor"))?;
        let frame = match element.value() {
            Value::List(items) => Frame {
                kind: FrameKind::List,
                items: items.iter().map(|e| (None, e)).collect(),
                cursor: usize::MAX,
            },
            Value::Struct(fields) => Frame {
                kind: FrameKind::Struct,
                items: fields
                    .iter()
                    .map(|(n, e)| (Some(n.as_str()), e))
                    .collect(),
                cursor: usize::MAX,
            },
            other => {
                return Err(Error::illegal_state(format!(
                    "step_in: not a container ({})",
                    other.type_tag()
                )))
            }
        };
        self.stack.push(frame);
        Ok(())
    }

    fn step_out(&mut self) -> Result<()> {
        if self.stack.len() <= 1 {
            return Err(Error::illegal_state("step_out: at top level"));
        }
        self.stack.pop();
        Ok(())
    }

    fn int_value(&self) -> Result<i64> {
        self.current_element()
            .and_then(|e| e.as_int())
            .ok_or_else(|| Error::illegal_state("int_value: not on an int"))
    }

    fn string_value(&self) -> Result<&str> {
        self.current_element()
            .and_then(|e| e.as_str())
            .ok_or_else(|| Error::illegal_state("string_value: not on a string"))
    }
}

// ===========================================================================
// Tests
// ===========================================================================
