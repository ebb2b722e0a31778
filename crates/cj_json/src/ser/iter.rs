use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::iter::FusedIterator;
use std::io;

use serde_json::Number;
use serde_json::ser::Formatter;

use super::formatter::{JsonFormatter, write_str};
use crate::{EncodeError, Map, TypeConverter, Value};

// -----------------------------------------------------------------------------
// Frames

enum Node<'a> {
    Borrowed(&'a Value),
    Owned(Value),
}

type Items<'a> = Box<dyn Iterator<Item = Node<'a>> + 'a>;
type Entries<'a> = Box<dyn Iterator<Item = (Cow<'a, str>, Node<'a>)> + 'a>;

/// Custom values may nest at most this deep, counting every value a
/// conversion or the default hook returns in place of another.
pub(crate) const CUSTOM_DEPTH_LIMIT: usize = 128;

enum Frame<'a> {
    Array {
        items: Items<'a>,
        first: bool,
        customs: usize,
    },
    Object {
        entries: Entries<'a>,
        first: bool,
        customs: usize,
    },
}

impl Frame<'_> {
    /// Custom values expanded on the path to this container.
    fn customs(&self) -> usize {
        match self {
            Frame::Array { customs, .. } | Frame::Object { customs, .. } => *customs,
        }
    }
}

// -----------------------------------------------------------------------------
// IterEncode

/// An iterator over the text fragments of an encoded value.
///
/// Created by [`TypeConverter::iterencode`]. Concatenating every fragment
/// yields exactly the text returned by [`TypeConverter::encode`].
///
/// Custom values are converted lazily, when the iterator reaches them. The
/// first error ends the iteration.
///
/// # Examples
///
/// ```
/// use cj_json::{TypeConverter, Value};
///
/// let converter = TypeConverter::new();
/// let value = Value::from(vec![Value::from(1), Value::from("a")]);
///
/// let chunks = converter
///     .iterencode(&value)
///     .collect::<Result<Vec<_>, _>>()
///     .unwrap();
/// assert!(chunks.len() > 1);
/// assert_eq!(chunks.concat(), r#"[1,"a"]"#);
/// ```
pub struct IterEncode<'a> {
    converter: &'a TypeConverter,
    formatter: JsonFormatter,
    sort_keys: bool,
    root: Option<Node<'a>>,
    stack: Vec<Frame<'a>>,
    finished: bool,
}

impl<'a> IterEncode<'a> {
    pub(crate) fn new(converter: &'a TypeConverter, value: &'a Value) -> Self {
        let options = converter.options().encoder();
        Self {
            converter,
            formatter: JsonFormatter::new(options),
            sort_keys: options.sort_keys,
            root: Some(Node::Borrowed(value)),
            stack: Vec::new(),
            finished: false,
        }
    }

    /// Writes the next token (a scalar, an opening or a closing bracket).
    fn step(&mut self, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        if let Some(root) = self.root.take() {
            return self.emit(root, out);
        }

        let Some(frame) = self.stack.last_mut() else {
            return Ok(());
        };

        match frame {
            Frame::Array { items, first, .. } => match items.next() {
                Some(node) => {
                    let first = core::mem::replace(first, false);
                    self.formatter.begin_array_value(out, first)?;
                    self.emit(node, out)
                }
                None => {
                    self.stack.pop();
                    self.formatter.end_array(out)?;
                    self.end_value(out)
                }
            },
            Frame::Object { entries, first, .. } => match entries.next() {
                Some((key, node)) => {
                    let first = core::mem::replace(first, false);
                    self.formatter.begin_object_key(out, first)?;
                    write_str(out, &mut self.formatter, &key)?;
                    self.formatter.end_object_key(out)?;
                    self.formatter.begin_object_value(out)?;
                    self.emit(node, out)
                }
                None => {
                    self.stack.pop();
                    self.formatter.end_object(out)?;
                    self.end_value(out)
                }
            },
        }
    }

    fn emit(&mut self, mut node: Node<'a>, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        let mut customs = self.stack.last().map_or(0, Frame::customs);

        // a default hook may return another custom value
        loop {
            let custom = match &node {
                Node::Borrowed(Value::Custom(custom)) => custom,
                Node::Owned(Value::Custom(custom)) => custom,
                _ => break,
            };
            customs += 1;
            if customs > CUSTOM_DEPTH_LIMIT {
                log::debug!("gave up encoding `{}`", custom.type_name());
                return Err(EncodeError::RecursionLimit(CUSTOM_DEPTH_LIMIT));
            }
            let envelope = self.converter.encode_type(custom)?;
            node = Node::Owned(envelope);
        }

        match node {
            Node::Borrowed(Value::Array(items)) => {
                self.open_array(Box::new(items.iter().map(Node::Borrowed)), customs, out)
            }
            Node::Owned(Value::Array(items)) => {
                self.open_array(Box::new(items.into_iter().map(Node::Owned)), customs, out)
            }
            Node::Borrowed(Value::Object(map)) => {
                let entries = self.borrowed_entries(map);
                self.open_object(entries, customs, out)
            }
            Node::Owned(Value::Object(map)) => {
                let entries = self.owned_entries(map);
                self.open_object(entries, customs, out)
            }
            Node::Borrowed(scalar) => self.write_scalar(scalar, out),
            Node::Owned(scalar) => self.write_scalar(&scalar, out),
        }
    }

    fn borrowed_entries(&self, map: &'a Map) -> Entries<'a> {
        if self.sort_keys {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));
            Box::new(
                entries
                    .into_iter()
                    .map(|(key, value)| (Cow::Borrowed(key.as_str()), Node::Borrowed(value))),
            )
        } else {
            Box::new(
                map.iter()
                    .map(|(key, value)| (Cow::Borrowed(key.as_str()), Node::Borrowed(value))),
            )
        }
    }

    fn owned_entries(&self, mut map: Map) -> Entries<'a> {
        if self.sort_keys {
            map.sort_unstable_keys();
        }
        Box::new(
            map.into_iter()
                .map(|(key, value)| (Cow::Owned(key), Node::Owned(value))),
        )
    }

    fn open_array(
        &mut self,
        items: Items<'a>,
        customs: usize,
        out: &mut Vec<u8>,
    ) -> Result<(), EncodeError> {
        self.formatter.begin_array(out)?;
        self.stack.push(Frame::Array {
            items,
            first: true,
            customs,
        });
        Ok(())
    }

    fn open_object(
        &mut self,
        entries: Entries<'a>,
        customs: usize,
        out: &mut Vec<u8>,
    ) -> Result<(), EncodeError> {
        self.formatter.begin_object(out)?;
        self.stack.push(Frame::Object {
            entries,
            first: true,
            customs,
        });
        Ok(())
    }

    fn write_scalar(&mut self, value: &Value, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        match value {
            Value::Null => self.formatter.write_null(out)?,
            Value::Bool(b) => self.formatter.write_bool(out, *b)?,
            Value::Number(n) => write_number(&mut self.formatter, out, n)?,
            Value::String(s) => write_str(out, &mut self.formatter, s)?,
            // expanded by `emit`
            Value::Array(_) | Value::Object(_) | Value::Custom(_) => {}
        }
        self.end_value(out)
    }

    /// Closes the value just written inside the enclosing container.
    fn end_value(&mut self, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        match self.stack.last() {
            Some(Frame::Array { .. }) => self.formatter.end_array_value(out)?,
            Some(Frame::Object { .. }) => self.formatter.end_object_value(out)?,
            None => {}
        }
        Ok(())
    }
}

fn write_number(formatter: &mut JsonFormatter, out: &mut Vec<u8>, n: &Number) -> io::Result<()> {
    if let Some(n) = n.as_u64() {
        formatter.write_u64(out, n)
    } else if let Some(n) = n.as_i64() {
        formatter.write_i64(out, n)
    } else if let Some(n) = n.as_f64() {
        formatter.write_f64(out, n)
    } else {
        formatter.write_null(out)
    }
}

impl Iterator for IterEncode<'_> {
    type Item = Result<String, EncodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let mut out = Vec::new();
        let result = self.step(&mut out);
        if result.is_err() || (self.root.is_none() && self.stack.is_empty()) {
            self.finished = true;
        }

        Some(result.and_then(|()| {
            String::from_utf8(out)
                .map_err(|err| EncodeError::Io(io::Error::new(io::ErrorKind::InvalidData, err)))
        }))
    }
}

impl FusedIterator for IterEncode<'_> {}

// -----------------------------------------------------------------------------
// Tests
