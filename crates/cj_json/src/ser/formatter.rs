use alloc::vec::Vec;
use std::io;

use serde_json::ser::{CharEscape, Formatter};

use crate::options::EncoderOptions;

/// A [`Formatter`] laid out by [`EncoderOptions`].
///
/// Covers compact and indented output, custom separators and ASCII-only
/// escaping. Empty containers are always written as `[]` and `{}`.
///
/// # Examples
///
/// ```
/// use cj_json::options::EncoderOptions;
/// use cj_json::ser::JsonFormatter;
/// use serde::Serialize;
///
/// let options = EncoderOptions { indent: Some(2), ensure_ascii: true, ..Default::default() };
/// let mut out = Vec::new();
/// let mut ser = serde_json::Serializer::with_formatter(&mut out, JsonFormatter::new(&options));
/// serde_json::json!({ "name": "café", "tags": [] }).serialize(&mut ser).unwrap();
///
/// assert_eq!(
///     String::from_utf8(out).unwrap(),
///     "{\n  \"name\": \"caf\\u00e9\",\n  \"tags\": []\n}",
/// );
/// ```
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    indent: Option<Vec<u8>>,
    item_separator: Vec<u8>,
    key_separator: Vec<u8>,
    ensure_ascii: bool,
    level: usize,
    has_value: bool,
}

impl JsonFormatter {
    pub fn new(options: &EncoderOptions) -> Self {
        Self {
            indent: options.indent.map(|width| alloc::vec![b' '; width]),
            item_separator: options.item_separator().as_bytes().to_vec(),
            key_separator: options.key_separator().as_bytes().to_vec(),
            ensure_ascii: options.ensure_ascii,
            level: 0,
            has_value: false,
        }
    }

    fn newline<W: ?Sized + io::Write>(&self, writer: &mut W) -> io::Result<()> {
        if let Some(indent) = &self.indent {
            writer.write_all(b"\n")?;
            for _ in 0..self.level {
                writer.write_all(indent)?;
            }
        }
        Ok(())
    }

    fn open<W: ?Sized + io::Write>(&mut self, writer: &mut W, bracket: &[u8]) -> io::Result<()> {
        self.level += 1;
        self.has_value = false;
        writer.write_all(bracket)
    }

    fn close<W: ?Sized + io::Write>(&mut self, writer: &mut W, bracket: &[u8]) -> io::Result<()> {
        self.level = self.level.saturating_sub(1);
        if self.has_value {
            self.newline(writer)?;
        }
        writer.write_all(bracket)
    }

    fn separate<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if !first {
            writer.write_all(&self.item_separator)?;
        }
        self.newline(writer)
    }
}

impl Formatter for JsonFormatter {
    #[inline]
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.open(writer, b"[")
    }

    #[inline]
    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.close(writer, b"]")
    }

    #[inline]
    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.separate(writer, first)
    }

    #[inline]
    fn end_array_value<W: ?Sized + io::Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        self.has_value = true;
        Ok(())
    }

    #[inline]
    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.open(writer, b"{")
    }

    #[inline]
    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.close(writer, b"}")
    }

    #[inline]
    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.separate(writer, first)
    }

    #[inline]
    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.key_separator)
    }

    #[inline]
    fn end_object_value<W: ?Sized + io::Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        self.has_value = true;
        Ok(())
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        if !self.ensure_ascii || fragment.is_ascii() {
            return writer.write_all(fragment.as_bytes());
        }

        let mut units = [0u16; 2];
        for c in fragment.chars() {
            if c.is_ascii() {
                writer.write_all(&[c as u8])?;
            } else {
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// String escaping

/// Writes `value` as a JSON string literal through `formatter`.
pub(crate) fn write_str<W, F>(writer: &mut W, formatter: &mut F, value: &str) -> io::Result<()>
where
    W: ?Sized + io::Write,
    F: Formatter,
{
    formatter.begin_string(writer)?;

    let bytes = value.as_bytes();
    let mut start = 0;
    for (index, &byte) in bytes.iter().enumerate() {
        let escape = match byte {
            b'"' => CharEscape::Quote,
            b'\\' => CharEscape::ReverseSolidus,
            b'\x08' => CharEscape::Backspace,
            b'\x0C' => CharEscape::FormFeed,
            b'\n' => CharEscape::LineFeed,
            b'\r' => CharEscape::CarriageReturn,
            b'\t' => CharEscape::Tab,
            0x00..=0x1F => CharEscape::AsciiControl(byte),
            _ => continue,
        };

        if start < index {
            formatter.write_string_fragment(writer, &value[start..index])?;
        }
        formatter.write_char_escape(writer, escape)?;
        start = index + 1;
    }

    if start < bytes.len() {
        formatter.write_string_fragment(writer, &value[start..])?;
    }
    formatter.end_string(writer)
}

// -----------------------------------------------------------------------------
// Tests
