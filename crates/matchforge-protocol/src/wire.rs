//! Low-level wire encoding: byte buffers and the tagged value model.
//!
//! Every value on the wire is written as a one-byte type tag followed
//! by its payload. Tags make the stream self-describing, which is what
//! allows a decoder to *skip* fields it does not know about (forward
//! compatibility) instead of desynchronizing on them.
//!
//! All multi-byte integers are big-endian. Strings are UTF-8 with a
//! u32 byte-length prefix. Lists are u32 count-prefixed, records are
//! u8 field-count-prefixed; both contain tagged values, so they can be
//! skipped recursively without knowing their element types.

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Type tags
// ---------------------------------------------------------------------------

/// The wire type tag that precedes every encoded value.
///
/// Tag values are part of the wire contract: once shipped, a tag's
/// meaning never changes. New representations get new tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Tag {
    I32 = 0x01,
    I64 = 0x02,
    /// A single byte, used for enum ordinals.
    U8 = 0x03,
    Bool = 0x04,
    F64 = 0x05,
    Str = 0x06,
    List = 0x07,
    Record = 0x08,
}

impl Tag {
    fn from_byte(byte: u8) -> Result<Self, ProtocolError> {
        match byte {
            0x01 => Ok(Self::I32),
            0x02 => Ok(Self::I64),
            0x03 => Ok(Self::U8),
            0x04 => Ok(Self::Bool),
            0x05 => Ok(Self::F64),
            0x06 => Ok(Self::Str),
            0x07 => Ok(Self::List),
            0x08 => Ok(Self::Record),
            other => Err(ProtocolError::malformed(format!(
                "unrecognized type tag 0x{other:02x}"
            ))),
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::I32 => "I32",
            Self::I64 => "I64",
            Self::U8 => "U8",
            Self::Bool => "Bool",
            Self::F64 => "F64",
            Self::Str => "Str",
            Self::List => "List",
            Self::Record => "Record",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Encode/decode traits
// ---------------------------------------------------------------------------

/// A type that can write itself as a tagged wire value.
///
/// Encoding cannot fail: any well-formed in-memory value has a valid
/// wire form.
pub trait WireEncode {
    fn encode(&self, w: &mut ByteWriter);
}

/// A type that can read itself back from a tagged wire value.
pub trait WireDecode: Sized {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, ProtocolError>;
}

// ---------------------------------------------------------------------------
// ByteWriter
// ---------------------------------------------------------------------------

/// A growable output buffer for wire encoding.
#[derive(Debug, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes the writer, returning the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    // -- Raw (untagged) primitives --

    pub fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn put_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn put_tag(&mut self, tag: Tag) {
        self.buf.push(tag as u8);
    }

    // -- Tagged values --

    pub fn put_i32(&mut self, v: i32) {
        self.put_tag(Tag::I32);
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn put_i64(&mut self, v: i64) {
        self.put_tag(Tag::I64);
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    /// Writes an enum ordinal.
    pub fn put_ordinal(&mut self, v: u8) {
        self.put_tag(Tag::U8);
        self.buf.push(v);
    }

    pub fn put_bool(&mut self, v: bool) {
        self.put_tag(Tag::Bool);
        self.buf.push(u8::from(v));
    }

    pub fn put_f64(&mut self, v: f64) {
        self.put_tag(Tag::F64);
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn put_str(&mut self, v: &str) {
        self.put_tag(Tag::Str);
        self.put_u32(v.len() as u32);
        self.buf.extend_from_slice(v.as_bytes());
    }

    /// Writes a list header; the caller then writes `count` tagged values.
    pub fn begin_list(&mut self, count: u32) {
        self.put_tag(Tag::List);
        self.put_u32(count);
    }

    /// Writes a record header; the caller then writes `fields` tagged values.
    pub fn begin_record(&mut self, fields: u8) {
        self.put_tag(Tag::Record);
        self.buf.push(fields);
    }

    /// Writes a whole list of encodable values, order preserved.
    pub fn put_list<T: WireEncode>(&mut self, items: &[T]) {
        self.begin_list(items.len() as u32);
        for item in items {
            item.encode(self);
        }
    }
}

// ---------------------------------------------------------------------------
// ByteReader
// ---------------------------------------------------------------------------

/// Nesting limit for [`ByteReader::skip_value`]. Hostile input could
/// otherwise nest lists a few bytes at a time and blow the stack.
const MAX_SKIP_DEPTH: u32 = 16;

/// A bounds-checked cursor over an encoded byte slice.
///
/// Every read reports truncation as [`ProtocolError::MalformedData`];
/// the reader never panics on short input.
#[derive(Debug)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ProtocolError> {
        if self.remaining() < n {
            return Err(ProtocolError::malformed(format!(
                "unexpected end of input: wanted {n} more bytes, have {}",
                self.remaining()
            )));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    // -- Raw (untagged) primitives --

    pub fn get_u8(&mut self) -> Result<u8, ProtocolError> {
        Ok(self.take(1)?[0])
    }

    pub fn get_u32(&mut self) -> Result<u32, ProtocolError> {
        let bytes: [u8; 4] = self.take(4)?.try_into().unwrap();
        Ok(u32::from_be_bytes(bytes))
    }

    fn get_tag(&mut self) -> Result<Tag, ProtocolError> {
        Tag::from_byte(self.get_u8()?)
    }

    /// Reads the next tag without consuming it. Used by values that
    /// dispatch on their own tag (e.g. mod parameter values).
    pub fn peek_tag(&self) -> Result<Tag, ProtocolError> {
        match self.data.get(self.pos) {
            Some(&byte) => Tag::from_byte(byte),
            None => Err(ProtocolError::malformed(
                "unexpected end of input: wanted a type tag",
            )),
        }
    }

    /// Reads the next tag and checks it against the expected one.
    ///
    /// A mismatch means the sender and receiver disagree about the
    /// field's type, which is unrecoverable.
    pub fn expect_tag(&mut self, want: Tag, field: &str) -> Result<(), ProtocolError> {
        let got = self.get_tag()?;
        if got != want {
            return Err(ProtocolError::malformed(format!(
                "type tag mismatch for {field}: expected {want}, got {got}"
            )));
        }
        Ok(())
    }

    // -- Tagged values --

    pub fn get_i32(&mut self, field: &str) -> Result<i32, ProtocolError> {
        self.expect_tag(Tag::I32, field)?;
        let bytes: [u8; 4] = self.take(4)?.try_into().unwrap();
        Ok(i32::from_be_bytes(bytes))
    }

    pub fn get_i64(&mut self, field: &str) -> Result<i64, ProtocolError> {
        self.expect_tag(Tag::I64, field)?;
        let bytes: [u8; 8] = self.take(8)?.try_into().unwrap();
        Ok(i64::from_be_bytes(bytes))
    }

    /// Reads an enum ordinal. Mapping the ordinal onto a variant (and
    /// rejecting unknown ones) is the caller's job.
    pub fn get_ordinal(&mut self, field: &str) -> Result<u8, ProtocolError> {
        self.expect_tag(Tag::U8, field)?;
        self.get_u8()
    }

    pub fn get_bool(&mut self, field: &str) -> Result<bool, ProtocolError> {
        self.expect_tag(Tag::Bool, field)?;
        Ok(self.get_u8()? != 0)
    }

    pub fn get_f64(&mut self, field: &str) -> Result<f64, ProtocolError> {
        self.expect_tag(Tag::F64, field)?;
        let bytes: [u8; 8] = self.take(8)?.try_into().unwrap();
        Ok(f64::from_be_bytes(bytes))
    }

    pub fn get_str(&mut self, field: &str) -> Result<String, ProtocolError> {
        self.expect_tag(Tag::Str, field)?;
        let len = self.get_u32()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| ProtocolError::malformed(format!("{field} is not valid UTF-8")))
    }

    /// Reads a list header, returning the element count. The caller
    /// then reads that many tagged values.
    pub fn expect_list(&mut self, field: &str) -> Result<u32, ProtocolError> {
        self.expect_tag(Tag::List, field)?;
        self.get_u32()
    }

    /// Reads a record header, returning the field count. The caller
    /// decodes the fields it knows and [`Self::skip_value`]s the rest.
    pub fn expect_record(&mut self, field: &str) -> Result<u8, ProtocolError> {
        self.expect_tag(Tag::Record, field)?;
        self.get_u8()
    }

    /// Reads a whole list of decodable values, order preserved.
    pub fn get_list<T: WireDecode>(&mut self, field: &str) -> Result<Vec<T>, ProtocolError> {
        let count = self.expect_list(field)?;
        let mut out = Vec::new();
        for _ in 0..count {
            out.push(T::decode(self)?);
        }
        Ok(out)
    }

    /// Skips one complete tagged value, whatever its type.
    ///
    /// This is the forward-compatibility workhorse: fields appended by
    /// newer protocol versions are consumed here without being
    /// interpreted.
    pub fn skip_value(&mut self) -> Result<(), ProtocolError> {
        self.skip_value_inner(0)
    }

    fn skip_value_inner(&mut self, depth: u32) -> Result<(), ProtocolError> {
        if depth > MAX_SKIP_DEPTH {
            return Err(ProtocolError::malformed("value nesting too deep to skip"));
        }
        match self.get_tag()? {
            Tag::I32 => self.take(4).map(|_| ()),
            Tag::I64 | Tag::F64 => self.take(8).map(|_| ()),
            Tag::U8 | Tag::Bool => self.take(1).map(|_| ()),
            Tag::Str => {
                let len = self.get_u32()? as usize;
                self.take(len).map(|_| ())
            }
            Tag::List => {
                let count = self.get_u32()?;
                for _ in 0..count {
                    self.skip_value_inner(depth + 1)?;
                }
                Ok(())
            }
            Tag::Record => {
                let fields = self.get_u8()?;
                for _ in 0..fields {
                    self.skip_value_inner(depth + 1)?;
                }
                Ok(())
            }
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_round_trips() {
        let mut w = ByteWriter::new();
        w.put_i32(-42);
        w.put_i64(1 << 40);
        w.put_ordinal(3);
        w.put_bool(true);
        w.put_f64(1.5);
        w.put_str("hello");

        let bytes = w.into_bytes();
        let mut r = ByteReader::new(&bytes);
        assert_eq!(r.get_i32("a").unwrap(), -42);
        assert_eq!(r.get_i64("b").unwrap(), 1 << 40);
        assert_eq!(r.get_ordinal("c").unwrap(), 3);
        assert!(r.get_bool("d").unwrap());
        assert_eq!(r.get_f64("e").unwrap(), 1.5);
        assert_eq!(r.get_str("f").unwrap(), "hello");
        assert!(r.is_empty());
    }

    #[test]
    fn test_truncated_input_is_malformed() {
        let mut w = ByteWriter::new();
        w.put_i64(99);
        let mut bytes = w.into_bytes();
        bytes.truncate(bytes.len() - 2);

        let mut r = ByteReader::new(&bytes);
        let err = r.get_i64("x").unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedData(_)));
    }

    #[test]
    fn test_tag_mismatch_is_malformed() {
        let mut w = ByteWriter::new();
        w.put_str("oops");
        let bytes = w.into_bytes();

        let mut r = ByteReader::new(&bytes);
        let err = r.get_i32("field").unwrap_err();
        match err {
            ProtocolError::MalformedData(msg) => {
                assert!(msg.contains("field"), "message should name the field: {msg}");
            }
            other => panic!("expected MalformedData, got {other:?}"),
        }
    }

    #[test]
    fn test_unrecognized_tag_byte_is_malformed() {
        let mut r = ByteReader::new(&[0xff, 0x00]);
        assert!(matches!(
            r.skip_value(),
            Err(ProtocolError::MalformedData(_))
        ));
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        // Str tag, length 2, invalid continuation bytes.
        let bytes = [Tag::Str as u8, 0, 0, 0, 2, 0xc3, 0x28];
        let mut r = ByteReader::new(&bytes);
        assert!(matches!(
            r.get_str("name"),
            Err(ProtocolError::MalformedData(_))
        ));
    }

    #[test]
    fn test_skip_value_consumes_nested_structures() {
        let mut w = ByteWriter::new();
        // A record of (string, list of two i32s), followed by a sentinel.
        w.begin_record(2);
        w.put_str("ignored");
        w.begin_list(2);
        w.put_i32(1);
        w.put_i32(2);
        w.put_i32(777);

        let bytes = w.into_bytes();
        let mut r = ByteReader::new(&bytes);
        r.skip_value().unwrap();
        assert_eq!(r.get_i32("sentinel").unwrap(), 777);
        assert!(r.is_empty());
    }

    #[test]
    fn test_skip_value_rejects_absurd_nesting() {
        // Each level is a one-element list; far past MAX_SKIP_DEPTH.
        let mut bytes = Vec::new();
        for _ in 0..64 {
            bytes.push(Tag::List as u8);
            bytes.extend_from_slice(&1u32.to_be_bytes());
        }
        bytes.push(Tag::Bool as u8);
        bytes.push(1);

        let mut r = ByteReader::new(&bytes);
        assert!(matches!(
            r.skip_value(),
            Err(ProtocolError::MalformedData(_))
        ));
    }

    #[test]
    fn test_string_length_beyond_input_is_malformed() {
        // Claims 1000 bytes but provides 3.
        let mut bytes = vec![Tag::Str as u8];
        bytes.extend_from_slice(&1000u32.to_be_bytes());
        bytes.extend_from_slice(b"abc");

        let mut r = ByteReader::new(&bytes);
        assert!(matches!(
            r.get_str("s"),
            Err(ProtocolError::MalformedData(_))
        ));
    }
}
