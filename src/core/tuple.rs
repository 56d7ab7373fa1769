// Copyright 2025 Stoolap Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Tuple buffers and the binary tuple layout
//!
//! # Layout
//!
//! Fields follow schema order with no header, padding, or terminator:
//!
//! ```text
//! INTEGER  [i32 LE: 4 bytes]
//! REAL     [f32 LE: 4 bytes]
//! TEXT     [len u32 LE: 4 bytes][len bytes of content]
//! ```
//!
//! The same encoding is used for full tuples and for single literal values,
//! so a field can be sliced out of a tuple and compared byte-for-byte with an
//! encoded literal.

use std::ops::Range;
use std::sync::Arc;

use super::attribute::Attribute;
use super::error::{Error, Result};
use super::types::DataType;
use super::value::Value;

/// Default upper bound on an encoded tuple, one 4 KiB page
pub const DEFAULT_MAX_TUPLE_SIZE: usize = 4096;

/// An owned, encoded tuple
///
/// The buffer holds exactly the encoded bytes, so `len()` is always the
/// encoded length of the record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Tuple {
    data: Vec<u8>,
}

impl Tuple {
    /// Create an empty tuple buffer
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Wrap already-encoded bytes
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Concatenate the fields of `left` and `right` (join output)
    pub fn concat(left: &Tuple, right: &Tuple) -> Self {
        let mut data = Vec::with_capacity(left.len() + right.len());
        data.extend_from_slice(&left.data);
        data.extend_from_slice(&right.data);
        Self { data }
    }

    /// Replace the contents with a copy of `other`, reusing the allocation
    pub fn copy_from(&mut self, other: &Tuple) {
        self.data.clear();
        self.data.extend_from_slice(&other.data);
    }

    /// The encoded bytes
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Encoded length in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true for a zero-length tuple
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Take the encoded bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Append the encoding of one value to `buf`
pub fn encode_value(value: &Value, buf: &mut Vec<u8>) {
    match value {
        Value::Integer(v) => buf.extend_from_slice(&v.to_le_bytes()),
        Value::Real(v) => buf.extend_from_slice(&v.to_le_bytes()),
        Value::Text(b) => {
            buf.extend_from_slice(&(b.len() as u32).to_le_bytes());
            buf.extend_from_slice(b);
        }
    }
}

/// Decode one value of type `data_type` starting at `offset`.
///
/// Returns the value and the offset just past it.
pub fn decode_value(data_type: DataType, bytes: &[u8], offset: usize) -> Result<(Value, usize)> {
    let word = read_word(bytes, offset)?;
    match data_type {
        DataType::Integer => Ok((Value::Integer(i32::from_le_bytes(word)), offset + 4)),
        DataType::Real => Ok((Value::Real(f32::from_le_bytes(word)), offset + 4)),
        DataType::Text => {
            let len = u32::from_le_bytes(word) as usize;
            let start = offset + 4;
            let end = start
                .checked_add(len)
                .filter(|end| *end <= bytes.len())
                .ok_or_else(|| {
                    Error::corrupt_tuple(format!(
                        "text of {} bytes at offset {} overruns {}-byte tuple",
                        len,
                        offset,
                        bytes.len()
                    ))
                })?;
            Ok((Value::Text(Arc::from(&bytes[start..end])), end))
        }
    }
}

/// Byte length of the field of type `data_type` starting at `offset`
fn field_len(data_type: DataType, bytes: &[u8], offset: usize) -> Result<usize> {
    match data_type.fixed_width() {
        Some(w) => {
            if offset + w > bytes.len() {
                return Err(Error::corrupt_tuple(format!(
                    "field at offset {} overruns {}-byte tuple",
                    offset,
                    bytes.len()
                )));
            }
            Ok(w)
        }
        None => {
            let len = u32::from_le_bytes(read_word(bytes, offset)?) as usize;
            if offset + 4 + len > bytes.len() {
                return Err(Error::corrupt_tuple(format!(
                    "text of {} bytes at offset {} overruns {}-byte tuple",
                    len,
                    offset,
                    bytes.len()
                )));
            }
            Ok(4 + len)
        }
    }
}

#[inline]
fn read_word(bytes: &[u8], offset: usize) -> Result<[u8; 4]> {
    bytes
        .get(offset..offset + 4)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| {
            Error::corrupt_tuple(format!(
                "4-byte read at offset {} overruns {}-byte tuple",
                offset,
                bytes.len()
            ))
        })
}

/// Schema-bound tuple codec
#[derive(Debug, Clone)]
pub struct TupleLayout {
    attrs: Vec<Attribute>,
    max_tuple_size: usize,
}

impl TupleLayout {
    /// Create a layout for `attrs` with the default size limit
    pub fn new(attrs: &[Attribute]) -> Self {
        Self {
            attrs: attrs.to_vec(),
            max_tuple_size: DEFAULT_MAX_TUPLE_SIZE,
        }
    }

    /// Builder method to set the maximum encoded tuple size
    pub fn with_max_tuple_size(mut self, max: usize) -> Self {
        self.max_tuple_size = max;
        self
    }

    /// The schema this layout encodes
    pub fn attributes(&self) -> &[Attribute] {
        &self.attrs
    }

    /// Maximum encoded tuple size
    pub fn max_tuple_size(&self) -> usize {
        self.max_tuple_size
    }

    /// Fail with `TupleTooLarge` if `size` exceeds the limit
    #[inline]
    pub fn check_size(&self, size: usize) -> Result<()> {
        if size > self.max_tuple_size {
            return Err(Error::TupleTooLarge {
                size,
                max: self.max_tuple_size,
            });
        }
        Ok(())
    }

    /// Encode a row of values
    pub fn encode(&self, values: &[Value]) -> Result<Tuple> {
        if values.len() != self.attrs.len() {
            return Err(Error::ArityMismatch {
                expected: self.attrs.len(),
                got: values.len(),
            });
        }

        let size: usize = values.iter().map(Value::encoded_len).sum();
        self.check_size(size)?;

        let mut buf = Vec::with_capacity(size);
        for (value, attr) in values.iter().zip(&self.attrs) {
            value.expect_type(attr.data_type)?;
            if let Value::Text(b) = value {
                if b.len() > attr.length {
                    return Err(Error::value_too_long(&attr.name, attr.length, b.len()));
                }
            }
            encode_value(value, &mut buf);
        }
        Ok(Tuple::from_bytes(buf))
    }

    /// Decode every field of `tuple`
    ///
    /// The tuple must be exactly as long as its fields.
    pub fn decode(&self, tuple: &Tuple) -> Result<Vec<Value>> {
        let bytes = tuple.as_bytes();
        let mut offset = 0;
        let mut values = Vec::with_capacity(self.attrs.len());
        for attr in &self.attrs {
            let (value, next) = decode_value(attr.data_type, bytes, offset)?;
            values.push(value);
            offset = next;
        }
        if offset != bytes.len() {
            return Err(Error::corrupt_tuple(format!(
                "{} trailing bytes after last field",
                bytes.len() - offset
            )));
        }
        Ok(values)
    }

    /// Byte span of field `idx` inside `tuple`
    pub fn field_span(&self, tuple: &Tuple, idx: usize) -> Result<Range<usize>> {
        if idx >= self.attrs.len() {
            return Err(Error::internal(format!(
                "field {} out of bounds for {}-field layout",
                idx,
                self.attrs.len()
            )));
        }
        let bytes = tuple.as_bytes();
        let mut offset = 0;
        for attr in &self.attrs[..idx] {
            offset += field_len(attr.data_type, bytes, offset)?;
        }
        let len = field_len(self.attrs[idx].data_type, bytes, offset)?;
        Ok(offset..offset + len)
    }

    /// Decode field `idx` of `tuple`
    pub fn field(&self, tuple: &Tuple, idx: usize) -> Result<Value> {
        let span = self.field_span(tuple, idx)?;
        let (value, _) = decode_value(self.attrs[idx].data_type, tuple.as_bytes(), span.start)?;
        Ok(value)
    }

    /// Number of bytes the tuple encoded at the front of `bytes` occupies
    pub fn encoded_len(&self, bytes: &[u8]) -> Result<usize> {
        let mut offset = 0;
        for attr in &self.attrs {
            offset += field_len(attr.data_type, bytes, offset)?;
        }
        Ok(offset)
    }

    /// Build a new tuple from the fields at `indices`, in that order
    ///
    /// Fields are copied byte-for-byte, length prefix included.
    pub fn project(&self, tuple: &Tuple, indices: &[usize]) -> Result<Tuple> {
        let bytes = tuple.as_bytes();
        let mut spans = Vec::with_capacity(self.attrs.len());
        let mut offset = 0;
        for attr in &self.attrs {
            let len = field_len(attr.data_type, bytes, offset)?;
            spans.push(offset..offset + len);
            offset += len;
        }

        let mut out = Vec::with_capacity(bytes.len());
        for &idx in indices {
            let span = spans.get(idx).cloned().ok_or_else(|| {
                Error::internal(format!(
                    "field {} out of bounds for {}-field layout",
                    idx,
                    self.attrs.len()
                ))
            })?;
            out.extend_from_slice(&bytes[span]);
        }
        self.check_size(out.len())?;
        Ok(Tuple::from_bytes(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emp_layout() -> TupleLayout {
        TupleLayout::new(&[
            Attribute::integer("id"),
            Attribute::text("dept", 8),
            Attribute::real("sal"),
        ])
    }

    fn emp_row(id: i32, dept: &str, sal: f32) -> Vec<Value> {
        vec![Value::integer(id), Value::text(dept), Value::real(sal)]
    }

    #[test]
    fn test_byte_layout() {
        let tuple = emp_layout().encode(&emp_row(1, "AB", 2.0)).unwrap();
        let mut expected = Vec::new();
        expected.extend_from_slice(&1i32.to_le_bytes());
        expected.extend_from_slice(&2u32.to_le_bytes());
        expected.extend_from_slice(b"AB");
        expected.extend_from_slice(&2.0f32.to_le_bytes());
        assert_eq!(tuple.as_bytes(), expected.as_slice());
        assert_eq!(tuple.len(), 14);
    }

    #[test]
    fn test_decode_and_field_access() {
        let layout = emp_layout();
        let row = emp_row(7, "sales", 12.5);
        let tuple = layout.encode(&row).unwrap();

        assert_eq!(layout.decode(&tuple).unwrap(), row);
        assert_eq!(layout.field(&tuple, 1).unwrap(), Value::text("sales"));
        assert_eq!(layout.field(&tuple, 2).unwrap(), Value::real(12.5));
        assert_eq!(layout.field_span(&tuple, 1).unwrap(), 4..13);
        assert!(layout.field(&tuple, 3).is_err());
    }

    #[test]
    fn test_empty_text_field() {
        let layout = emp_layout();
        let tuple = layout.encode(&emp_row(1, "", 0.0)).unwrap();
        assert_eq!(tuple.len(), 12);
        assert_eq!(layout.field(&tuple, 1).unwrap(), Value::text(""));
    }

    #[test]
    fn test_encode_rejects_bad_rows() {
        let layout = emp_layout();
        assert!(matches!(
            layout.encode(&[Value::integer(1)]),
            Err(Error::ArityMismatch { expected: 3, got: 1 })
        ));
        assert!(matches!(
            layout.encode(&[Value::text("x"), Value::text("A"), Value::real(1.0)]),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            layout.encode(&emp_row(1, "far too long", 1.0)),
            Err(Error::ValueTooLong { .. })
        ));
    }

    #[test]
    fn test_max_tuple_size() {
        let layout = emp_layout().with_max_tuple_size(10);
        assert_eq!(
            layout.encode(&emp_row(1, "AB", 1.0)),
            Err(Error::TupleTooLarge { size: 14, max: 10 })
        );
    }

    #[test]
    fn test_decode_rejects_corrupt_bytes() {
        let layout = emp_layout();
        let mut bytes = layout.encode(&emp_row(1, "AB", 1.0)).unwrap().into_bytes();

        let truncated = Tuple::from_bytes(bytes[..10].to_vec());
        assert!(matches!(layout.decode(&truncated), Err(Error::CorruptTuple(_))));

        bytes.push(0);
        assert!(matches!(
            layout.decode(&Tuple::from_bytes(bytes)),
            Err(Error::CorruptTuple(_))
        ));
    }

    #[test]
    fn test_encoded_len_of_prefix() {
        let layout = emp_layout();
        let first = layout.encode(&emp_row(1, "A", 1.0)).unwrap();
        let second = layout.encode(&emp_row(2, "BCD", 2.0)).unwrap();
        let joined = Tuple::concat(&first, &second);
        assert_eq!(layout.encoded_len(joined.as_bytes()).unwrap(), first.len());
    }

    #[test]
    fn test_project_reorders_fields() {
        let layout = emp_layout();
        let tuple = layout.encode(&emp_row(3, "B", 5.0)).unwrap();
        let projected = layout.project(&tuple, &[2, 1]).unwrap();

        let out = TupleLayout::new(&[Attribute::real("sal"), Attribute::text("dept", 8)]);
        assert_eq!(
            out.decode(&projected).unwrap(),
            vec![Value::real(5.0), Value::text("B")]
        );
    }

    #[test]
    fn test_copy_from_reuses_buffer() {
        let layout = emp_layout();
        let src = layout.encode(&emp_row(1, "A", 1.0)).unwrap();
        let mut dst = Tuple::from_bytes(vec![9; 64]);
        dst.copy_from(&src);
        assert_eq!(dst, src);
        assert_eq!(dst.len(), src.len());
    }
}
