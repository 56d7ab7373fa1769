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

//! Value type for relexec - typed scalars with per-type ordering
//!
//! A [`Value`] is one field of a tuple. Ordering is only defined between
//! values of the same [`DataType`]; [`Value::compare`] rejects everything else
//! instead of inventing an order.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use super::error::{Error, Result};
use super::types::DataType;

/// A runtime value with type information
///
/// Text is stored as raw bytes (not necessarily UTF-8) behind an `Arc` so
/// that cloning values out of buffered tuples stays cheap.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// 32-bit signed integer
    Integer(i32),

    /// 32-bit floating point
    Real(f32),

    /// Byte string, compared lexicographically
    Text(Arc<[u8]>),
}

impl Value {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Create an integer value
    pub fn integer(value: i32) -> Self {
        Value::Integer(value)
    }

    /// Create a real value
    pub fn real(value: f32) -> Self {
        Value::Real(value)
    }

    /// Create a text value
    pub fn text(value: impl AsRef<[u8]>) -> Self {
        Value::Text(Arc::from(value.as_ref()))
    }

    // =========================================================================
    // Type accessors
    // =========================================================================

    /// Returns the data type of this value
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Integer(_) => DataType::Integer,
            Value::Real(_) => DataType::Real,
            Value::Text(_) => DataType::Text,
        }
    }

    /// Returns the integer payload, if this is an INTEGER
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the real payload, if this is a REAL
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::Real(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns any numeric value widened to f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(v) => Some(*v as f64),
            Value::Real(v) => Some(*v as f64),
            Value::Text(_) => None,
        }
    }

    /// Returns the text payload, if this is TEXT
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Text(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the text payload as `&str` when it is valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Number of bytes this value occupies in the tuple layout
    pub fn encoded_len(&self) -> usize {
        match self {
            Value::Integer(_) | Value::Real(_) => 4,
            Value::Text(b) => 4 + b.len(),
        }
    }

    // =========================================================================
    // Comparison
    // =========================================================================

    /// Compare two values of the same type
    ///
    /// Returns:
    /// - Ok(ordering) for two INTEGERs, two finite REALs, or two TEXTs
    /// - Err(TypeMismatch) when the types differ
    /// - Err(NonFiniteReal) when either REAL is NaN or infinite
    pub fn compare(&self, other: &Value) -> Result<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Ok(a.cmp(b)),
            (Value::Real(a), Value::Real(b)) => {
                if !a.is_finite() || !b.is_finite() {
                    return Err(Error::NonFiniteReal);
                }
                // both finite, so partial_cmp is total here
                Ok(a.partial_cmp(b).unwrap_or(Ordering::Equal))
            }
            (Value::Text(a), Value::Text(b)) => Ok(a.as_ref().cmp(b.as_ref())),
            _ => Err(Error::type_mismatch(self.data_type(), other.data_type())),
        }
    }

    /// Check that this value has the given type
    pub fn expect_type(&self, expected: DataType) -> Result<()> {
        if self.data_type() == expected {
            Ok(())
        } else {
            Err(Error::type_mismatch(expected, self.data_type()))
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::Real(v) => write!(f, "{}", v),
            Value::Text(b) => write!(f, "{}", String::from_utf8_lossy(b)),
        }
    }
}

// =========================================================================
// From implementations for convenient construction
// =========================================================================

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::text(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Text(Arc::from(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(Value::integer(7).data_type(), DataType::Integer);
        assert_eq!(Value::real(1.5).data_type(), DataType::Real);
        assert_eq!(Value::text("abc").data_type(), DataType::Text);
        assert_eq!(Value::from("abc"), Value::text(b"abc"));
        assert_eq!(Value::from(vec![0xffu8, 0x00]).as_bytes(), Some(&[0xff, 0x00][..]));
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::integer(3).as_f64(), Some(3.0));
        assert_eq!(Value::real(2.5).as_f64(), Some(2.5));
        assert_eq!(Value::text("x").as_f64(), None);
        assert_eq!(Value::text("hello").as_str(), Some("hello"));
        assert_eq!(Value::integer(3).as_str(), None);
    }

    #[test]
    fn test_encoded_len() {
        assert_eq!(Value::integer(1).encoded_len(), 4);
        assert_eq!(Value::real(1.0).encoded_len(), 4);
        assert_eq!(Value::text("abcd").encoded_len(), 8);
        assert_eq!(Value::text("").encoded_len(), 4);
    }

    #[test]
    fn test_compare_integers() {
        assert_eq!(Value::integer(1).compare(&Value::integer(2)).unwrap(), Ordering::Less);
        assert_eq!(Value::integer(-5).compare(&Value::integer(-5)).unwrap(), Ordering::Equal);
    }

    #[test]
    fn test_compare_reals() {
        assert_eq!(Value::real(2.5).compare(&Value::real(1.0)).unwrap(), Ordering::Greater);
        assert_eq!(Value::real(-0.0).compare(&Value::real(0.0)).unwrap(), Ordering::Equal);
        assert_eq!(
            Value::real(f32::NAN).compare(&Value::real(1.0)),
            Err(Error::NonFiniteReal)
        );
        assert_eq!(
            Value::real(1.0).compare(&Value::real(f32::INFINITY)),
            Err(Error::NonFiniteReal)
        );
    }

    #[test]
    fn test_compare_text_is_bytewise() {
        assert_eq!(Value::text("A").compare(&Value::text("B")).unwrap(), Ordering::Less);
        assert_eq!(Value::text("ab").compare(&Value::text("a")).unwrap(), Ordering::Greater);
        // uppercase sorts before lowercase in byte order
        assert_eq!(Value::text("Z").compare(&Value::text("a")).unwrap(), Ordering::Less);
    }

    #[test]
    fn test_compare_cross_type_is_rejected() {
        let err = Value::integer(1).compare(&Value::real(1.0)).unwrap_err();
        assert_eq!(err, Error::type_mismatch(DataType::Integer, DataType::Real));
        assert!(Value::text("1").compare(&Value::integer(1)).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::integer(42).to_string(), "42");
        assert_eq!(Value::real(2.5).to_string(), "2.5");
        assert_eq!(Value::text("dept").to_string(), "dept");
    }
}
