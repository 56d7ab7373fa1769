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

//! Attribute (column) descriptors and schema lookups

use std::fmt;

use super::error::{Error, Result};
use super::types::DataType;

/// A column descriptor: name, declared type, and nominal byte width.
///
/// For INTEGER and REAL the width is always 4. For TEXT it is the declared
/// maximum length of the content, excluding the 4-byte length prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    /// Column name, `relation.column` once it has passed through a scan
    pub name: String,
    /// Declared type
    pub data_type: DataType,
    /// Nominal width in bytes
    pub length: usize,
}

impl Attribute {
    /// Create an attribute
    pub fn new(name: impl Into<String>, data_type: DataType, length: usize) -> Self {
        Self {
            name: name.into(),
            data_type,
            length,
        }
    }

    /// INTEGER attribute
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, DataType::Integer, 4)
    }

    /// REAL attribute
    pub fn real(name: impl Into<String>) -> Self {
        Self::new(name, DataType::Real, 4)
    }

    /// TEXT attribute holding at most `max_len` bytes
    pub fn text(name: impl Into<String>, max_len: usize) -> Self {
        Self::new(name, DataType::Text, max_len)
    }

    /// Copy of this attribute renamed to `prefix.name`
    pub fn qualified(&self, prefix: &str) -> Self {
        Self {
            name: format!("{}.{}", prefix, self.name),
            data_type: self.data_type,
            length: self.length,
        }
    }

    /// Largest number of bytes a field of this attribute can occupy
    pub fn max_encoded_len(&self) -> usize {
        match self.data_type.fixed_width() {
            Some(w) => w,
            None => 4 + self.length,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}({})", self.name, self.data_type, self.length)
    }
}

/// Position of the attribute called `name` in `attrs`
pub fn position_of(attrs: &[Attribute], name: &str) -> Result<usize> {
    attrs
        .iter()
        .position(|a| a.name == name)
        .ok_or_else(|| Error::column_not_found(name))
}

/// The attribute called `name` in `attrs`, with its position
pub fn find_attribute<'a>(attrs: &'a [Attribute], name: &str) -> Result<(usize, &'a Attribute)> {
    let idx = position_of(attrs, name)?;
    Ok((idx, &attrs[idx]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emp() -> Vec<Attribute> {
        vec![
            Attribute::integer("emp.id"),
            Attribute::text("emp.dept", 16),
            Attribute::real("emp.sal"),
        ]
    }

    #[test]
    fn test_constructors() {
        let a = Attribute::text("name", 30);
        assert_eq!(a.data_type, DataType::Text);
        assert_eq!(a.length, 30);
        assert_eq!(a.max_encoded_len(), 34);
        assert_eq!(Attribute::real("x").max_encoded_len(), 4);
    }

    #[test]
    fn test_qualified() {
        let a = Attribute::integer("id").qualified("emp");
        assert_eq!(a.name, "emp.id");
        assert_eq!(a.data_type, DataType::Integer);
    }

    #[test]
    fn test_lookup() {
        let attrs = emp();
        assert_eq!(position_of(&attrs, "emp.sal").unwrap(), 2);
        let (idx, attr) = find_attribute(&attrs, "emp.dept").unwrap();
        assert_eq!(idx, 1);
        assert_eq!(attr.data_type, DataType::Text);
        assert_eq!(
            position_of(&attrs, "sal"),
            Err(Error::column_not_found("sal"))
        );
    }
}
