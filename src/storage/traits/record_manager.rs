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

//! Record manager trait and index key ranges

use std::cmp::Ordering;
use std::fmt;

use crate::core::{Attribute, Result, Tuple, Value};

use super::scanner::{IndexScanner, RecordScanner, RowId};

/// Bounds of an index range scan
///
/// An absent bound is unbounded on that side. Inclusivity flags are ignored
/// for absent bounds.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeyRange {
    pub low: Option<Value>,
    pub high: Option<Value>,
    pub low_inclusive: bool,
    pub high_inclusive: bool,
}

impl KeyRange {
    /// `(-inf, +inf)`
    pub fn all() -> Self {
        Self::default()
    }

    /// `[v, v]`
    pub fn point(value: Value) -> Self {
        Self {
            low: Some(value.clone()),
            high: Some(value),
            low_inclusive: true,
            high_inclusive: true,
        }
    }

    /// `(v, +inf)` or `[v, +inf)`
    pub fn above(value: Value, inclusive: bool) -> Self {
        Self {
            low: Some(value),
            high: None,
            low_inclusive: inclusive,
            high_inclusive: false,
        }
    }

    /// `(-inf, v)` or `(-inf, v]`
    pub fn below(value: Value, inclusive: bool) -> Self {
        Self {
            low: None,
            high: Some(value),
            low_inclusive: false,
            high_inclusive: inclusive,
        }
    }

    /// Both bounds given
    pub fn between(low: Value, low_inclusive: bool, high: Value, high_inclusive: bool) -> Self {
        Self {
            low: Some(low),
            high: Some(high),
            low_inclusive,
            high_inclusive,
        }
    }

    /// Returns true if neither side is bounded
    pub fn is_full(&self) -> bool {
        self.low.is_none() && self.high.is_none()
    }

    /// Check whether `value` lies inside the range
    pub fn contains(&self, value: &Value) -> Result<bool> {
        if let Some(low) = &self.low {
            match value.compare(low)? {
                Ordering::Less => return Ok(false),
                Ordering::Equal if !self.low_inclusive => return Ok(false),
                _ => {}
            }
        }
        if let Some(high) = &self.high {
            match value.compare(high)? {
                Ordering::Greater => return Ok(false),
                Ordering::Equal if !self.high_inclusive => return Ok(false),
                _ => {}
            }
        }
        Ok(true)
    }
}

impl fmt::Display for KeyRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.low {
            Some(v) if self.low_inclusive => write!(f, "[{}", v)?,
            Some(v) => write!(f, "({}", v)?,
            None => write!(f, "(-inf")?,
        }
        match &self.high {
            Some(v) if self.high_inclusive => write!(f, ", {}]", v),
            Some(v) => write!(f, ", {})", v),
            None => write!(f, ", +inf)"),
        }
    }
}

/// Storage collaborator the operators read relations through
///
/// Implementations are shared behind `Arc<dyn RecordManager>` by every scan
/// adapter of an operator tree.
pub trait RecordManager: Send + Sync {
    /// Schema of `table`, with unqualified attribute names
    fn attributes(&self, table: &str) -> Result<Vec<Attribute>>;

    /// Open a full scan of `table`
    fn scan(&self, table: &str) -> Result<Box<dyn RecordScanner>>;

    /// Fetch one record by row id
    fn read_tuple(&self, table: &str, rid: RowId) -> Result<Tuple>;

    /// Open a range scan over the index on `table.attribute`
    fn index_scan(
        &self,
        table: &str,
        attribute: &str,
        range: KeyRange,
    ) -> Result<Box<dyn IndexScanner>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Error;

    #[test]
    fn test_contains() {
        let r = KeyRange::between(Value::integer(2), true, Value::integer(5), false);
        assert!(!r.contains(&Value::integer(1)).unwrap());
        assert!(r.contains(&Value::integer(2)).unwrap());
        assert!(r.contains(&Value::integer(4)).unwrap());
        assert!(!r.contains(&Value::integer(5)).unwrap());

        assert!(KeyRange::all().contains(&Value::text("x")).unwrap());
        assert!(KeyRange::point(Value::text("A"))
            .contains(&Value::text("A"))
            .unwrap());
        assert!(!KeyRange::above(Value::real(1.0), false)
            .contains(&Value::real(1.0))
            .unwrap());
        assert!(KeyRange::below(Value::real(1.0), true)
            .contains(&Value::real(1.0))
            .unwrap());
    }

    #[test]
    fn test_contains_type_mismatch() {
        let r = KeyRange::point(Value::integer(1));
        assert!(matches!(
            r.contains(&Value::text("1")),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(KeyRange::all().to_string(), "(-inf, +inf)");
        assert_eq!(KeyRange::point(Value::integer(3)).to_string(), "[3, 3]");
        assert_eq!(
            KeyRange::above(Value::integer(3), false).to_string(),
            "(3, +inf)"
        );
    }
}
