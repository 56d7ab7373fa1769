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

//! Volcano-style operator interface for pull-based execution.
//!
//! Operators pull encoded tuples from their children on demand. Only the
//! blocking operators (block nested-loop join, hash join, aggregate)
//! materialize input, and each owns what it buffers.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │ Consumer     │ ← Pulls tuples via next()
//! └──────┬───────┘
//!        │
//! ┌──────▼───────┐
//! │ Join Op      │ ← Buffers a block, a partition, or nothing
//! └──────┬───────┘
//!        │
//! ┌──────┴──────┐
//! │             │
//! ▼             ▼
//! ┌─────┐   ┌─────┐
//! │Scan │   │Scan │ ← Stream tuples from the record manager
//! └─────┘   └─────┘
//! ```

use crate::core::{Attribute, Error, Result, Tuple, TupleLayout, Value};

/// Volcano-style iterator interface for physical operators.
///
/// The execution follows the open-next-close pattern:
///
/// 1. `open()` - Initialize the operator (called once)
/// 2. `next()` - Get the next tuple (called repeatedly until None)
/// 3. `close()` - Release resources (called once at end)
///
/// # Thread Safety
///
/// Operators are `Send` so a tree can be moved to another thread,
/// but individual operators are not `Sync` - they maintain mutable state.
pub trait Operator: Send {
    /// Initialize the operator.
    ///
    /// Child operators are opened here. Calling `next()` on an operator
    /// that was never opened fails with `Error::NotOpen`.
    fn open(&mut self) -> Result<()>;

    /// Get the next tuple from this operator.
    ///
    /// Returns:
    /// - `Ok(Some(tuple))` - A tuple is available
    /// - `Ok(None)` - No more tuples (exhausted)
    /// - `Err(e)` - An error occurred
    ///
    /// After returning `None`, subsequent calls continue to return `None`.
    fn next(&mut self) -> Result<Option<Tuple>>;

    /// Move the next tuple into `out`.
    ///
    /// Returns `false` at end of stream and leaves `out` untouched.
    fn next_into(&mut self, out: &mut Tuple) -> Result<bool> {
        match self.next()? {
            Some(tuple) => {
                *out = tuple;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Close the operator and release resources.
    ///
    /// Children are closed before any handle the operator opened itself.
    fn close(&mut self) -> Result<()>;

    /// Ordered output schema.
    fn schema(&self) -> &[Attribute];

    /// Short operator label for log events.
    fn name(&self) -> &str;
}

/// Empty operator that produces no tuples.
pub struct EmptyOperator {
    schema: Vec<Attribute>,
    opened: bool,
}

impl EmptyOperator {
    /// Create an empty operator with the given schema.
    pub fn new(schema: Vec<Attribute>) -> Self {
        Self {
            schema,
            opened: false,
        }
    }
}

impl Operator for EmptyOperator {
    fn open(&mut self) -> Result<()> {
        self.opened = true;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>> {
        if !self.opened {
            return Err(Error::not_open(self.name()));
        }
        Ok(None)
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    fn schema(&self) -> &[Attribute] {
        &self.schema
    }

    fn name(&self) -> &str {
        "Empty"
    }
}

/// Operator over pre-encoded tuples.
///
/// Used as a leaf for intermediate results and in tests.
pub struct MaterializedOperator {
    tuples: Vec<Tuple>,
    schema: Vec<Attribute>,
    current_idx: usize,
    opened: bool,
}

impl MaterializedOperator {
    /// Create a materialized operator from encoded tuples.
    pub fn new(tuples: Vec<Tuple>, schema: Vec<Attribute>) -> Self {
        Self {
            tuples,
            schema,
            current_idx: 0,
            opened: false,
        }
    }

    /// Encode `rows` under `schema`.
    pub fn from_values(schema: Vec<Attribute>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let layout = TupleLayout::new(&schema);
        let tuples = rows
            .iter()
            .map(|row| layout.encode(row))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(tuples, schema))
    }

    /// Number of tuples not yet produced.
    pub fn remaining(&self) -> usize {
        self.tuples.len() - self.current_idx
    }
}

impl Operator for MaterializedOperator {
    fn open(&mut self) -> Result<()> {
        self.opened = true;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>> {
        if !self.opened {
            return Err(Error::not_open(self.name()));
        }
        if self.current_idx >= self.tuples.len() {
            return Ok(None);
        }

        // Each tuple is yielded once; take it instead of cloning.
        let tuple = std::mem::take(&mut self.tuples[self.current_idx]);
        self.current_idx += 1;
        Ok(Some(tuple))
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    fn schema(&self) -> &[Attribute] {
        &self.schema
    }

    fn name(&self) -> &str {
        "Materialized"
    }
}

/// Drain an operator tree: open, pull until end of stream, close.
pub fn collect_tuples(op: &mut dyn Operator) -> Result<Vec<Tuple>> {
    op.open()?;
    let mut out = Vec::new();
    while let Some(tuple) = op.next()? {
        out.push(tuple);
    }
    op.close()?;
    Ok(out)
}

/// Drain an operator tree and decode every tuple under its schema.
pub fn collect_values(op: &mut dyn Operator) -> Result<Vec<Vec<Value>>> {
    let tuples = collect_tuples(op)?;
    let layout = TupleLayout::new(op.schema());
    tuples.iter().map(|t| layout.decode(t)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Vec<Attribute> {
        vec![Attribute::integer("t.id"), Attribute::text("t.name", 8)]
    }

    #[test]
    fn test_empty_operator() {
        let mut op = EmptyOperator::new(schema());
        assert!(matches!(op.next(), Err(Error::NotOpen(_))));
        op.open().unwrap();
        assert!(op.next().unwrap().is_none());
        assert!(op.next().unwrap().is_none());
        assert_eq!(op.schema().len(), 2);
        op.close().unwrap();
    }

    #[test]
    fn test_materialized_operator() {
        let rows = vec![
            vec![Value::integer(1), Value::text("Alice")],
            vec![Value::integer(2), Value::text("Bob")],
        ];
        let mut op = MaterializedOperator::from_values(schema(), rows.clone()).unwrap();
        assert!(matches!(op.next(), Err(Error::NotOpen(_))));

        assert_eq!(collect_values(&mut op).unwrap(), rows);
        assert_eq!(op.remaining(), 0);
        // end of stream is sticky
        assert!(op.next().unwrap().is_none());
    }

    #[test]
    fn test_next_into() {
        let mut op = MaterializedOperator::from_values(
            schema(),
            vec![vec![Value::integer(7), Value::text("x")]],
        )
        .unwrap();
        op.open().unwrap();

        let mut buf = Tuple::new();
        assert!(op.next_into(&mut buf).unwrap());
        let first = buf.clone();
        assert!(!op.next_into(&mut buf).unwrap());
        assert_eq!(buf, first);
        assert_eq!(
            TupleLayout::new(&schema()).field(&buf, 0).unwrap(),
            Value::integer(7)
        );
    }

    #[test]
    fn test_from_values_rejects_bad_rows() {
        assert!(MaterializedOperator::from_values(schema(), vec![vec![Value::integer(1)]]).is_err());
    }
}
