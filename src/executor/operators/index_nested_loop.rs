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

//! Index Nested Loop Join Operator.
//!
//! This operator implements index nested loop join with O(N * log M) complexity
//! by re-targeting an index range scan on the inner relation once per outer
//! tuple. The scanned ranges are derived from the comparator and the outer
//! join value, so the inner relation is never read outside the rows that can
//! match:
//!
//! | op   | ranges on the indexed attribute `r` for outer value `v` |
//! |------|---------------------------------------------------------|
//! | `=`  | `[v, v]`                                                |
//! | `<`  | `(v, +inf)`                                             |
//! | `<=` | `[v, +inf)`                                             |
//! | `>`  | `(-inf, v)`                                             |
//! | `>=` | `(-inf, v]`                                             |
//! | `!=` | `(-inf, v)` then `(v, +inf)`                            |
//! | TRUE | `(-inf, +inf)`                                          |
//!
//! Only the current outer tuple is buffered.

use smallvec::{smallvec, SmallVec};

use crate::core::{Attribute, CompOp, Condition, Error, JoinPredicate, Result, Tuple, Value};
use crate::executor::config::ExecConfig;
use crate::executor::operator::Operator;
use crate::executor::scan::IndexScan;
use crate::storage::KeyRange;

/// Index ranges to probe for one outer tuple
pub type LookupRanges = SmallVec<[KeyRange; 2]>;

/// Ranges of the indexed attribute `r` satisfying `value op r`.
pub fn lookup_ranges(op: CompOp, value: &Value) -> LookupRanges {
    let v = value.clone();
    match op {
        CompOp::Eq => smallvec![KeyRange::point(v)],
        CompOp::Lt => smallvec![KeyRange::above(v, false)],
        CompOp::Le => smallvec![KeyRange::above(v, true)],
        CompOp::Gt => smallvec![KeyRange::below(v, false)],
        CompOp::Ge => smallvec![KeyRange::below(v, true)],
        CompOp::Ne => smallvec![KeyRange::below(v.clone(), false), KeyRange::above(v, false)],
        CompOp::NoOp => smallvec![KeyRange::all()],
    }
}

/// Index Nested Loop Join Operator.
///
/// For each tuple of the outer input, probes the inner relation through an
/// index on the join attribute and emits one joined tuple per match.
pub struct IndexNestedLoopJoin {
    // Inputs
    left: Box<dyn Operator>,
    right: IndexScan,

    // Join configuration
    condition: Condition,
    predicate: JoinPredicate,
    max_tuple_size: usize,

    // Output schema
    schema: Vec<Attribute>,

    // Current outer tuple and the ranges still to probe for it
    current_left: Option<Tuple>,
    ranges: LookupRanges,
    range_idx: usize,
    range_active: bool,

    // State tracking
    opened: bool,
    failed: bool,
    done: bool,
}

impl IndexNestedLoopJoin {
    /// Create a new index nested loop join operator.
    ///
    /// # Arguments
    /// * `left` - Outer input operator
    /// * `right` - Index scan over the inner relation's join attribute
    /// * `condition` - Join condition; its right operand must be the indexed attribute
    pub fn new(
        left: Box<dyn Operator>,
        right: IndexScan,
        condition: Condition,
        config: &ExecConfig,
    ) -> Result<Self> {
        config.validate()?;
        let predicate = condition.bind_join(left.schema(), right.schema())?;
        let indexed = &right.indexed_attribute().name;
        if condition.rhs_attribute() != Some(indexed.as_str()) {
            return Err(Error::invalid_condition(format!(
                "'{}' does not compare against the indexed attribute '{}'",
                condition, indexed
            )));
        }

        let mut schema = Vec::with_capacity(left.schema().len() + right.schema().len());
        schema.extend(left.schema().iter().cloned());
        schema.extend(right.schema().iter().cloned());

        Ok(Self {
            left,
            right,
            condition,
            predicate,
            max_tuple_size: config.max_tuple_size,
            schema,
            current_left: None,
            ranges: SmallVec::new(),
            range_idx: 0,
            range_active: false,
            opened: false,
            failed: false,
            done: false,
        })
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    /// Get the next outer tuple and derive its lookup ranges.
    fn advance_left(&mut self) -> Result<bool> {
        match self.left.next()? {
            Some(tuple) => {
                self.ranges = match self.predicate.op() {
                    CompOp::NoOp => lookup_ranges(CompOp::NoOp, &Value::integer(0)),
                    op => lookup_ranges(op, &self.predicate.left_value(&tuple)?),
                };
                self.range_idx = 0;
                self.range_active = false;
                self.current_left = Some(tuple);
                Ok(true)
            }
            None => {
                self.current_left = None;
                Ok(false)
            }
        }
    }
}

impl IndexNestedLoopJoin {
    /// Produce the next tuple; any error aborts the operator.
    fn pull(&mut self) -> Result<Option<Tuple>> {
        if !self.opened {
            return Err(Error::not_open(self.name()));
        }

        loop {
            if self.done {
                return Ok(None);
            }

            if self.current_left.is_none() && !self.advance_left()? {
                self.done = true;
                return Ok(None);
            }

            if self.range_active {
                match self.right.next()? {
                    Some(right) => {
                        if let Some(left) = &self.current_left {
                            debug_assert!(self.predicate.evaluate(left, &right).unwrap_or(false));
                            let joined = Tuple::concat(left, &right);
                            if joined.len() > self.max_tuple_size {
                                return Err(Error::TupleTooLarge {
                                    size: joined.len(),
                                    max: self.max_tuple_size,
                                });
                            }
                            return Ok(Some(joined));
                        }
                    }
                    None => self.range_active = false,
                }
            }

            // Re-target to the next range, or move on to the next outer tuple
            if self.range_idx < self.ranges.len() {
                let range = self.ranges[self.range_idx].clone();
                self.range_idx += 1;
                self.right.set_range(range)?;
                self.range_active = true;
            } else {
                self.current_left = None;
            }
        }
    }
}

impl Operator for IndexNestedLoopJoin {
    fn open(&mut self) -> Result<()> {
        self.left.open()?;
        self.right.open()?;

        self.current_left = None;
        self.ranges.clear();
        self.range_idx = 0;
        self.range_active = false;
        self.done = false;
        self.opened = true;
        self.failed = false;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>> {
        if self.failed {
            return Err(Error::aborted(self.name()));
        }
        let result = self.pull();
        self.failed = self.opened && result.is_err();
        result
    }

    fn close(&mut self) -> Result<()> {
        self.left.close()?;
        self.right.close()?;
        self.current_left = None;
        Ok(())
    }

    fn schema(&self) -> &[Attribute] {
        &self.schema
    }

    fn name(&self) -> &str {
        "IndexNestedLoopJoin"
    }
}
