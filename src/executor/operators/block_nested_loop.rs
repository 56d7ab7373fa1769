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

//! Block Nested Loop Join Operator.
//!
//! The left (outer) input is consumed in blocks bounded by a byte budget of
//! `num_pages * page_size`. For every block the right relation is rescanned
//! from its first row, and each right tuple is tested against every tuple in
//! the block. The right side is read `ceil(|left| / block)` times instead of
//! `|left|` times.
//!
//! Output order is block by block; inside a block it is right-scan order,
//! then block order. The result set does not depend on the budget.

use crate::core::{Attribute, Condition, Error, JoinPredicate, Result, Tuple};
use crate::executor::config::ExecConfig;
use crate::executor::operator::Operator;
use crate::executor::scan::TableScan;

/// Block Nested Loop Join Operator.
pub struct BlockNestedLoopJoin {
    // Inputs
    left: Box<dyn Operator>,
    right: TableScan,

    // Join configuration
    condition: Condition,
    predicate: JoinPredicate,
    budget: usize,
    max_tuple_size: usize,

    // Output schema
    schema: Vec<Attribute>,

    // Current block of left tuples
    block: Vec<Tuple>,
    block_bytes: usize,
    // First tuple of the next block, read while filling the current one
    pending_left: Option<Tuple>,

    // Current right tuple and the next block position to test it against
    current_right: Option<Tuple>,
    block_idx: usize,

    // State tracking
    opened: bool,
    failed: bool,
    left_exhausted: bool,
    done: bool,
}

impl BlockNestedLoopJoin {
    /// Create a new block nested loop join operator.
    ///
    /// # Arguments
    /// * `left` - Left (outer) input operator
    /// * `right` - Scan of the right (inner) relation, rewound once per block
    /// * `condition` - Join condition, right operand an attribute of `right`
    /// * `num_pages` - Block budget in pages of `config.page_size` bytes
    pub fn new(
        left: Box<dyn Operator>,
        right: TableScan,
        condition: Condition,
        num_pages: usize,
        config: &ExecConfig,
    ) -> Result<Self> {
        config.validate()?;
        if num_pages == 0 {
            return Err(Error::invalid_argument("num_pages must be positive"));
        }
        let predicate = condition.bind_join(left.schema(), right.schema())?;

        let mut schema = Vec::with_capacity(left.schema().len() + right.schema().len());
        schema.extend(left.schema().iter().cloned());
        schema.extend(right.schema().iter().cloned());

        Ok(Self {
            left,
            right,
            condition,
            predicate,
            budget: num_pages.saturating_mul(config.page_size),
            max_tuple_size: config.max_tuple_size,
            schema,
            block: Vec::new(),
            block_bytes: 0,
            pending_left: None,
            current_right: None,
            block_idx: 0,
            opened: false,
            failed: false,
            left_exhausted: false,
            done: false,
        })
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    /// Refill the block from the left input.
    ///
    /// A block always takes at least one tuple, even one larger than the
    /// budget. Returns false once the left input is drained.
    fn fill_block(&mut self) -> Result<bool> {
        self.block.clear();
        self.block_bytes = 0;

        if let Some(tuple) = self.pending_left.take() {
            self.block_bytes += tuple.len();
            self.block.push(tuple);
        }
        while !self.left_exhausted {
            match self.left.next()? {
                Some(tuple) => {
                    if !self.block.is_empty() && self.block_bytes + tuple.len() > self.budget {
                        self.pending_left = Some(tuple);
                        break;
                    }
                    self.block_bytes += tuple.len();
                    self.block.push(tuple);
                }
                None => self.left_exhausted = true,
            }
        }

        if self.block.is_empty() {
            return Ok(false);
        }
        tracing::debug!(
            tuples = self.block.len(),
            bytes = self.block_bytes,
            budget = self.budget,
            "block filled"
        );
        Ok(true)
    }
}

impl BlockNestedLoopJoin {
    /// Produce the next tuple; any error aborts the operator.
    fn pull(&mut self) -> Result<Option<Tuple>> {
        if !self.opened {
            return Err(Error::not_open(self.name()));
        }

        loop {
            if self.done {
                return Ok(None);
            }

            // Start a new block and restart the right scan for it
            if self.block.is_empty() {
                if !self.fill_block()? {
                    self.done = true;
                    return Ok(None);
                }
                self.right.rewind()?;
                self.current_right = None;
            }

            if self.current_right.is_none() {
                match self.right.next()? {
                    Some(tuple) => {
                        self.current_right = Some(tuple);
                        self.block_idx = 0;
                    }
                    None => {
                        // Right scan exhausted for this block
                        self.block.clear();
                        continue;
                    }
                }
            }

            if let Some(right) = &self.current_right {
                while self.block_idx < self.block.len() {
                    let left = &self.block[self.block_idx];
                    self.block_idx += 1;

                    if self.predicate.evaluate(left, right)? {
                        let joined = Tuple::concat(left, right);
                        if joined.len() > self.max_tuple_size {
                            return Err(Error::TupleTooLarge {
                                size: joined.len(),
                                max: self.max_tuple_size,
                            });
                        }
                        return Ok(Some(joined));
                    }
                }
            }
            self.current_right = None;
        }
    }
}

impl Operator for BlockNestedLoopJoin {
    fn open(&mut self) -> Result<()> {
        self.left.open()?;
        self.right.open()?;

        self.block.clear();
        self.block_bytes = 0;
        self.pending_left = None;
        self.current_right = None;
        self.block_idx = 0;
        self.left_exhausted = false;
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
        self.block.clear();
        self.pending_left = None;
        self.current_right = None;
        Ok(())
    }

    fn schema(&self) -> &[Attribute] {
        &self.schema
    }

    fn name(&self) -> &str {
        "BlockNestedLoopJoin"
    }
}
