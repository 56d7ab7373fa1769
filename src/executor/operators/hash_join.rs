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

//! Partitioned (grace) hash join operator.
//!
//! The join proceeds in two phases:
//!
//! 1. **Partition Phase** (first `next()`):
//!    - Drain both inputs
//!    - Route every tuple to partition `hash(key) % num_partitions` of its side
//!    - Partitions go to temporary files, or stay in memory with
//!      [`SpillMode::Memory`](crate::executor::config::SpillMode)
//!
//! 2. **Join Phase** (subsequent `next()` calls):
//!    - Take partitions one at a time
//!    - Load the smaller side of the partition into a hash table keyed by
//!      the exact join value
//!    - Stream the other side through it and emit every matching pair
//!
//! Only one partition's build side is resident at any time. Output fields are
//! always left then right, whichever side is built. The result multiset does
//! not depend on the partition count.

use std::collections::VecDeque;

use crate::core::{
    Attribute, CompOp, Condition, DataType, Error, JoinPredicate, Key, KeyIndex, Operand, Result,
    Tuple, Value,
};
use crate::executor::config::{ExecConfig, SpillMode};
use crate::executor::operator::Operator;
use crate::executor::spill::{PartitionReader, SpillPartition};

/// Which side of the join a tuple comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinSide {
    /// Left input
    Left,
    /// Right input
    Right,
}

/// Join value of `tuple` taken from `side`'s join attribute.
#[inline]
fn side_value(predicate: &JoinPredicate, side: JoinSide, tuple: &Tuple) -> Result<Value> {
    match side {
        JoinSide::Left => predicate.left_value(tuple),
        JoinSide::Right => predicate.right_value(tuple),
    }
}

/// Partition currently being joined.
struct ActivePartition {
    index: usize,
    build_side: JoinSide,
    table: KeyIndex<Tuple>,
    probe: PartitionReader,
    // Current probe tuple with its join value
    probe_tuple: Option<(Tuple, Value)>,
    match_idx: usize,
    emitted: usize,
}

impl ActivePartition {
    fn probe_side(&self) -> JoinSide {
        match self.build_side {
            JoinSide::Left => JoinSide::Right,
            JoinSide::Right => JoinSide::Left,
        }
    }
}

/// Partitioned (grace) hash join operator.
///
/// Supports equality conditions between a left and a right attribute only.
pub struct HashJoin {
    // Input operators
    left: Box<dyn Operator>,
    right: Box<dyn Operator>,

    // Join configuration
    condition: Condition,
    predicate: JoinPredicate,
    num_partitions: usize,
    spill_mode: SpillMode,
    max_tuple_size: usize,

    // Output schema
    schema: Vec<Attribute>,

    // Partitions not yet joined, as (index, left, right)
    pending: VecDeque<(usize, SpillPartition, SpillPartition)>,
    active: Option<ActivePartition>,

    // State tracking
    opened: bool,
    failed: bool,
    partitioned: bool,
    done: bool,
}

impl HashJoin {
    /// Create a new hash join operator.
    ///
    /// # Arguments
    /// * `left` - Left input operator
    /// * `right` - Right input operator
    /// * `condition` - `left.attr = right.attr`
    /// * `num_partitions` - Number of partitions per side
    ///
    /// # Open files
    ///
    /// With [`SpillMode::Disk`] every non-empty partition holds its own
    /// anonymous temp file from its first tuple until it is joined, so
    /// partitioning can keep up to `2 * num_partitions` descriptors open at
    /// once. Keep `num_partitions` well under the process file limit
    /// (`ulimit -n`), or use [`SpillMode::Memory`]; running out surfaces as
    /// [`Error::Io`].
    pub fn new(
        left: Box<dyn Operator>,
        right: Box<dyn Operator>,
        condition: Condition,
        num_partitions: usize,
        config: &ExecConfig,
    ) -> Result<Self> {
        config.validate()?;
        if condition.op != CompOp::Eq {
            return Err(Error::unsupported_join_condition(format!(
                "hash join needs '=', got '{}'",
                condition
            )));
        }
        if let Operand::Literal(_) = condition.rhs {
            return Err(Error::unsupported_join_condition(format!(
                "hash join needs an attribute on the right, got '{}'",
                condition
            )));
        }
        if num_partitions == 0 {
            return Err(Error::invalid_argument("num_partitions must be positive"));
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
            num_partitions,
            spill_mode: config.spill_mode,
            max_tuple_size: config.max_tuple_size,
            schema,
            pending: VecDeque::new(),
            active: None,
            opened: false,
            failed: false,
            partitioned: false,
            done: false,
        })
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    pub fn num_partitions(&self) -> usize {
        self.num_partitions
    }

    /// Drain one input into per-partition spill files.
    fn partition_side(&mut self, side: JoinSide) -> Result<Vec<SpillPartition>> {
        let n = self.num_partitions;
        let key_type = self.predicate.key_type();
        let mut parts: Vec<SpillPartition> =
            (0..n).map(|_| SpillPartition::new(self.spill_mode)).collect();

        let input = match side {
            JoinSide::Left => &mut self.left,
            JoinSide::Right => &mut self.right,
        };
        while let Some(tuple) = input.next()? {
            let value = side_value(&self.predicate, side, &tuple)?;
            let p = Key::typed(&value, key_type)?.partition(n);
            parts[p].push(tuple)?;
        }
        Ok(parts)
    }

    fn partition_inputs(&mut self) -> Result<()> {
        let left = self.partition_side(JoinSide::Left)?;
        let right = self.partition_side(JoinSide::Right)?;

        let left_tuples: usize = left.iter().map(SpillPartition::len).sum();
        let right_tuples: usize = right.iter().map(SpillPartition::len).sum();
        tracing::debug!(
            partitions = self.num_partitions,
            left_tuples,
            right_tuples,
            spill_mode = ?self.spill_mode,
            "partitioning finished"
        );

        self.pending = left
            .into_iter()
            .zip(right)
            .enumerate()
            .map(|(i, (l, r))| (i, l, r))
            .collect();
        Ok(())
    }

    /// Build the hash table for one partition.
    ///
    /// Returns `None` when either side of the partition is empty.
    fn load_partition(
        &self,
        index: usize,
        left: SpillPartition,
        right: SpillPartition,
    ) -> Result<Option<ActivePartition>> {
        if left.is_empty() || right.is_empty() {
            return Ok(None);
        }

        let build_side = if left.len() <= right.len() {
            JoinSide::Left
        } else {
            JoinSide::Right
        };
        let (build, probe) = match build_side {
            JoinSide::Left => (left, right),
            JoinSide::Right => (right, left),
        };

        let mut table = KeyIndex::new(self.key_type());
        let mut reader = build.into_reader()?;
        while let Some(tuple) = reader.next_tuple()? {
            let value = side_value(&self.predicate, build_side, &tuple)?;
            table.insert(&value, tuple)?;
        }
        tracing::debug!(
            partition = index,
            build_side = ?build_side,
            build_tuples = table.len(),
            distinct_keys = table.key_count(),
            probe_tuples = probe.len(),
            "partition loaded"
        );

        Ok(Some(ActivePartition {
            index,
            build_side,
            table,
            probe: probe.into_reader()?,
            probe_tuple: None,
            match_idx: 0,
            emitted: 0,
        }))
    }

    fn key_type(&self) -> DataType {
        self.predicate.key_type()
    }
}

impl HashJoin {
    /// Produce the next tuple; any error aborts the operator.
    fn pull(&mut self) -> Result<Option<Tuple>> {
        if !self.opened {
            return Err(Error::not_open(self.name()));
        }
        if self.done {
            return Ok(None);
        }
        if !self.partitioned {
            self.partition_inputs()?;
            self.partitioned = true;
        }

        loop {
            let active = match self.active.as_mut() {
                Some(active) => active,
                None => match self.pending.pop_front() {
                    Some((index, left, right)) => {
                        self.active = self.load_partition(index, left, right)?;
                        continue;
                    }
                    None => {
                        self.done = true;
                        return Ok(None);
                    }
                },
            };

            // Emit the next build tuple matching the current probe tuple
            if let Some((probe, value)) = &active.probe_tuple {
                let matches = active.table.get(value)?;
                if let Some(build) = matches.get(active.match_idx) {
                    active.match_idx += 1;
                    active.emitted += 1;
                    let joined = match active.build_side {
                        JoinSide::Left => Tuple::concat(build, probe),
                        JoinSide::Right => Tuple::concat(probe, build),
                    };
                    debug_assert!(match active.build_side {
                        JoinSide::Left => self.predicate.evaluate(build, probe),
                        JoinSide::Right => self.predicate.evaluate(probe, build),
                    }
                    .unwrap_or(false));
                    if joined.len() > self.max_tuple_size {
                        return Err(Error::TupleTooLarge {
                            size: joined.len(),
                            max: self.max_tuple_size,
                        });
                    }
                    return Ok(Some(joined));
                }
            }

            // Advance the probe side
            let probe_side = active.probe_side();
            match active.probe.next_tuple()? {
                Some(tuple) => {
                    let value = side_value(&self.predicate, probe_side, &tuple)?;
                    active.probe_tuple = Some((tuple, value));
                    active.match_idx = 0;
                }
                None => {
                    tracing::debug!(
                        partition = active.index,
                        output_tuples = active.emitted,
                        "partition joined"
                    );
                    self.active = None;
                }
            }
        }
    }
}

impl Operator for HashJoin {
    fn open(&mut self) -> Result<()> {
        self.left.open()?;
        self.right.open()?;

        self.pending.clear();
        self.active = None;
        self.partitioned = false;
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
        self.pending.clear();
        self.active = None;
        Ok(())
    }

    fn schema(&self) -> &[Attribute] {
        &self.schema
    }

    fn name(&self) -> &str {
        "HashJoin"
    }
}
