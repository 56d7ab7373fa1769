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

//! Aggregation operator.
//!
//! Computes one of MIN, MAX, COUNT, SUM or AVG over a numeric attribute,
//! either over the whole input or per distinct value of a grouping attribute.
//!
//! Key features:
//! - Drains the child on the first `next()` call
//! - Groups are emitted one per `next()` call in ascending key order
//! - SUM and AVG accumulate in `f64` whatever the input type
//! - Empty input produces no rows, grouped or not

use crate::core::{
    find_attribute, AggregateOp, Attribute, DataType, Error, GroupMap, Result, Tuple, TupleLayout,
    Value,
};

use super::config::ExecConfig;
use super::operator::Operator;

/// Running accumulator for one group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateResult {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
}

impl Default for AggregateResult {
    fn default() -> Self {
        Self::new()
    }
}

impl AggregateResult {
    pub fn new() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            min: f64::MAX,
            max: f64::MIN,
        }
    }

    /// Fold one observed value into the accumulator.
    #[inline]
    pub fn update(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// `sum / count`, or `None` before the first update
    pub fn avg(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }

    /// Final statistic for `op` typed as `op.output_type(input)`.
    pub fn statistic(&self, op: AggregateOp, input: DataType) -> Result<Value> {
        if self.count == 0 {
            return Err(Error::internal("statistic of an empty group"));
        }
        let raw = match op {
            AggregateOp::Count => {
                let count = i32::try_from(self.count)
                    .map_err(|_| Error::internal("COUNT does not fit in INTEGER"))?;
                return Ok(Value::integer(count));
            }
            AggregateOp::Sum => self.sum,
            AggregateOp::Avg => self.sum / self.count as f64,
            AggregateOp::Min => self.min,
            AggregateOp::Max => self.max,
        };

        match op.output_type(input) {
            // MIN/MAX of an INTEGER column are exact
            DataType::Integer => Ok(Value::integer(raw as i32)),
            _ => {
                let real = raw as f32;
                if !real.is_finite() {
                    return Err(Error::NonFiniteReal);
                }
                Ok(Value::real(real))
            }
        }
    }
}

fn numeric(value: &Value) -> Result<f64> {
    let v = value
        .as_f64()
        .ok_or_else(|| Error::invalid_aggregate(format!("'{}' is not numeric", value)))?;
    if !v.is_finite() {
        return Err(Error::NonFiniteReal);
    }
    Ok(v)
}

/// Aggregation operator.
pub struct Aggregate {
    child: Box<dyn Operator>,
    op: AggregateOp,

    // Positions in the child schema
    attr_idx: usize,
    attr_type: DataType,
    group_idx: Option<usize>,

    child_layout: TupleLayout,
    layout: TupleLayout,
    schema: Vec<Attribute>,

    // Output rows, computed on the first next()
    output: Option<std::vec::IntoIter<Tuple>>,
    opened: bool,
    failed: bool,
}

impl Aggregate {
    /// Aggregate `attribute` over the whole input.
    pub fn new(child: Box<dyn Operator>, attribute: &str, op: AggregateOp) -> Result<Self> {
        Self::with_config(child, attribute, op, &ExecConfig::default())
    }

    /// Aggregate `attribute` over the whole input, bounding output tuples by
    /// `config.max_tuple_size`.
    pub fn with_config(
        child: Box<dyn Operator>,
        attribute: &str,
        op: AggregateOp,
        config: &ExecConfig,
    ) -> Result<Self> {
        Self::build(child, attribute, None, op, config)
    }

    /// Aggregate `attribute` per distinct value of `group_by`.
    ///
    /// Output rows are `(group value, statistic)` in ascending group order.
    pub fn grouped(
        child: Box<dyn Operator>,
        attribute: &str,
        group_by: &str,
        op: AggregateOp,
    ) -> Result<Self> {
        Self::grouped_with_config(child, attribute, group_by, op, &ExecConfig::default())
    }

    pub fn grouped_with_config(
        child: Box<dyn Operator>,
        attribute: &str,
        group_by: &str,
        op: AggregateOp,
        config: &ExecConfig,
    ) -> Result<Self> {
        Self::build(child, attribute, Some(group_by), op, config)
    }

    fn build(
        child: Box<dyn Operator>,
        attribute: &str,
        group_by: Option<&str>,
        op: AggregateOp,
        config: &ExecConfig,
    ) -> Result<Self> {
        config.validate()?;
        let input = child.schema();
        let (attr_idx, attr) = find_attribute(input, attribute)?;
        if !attr.data_type.is_numeric() {
            return Err(Error::invalid_aggregate(format!(
                "{} over {} attribute '{}'",
                op, attr.data_type, attr.name
            )));
        }
        let attr_type = attr.data_type;

        let stat_name = format!("{}({})", op, attr.name);
        let stat = match op.output_type(attr_type) {
            DataType::Integer => Attribute::integer(stat_name),
            _ => Attribute::real(stat_name),
        };

        let mut schema = Vec::with_capacity(2);
        let group_idx = match group_by {
            Some(name) => {
                let (idx, group_attr) = find_attribute(input, name)?;
                schema.push(group_attr.clone());
                Some(idx)
            }
            None => None,
        };
        schema.push(stat);

        let child_layout = TupleLayout::new(input).with_max_tuple_size(config.max_tuple_size);
        let layout = TupleLayout::new(&schema).with_max_tuple_size(config.max_tuple_size);
        Ok(Self {
            child,
            op,
            attr_idx,
            attr_type,
            group_idx,
            child_layout,
            layout,
            schema,
            output: None,
            opened: false,
            failed: false,
        })
    }

    pub fn op(&self) -> AggregateOp {
        self.op
    }

    pub fn is_grouped(&self) -> bool {
        self.group_idx.is_some()
    }

    fn aggregate_all(&mut self) -> Result<Vec<Tuple>> {
        let mut acc = AggregateResult::new();
        while let Some(tuple) = self.child.next()? {
            acc.update(numeric(&self.child_layout.field(&tuple, self.attr_idx)?)?);
        }
        tracing::debug!(op = %self.op, input_tuples = acc.count(), "aggregate computed");

        if acc.count() == 0 {
            return Ok(Vec::new());
        }
        let stat = acc.statistic(self.op, self.attr_type)?;
        Ok(vec![self.layout.encode(&[stat])?])
    }

    fn aggregate_groups(&mut self, group_idx: usize) -> Result<Vec<Tuple>> {
        let group_type = self.schema[0].data_type;
        let mut groups: GroupMap<AggregateResult> = GroupMap::new(group_type);
        let mut input_tuples = 0usize;
        while let Some(tuple) = self.child.next()? {
            let key = self.child_layout.field(&tuple, group_idx)?;
            let value = numeric(&self.child_layout.field(&tuple, self.attr_idx)?)?;
            groups
                .get_or_insert_with(&key, AggregateResult::new)?
                .update(value);
            input_tuples += 1;
        }
        tracing::debug!(
            op = %self.op,
            input_tuples,
            groups = groups.len(),
            "groups materialized"
        );

        let mut out = Vec::with_capacity(groups.len());
        for (key, acc) in groups {
            let stat = acc.statistic(self.op, self.attr_type)?;
            out.push(self.layout.encode(&[key.to_value(), stat])?);
        }
        Ok(out)
    }
}

impl Aggregate {
    /// Produce the next tuple; any error aborts the operator.
    fn pull(&mut self) -> Result<Option<Tuple>> {
        if !self.opened {
            return Err(Error::not_open(self.name()));
        }
        if self.output.is_none() {
            let rows = match self.group_idx {
                Some(idx) => self.aggregate_groups(idx)?,
                None => self.aggregate_all()?,
            };
            self.output = Some(rows.into_iter());
        }
        Ok(self.output.as_mut().and_then(Iterator::next))
    }
}

impl Operator for Aggregate {
    fn open(&mut self) -> Result<()> {
        self.child.open()?;
        self.output = None;
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
        self.child.close()?;
        self.output = None;
        Ok(())
    }

    fn schema(&self) -> &[Attribute] {
        &self.schema
    }

    fn name(&self) -> &str {
        "Aggregate"
    }
}
