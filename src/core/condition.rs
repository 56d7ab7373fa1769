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

//! Binary predicates over attributes
//!
//! A [`Condition`] is written against attribute names. Operators bind it to
//! their input schemas once, at construction, producing a [`Predicate`] (one
//! input) or a [`JoinPredicate`] (two inputs) that evaluates by field
//! position. Unknown names and mismatched operand types surface at bind time.

use std::fmt;

use super::attribute::{find_attribute, Attribute};
use super::error::{Error, Result};
use super::tuple::{Tuple, TupleLayout};
use super::types::{CompOp, DataType};
use super::value::Value;

/// Right-hand side of a condition
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Another attribute, from the same tuple (selection) or the right input (join)
    Attribute(String),
    /// A constant
    Literal(Value),
}

/// `lhs_attr op rhs`
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub lhs_attr: String,
    pub op: CompOp,
    pub rhs: Operand,
}

impl Condition {
    pub fn new(lhs_attr: impl Into<String>, op: CompOp, rhs: Operand) -> Self {
        Self {
            lhs_attr: lhs_attr.into(),
            op,
            rhs,
        }
    }

    /// Attribute-to-attribute comparison
    pub fn attributes(lhs: impl Into<String>, op: CompOp, rhs: impl Into<String>) -> Self {
        Self::new(lhs, op, Operand::Attribute(rhs.into()))
    }

    /// Attribute-to-constant comparison
    pub fn literal(lhs: impl Into<String>, op: CompOp, value: impl Into<Value>) -> Self {
        Self::new(lhs, op, Operand::Literal(value.into()))
    }

    /// The right-hand attribute name, if the right operand is an attribute
    pub fn rhs_attribute(&self) -> Option<&str> {
        match &self.rhs {
            Operand::Attribute(name) => Some(name),
            Operand::Literal(_) => None,
        }
    }

    /// Bind against a single input schema
    pub fn bind(&self, attrs: &[Attribute]) -> Result<Predicate> {
        let (lhs, lhs_attr) = find_attribute(attrs, &self.lhs_attr)?;
        let rhs = match &self.rhs {
            Operand::Attribute(name) => {
                let (idx, attr) = find_attribute(attrs, name)?;
                self.check_types(lhs_attr.data_type, attr.data_type)?;
                BoundOperand::Field(idx)
            }
            Operand::Literal(value) => {
                self.check_types(lhs_attr.data_type, value.data_type())?;
                BoundOperand::Literal(value.clone())
            }
        };
        Ok(Predicate {
            layout: TupleLayout::new(attrs),
            lhs,
            op: self.op,
            rhs,
        })
    }

    /// Bind a join condition: the left name against `left`, the right
    /// attribute against `right`
    pub fn bind_join(&self, left: &[Attribute], right: &[Attribute]) -> Result<JoinPredicate> {
        let rhs_name = self.rhs_attribute().ok_or_else(|| {
            Error::invalid_condition(format!(
                "join condition '{}' needs an attribute on the right",
                self
            ))
        })?;
        let (left_idx, left_attr) = find_attribute(left, &self.lhs_attr)?;
        let (right_idx, right_attr) = find_attribute(right, rhs_name)?;
        self.check_types(left_attr.data_type, right_attr.data_type)?;
        Ok(JoinPredicate {
            left: TupleLayout::new(left),
            right: TupleLayout::new(right),
            left_idx,
            right_idx,
            op: self.op,
            key_type: left_attr.data_type,
        })
    }

    fn check_types(&self, lhs: DataType, rhs: DataType) -> Result<()> {
        if self.op.needs_value() && lhs != rhs {
            return Err(Error::type_mismatch(lhs, rhs));
        }
        Ok(())
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.rhs {
            Operand::Attribute(name) => write!(f, "{} {} {}", self.lhs_attr, self.op, name),
            Operand::Literal(v @ Value::Text(_)) => {
                write!(f, "{} {} '{}'", self.lhs_attr, self.op, v)
            }
            Operand::Literal(v) => write!(f, "{} {} {}", self.lhs_attr, self.op, v),
        }
    }
}

#[derive(Debug, Clone)]
enum BoundOperand {
    Field(usize),
    Literal(Value),
}

/// A condition bound to one schema
#[derive(Debug, Clone)]
pub struct Predicate {
    layout: TupleLayout,
    lhs: usize,
    op: CompOp,
    rhs: BoundOperand,
}

impl Predicate {
    /// Evaluate against a tuple of the bound schema
    pub fn evaluate(&self, tuple: &Tuple) -> Result<bool> {
        if !self.op.needs_value() {
            return Ok(true);
        }
        let lhs = self.layout.field(tuple, self.lhs)?;
        let ordering = match &self.rhs {
            BoundOperand::Field(idx) => lhs.compare(&self.layout.field(tuple, *idx)?)?,
            BoundOperand::Literal(value) => lhs.compare(value)?,
        };
        Ok(self.op.matches(ordering))
    }
}

/// A condition bound to a left and a right schema
#[derive(Debug, Clone)]
pub struct JoinPredicate {
    left: TupleLayout,
    right: TupleLayout,
    left_idx: usize,
    right_idx: usize,
    op: CompOp,
    key_type: DataType,
}

impl JoinPredicate {
    pub fn op(&self) -> CompOp {
        self.op
    }

    /// Type of the join attribute on both sides
    pub fn key_type(&self) -> DataType {
        self.key_type
    }

    /// Join attribute value of a left tuple
    pub fn left_value(&self, left: &Tuple) -> Result<Value> {
        self.left.field(left, self.left_idx)
    }

    /// Join attribute value of a right tuple
    pub fn right_value(&self, right: &Tuple) -> Result<Value> {
        self.right.field(right, self.right_idx)
    }

    /// `left.lhs op right.rhs`
    pub fn evaluate(&self, left: &Tuple, right: &Tuple) -> Result<bool> {
        if !self.op.needs_value() {
            return Ok(true);
        }
        let l = self.left_value(left)?;
        let r = self.right_value(right)?;
        Ok(self.op.matches(l.compare(&r)?))
    }

    /// Compare an already extracted left value against a right tuple
    pub fn matches_value(&self, left_value: &Value, right: &Tuple) -> Result<bool> {
        if !self.op.needs_value() {
            return Ok(true);
        }
        let r = self.right_value(right)?;
        Ok(self.op.matches(left_value.compare(&r)?))
    }
}
