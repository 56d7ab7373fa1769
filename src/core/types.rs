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

//! Core type definitions for relexec
//!
//! This module defines the fundamental enums: DataType, CompOp, AggregateOp

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::error::Error;

/// Scalar types an attribute can be declared with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DataType {
    /// 32-bit signed integer, 4 bytes on disk
    Integer = 0,

    /// 32-bit IEEE float, 4 bytes on disk
    Real = 1,

    /// Variable-length byte string, 4-byte length prefix on disk
    Text = 2,
}

impl DataType {
    /// Returns true if this type is numeric (INTEGER or REAL)
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Real)
    }

    /// Returns the encoded width of a fixed-width type
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            DataType::Integer | DataType::Real => Some(4),
            DataType::Text => None,
        }
    }

    /// Returns the type ID as u8 for serialization
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Create DataType from u8
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(DataType::Integer),
            1 => Some(DataType::Real),
            2 => Some(DataType::Text),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Integer => write!(f, "INTEGER"),
            DataType::Real => write!(f, "REAL"),
            DataType::Text => write!(f, "TEXT"),
        }
    }
}

impl FromStr for DataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "INTEGER" | "INT" => Ok(DataType::Integer),
            "REAL" | "FLOAT" => Ok(DataType::Real),
            "TEXT" | "VARCHAR" | "CHAR" => Ok(DataType::Text),
            _ => Err(Error::invalid_argument(format!("unknown type '{}'", s))),
        }
    }
}

/// Comparison operators for conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CompOp {
    /// Equality (=)
    Eq = 0,

    /// Less than (<)
    Lt = 1,

    /// Greater than (>)
    Gt = 2,

    /// Less than or equal (<=)
    Le = 3,

    /// Greater than or equal (>=)
    Ge = 4,

    /// Inequality (!=)
    Ne = 5,

    /// Always true, no comparison
    NoOp = 6,
}

impl CompOp {
    /// Returns true if this operator compares its operands
    pub fn needs_value(&self) -> bool {
        !matches!(self, CompOp::NoOp)
    }

    /// Apply the operator to the ordering of `lhs` relative to `rhs`.
    pub fn matches(&self, ordering: Ordering) -> bool {
        match self {
            CompOp::Eq => ordering == Ordering::Equal,
            CompOp::Ne => ordering != Ordering::Equal,
            CompOp::Lt => ordering == Ordering::Less,
            CompOp::Le => ordering != Ordering::Greater,
            CompOp::Gt => ordering == Ordering::Greater,
            CompOp::Ge => ordering != Ordering::Less,
            CompOp::NoOp => true,
        }
    }

    /// Returns the operator with its operands swapped (`a < b` becomes `b > a`)
    pub fn flip(&self) -> Self {
        match self {
            CompOp::Lt => CompOp::Gt,
            CompOp::Gt => CompOp::Lt,
            CompOp::Le => CompOp::Ge,
            CompOp::Ge => CompOp::Le,
            other => *other,
        }
    }
}

impl fmt::Display for CompOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompOp::Eq => write!(f, "="),
            CompOp::Ne => write!(f, "!="),
            CompOp::Lt => write!(f, "<"),
            CompOp::Le => write!(f, "<="),
            CompOp::Gt => write!(f, ">"),
            CompOp::Ge => write!(f, ">="),
            CompOp::NoOp => write!(f, "TRUE"),
        }
    }
}

/// Aggregate functions supported by the aggregate operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateOp {
    Min,
    Max,
    Count,
    Sum,
    Avg,
}

impl AggregateOp {
    /// Type of the statistic produced for an input attribute of `input` type.
    pub fn output_type(&self, input: DataType) -> DataType {
        match self {
            AggregateOp::Count => DataType::Integer,
            AggregateOp::Min | AggregateOp::Max => input,
            AggregateOp::Sum | AggregateOp::Avg => DataType::Real,
        }
    }
}

impl fmt::Display for AggregateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateOp::Min => write!(f, "MIN"),
            AggregateOp::Max => write!(f, "MAX"),
            AggregateOp::Count => write!(f, "COUNT"),
            AggregateOp::Sum => write!(f, "SUM"),
            AggregateOp::Avg => write!(f, "AVG"),
        }
    }
}
